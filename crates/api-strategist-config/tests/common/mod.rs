// crates/api-strategist-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared fixtures for api-strategist-config tests.
// Purpose: Write TOML fixtures to temp files and load them.
// =============================================================================

#![allow(dead_code, reason = "Helpers are shared across test binaries.")]

use std::io::Write;

use api_strategist_config::ConfigError;
use api_strategist_config::StrategistConfig;
use tempfile::NamedTempFile;

/// Writes `content` to a temp file and loads it through the full pipeline.
pub fn load_toml(content: &str) -> Result<Result<StrategistConfig, ConfigError>, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content.as_bytes()).map_err(|err| err.to_string())?;
    Ok(StrategistConfig::load(Some(file.path())))
}

/// Asserts that a result is an error whose message contains `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> Result<(), String> {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error '{message}' did not contain '{needle}'"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
