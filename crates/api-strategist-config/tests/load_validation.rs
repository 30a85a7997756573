//! Config load validation tests for api-strategist-config.
// crates/api-strategist-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding, parse).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

#![allow(clippy::use_debug, reason = "Tests inspect Debug output for redaction.")]

use std::io::Write;
use std::path::Path;

use api_strategist_config::AuditSinkKind;
use api_strategist_config::ConfigError;
use api_strategist_config::StrategistConfig;
use api_strategist_core::FunctionChoice;
use tempfile::NamedTempFile;
use tempfile::TempDir;

mod common;

type TestResult = Result<(), String>;

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    common::assert_invalid(
        StrategistConfig::load(Some(Path::new(&long_path))),
        "config path exceeds max length",
    )
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    common::assert_invalid(
        StrategistConfig::load(Some(Path::new(&long_component))),
        "config path component too long",
    )
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let mut payload = b"# ".to_vec();
    payload.extend(vec![b'a'; 1_048_577]);
    file.write_all(&payload).map_err(|err| err.to_string())?;
    common::assert_invalid(
        StrategistConfig::load(Some(file.path())),
        "config file exceeds size limit",
    )
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    common::assert_invalid(StrategistConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_reports_missing_file_as_io_error() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let missing = dir.path().join("absent.toml");
    match StrategistConfig::load(Some(&missing)) {
        Err(ConfigError::Io(_)) => Ok(()),
        other => Err(format!("expected io error, got {other:?}")),
    }
}

#[test]
fn load_reports_malformed_toml_as_parse_error() -> TestResult {
    match common::load_toml("[model\nmodel_id = ")? {
        Err(ConfigError::Parse(_)) => Ok(()),
        other => Err(format!("expected parse error, got {other:?}")),
    }
}

#[test]
fn empty_file_loads_defaults() -> TestResult {
    let config = common::load_toml("")?.map_err(|err| err.to_string())?;
    if config.model.model_id != "gpt-4o-mini" {
        return Err(format!("unexpected model id {}", config.model.model_id));
    }
    if config.model.api_key_env != "OPENAI_API_KEY" {
        return Err("default api key env should be OPENAI_API_KEY".to_string());
    }
    if (config.model.temperature - 0.3).abs() > f32::EPSILON {
        return Err("default temperature should be 0.3".to_string());
    }
    if config.model.max_output_tokens != 2_000 || config.model.max_tool_rounds != 8 {
        return Err("unexpected token or round defaults".to_string());
    }
    if config.fakestore.base_url != "https://fakestoreapi.com" {
        return Err(format!("unexpected base url {}", config.fakestore.base_url));
    }
    if config.audit.sink != AuditSinkKind::Stderr {
        return Err("default audit sink should be stderr".to_string());
    }
    Ok(())
}

#[test]
fn full_file_round_trips_into_component_settings() -> TestResult {
    let config = common::load_toml(
        r#"
[model]
endpoint = "http://127.0.0.1:9000/v1/chat/completions"
allow_http = true
model_id = "local-model"
api_key_env = "LOCAL_LLM_KEY"
temperature = 0.0
max_output_tokens = 512
max_tool_rounds = 3
request_timeout_ms = 5000
function_choice = "none"

[fakestore]
base_url = "https://store.internal.test/api"
timeout_ms = 2500
login_username = "qa"
login_password = "hunter2"

[audit]
sink = "file"
path = "logs/strategist.jsonl"
"#,
    )?
    .map_err(|err| err.to_string())?;

    let settings = config.model.execution_settings();
    if settings.max_output_tokens != 512 || settings.function_choice != FunctionChoice::None {
        return Err(format!("unexpected execution settings {settings:?}"));
    }
    let openai = config.model.openai_config();
    if openai.model_id != "local-model" || openai.max_tool_rounds != 3 || !openai.allow_http {
        return Err(format!("unexpected transport config {openai:?}"));
    }
    if openai.request_timeout_ms != 5_000 || openai.api_key_env != "LOCAL_LLM_KEY" {
        return Err("transport timeout or key env not carried over".to_string());
    }
    let client = config.fakestore.client_config();
    if client.base_url != "https://store.internal.test/api" || client.timeout_ms != 2_500 {
        return Err(format!("unexpected client config {client:?}"));
    }
    let credentials = config.fakestore.credentials();
    if credentials.username != "qa" || credentials.password != "hunter2" {
        return Err("configured credentials not used".to_string());
    }
    if config.audit.sink != AuditSinkKind::File {
        return Err("audit sink should be file".to_string());
    }
    Ok(())
}

#[test]
fn debug_output_redacts_login_password() -> TestResult {
    let config = common::load_toml(
        "[fakestore]\nlogin_username = \"qa\"\nlogin_password = \"s3cret-value\"\n",
    )?
    .map_err(|err| err.to_string())?;
    let rendered = format!("{:?}", config.fakestore);
    if rendered.contains("s3cret-value") {
        return Err("password leaked into debug output".to_string());
    }
    if !rendered.contains("<redacted>") {
        return Err("password placeholder missing".to_string());
    }
    Ok(())
}
