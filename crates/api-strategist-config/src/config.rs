// crates/api-strategist-config/src/config.rs
// ============================================================================
// Module: API Strategist Configuration
// Description: Configuration loading and validation for the strategist CLI.
// Purpose: Provide strict, fail-closed config parsing with explicit limits.
// Dependencies: api-strategist-core, api-strategist-providers, serde, toml
// ============================================================================

//! ## Overview
//! This module loads `api-strategist.toml`, applies defaults, and validates
//! every field before any network client is built. Invalid configuration is
//! rejected; nothing is clamped silently. Each section converts into the
//! settings type of the component it configures.
//!
//! Security posture: config files are untrusted input. Size and path limits
//! are enforced before parsing, and secrets never appear in `Debug` output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use api_strategist_core::ExecutionSettings;
use api_strategist_core::FunctionChoice;
use api_strategist_providers::FakeStoreConfig;
use api_strategist_providers::LoginCredentials;
use api_strategist_providers::OpenAiConfig;
use api_strategist_providers::fakestore::DEFAULT_FAKESTORE_URL;
use api_strategist_providers::openai::DEFAULT_API_KEY_ENV;
use api_strategist_providers::openai::DEFAULT_CHAT_ENDPOINT;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits and Defaults
// ============================================================================

/// Default config file name.
pub const DEFAULT_CONFIG_NAME: &str = "api-strategist.toml";
/// Environment variable for config path override.
pub(crate) const CONFIG_ENV_VAR: &str = "API_STRATEGIST_CONFIG";
/// Maximum size of a config file in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// Default model identifier.
pub(crate) const DEFAULT_MODEL_ID: &str = "gpt-4o-mini";
/// Default sampling temperature.
pub(crate) const DEFAULT_TEMPERATURE: f32 = 0.3;
/// Maximum sampling temperature.
pub(crate) const MAX_TEMPERATURE: f32 = 1.0;
/// Default maximum response length in tokens.
pub(crate) const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2_000;
/// Maximum response length in tokens.
pub(crate) const MAX_OUTPUT_TOKENS: u32 = 32_768;
/// Default number of tool-calling rounds.
pub(crate) const DEFAULT_MAX_TOOL_ROUNDS: u32 = 8;
/// Maximum number of tool-calling rounds.
pub(crate) const MAX_TOOL_ROUNDS: u32 = 32;
/// Default model request timeout in milliseconds.
pub(crate) const DEFAULT_MODEL_TIMEOUT_MS: u64 = 60_000;
/// Minimum model request timeout in milliseconds.
pub(crate) const MIN_MODEL_TIMEOUT_MS: u64 = 1_000;
/// Maximum model request timeout in milliseconds.
pub(crate) const MAX_MODEL_TIMEOUT_MS: u64 = 300_000;
/// Default FakeStore request timeout in milliseconds.
pub(crate) const DEFAULT_FAKESTORE_TIMEOUT_MS: u64 = 10_000;
/// Minimum FakeStore request timeout in milliseconds.
pub(crate) const MIN_FAKESTORE_TIMEOUT_MS: u64 = 100;
/// Maximum FakeStore request timeout in milliseconds.
pub(crate) const MAX_FAKESTORE_TIMEOUT_MS: u64 = 120_000;
/// Maximum length of identifiers such as the model id or env var name.
pub(crate) const MAX_IDENTIFIER_LENGTH: usize = 256;
/// Maximum length of URL fields.
pub(crate) const MAX_URL_LENGTH: usize = 2048;

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// Strategist configuration loaded from TOML.
///
/// # Invariants
/// - A value returned by [`StrategistConfig::load`] has passed
///   [`StrategistConfig::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StrategistConfig {
    /// Chat model configuration.
    #[serde(default)]
    pub model: ModelConfig,
    /// FakeStore target configuration.
    #[serde(default)]
    pub fakestore: FakeStoreSection,
    /// Audit sink configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl StrategistConfig {
    /// Loads configuration using the default resolution rules.
    ///
    /// Resolution order: explicit `path`, then `API_STRATEGIST_CONFIG`, then
    /// `api-strategist.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, is too large, is
    /// not UTF-8, fails to parse, or fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.model.validate()?;
        self.fakestore.validate()?;
        self.audit.validate()
    }
}

// ============================================================================
// SECTION: Model Section
// ============================================================================

/// Chat model configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelConfig {
    /// Chat-completions endpoint URL.
    #[serde(default = "default_chat_endpoint")]
    pub endpoint: String,
    /// Model identifier.
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Sampling temperature in `0.0..=1.0`.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum response length in tokens.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Maximum tool-calling rounds per run.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_model_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Function-calling mode.
    #[serde(default = "default_function_choice")]
    pub function_choice: FunctionChoice,
    /// Allow a cleartext HTTP endpoint.
    #[serde(default)]
    pub allow_http: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: default_chat_endpoint(),
            model_id: default_model_id(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            max_tool_rounds: default_max_tool_rounds(),
            request_timeout_ms: default_model_timeout_ms(),
            function_choice: default_function_choice(),
            allow_http: false,
        }
    }
}

impl ModelConfig {
    /// Validates the model section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a field is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url("model.endpoint", &self.endpoint, self.allow_http)?;
        validate_identifier("model.model_id", &self.model_id)?;
        validate_identifier("model.api_key_env", &self.api_key_env)?;
        if !self.api_key_env.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
            return Err(ConfigError::Invalid(
                "model.api_key_env must contain only ascii letters, digits, or underscores"
                    .to_string(),
            ));
        }
        if !self.temperature.is_finite() || !(0.0..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "model.temperature must be between 0.0 and {MAX_TEMPERATURE:.1}"
            )));
        }
        validate_count_range("model.max_output_tokens", self.max_output_tokens, 1, MAX_OUTPUT_TOKENS)?;
        validate_count_range("model.max_tool_rounds", self.max_tool_rounds, 1, MAX_TOOL_ROUNDS)?;
        validate_timeout_range(
            "model.request_timeout_ms",
            self.request_timeout_ms,
            MIN_MODEL_TIMEOUT_MS,
            MAX_MODEL_TIMEOUT_MS,
        )
    }

    /// Returns the execution settings for a strategy run.
    #[must_use]
    pub const fn execution_settings(&self) -> ExecutionSettings {
        ExecutionSettings {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            function_choice: self.function_choice,
        }
    }

    /// Returns the chat transport configuration.
    #[must_use]
    pub fn openai_config(&self) -> OpenAiConfig {
        OpenAiConfig {
            endpoint: self.endpoint.clone(),
            model_id: self.model_id.clone(),
            api_key_env: self.api_key_env.clone(),
            max_tool_rounds: self.max_tool_rounds,
            request_timeout_ms: self.request_timeout_ms,
            allow_http: self.allow_http,
            ..OpenAiConfig::default()
        }
    }
}

// ============================================================================
// SECTION: FakeStore Section
// ============================================================================

/// FakeStore target configuration.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct FakeStoreSection {
    /// API base URL.
    #[serde(default = "default_fakestore_url")]
    pub base_url: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_fakestore_timeout_ms")]
    pub timeout_ms: u64,
    /// Allow a cleartext HTTP base URL.
    #[serde(default)]
    pub allow_http: bool,
    /// Login name used by the authentication test.
    #[serde(default)]
    pub login_username: Option<String>,
    /// Password used by the authentication test.
    #[serde(default)]
    pub login_password: Option<String>,
}

impl Default for FakeStoreSection {
    fn default() -> Self {
        Self {
            base_url: default_fakestore_url(),
            timeout_ms: default_fakestore_timeout_ms(),
            allow_http: false,
            login_username: None,
            login_password: None,
        }
    }
}

impl fmt::Debug for FakeStoreSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeStoreSection")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("allow_http", &self.allow_http)
            .field("login_username", &self.login_username)
            .field("login_password", &self.login_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl FakeStoreSection {
    /// Validates the FakeStore section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a field is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url("fakestore.base_url", &self.base_url, self.allow_http)?;
        validate_timeout_range(
            "fakestore.timeout_ms",
            self.timeout_ms,
            MIN_FAKESTORE_TIMEOUT_MS,
            MAX_FAKESTORE_TIMEOUT_MS,
        )?;
        match (&self.login_username, &self.login_password) {
            (Some(username), Some(password)) => {
                validate_identifier("fakestore.login_username", username)?;
                if password.is_empty() {
                    return Err(ConfigError::Invalid(
                        "fakestore.login_password must be non-empty".to_string(),
                    ));
                }
                Ok(())
            }
            (None, None) => Ok(()),
            _ => Err(ConfigError::Invalid(
                "fakestore.login_username and fakestore.login_password must be set together"
                    .to_string(),
            )),
        }
    }

    /// Returns the repository client configuration.
    #[must_use]
    pub fn client_config(&self) -> FakeStoreConfig {
        FakeStoreConfig {
            base_url: self.base_url.clone(),
            timeout_ms: self.timeout_ms,
            allow_http: self.allow_http,
            ..FakeStoreConfig::default()
        }
    }

    /// Returns the credentials for the login test, falling back to the
    /// public FakeStore sample account.
    #[must_use]
    pub fn credentials(&self) -> LoginCredentials {
        match (&self.login_username, &self.login_password) {
            (Some(username), Some(password)) => LoginCredentials {
                username: username.clone(),
                password: password.clone(),
            },
            _ => LoginCredentials::default(),
        }
    }
}

// ============================================================================
// SECTION: Audit Section
// ============================================================================

/// Audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Audit events are discarded.
    None,
}

/// Audit sink configuration.
///
/// # Invariants
/// - `path` is set exactly when `sink` is [`AuditSinkKind::File`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct AuditConfig {
    /// Selected sink.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Output path for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates the audit section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the sink and path disagree.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, Some(path)) => {
                let text = path.to_string_lossy();
                validate_path_string("audit.path", &text)
            }
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
            (_, Some(_)) => Err(ConfigError::Invalid(
                "audit.path is only allowed for the file sink".to_string(),
            )),
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error while reading config.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parse error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Validation error.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Path Resolution
// ============================================================================

/// Resolves the config path from the argument, env var, or default name.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Enforces total and per-component path length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Field Validation
// ============================================================================

/// Validates a path-valued field.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if value.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(value).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} component too long")));
        }
    }
    Ok(())
}

/// Validates a non-empty identifier without surrounding whitespace.
fn validate_identifier(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if value.trim() != value {
        return Err(ConfigError::Invalid(format!(
            "{field} must not have leading or trailing whitespace"
        )));
    }
    if value.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    Ok(())
}

/// Validates a URL field: http(s) scheme, http only when allowed.
fn validate_url(field: &str, value: &str, allow_http: bool) -> Result<(), ConfigError> {
    if value.len() > MAX_URL_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let lowered = value.trim().to_ascii_lowercase();
    let rest = if let Some(rest) = lowered.strip_prefix("https://") {
        rest
    } else if let Some(rest) = lowered.strip_prefix("http://") {
        if !allow_http {
            return Err(ConfigError::Invalid(format!(
                "{field} uses http without allow_http = true"
            )));
        }
        rest
    } else {
        return Err(ConfigError::Invalid(format!("{field} must be an http or https url")));
    };
    if rest.is_empty() || rest.starts_with('/') {
        return Err(ConfigError::Invalid(format!("{field} must include a host")));
    }
    Ok(())
}

/// Validates an inclusive millisecond range.
fn validate_timeout_range(
    field: &str,
    value_ms: u64,
    min_ms: u64,
    max_ms: u64,
) -> Result<(), ConfigError> {
    if value_ms < min_ms || value_ms > max_ms {
        return Err(ConfigError::Invalid(format!(
            "{field} must be between {min_ms} and {max_ms} milliseconds"
        )));
    }
    Ok(())
}

/// Validates an inclusive count range.
fn validate_count_range(field: &str, value: u32, min: u32, max: u32) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::Invalid(format!("{field} must be between {min} and {max}")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default chat-completions endpoint.
fn default_chat_endpoint() -> String {
    DEFAULT_CHAT_ENDPOINT.to_string()
}

/// Default model identifier.
fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}

/// Default API key environment variable.
fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

/// Default sampling temperature.
pub(crate) const fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

/// Default maximum response length in tokens.
pub(crate) const fn default_max_output_tokens() -> u32 {
    DEFAULT_MAX_OUTPUT_TOKENS
}

/// Default tool-calling round limit.
pub(crate) const fn default_max_tool_rounds() -> u32 {
    DEFAULT_MAX_TOOL_ROUNDS
}

/// Default model request timeout.
pub(crate) const fn default_model_timeout_ms() -> u64 {
    DEFAULT_MODEL_TIMEOUT_MS
}

/// Default function-calling mode.
pub(crate) const fn default_function_choice() -> FunctionChoice {
    FunctionChoice::Auto
}

/// Default FakeStore base URL.
fn default_fakestore_url() -> String {
    DEFAULT_FAKESTORE_URL.to_string()
}

/// Default FakeStore request timeout.
pub(crate) const fn default_fakestore_timeout_ms() -> u64 {
    DEFAULT_FAKESTORE_TIMEOUT_MS
}

// ============================================================================
// SECTION: Tests
// ============================================================================
