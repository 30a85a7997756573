// crates/api-strategist-providers/src/openai.rs
// ============================================================================
// Module: OpenAI-Compatible Chat Model
// Description: Chat-completions transport with function calling.
// Purpose: Let the model select and run catalog functions before answering.
// Dependencies: api-strategist-core, async-trait, reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! [`OpenAiChatModel`] sends the strategy prompt as a single user message and
//! exposes the catalog as `tools`. While the reply carries `tool_calls`, each
//! call is dispatched through [`FunctionCatalog::invoke`] (so it lands in the
//! ledger), its result is appended as a `tool` message, and the exchange
//! repeats. The number of tool rounds is bounded. Function failures and bad
//! arguments are reported back to the model rather than aborting the run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use api_strategist_core::CancellationSignal;
use api_strategist_core::FunctionArguments;
use api_strategist_core::FunctionCatalog;
use api_strategist_core::FunctionChoice;
use api_strategist_core::LanguageModel;
use api_strategist_core::ModelError;
use api_strategist_core::ModelRequest;
use api_strategist_core::ModelResponse;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::Url;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::http::body_preview;
use crate::http::parse_endpoint;
use crate::http::read_body_with_limit;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Default chat-completions endpoint.
pub const DEFAULT_CHAT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
/// Default environment variable holding the API key.
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Configuration for the chat model transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiConfig {
    /// Full chat-completions URL.
    pub endpoint: String,
    /// Model identifier sent with each request.
    pub model_id: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Maximum tool-calling rounds before the run is abandoned.
    pub max_tool_rounds: u32,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Allow cleartext HTTP (disabled by default).
    pub allow_http: bool,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CHAT_ENDPOINT.to_string(),
            model_id: "gpt-4o-mini".to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            max_tool_rounds: 8,
            request_timeout_ms: 60_000,
            allow_http: false,
            max_response_bytes: 4 * 1024 * 1024,
        }
    }
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Chat message in either direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    /// Message author role.
    role: String,
    /// Text content; absent on pure tool-call replies.
    #[serde(default)]
    content: Option<String>,
    /// Tool calls requested by the assistant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ToolCall>>,
    /// Tool call this message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl ChatMessage {
    /// Builds a user message.
    fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.to_string()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Builds a tool-result message.
    fn tool(call_id: String, content: String) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content),
            tool_calls: None,
            tool_call_id: Some(call_id),
        }
    }
}

/// Tool call requested by the assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToolCall {
    /// Call identifier echoed in the tool result.
    id: String,
    /// Call type; always `function`.
    #[serde(rename = "type", default = "function_type")]
    kind: String,
    /// Function name and raw JSON arguments.
    function: ToolCallFunction,
}

/// Function part of a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToolCallFunction {
    /// Catalog function name.
    name: String,
    /// JSON-encoded arguments object.
    #[serde(default)]
    arguments: String,
}

/// Tool definition advertised to the model.
#[derive(Debug, Serialize)]
struct ToolSpec<'a> {
    /// Tool type; always `function`.
    #[serde(rename = "type")]
    kind: &'static str,
    /// Function definition.
    function: FunctionSpec<'a>,
}

/// Function definition inside a tool.
#[derive(Debug, Serialize)]
struct FunctionSpec<'a> {
    /// Function name.
    name: &'a str,
    /// Function description.
    description: &'a str,
    /// JSON Schema for the arguments.
    parameters: &'a Value,
}

/// Chat-completions request body.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    /// Model identifier.
    model: &'a str,
    /// Conversation so far.
    messages: &'a [ChatMessage],
    /// Advertised tools; omitted when function calling is disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolSpec<'a>]>,
    /// Tool choice mode; omitted when no tools are advertised.
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    /// Sampling temperature.
    temperature: f32,
    /// Response-length budget.
    max_tokens: u32,
}

/// Chat-completions response body.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    /// Candidate replies; the first is used.
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

/// Single candidate reply.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    /// Assistant message.
    message: ChatMessage,
}

/// Serde default for [`ToolCall::kind`].
fn function_type() -> String {
    "function".to_string()
}

// ============================================================================
// SECTION: Model
// ============================================================================

/// OpenAI-compatible chat model with function calling.
pub struct OpenAiChatModel {
    /// Chat-completions URL.
    endpoint: Url,
    /// HTTP client used for outbound requests.
    client: Client,
    /// Model identifier.
    model_id: String,
    /// Bearer token.
    api_key: String,
    /// Maximum tool-calling rounds.
    max_tool_rounds: u32,
    /// Maximum response size allowed, in bytes.
    max_response_bytes: usize,
}

impl std::fmt::Debug for OpenAiChatModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiChatModel")
            .field("endpoint", &self.endpoint.as_str())
            .field("model_id", &self.model_id)
            .field("api_key", &"<redacted>")
            .field("max_tool_rounds", &self.max_tool_rounds)
            .finish_non_exhaustive()
    }
}

impl OpenAiChatModel {
    /// Creates a model, reading the API key from the configured variable.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Configuration`] when the key variable is unset
    /// or blank, or the endpoint is unusable.
    pub fn new(config: &OpenAiConfig) -> Result<Self, ModelError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ModelError::Configuration(format!(
                    "environment variable {} is not set",
                    config.api_key_env
                ))
            })?;
        Self::with_api_key(config, api_key)
    }

    /// Creates a model with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Configuration`] when the endpoint is unusable,
    /// the round limit is zero, or the HTTP client cannot be built.
    pub fn with_api_key(config: &OpenAiConfig, api_key: String) -> Result<Self, ModelError> {
        let endpoint = parse_endpoint(&config.endpoint, config.allow_http)
            .map_err(ModelError::Configuration)?;
        if config.max_tool_rounds == 0 {
            return Err(ModelError::Configuration(
                "max_tool_rounds must be greater than zero".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .redirect(Policy::none())
            .build()
            .map_err(|err| ModelError::Configuration(format!("http client build failed: {err}")))?;
        Ok(Self {
            endpoint,
            client,
            model_id: config.model_id.clone(),
            api_key,
            max_tool_rounds: config.max_tool_rounds,
            max_response_bytes: config.max_response_bytes,
        })
    }

    /// Posts one chat-completions request and returns the first reply.
    async fn send(&self, body: &ChatRequest<'_>) -> Result<ChatMessage, ModelError> {
        let mut response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| ModelError::Transport(format!("chat request failed: {err}")))?;
        let status = response.status();
        let bytes = read_body_with_limit(&mut response, self.max_response_bytes)
            .await
            .map_err(ModelError::Transport)?;
        if !status.is_success() {
            return Err(ModelError::Transport(format!(
                "chat completion returned status {status}: {}",
                body_preview(&bytes)
            )));
        }
        let parsed: ChatResponse = serde_json::from_slice(&bytes)
            .map_err(|err| ModelError::Protocol(format!("invalid chat completion body: {err}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| ModelError::Protocol("chat completion contained no choices".to_string()))
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatModel {
    async fn complete(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        let tools: Vec<ToolSpec<'_>> = match request.settings.function_choice {
            FunctionChoice::Auto => request
                .catalog
                .descriptors()
                .map(|descriptor| ToolSpec {
                    kind: "function",
                    function: FunctionSpec {
                        name: &descriptor.name,
                        description: &descriptor.description,
                        parameters: &descriptor.parameters,
                    },
                })
                .collect(),
            FunctionChoice::None => Vec::new(),
        };
        let tool_choice = (!tools.is_empty()).then(|| request.settings.function_choice.as_str());
        let mut messages = vec![ChatMessage::user(request.prompt)];
        let mut rounds = 0_u32;

        loop {
            ensure_not_cancelled(request.cancel)?;
            let body = ChatRequest {
                model: &self.model_id,
                messages: &messages,
                tools: (!tools.is_empty()).then_some(tools.as_slice()),
                tool_choice,
                temperature: request.settings.temperature,
                max_tokens: request.settings.max_output_tokens,
            };
            let reply = self.send(&body).await?;
            let calls = reply.tool_calls.clone().unwrap_or_default();
            if calls.is_empty() {
                return Ok(ModelResponse {
                    text: reply.content,
                });
            }
            if rounds >= self.max_tool_rounds {
                return Err(ModelError::Protocol(format!(
                    "model exceeded the limit of {} tool-calling rounds",
                    self.max_tool_rounds
                )));
            }
            rounds = rounds.saturating_add(1);
            messages.push(reply);
            for call in calls {
                ensure_not_cancelled(request.cancel)?;
                let content = dispatch(request.catalog, &call).await;
                messages.push(ChatMessage::tool(call.id, content));
            }
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns [`ModelError::Cancelled`] once cancellation is requested.
fn ensure_not_cancelled(cancel: &CancellationSignal) -> Result<(), ModelError> {
    if cancel.is_cancelled() { Err(ModelError::Cancelled) } else { Ok(()) }
}

/// Runs one tool call and renders its result for the model.
async fn dispatch(catalog: &FunctionCatalog, call: &ToolCall) -> String {
    let arguments = match parse_arguments(&call.function.arguments) {
        Ok(arguments) => arguments,
        Err(message) => return json!({ "error": message }).to_string(),
    };
    match catalog.invoke(&call.function.name, arguments).await {
        Ok(output) => output.value.to_string(),
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

/// Parses the JSON-encoded arguments object; blank means no arguments.
fn parse_arguments(raw: &str) -> Result<FunctionArguments, String> {
    if raw.trim().is_empty() {
        return Ok(FunctionArguments::new());
    }
    serde_json::from_str::<FunctionArguments>(raw)
        .map_err(|err| format!("invalid function arguments: {err}"))
}
