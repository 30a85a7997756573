// crates/api-strategist-core/src/interfaces/mod.rs
// ============================================================================
// Module: API Strategist Interfaces
// Description: Backend-agnostic interfaces for the language model and catalog functions.
// Purpose: Define the contract surfaces the strategy runtime consumes.
// Dependencies: crate::{core, runtime}, async-trait, serde, thiserror
// ============================================================================

//! ## Overview
//! Two seams connect the runtime to the outside world:
//! - [`LanguageModel`]: a chat/completion capability that, with function
//!   calling enabled, may dispatch catalog functions before returning text.
//! - [`CatalogFunction`]: a test-capable function the model may elect to call.
//!
//! Implementations live in host crates. The runtime never performs network
//! I/O itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::InvocationParameters;
use crate::runtime::CancellationSignal;
use crate::runtime::FunctionCatalog;

// ============================================================================
// SECTION: Execution Settings
// ============================================================================

/// Default sampling temperature for strategy runs.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
/// Default response-length budget in tokens.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2_000;

/// Function-calling mode requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionChoice {
    /// The model decides which catalog functions to call, if any.
    Auto,
    /// Function calling is disabled; the model only produces text.
    None,
}

impl FunctionChoice {
    /// Returns a stable label for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::None => "none",
        }
    }
}

/// Model execution configuration for a strategy run.
///
/// # Invariants
/// - `temperature` is low so function selection is reproducible across runs.
/// - `max_output_tokens` bounds the response length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSettings {
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum response length in tokens.
    pub max_output_tokens: u32,
    /// Function-calling mode.
    pub function_choice: FunctionChoice,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            function_choice: FunctionChoice::Auto,
        }
    }
}

// ============================================================================
// SECTION: Language Model
// ============================================================================

/// Single model round-trip request.
///
/// # Invariants
/// - `catalog` is the complete, read-only function catalog for the run.
/// - Functions must be dispatched through [`FunctionCatalog::invoke`] so every
///   call is recorded in the ledger.
#[derive(Clone, Copy)]
pub struct ModelRequest<'a> {
    /// Fully composed prompt text.
    pub prompt: &'a str,
    /// Execution settings for the call.
    pub settings: &'a ExecutionSettings,
    /// Function catalog exposed to the model.
    pub catalog: &'a FunctionCatalog,
    /// Cancellation signal for the run.
    pub cancel: &'a CancellationSignal,
}

/// Final model response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelResponse {
    /// Final text content, if the model produced any.
    pub text: Option<String>,
}

impl ModelResponse {
    /// Creates a response with text content.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// Model transport errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The call observed cancellation and stopped.
    #[error("model call cancelled")]
    Cancelled,
    /// The transport failed to reach the model or received an error status.
    #[error("model transport error: {0}")]
    Transport(String),
    /// The model response violated the expected protocol.
    #[error("model protocol error: {0}")]
    Protocol(String),
    /// The transport is misconfigured.
    #[error("model configuration error: {0}")]
    Configuration(String),
}

/// Chat/completion capability with optional function calling.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Submits the request and returns the final response.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] when the call fails or observes cancellation.
    async fn complete(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError>;
}

#[async_trait]
impl<M: LanguageModel + ?Sized> LanguageModel for Arc<M> {
    async fn complete(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        self.as_ref().complete(request).await
    }
}

// ============================================================================
// SECTION: Catalog Functions
// ============================================================================

/// Arguments supplied to a catalog function by the model.
pub type FunctionArguments = InvocationParameters;

/// Human- and model-facing description of a catalog function.
///
/// # Invariants
/// - `name` is non-empty and stable across runs.
/// - `parameters` is a JSON Schema object describing accepted arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    /// Stable function name.
    pub name: String,
    /// One-line purpose shown to the model.
    pub description: String,
    /// Resource area used to group functions in the prompt.
    pub area: String,
    /// JSON Schema for the function arguments.
    pub parameters: Value,
}

impl FunctionDescriptor {
    /// Creates a descriptor for a function that takes no arguments.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        area: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            area: area.into(),
            parameters: serde_json::json!({ "type": "object", "properties": {} }),
        }
    }

    /// Replaces the argument schema.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }
}

/// Result payload returned by a catalog function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionOutput {
    /// JSON result reported back to the model.
    pub value: Value,
}

impl FunctionOutput {
    /// Creates an output from a JSON value.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self {
            value,
        }
    }
}

/// Catalog function errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FunctionError {
    /// Arguments were missing or malformed.
    #[error("invalid function arguments: {0}")]
    InvalidArguments(String),
    /// The function ran but its checks did not hold.
    #[error("assertion failed: {0}")]
    AssertionFailed(String),
    /// The function could not complete its action.
    #[error("function execution failed: {0}")]
    Execution(String),
}

/// Test-capable function exposed to the model through the catalog.
#[async_trait]
pub trait CatalogFunction: Send + Sync {
    /// Returns the function descriptor.
    fn descriptor(&self) -> &FunctionDescriptor;

    /// Performs the function's action.
    ///
    /// # Errors
    ///
    /// Returns [`FunctionError`] when arguments are invalid, checks fail, or
    /// the underlying action fails.
    async fn invoke(&self, arguments: &FunctionArguments) -> Result<FunctionOutput, FunctionError>;
}
