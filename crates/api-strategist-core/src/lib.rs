// crates/api-strategist-core/src/lib.rs
// ============================================================================
// Module: API Strategist Core Library
// Description: Public API surface for the API strategist core.
// Purpose: Expose the invocation ledger, validator, catalog, and orchestrator.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! API strategist core turns free-form test instructions into a model-driven
//! test run. A language model reads the instructions and a catalog of test
//! functions, elects which functions to call, and returns a strategy
//! narrative. Every function the model calls is recorded in an
//! [`InvocationLedger`], which callers validate against the functions they
//! expected to run. The crate performs no network I/O; model transports and
//! concrete catalog functions are supplied through [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::CatalogFunction;
pub use interfaces::ExecutionSettings;
pub use interfaces::FunctionArguments;
pub use interfaces::FunctionChoice;
pub use interfaces::FunctionDescriptor;
pub use interfaces::FunctionError;
pub use interfaces::FunctionOutput;
pub use interfaces::LanguageModel;
pub use interfaces::ModelError;
pub use interfaces::ModelRequest;
pub use interfaces::ModelResponse;
pub use runtime::CancellationSignal;
pub use runtime::CatalogError;
pub use runtime::FunctionCatalog;
pub use runtime::FunctionCatalogBuilder;
pub use runtime::InvocationLedger;
pub use runtime::LedgerError;
pub use runtime::StrategyError;
pub use runtime::StrategyErrorKind;
pub use runtime::StrategyOrchestrator;
pub use runtime::StrategyOutcome;
pub use runtime::StrategyPhase;
pub use runtime::StrategyRun;
