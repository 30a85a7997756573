// crates/api-strategist-core/src/core/mod.rs
// ============================================================================
// Module: API Strategist Core Types
// Description: Invocation records, validation results, and identifiers.
// Purpose: Provide stable, serializable types shared by the runtime and hosts.
// Dependencies: serde, serde_json, time
// ============================================================================

//! ## Overview
//! Core types describe what the ledger stores and what validation returns.
//! They carry no synchronization and no I/O; the runtime owns both.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod identifiers;
pub mod invocation;
pub mod time;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use identifiers::FunctionNameKey;
pub use identifiers::RunId;
pub use identifiers::function_names_match;
pub use invocation::FunctionInvocation;
pub use invocation::InvocationParameters;
pub use time::Timestamp;
pub use validation::InvocationValidationResult;
pub use validation::InvocationValidator;
