// crates/api-strategist-core/src/runtime/mod.rs
// ============================================================================
// Module: API Strategist Runtime
// Description: Invocation ledger, function catalog, and strategy orchestrator.
// Purpose: Execute strategy runs and record the functions the model calls.
// Dependencies: crate::{core, interfaces}, tokio
// ============================================================================

//! ## Overview
//! Runtime modules hold all synchronization in the crate. The ledger is the
//! only shared mutable state; the catalog and orchestrator are read-only once
//! built, and each strategy run keeps its own phase state.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod cancel;
pub mod catalog;
pub mod ledger;
pub mod orchestrator;
pub mod prompt;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditLevel;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use audit::StrategyAuditEvent;
pub use audit::StrategyAuditEventParams;
pub use audit::StrategyAuditSink;
pub use cancel::CancellationSignal;
pub use catalog::CatalogError;
pub use catalog::FunctionCatalog;
pub use catalog::FunctionCatalogBuilder;
pub use ledger::InvocationLedger;
pub use ledger::LedgerError;
pub use orchestrator::LONG_INSTRUCTIONS_CHARS;
pub use orchestrator::StrategyError;
pub use orchestrator::StrategyErrorKind;
pub use orchestrator::StrategyOrchestrator;
pub use orchestrator::StrategyOutcome;
pub use orchestrator::StrategyPhase;
pub use orchestrator::StrategyRun;
pub use prompt::INSTRUCTIONS_HEADING;
pub use prompt::StrategyPrompt;
