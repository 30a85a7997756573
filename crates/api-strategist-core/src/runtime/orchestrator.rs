// crates/api-strategist-core/src/runtime/orchestrator.rs
// ============================================================================
// Module: Strategy Orchestrator
// Description: Validate, compose, and execute strategy-determination runs.
// Purpose: Turn operator instructions into a model-produced test strategy.
// Dependencies: crate::{core, interfaces, runtime}, thiserror, tokio
// ============================================================================

//! ## Overview
//! Each call to [`StrategyOrchestrator::determine_test_execution_strategy`]
//! runs a fresh state machine:
//! `Idle -> Validating -> Composing -> Executing -> {Succeeded | Failed | Cancelled}`.
//! The only state shared between runs is the ledger behind the catalog,
//! which is intentionally shared so callers can assert on the functions the
//! model chose to run.
//!
//! Invariants:
//! - Blank instructions and pre-cancelled signals fail before any model call.
//! - Exactly one model request is issued per run that reaches `Executing`.
//! - A blank model response is a failure; no default strategy is substituted.
//! - Model failures are surfaced unchanged as the error source.
//! - Cancellation never erases ledger records already written.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::num::NonZeroU64;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use thiserror::Error;

use crate::core::RunId;
use crate::interfaces::ExecutionSettings;
use crate::interfaces::LanguageModel;
use crate::interfaces::ModelError;
use crate::interfaces::ModelRequest;
use crate::runtime::audit::AuditLevel;
use crate::runtime::audit::INSTRUCTIONS_PREVIEW_CHARS;
use crate::runtime::audit::NoopAuditSink;
use crate::runtime::audit::RESPONSE_PREVIEW_CHARS;
use crate::runtime::audit::StrategyAuditEvent;
use crate::runtime::audit::StrategyAuditEventParams;
use crate::runtime::audit::StrategyAuditSink;
use crate::runtime::audit::preview;
use crate::runtime::cancel::CancellationSignal;
use crate::runtime::catalog::FunctionCatalog;
use crate::runtime::ledger::InvocationLedger;
use crate::runtime::prompt::StrategyPrompt;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Instruction length above which a warning is logged.
pub const LONG_INSTRUCTIONS_CHARS: usize = 5_000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Strategy failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyErrorKind {
    /// Input was rejected.
    InvalidArgument,
    /// The run observed cancellation.
    Cancelled,
    /// The model returned a blank strategy.
    InvalidResult,
    /// The model transport failed.
    OperationFailure,
}

impl StrategyErrorKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::Cancelled => "cancelled",
            Self::InvalidResult => "invalid_result",
            Self::OperationFailure => "operation_failure",
        }
    }
}

/// Strategy-determination errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `OperationFailure` carries the model error unchanged.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// Input was rejected before any model call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Cancellation was observed before or during the model call.
    #[error("strategy cancelled: {0}")]
    Cancelled(String),
    /// The model returned an empty or blank strategy.
    #[error("invalid result: {0}")]
    InvalidResult(String),
    /// The model transport failed.
    #[error("strategy operation failed: {0}")]
    OperationFailure(#[source] ModelError),
}

impl StrategyError {
    /// Returns the failure classification.
    #[must_use]
    pub const fn kind(&self) -> StrategyErrorKind {
        match self {
            Self::InvalidArgument(_) => StrategyErrorKind::InvalidArgument,
            Self::Cancelled(_) => StrategyErrorKind::Cancelled,
            Self::InvalidResult(_) => StrategyErrorKind::InvalidResult,
            Self::OperationFailure(_) => StrategyErrorKind::OperationFailure,
        }
    }
}

// ============================================================================
// SECTION: State Machine
// ============================================================================

/// Phase of a strategy run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyPhase {
    /// Created, not yet started.
    Idle,
    /// Checking cancellation and instructions.
    Validating,
    /// Building the prompt.
    Composing,
    /// Awaiting the model.
    Executing,
    /// Finished with a strategy.
    Succeeded,
    /// Finished with a failure other than cancellation.
    Failed(StrategyErrorKind),
    /// Finished because cancellation was observed.
    Cancelled,
}

impl StrategyPhase {
    /// Returns a stable label for the phase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Composing => "composing",
            Self::Executing => "executing",
            Self::Succeeded => "succeeded",
            Self::Failed(_) => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true for phases that end a run.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_) | Self::Cancelled)
    }

    /// Returns true when moving from `self` to `next` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Idle, Self::Validating)
            | (Self::Validating, Self::Composing)
            | (Self::Composing, Self::Executing)
            | (Self::Executing, Self::Succeeded) => true,
            (Self::Validating | Self::Composing | Self::Executing, Self::Cancelled) => true,
            (Self::Validating | Self::Composing | Self::Executing, Self::Failed(kind)) => {
                !matches!(kind, StrategyErrorKind::Cancelled)
            }
            _ => false,
        }
    }

    /// Returns the terminal phase for a failure.
    #[must_use]
    pub const fn for_error(error: &StrategyError) -> Self {
        match error.kind() {
            StrategyErrorKind::Cancelled => Self::Cancelled,
            kind => Self::Failed(kind),
        }
    }
}

/// State of a single strategy run.
///
/// # Invariants
/// - `history` starts at [`StrategyPhase::Idle`] and only grows through
///   allowed transitions.
/// - Once terminal, the phase never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyRun {
    /// Run identifier.
    run_id: RunId,
    /// Phases entered so far, in order.
    history: Vec<StrategyPhase>,
}

impl StrategyRun {
    /// Creates a run in the idle phase.
    #[must_use]
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            history: vec![StrategyPhase::Idle],
        }
    }

    /// Returns the run identifier.
    #[must_use]
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> StrategyPhase {
        self.history.last().copied().unwrap_or(StrategyPhase::Idle)
    }

    /// Returns every phase entered, in order.
    #[must_use]
    pub fn history(&self) -> &[StrategyPhase] {
        &self.history
    }

    /// Moves to `next` when allowed; returns false and stays put otherwise.
    pub fn transition(&mut self, next: StrategyPhase) -> bool {
        if !self.phase().can_transition_to(next) {
            return false;
        }
        self.history.push(next);
        true
    }
}

/// Finished run together with its result.
#[derive(Debug)]
pub struct StrategyOutcome {
    /// Final run state.
    pub run: StrategyRun,
    /// Strategy text or failure.
    pub result: Result<String, StrategyError>,
}

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Drives strategy-determination runs against a language model.
pub struct StrategyOrchestrator<M> {
    /// Model capability used for the execute phase.
    model: M,
    /// Function catalog exposed to the model.
    catalog: Arc<FunctionCatalog>,
    /// Execution settings applied to every run.
    settings: ExecutionSettings,
    /// Audit sink for run events.
    audit: Arc<dyn StrategyAuditSink>,
    /// Next run identifier to assign.
    next_run_id: AtomicU64,
}

impl<M: LanguageModel> StrategyOrchestrator<M> {
    /// Creates an orchestrator with default settings and a no-op audit sink.
    #[must_use]
    pub fn new(model: M, catalog: Arc<FunctionCatalog>) -> Self {
        Self {
            model,
            catalog,
            settings: ExecutionSettings::default(),
            audit: Arc::new(NoopAuditSink),
            next_run_id: AtomicU64::new(1),
        }
    }

    /// Replaces the execution settings.
    #[must_use]
    pub const fn with_settings(mut self, settings: ExecutionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn StrategyAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the function catalog.
    #[must_use]
    pub fn catalog(&self) -> &FunctionCatalog {
        &self.catalog
    }

    /// Returns the ledger the catalog records into.
    #[must_use]
    pub fn ledger(&self) -> &InvocationLedger {
        self.catalog.ledger()
    }

    /// Returns the execution settings.
    #[must_use]
    pub const fn settings(&self) -> &ExecutionSettings {
        &self.settings
    }

    /// Determines a test execution strategy for `instructions`.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError`] when the instructions are blank, the run is
    /// cancelled, the model returns a blank response, or the model fails.
    pub async fn determine_test_execution_strategy(
        &self,
        instructions: &str,
        cancel: &CancellationSignal,
    ) -> Result<String, StrategyError> {
        self.run_strategy(instructions, cancel).await.result
    }

    /// Runs the full state machine and returns the final run state with the result.
    pub async fn run_strategy(
        &self,
        instructions: &str,
        cancel: &CancellationSignal,
    ) -> StrategyOutcome {
        let mut run = StrategyRun::new(self.allocate_run_id());
        self.record(StrategyAuditEventParams {
            run_id: Some(run.run_id()),
            phase: Some(run.phase().as_str()),
            ..StrategyAuditEventParams::info("strategy_started")
        });

        let result = self.drive(&mut run, instructions, cancel).await;
        let terminal = match &result {
            Ok(_) => StrategyPhase::Succeeded,
            Err(error) => StrategyPhase::for_error(error),
        };
        run.transition(terminal);

        match &result {
            Ok(strategy) => self.record(StrategyAuditEventParams {
                run_id: Some(run.run_id()),
                phase: Some(run.phase().as_str()),
                message: Some(preview(strategy, RESPONSE_PREVIEW_CHARS)),
                length: Some(strategy.chars().count()),
                ..StrategyAuditEventParams::info("strategy_completed")
            }),
            Err(error) => self.record(StrategyAuditEventParams {
                level: AuditLevel::Error,
                run_id: Some(run.run_id()),
                phase: Some(run.phase().as_str()),
                error_kind: Some(error.kind().as_str()),
                message: Some(error.to_string()),
                ..StrategyAuditEventParams::info("strategy_failed")
            }),
        }

        StrategyOutcome {
            run,
            result,
        }
    }

    /// Runs the validating, composing, and executing phases.
    async fn drive(
        &self,
        run: &mut StrategyRun,
        instructions: &str,
        cancel: &CancellationSignal,
    ) -> Result<String, StrategyError> {
        self.enter(run, StrategyPhase::Validating);
        self.validate_input(run, instructions, cancel)?;

        self.enter(run, StrategyPhase::Composing);
        let prompt = StrategyPrompt::compose(&self.catalog, instructions);
        self.record(StrategyAuditEventParams {
            run_id: Some(run.run_id()),
            phase: Some(run.phase().as_str()),
            message: Some(format!(
                "{} functions across {} areas",
                prompt.function_count(),
                prompt.area_count()
            )),
            length: Some(prompt.as_str().chars().count()),
            ..StrategyAuditEventParams::info("prompt_composed")
        });

        self.enter(run, StrategyPhase::Executing);
        self.execute(&prompt, cancel).await
    }

    /// Checks cancellation and instructions before any model work.
    fn validate_input(
        &self,
        run: &StrategyRun,
        instructions: &str,
        cancel: &CancellationSignal,
    ) -> Result<(), StrategyError> {
        if cancel.is_cancelled() {
            return Err(StrategyError::Cancelled(
                "cancellation requested before the model call".to_string(),
            ));
        }
        if instructions.trim().is_empty() {
            return Err(StrategyError::InvalidArgument(
                "instructions cannot be null or empty".to_string(),
            ));
        }
        let length = instructions.chars().count();
        if length > LONG_INSTRUCTIONS_CHARS {
            self.record(StrategyAuditEventParams {
                level: AuditLevel::Warn,
                run_id: Some(run.run_id()),
                phase: Some(run.phase().as_str()),
                message: Some(format!("instructions are quite long: {length} characters")),
                length: Some(length),
                ..StrategyAuditEventParams::info("instructions_long")
            });
        }
        self.record(StrategyAuditEventParams {
            run_id: Some(run.run_id()),
            phase: Some(run.phase().as_str()),
            message: Some(preview(instructions, INSTRUCTIONS_PREVIEW_CHARS)),
            length: Some(length),
            ..StrategyAuditEventParams::info("instructions_accepted")
        });
        Ok(())
    }

    /// Submits the prompt and awaits the model or cancellation.
    async fn execute(
        &self,
        prompt: &StrategyPrompt,
        cancel: &CancellationSignal,
    ) -> Result<String, StrategyError> {
        let request = ModelRequest {
            prompt: prompt.as_str(),
            settings: &self.settings,
            catalog: &self.catalog,
            cancel,
        };
        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Err(StrategyError::Cancelled(
                    "cancellation requested during the model call".to_string(),
                ));
            }
            response = self.model.complete(request) => response,
        };
        let response = match response {
            Ok(response) => response,
            Err(ModelError::Cancelled) => {
                return Err(StrategyError::Cancelled("model call observed cancellation".to_string()));
            }
            Err(error) => return Err(StrategyError::OperationFailure(error)),
        };
        match response.text {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(StrategyError::InvalidResult(
                "model failed to generate a valid test execution strategy; the response was \
                 empty"
                    .to_string(),
            )),
        }
    }

    /// Enters `phase` and records the transition.
    fn enter(&self, run: &mut StrategyRun, phase: StrategyPhase) {
        if run.transition(phase) {
            self.record(StrategyAuditEventParams {
                run_id: Some(run.run_id()),
                phase: Some(phase.as_str()),
                ..StrategyAuditEventParams::info("strategy_phase")
            });
        }
    }

    /// Allocates the next run identifier.
    fn allocate_run_id(&self) -> RunId {
        let raw = self.next_run_id.fetch_add(1, Ordering::Relaxed);
        RunId::from_raw(raw).unwrap_or(RunId::new(NonZeroU64::MIN))
    }

    /// Sends an event to the audit sink.
    fn record(&self, params: StrategyAuditEventParams) {
        self.audit.record(&StrategyAuditEvent::new(params));
    }
}
