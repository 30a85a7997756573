// crates/api-strategist-core/src/runtime/audit.rs
// ============================================================================
// Module: Strategy Audit Logging
// Description: Structured audit events for strategy runs and catalog dispatch.
// Purpose: Emit bounded JSON-line logs without hard logging dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines the audit event payload and sinks used by the
//! orchestrator and the function catalog. Events carry sizes and short
//! previews rather than full prompts or responses so that logs stay bounded.
//! Deployments route events to their logging pipeline by implementing
//! [`StrategyAuditSink`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::RunId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum characters of instructions included in audit previews.
pub const INSTRUCTIONS_PREVIEW_CHARS: usize = 100;
/// Maximum characters of model responses included in audit previews.
pub const RESPONSE_PREVIEW_CHARS: usize = 150;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Severity attached to an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditLevel {
    /// Routine progress.
    Info,
    /// Unusual but accepted input.
    Warn,
    /// Failed operation.
    Error,
}

/// Strategy audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event severity.
    pub level: AuditLevel,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Strategy run identifier when the event belongs to a run.
    pub run_id: Option<RunId>,
    /// Phase label when the event belongs to a run.
    pub phase: Option<&'static str>,
    /// Catalog function name when the event concerns a dispatch.
    pub function_name: Option<String>,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Short human-readable message or bounded preview.
    pub message: Option<String>,
    /// Size of the relevant payload in characters, when meaningful.
    pub length: Option<usize>,
}

/// Inputs required to construct an audit event.
pub struct StrategyAuditEventParams {
    /// Event identifier.
    pub event: &'static str,
    /// Event severity.
    pub level: AuditLevel,
    /// Strategy run identifier.
    pub run_id: Option<RunId>,
    /// Phase label.
    pub phase: Option<&'static str>,
    /// Catalog function name.
    pub function_name: Option<String>,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Short message or preview.
    pub message: Option<String>,
    /// Payload size in characters.
    pub length: Option<usize>,
}

impl StrategyAuditEventParams {
    /// Creates params for an informational event with no optional fields set.
    #[must_use]
    pub const fn info(event: &'static str) -> Self {
        Self {
            event,
            level: AuditLevel::Info,
            run_id: None,
            phase: None,
            function_name: None,
            error_kind: None,
            message: None,
            length: None,
        }
    }
}

impl StrategyAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: StrategyAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: params.event,
            level: params.level,
            timestamp_ms,
            run_id: params.run_id,
            phase: params.phase,
            function_name: params.function_name,
            error_kind: params.error_kind,
            message: params.message,
            length: params.length,
        }
    }
}

/// Truncates `text` to at most `max_chars` characters for previews.
#[must_use]
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}...", &text[.. index]),
        None => text.to_string(),
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for strategy and catalog events.
pub trait StrategyAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &StrategyAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl StrategyAuditSink for StderrAuditSink {
    fn record(&self, event: &StrategyAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl StrategyAuditSink for FileAuditSink {
    fn record(&self, event: &StrategyAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl StrategyAuditSink for NoopAuditSink {
    fn record(&self, _event: &StrategyAuditEvent) {}
}
