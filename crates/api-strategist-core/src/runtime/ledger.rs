// crates/api-strategist-core/src/runtime/ledger.rs
// ============================================================================
// Module: Invocation Ledger
// Description: Thread-safe, append-only record of function invocations.
// Purpose: Track which catalog functions ran so callers can assert on them.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The [`InvocationLedger`] is an explicitly constructed handle shared by the
//! function catalog (which writes to it) and the caller (which reads it).
//! Clones share the same underlying records. Create a fresh ledger per run to
//! avoid cross-run leakage.
//!
//! Invariants:
//! - Records are appended atomically, one per call, under a single lock.
//! - Records are never reordered or removed individually; only
//!   [`InvocationLedger::clear_invocations`] removes them, all at once.
//! - Timestamps never decrease in append order, so a snapshot in append order
//!   is also ordered by `(invoked_at, sequence)`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use thiserror::Error;

use crate::core::FunctionInvocation;
use crate::core::InvocationParameters;
use crate::core::InvocationValidationResult;
use crate::core::InvocationValidator;
use crate::core::Timestamp;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Ledger errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The supplied argument was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

// ============================================================================
// SECTION: Ledger
// ============================================================================

/// Mutable ledger state guarded by the ledger mutex.
#[derive(Debug, Default)]
struct LedgerState {
    /// Records in append order.
    records: Vec<FunctionInvocation>,
    /// Next sequence number to assign; never reset by clears.
    next_sequence: u64,
    /// Latest timestamp handed out, used to keep stamps non-decreasing.
    last_stamp: Option<Timestamp>,
}

/// Concurrent, append-only invocation ledger.
#[derive(Debug, Default, Clone)]
pub struct InvocationLedger {
    /// Shared ledger state protected by a mutex.
    state: Arc<Mutex<LedgerState>>,
}

impl InvocationLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an invocation of `function_name` with optional parameters.
    ///
    /// Parameters are taken by value; the stored record is isolated from any
    /// later changes the caller makes to its own copies.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidArgument`] when the name is empty or
    /// whitespace.
    pub fn record_invocation(
        &self,
        function_name: &str,
        parameters: Option<InvocationParameters>,
    ) -> Result<FunctionInvocation, LedgerError> {
        if function_name.trim().is_empty() {
            return Err(LedgerError::InvalidArgument(
                "function name cannot be null or empty".to_string(),
            ));
        }
        let mut state = self.lock();
        let now = Timestamp::now();
        let invoked_at = match state.last_stamp {
            Some(last) if last > now => last,
            _ => now,
        };
        let sequence = state.next_sequence;
        state.next_sequence = sequence.saturating_add(1);
        state.last_stamp = Some(invoked_at);
        let invocation =
            FunctionInvocation::new(sequence, function_name.to_string(), invoked_at, parameters);
        state.records.push(invocation.clone());
        drop(state);
        Ok(invocation)
    }

    /// Returns a snapshot of all records ordered by invocation time.
    #[must_use]
    pub fn get_invocations(&self) -> Vec<FunctionInvocation> {
        self.lock().records.clone()
    }

    /// Returns true when at least one record matches `function_name`, ignoring case.
    #[must_use]
    pub fn was_invoked(&self, function_name: &str) -> bool {
        self.lock().records.iter().any(|record| record.matches(function_name))
    }

    /// Returns the number of records matching `function_name`, ignoring case.
    #[must_use]
    pub fn get_invocation_count(&self, function_name: &str) -> usize {
        self.lock().records.iter().filter(|record| record.matches(function_name)).count()
    }

    /// Returns the records matching `function_name`, ignoring case, in order.
    #[must_use]
    pub fn invocations_of(&self, function_name: &str) -> Vec<FunctionInvocation> {
        self.lock()
            .records
            .iter()
            .filter(|record| record.matches(function_name))
            .cloned()
            .collect()
    }

    /// Returns the number of recorded invocations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    /// Returns true when no invocations are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    /// Removes every record atomically.
    pub fn clear_invocations(&self) {
        self.lock().records.clear();
    }

    /// Validates `expected` names against a snapshot of the ledger.
    #[must_use]
    pub fn validate_expected_invocations<I, S>(&self, expected: I) -> InvocationValidationResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let snapshot = self.get_invocations();
        InvocationValidator::validate(expected, &snapshot)
    }

    /// Acquires the ledger lock.
    ///
    /// Every critical section is a single push, clear, or read, so the state
    /// is consistent even if a holder panicked; poisoning is therefore ignored.
    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
