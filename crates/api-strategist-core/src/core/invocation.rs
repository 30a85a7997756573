// crates/api-strategist-core/src/core/invocation.rs
// ============================================================================
// Module: Function Invocation Records
// Description: Immutable records of catalog function invocations.
// Purpose: Define the unit of data stored by the invocation ledger.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`FunctionInvocation`] is created by the ledger each time a function is
//! reported as invoked. Records are immutable: fields are private and only
//! exposed through accessors, and parameters are owned copies taken at record
//! time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::function_names_match;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Named parameter values captured with an invocation.
pub type InvocationParameters = BTreeMap<String, Value>;

/// Record of a single function invocation.
///
/// # Invariants
/// - `function_name` is non-empty and not all whitespace.
/// - `sequence` is unique within the ledger that created the record and
///   increases with append order.
/// - Records are never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionInvocation {
    /// Ledger-assigned append sequence number.
    sequence: u64,
    /// Name of the invoked function, as reported.
    function_name: String,
    /// Wall-clock time of the invocation.
    invoked_at: Timestamp,
    /// Optional parameters supplied to the function.
    parameters: Option<InvocationParameters>,
}

impl FunctionInvocation {
    /// Creates a new invocation record.
    ///
    /// Only the ledger assigns sequences, so construction is crate-private.
    pub(crate) const fn new(
        sequence: u64,
        function_name: String,
        invoked_at: Timestamp,
        parameters: Option<InvocationParameters>,
    ) -> Self {
        Self {
            sequence,
            function_name,
            invoked_at,
            parameters,
        }
    }

    /// Returns the append sequence number.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the invoked function name.
    #[must_use]
    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Returns the invocation timestamp.
    #[must_use]
    pub const fn invoked_at(&self) -> Timestamp {
        self.invoked_at
    }

    /// Returns the captured parameters, if any.
    #[must_use]
    pub const fn parameters(&self) -> Option<&InvocationParameters> {
        self.parameters.as_ref()
    }

    /// Returns true when this record names `function_name`, ignoring case.
    #[must_use]
    pub fn matches(&self, function_name: &str) -> bool {
        function_names_match(&self.function_name, function_name)
    }
}
