// crates/api-strategist-core/src/core/validation.rs
// ============================================================================
// Module: Invocation Validation
// Description: Expected-versus-actual comparison of function invocations.
// Purpose: Compute set differences and a pass/fail verdict over a ledger snapshot.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Validation compares an expected set of function names with the names found
//! in a ledger snapshot. Names are compared case-insensitively and
//! de-duplicated. The verdict is asymmetric: only expected-but-missing names
//! fail validation; extra invocations are reported but always pass.
//!
//! Validation is a pure function of its inputs. It never mutates the ledger.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::FunctionNameKey;
use crate::core::invocation::FunctionInvocation;

// ============================================================================
// SECTION: Result Type
// ============================================================================

/// Outcome of validating expected invocations against a ledger snapshot.
///
/// # Invariants
/// - `is_valid` is true iff `expected_but_not_invoked` is empty.
/// - The three lists hold no case-insensitive duplicates.
/// - Expected-derived lists follow the order of the expected input;
///   `invoked_but_not_expected` follows ledger order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationValidationResult {
    /// True when every expected function was invoked.
    pub is_valid: bool,
    /// Expected names with no matching invocation.
    pub expected_but_not_invoked: Vec<String>,
    /// Invoked names that were not expected.
    pub invoked_but_not_expected: Vec<String>,
    /// Expected names that were invoked.
    pub successfully_invoked: Vec<String>,
}

impl InvocationValidationResult {
    /// Returns a one-line human-readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let verdict = if self.is_valid { "valid" } else { "invalid" };
        let mut summary = format!(
            "{verdict}: {} invoked as expected, {} missing, {} unexpected",
            self.successfully_invoked.len(),
            self.expected_but_not_invoked.len(),
            self.invoked_but_not_expected.len()
        );
        if !self.expected_but_not_invoked.is_empty() {
            summary.push_str(" (missing: ");
            summary.push_str(&self.expected_but_not_invoked.join(", "));
            summary.push(')');
        }
        summary
    }
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Stateless validator for expected function invocations.
pub struct InvocationValidator;

impl InvocationValidator {
    /// Validates `expected` function names against a ledger `snapshot`.
    #[must_use]
    pub fn validate<I, S>(expected: I, snapshot: &[FunctionInvocation]) -> InvocationValidationResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let expected = OrderedNameSet::from_names(expected);
        let invoked = OrderedNameSet::from_names(
            snapshot.iter().map(FunctionInvocation::function_name),
        );

        let mut successfully_invoked = Vec::new();
        let mut expected_but_not_invoked = Vec::new();
        for (key, name) in &expected.entries {
            if invoked.contains(key) {
                successfully_invoked.push(name.clone());
            } else {
                expected_but_not_invoked.push(name.clone());
            }
        }
        let invoked_but_not_expected = invoked
            .entries
            .iter()
            .filter(|(key, _)| !expected.contains(key))
            .map(|(_, name)| name.clone())
            .collect();

        InvocationValidationResult {
            is_valid: expected_but_not_invoked.is_empty(),
            expected_but_not_invoked,
            invoked_but_not_expected,
            successfully_invoked,
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Case-insensitive set that remembers first-occurrence order and casing.
struct OrderedNameSet {
    /// Entries in first-occurrence order.
    entries: Vec<(FunctionNameKey, String)>,
    /// Folded keys for membership checks.
    keys: BTreeSet<FunctionNameKey>,
}

impl OrderedNameSet {
    /// Builds the set from names, dropping case-insensitive duplicates.
    fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self {
            entries: Vec::new(),
            keys: BTreeSet::new(),
        };
        for name in names {
            let name = name.as_ref();
            let key = FunctionNameKey::new(name);
            if set.keys.insert(key.clone()) {
                set.entries.push((key, name.to_string()));
            }
        }
        set
    }

    /// Returns true when the folded key is present.
    fn contains(&self, key: &FunctionNameKey) -> bool {
        self.keys.contains(key)
    }
}
