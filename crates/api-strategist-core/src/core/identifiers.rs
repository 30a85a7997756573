// crates/api-strategist-core/src/core/identifiers.rs
// ============================================================================
// Module: API Strategist Identifiers
// Description: Function-name keys and strategy run identifiers.
// Purpose: Centralize case-insensitive name comparison and run numbering.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Function names are compared case-insensitively everywhere: in the ledger,
//! the validator, and the function catalog. [`FunctionNameKey`] is the single
//! folding rule so those components cannot drift apart. [`RunId`] numbers
//! strategy runs for audit correlation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU64;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Function Names
// ============================================================================

/// Case-folded lookup key for a function name.
///
/// # Invariants
/// - Two names produce equal keys iff they are equal ignoring case
///   (Unicode lowercase folding).
/// - Keys are for comparison only; display the original name instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionNameKey(String);

impl FunctionNameKey {
    /// Folds a function name into its comparison key.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_lowercase())
    }

    /// Returns the folded key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FunctionNameKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Returns true when two function names match ignoring case.
#[must_use]
pub fn function_names_match(left: &str, right: &str) -> bool {
    left == right || FunctionNameKey::new(left) == FunctionNameKey::new(right)
}

// ============================================================================
// SECTION: Run Identifiers
// ============================================================================

/// Identifier for a single strategy-determination run.
///
/// # Invariants
/// - Always >= 1 (non-zero, 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(NonZeroU64);

impl RunId {
    /// Creates a new run identifier from a non-zero value.
    #[must_use]
    pub const fn new(id: NonZeroU64) -> Self {
        Self(id)
    }

    /// Creates a run identifier from a raw value (returns `None` if zero).
    #[must_use]
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Returns the raw identifier value (always >= 1).
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(f)
    }
}
