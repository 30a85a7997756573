// crates/api-strategist-core/src/core/time.rs
// ============================================================================
// Module: API Strategist Time Model
// Description: Canonical timestamp representation for invocation records.
// Purpose: Provide ordered, serializable time values for the invocation ledger.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Invocation records carry wall-clock timestamps in unix epoch milliseconds.
//! The ledger is the only component that reads the clock; everything else
//! treats timestamps as opaque ordered values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use ::time::OffsetDateTime;
use ::time::format_description::well_known::Rfc3339;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Wall-clock timestamp in unix epoch milliseconds.
///
/// # Invariants
/// - Ordering matches chronological ordering.
/// - Values before the unix epoch are clamped to zero by [`Timestamp::now`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Reads the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        let millis = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self(i64::try_from(millis).unwrap_or(i64::MAX))
    }

    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(value: i64) -> Self {
        Self(value)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }

    /// Renders the timestamp as an RFC 3339 string (UTC).
    ///
    /// Returns `None` when the value is outside the representable date range.
    #[must_use]
    pub fn to_rfc3339(self) -> Option<String> {
        let nanos = i128::from(self.0) * 1_000_000;
        let datetime = OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()?;
        datetime.format(&Rfc3339).ok()
    }
}
