// crates/api-strategist-core/tests/validation.rs
// ============================================================================
// Module: Invocation Validation Tests
// Description: Expected-versus-invoked comparison over ledger snapshots.
// Purpose: Pin down partitioning, case folding, and the validity rule.
// Dependencies: api-strategist-core
// ============================================================================

//! ## Overview
//! Validation is asymmetric: only missing expected functions fail a run.
//! Extra invocations are reported but never invalidate it.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use api_strategist_core::InvocationLedger;
use api_strategist_core::InvocationValidator;

fn ledger_with(names: &[&str]) -> InvocationLedger {
    let ledger = InvocationLedger::new();
    for name in names {
        ledger.record_invocation(name, None).unwrap();
    }
    ledger
}

#[test]
fn empty_expected_and_empty_ledger_is_valid() {
    let ledger = InvocationLedger::new();
    let result = ledger.validate_expected_invocations(Vec::<String>::new());
    assert!(result.is_valid);
    assert!(result.expected_but_not_invoked.is_empty());
    assert!(result.invoked_but_not_expected.is_empty());
    assert!(result.successfully_invoked.is_empty());
}

#[test]
fn extra_invocations_do_not_fail_validation() {
    let ledger = ledger_with(&["GetAllProducts", "GetProduct"]);
    let result = ledger.validate_expected_invocations(["GetAllProducts"]);
    assert!(result.is_valid);
    assert_eq!(result.successfully_invoked, vec!["GetAllProducts"]);
    assert_eq!(result.invoked_but_not_expected, vec!["GetProduct"]);
    assert!(result.expected_but_not_invoked.is_empty());
}

#[test]
fn missing_expected_fails_validation() {
    let ledger = ledger_with(&["A"]);
    let result = ledger.validate_expected_invocations(["A", "B"]);
    assert!(!result.is_valid);
    assert_eq!(result.successfully_invoked, vec!["A"]);
    assert_eq!(result.expected_but_not_invoked, vec!["B"]);
    assert!(result.invoked_but_not_expected.is_empty());
}

#[test]
fn comparison_ignores_case() {
    let ledger = ledger_with(&["getproduct"]);
    let result = ledger.validate_expected_invocations(["GetProduct"]);
    assert!(result.is_valid);
    assert_eq!(result.successfully_invoked, vec!["GetProduct"]);
    assert!(result.invoked_but_not_expected.is_empty());
}

#[test]
fn duplicates_collapse_to_first_occurrence() {
    let ledger = ledger_with(&["Login", "LOGIN", "GetUsers", "login"]);
    let result = ledger.validate_expected_invocations(["getusers", "GetUsers", "Missing"]);
    assert!(!result.is_valid);
    assert_eq!(result.successfully_invoked, vec!["getusers"]);
    assert_eq!(result.expected_but_not_invoked, vec!["Missing"]);
    assert_eq!(result.invoked_but_not_expected, vec!["Login"]);
}

#[test]
fn validator_is_pure_over_snapshots() {
    let ledger = ledger_with(&["A", "C"]);
    let snapshot = ledger.get_invocations();
    let first = InvocationValidator::validate(["A", "B"], &snapshot);
    let second = InvocationValidator::validate(["A", "B"], &snapshot);
    assert_eq!(first, second);
    assert!(!first.is_valid);
    assert_eq!(first.expected_but_not_invoked, vec!["B"]);
    assert_eq!(first.invoked_but_not_expected, vec!["C"]);
    assert_eq!(first.successfully_invoked, vec!["A"]);
    assert_eq!(ledger.len(), 2);
}

#[test]
fn summary_lists_missing_functions() {
    let ledger = ledger_with(&["A"]);
    let result = ledger.validate_expected_invocations(["A", "B", "C"]);
    let summary = result.summary();
    assert!(summary.starts_with("invalid"));
    assert!(summary.contains("B, C"));

    let valid = ledger.validate_expected_invocations(["a"]).summary();
    assert!(valid.starts_with("valid"));
}
