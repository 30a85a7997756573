// crates/api-strategist-core/tests/catalog.rs
// ============================================================================
// Module: Function Catalog Tests
// Description: Registration rules and dispatch recording for the catalog.
// Purpose: Ensure every dispatch is recorded once and unknown names are rejected.
// Dependencies: api-strategist-core, tokio
// ============================================================================

//! ## Overview
//! Validates that the function catalog:
//! - Rejects duplicate, unnamed, and undescribed functions.
//! - Records each dispatch under the registered name before the function runs.
//! - Records failing dispatches and leaves the ledger untouched for unknown names.

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

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use api_strategist_core::CatalogError;
use api_strategist_core::CatalogFunction;
use api_strategist_core::FunctionArguments;
use api_strategist_core::FunctionCatalog;
use api_strategist_core::FunctionDescriptor;
use api_strategist_core::FunctionError;
use api_strategist_core::FunctionOutput;
use api_strategist_core::InvocationLedger;
use api_strategist_core::runtime::StrategyAuditEvent;
use api_strategist_core::runtime::StrategyAuditSink;
use async_trait::async_trait;
use serde_json::json;

struct StaticFunction {
    descriptor: FunctionDescriptor,
    outcome: Result<FunctionOutput, FunctionError>,
}

impl StaticFunction {
    fn ok(name: &str) -> Self {
        Self {
            descriptor: FunctionDescriptor::new(name, format!("{name} test"), "Products"),
            outcome: Ok(FunctionOutput::new(json!({ "passed": true }))),
        }
    }

    fn failing(name: &str) -> Self {
        Self {
            descriptor: FunctionDescriptor::new(name, format!("{name} test"), "Products"),
            outcome: Err(FunctionError::AssertionFailed("status was 500".to_string())),
        }
    }
}

#[async_trait]
impl CatalogFunction for StaticFunction {
    fn descriptor(&self) -> &FunctionDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, _arguments: &FunctionArguments) -> Result<FunctionOutput, FunctionError> {
        self.outcome.clone()
    }
}

/// Function that reports whether the ledger already held its record when it ran.
struct LedgerProbe {
    descriptor: FunctionDescriptor,
    ledger: InvocationLedger,
}

#[async_trait]
impl CatalogFunction for LedgerProbe {
    fn descriptor(&self) -> &FunctionDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, _arguments: &FunctionArguments) -> Result<FunctionOutput, FunctionError> {
        Ok(FunctionOutput::new(json!(self.ledger.was_invoked("Probe"))))
    }
}

#[derive(Default)]
struct CaptureSink {
    events: Mutex<Vec<StrategyAuditEvent>>,
}

impl StrategyAuditSink for CaptureSink {
    fn record(&self, event: &StrategyAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

#[test]
fn register_rejects_case_insensitive_duplicates() {
    let mut builder = FunctionCatalog::builder();
    builder.register(StaticFunction::ok("GetProduct")).unwrap();
    let err = builder.register(StaticFunction::ok("getproduct")).err().unwrap();
    assert!(matches!(err, CatalogError::DuplicateFunction(name) if name == "getproduct"));
}

#[test]
fn register_rejects_blank_name_or_description() {
    let mut builder = FunctionCatalog::builder();
    let unnamed = StaticFunction {
        descriptor: FunctionDescriptor::new("  ", "desc", "Products"),
        outcome: Ok(FunctionOutput::new(json!(null))),
    };
    assert!(matches!(builder.register(unnamed), Err(CatalogError::InvalidDescriptor(_))));

    let undescribed = StaticFunction {
        descriptor: FunctionDescriptor::new("Named", "", "Products"),
        outcome: Ok(FunctionOutput::new(json!(null))),
    };
    assert!(matches!(builder.register(undescribed), Err(CatalogError::InvalidDescriptor(_))));
}

#[test]
fn descriptors_follow_registration_order() {
    let mut builder = FunctionCatalog::builder();
    builder
        .register(StaticFunction::ok("Zeta"))
        .unwrap()
        .register(StaticFunction::ok("Alpha"))
        .unwrap()
        .register(StaticFunction::ok("Mid"))
        .unwrap();
    let catalog = builder.build(InvocationLedger::new());

    let names: Vec<&str> = catalog.descriptors().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    assert_eq!(catalog.len(), 3);
    assert!(catalog.contains("alpha"));
    assert_eq!(catalog.descriptor("ZETA").unwrap().name, "Zeta");
}

#[tokio::test]
async fn invoke_records_registered_name_and_arguments() {
    let ledger = InvocationLedger::new();
    let mut builder = FunctionCatalog::builder();
    builder.register(StaticFunction::ok("GetProduct")).unwrap();
    let catalog = builder.build(ledger.clone());

    let mut arguments = BTreeMap::new();
    arguments.insert("productId".to_string(), json!(1));
    let output = catalog.invoke("getPRODUCT", arguments.clone()).await.unwrap();
    assert_eq!(output.value, json!({ "passed": true }));

    let snapshot = ledger.get_invocations();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].function_name(), "GetProduct");
    assert_eq!(snapshot[0].parameters(), Some(&arguments));
}

#[tokio::test]
async fn invoke_without_arguments_records_no_parameters() {
    let ledger = InvocationLedger::new();
    let mut builder = FunctionCatalog::builder();
    builder.register(StaticFunction::ok("GetAllProducts")).unwrap();
    let catalog = builder.build(ledger.clone());

    catalog.invoke("GetAllProducts", BTreeMap::new()).await.unwrap();
    assert!(ledger.get_invocations()[0].parameters().is_none());
}

#[tokio::test]
async fn invoke_records_before_the_function_runs() {
    let ledger = InvocationLedger::new();
    let mut builder = FunctionCatalog::builder();
    builder
        .register(LedgerProbe {
            descriptor: FunctionDescriptor::new("Probe", "checks the ledger", "Diagnostics"),
            ledger: ledger.clone(),
        })
        .unwrap();
    let catalog = builder.build(ledger);

    let output = catalog.invoke("Probe", BTreeMap::new()).await.unwrap();
    assert_eq!(output.value, json!(true));
}

#[tokio::test]
async fn failing_function_is_still_recorded() {
    let ledger = InvocationLedger::new();
    let sink = Arc::new(CaptureSink::default());
    let mut builder = FunctionCatalog::builder().with_audit_sink(sink.clone());
    builder.register(StaticFunction::failing("DeleteProduct")).unwrap();
    let catalog = builder.build(ledger.clone());

    let err = catalog.invoke("DeleteProduct", BTreeMap::new()).await.unwrap_err();
    match err {
        CatalogError::Function {
            name,
            source,
        } => {
            assert_eq!(name, "DeleteProduct");
            assert!(matches!(source, FunctionError::AssertionFailed(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(ledger.get_invocation_count("deleteproduct"), 1);

    let events: Vec<&str> = sink.events.lock().unwrap().iter().map(|event| event.event).collect();
    assert_eq!(events, vec!["function_invoked", "function_failed"]);
}

#[tokio::test]
async fn unknown_function_is_rejected_without_recording() {
    let ledger = InvocationLedger::new();
    let mut builder = FunctionCatalog::builder();
    builder.register(StaticFunction::ok("GetProduct")).unwrap();
    let catalog = builder.build(ledger.clone());

    let err = catalog.invoke("DropDatabase", BTreeMap::new()).await.unwrap_err();
    assert!(matches!(err, CatalogError::UnknownFunction(name) if name == "DropDatabase"));
    assert!(ledger.is_empty());
}
