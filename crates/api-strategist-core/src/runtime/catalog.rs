// crates/api-strategist-core/src/runtime/catalog.rs
// ============================================================================
// Module: Function Catalog
// Description: Closed registry of catalog functions with ledger recording.
// Purpose: Route model-selected function calls and record each dispatch.
// Dependencies: crate::{core, interfaces}, thiserror
// ============================================================================

//! ## Overview
//! The catalog maps stable function names to [`CatalogFunction`]
//! implementations. It is assembled once through [`FunctionCatalogBuilder`]
//! and is read-only afterwards. Every dispatch through
//! [`FunctionCatalog::invoke`] records an invocation in the ledger before the
//! function runs, so a failing or cancelled function still leaves a record.
//!
//! Invariants:
//! - Function names are unique ignoring case.
//! - Unknown names are rejected without touching the ledger.
//! - Descriptors are listed in registration order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::core::FunctionNameKey;
use crate::interfaces::CatalogFunction;
use crate::interfaces::FunctionArguments;
use crate::interfaces::FunctionDescriptor;
use crate::interfaces::FunctionError;
use crate::interfaces::FunctionOutput;
use crate::runtime::audit::AuditLevel;
use crate::runtime::audit::NoopAuditSink;
use crate::runtime::audit::StrategyAuditEvent;
use crate::runtime::audit::StrategyAuditEventParams;
use crate::runtime::audit::StrategyAuditSink;
use crate::runtime::ledger::InvocationLedger;
use crate::runtime::ledger::LedgerError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Function catalog errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A function with the same name (ignoring case) is already registered.
    #[error("function already registered: {0}")]
    DuplicateFunction(String),
    /// The function descriptor is unusable.
    #[error("invalid function descriptor: {0}")]
    InvalidDescriptor(String),
    /// No function is registered under the requested name.
    #[error("function not registered: {0}")]
    UnknownFunction(String),
    /// The function ran and reported an error.
    #[error("function {name} failed: {source}")]
    Function {
        /// Registered function name.
        name: String,
        /// Underlying function error.
        #[source]
        source: FunctionError,
    },
    /// The ledger rejected the invocation record.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builder that assembles a closed function catalog.
pub struct FunctionCatalogBuilder {
    /// Registered functions keyed by folded name.
    functions: BTreeMap<FunctionNameKey, Arc<dyn CatalogFunction>>,
    /// Folded names in registration order.
    order: Vec<FunctionNameKey>,
    /// Audit sink for dispatch events.
    audit: Arc<dyn StrategyAuditSink>,
}

impl Default for FunctionCatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionCatalogBuilder {
    /// Creates an empty builder with a no-op audit sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            functions: BTreeMap::new(),
            order: Vec::new(),
            audit: Arc::new(NoopAuditSink),
        }
    }

    /// Sets the audit sink used for dispatch events.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn StrategyAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Registers a function.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the descriptor name or description is
    /// blank, or when the name is already registered.
    pub fn register(
        &mut self,
        function: impl CatalogFunction + 'static,
    ) -> Result<&mut Self, CatalogError> {
        self.register_shared(Arc::new(function))
    }

    /// Registers a function that is already shared.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] under the same conditions as [`Self::register`].
    pub fn register_shared(
        &mut self,
        function: Arc<dyn CatalogFunction>,
    ) -> Result<&mut Self, CatalogError> {
        let descriptor = function.descriptor();
        if descriptor.name.trim().is_empty() {
            return Err(CatalogError::InvalidDescriptor("function name must be set".to_string()));
        }
        if descriptor.description.trim().is_empty() {
            return Err(CatalogError::InvalidDescriptor(format!(
                "function {} must have a description",
                descriptor.name
            )));
        }
        let key = FunctionNameKey::new(&descriptor.name);
        if self.functions.contains_key(&key) {
            return Err(CatalogError::DuplicateFunction(descriptor.name.clone()));
        }
        self.order.push(key.clone());
        self.functions.insert(key, function);
        Ok(self)
    }

    /// Finalizes the catalog, binding it to `ledger`.
    #[must_use]
    pub fn build(self, ledger: InvocationLedger) -> FunctionCatalog {
        FunctionCatalog {
            functions: self.functions,
            order: self.order,
            ledger,
            audit: self.audit,
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Read-only function catalog bound to an invocation ledger.
pub struct FunctionCatalog {
    /// Registered functions keyed by folded name.
    functions: BTreeMap<FunctionNameKey, Arc<dyn CatalogFunction>>,
    /// Folded names in registration order.
    order: Vec<FunctionNameKey>,
    /// Ledger receiving one record per dispatch.
    ledger: InvocationLedger,
    /// Audit sink for dispatch events.
    audit: Arc<dyn StrategyAuditSink>,
}

impl FunctionCatalog {
    /// Returns a builder for a new catalog.
    #[must_use]
    pub fn builder() -> FunctionCatalogBuilder {
        FunctionCatalogBuilder::new()
    }

    /// Returns the ledger this catalog records into.
    #[must_use]
    pub const fn ledger(&self) -> &InvocationLedger {
        &self.ledger
    }

    /// Returns descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &FunctionDescriptor> {
        self.order.iter().filter_map(|key| self.functions.get(key)).map(|f| f.descriptor())
    }

    /// Returns the descriptor for `name`, ignoring case.
    #[must_use]
    pub fn descriptor(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.get(&FunctionNameKey::new(name)).map(|f| f.descriptor())
    }

    /// Returns true when a function named `name` is registered, ignoring case.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(&FunctionNameKey::new(name))
    }

    /// Returns the number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns true when no functions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Dispatches a call to the function registered as `name`.
    ///
    /// The invocation is recorded under the registered name before the
    /// function runs.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownFunction`] for unregistered names and
    /// [`CatalogError::Function`] when the function fails.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: FunctionArguments,
    ) -> Result<FunctionOutput, CatalogError> {
        let Some(function) = self.functions.get(&FunctionNameKey::new(name)) else {
            self.audit.record(&StrategyAuditEvent::new(StrategyAuditEventParams {
                level: AuditLevel::Warn,
                function_name: Some(name.to_string()),
                error_kind: Some("unknown_function"),
                ..StrategyAuditEventParams::info("function_rejected")
            }));
            return Err(CatalogError::UnknownFunction(name.to_string()));
        };
        let registered_name = function.descriptor().name.clone();
        let parameters = if arguments.is_empty() { None } else { Some(arguments.clone()) };
        self.ledger.record_invocation(&registered_name, parameters)?;
        self.audit.record(&StrategyAuditEvent::new(StrategyAuditEventParams {
            function_name: Some(registered_name.clone()),
            ..StrategyAuditEventParams::info("function_invoked")
        }));

        match function.invoke(&arguments).await {
            Ok(output) => Ok(output),
            Err(source) => {
                self.audit.record(&StrategyAuditEvent::new(StrategyAuditEventParams {
                    level: AuditLevel::Error,
                    function_name: Some(registered_name.clone()),
                    error_kind: Some(function_error_kind(&source)),
                    message: Some(source.to_string()),
                    ..StrategyAuditEventParams::info("function_failed")
                }));
                Err(CatalogError::Function {
                    name: registered_name,
                    source,
                })
            }
        }
    }
}

/// Returns a stable label for a function error.
const fn function_error_kind(error: &FunctionError) -> &'static str {
    match error {
        FunctionError::InvalidArguments(_) => "invalid_arguments",
        FunctionError::AssertionFailed(_) => "assertion_failed",
        FunctionError::Execution(_) => "execution_failed",
    }
}
