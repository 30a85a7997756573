// crates/api-strategist-config/src/lib.rs
// ============================================================================
// Module: API Strategist Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for api-strategist.toml semantics.
// Dependencies: api-strategist-core, api-strategist-providers, serde, toml
// ============================================================================

//! ## Overview
//! `api-strategist-config` defines the configuration model for the strategist
//! CLI: the chat model, the FakeStore target, and the audit sink. Validation
//! is strict and fails closed; every section converts into the settings type
//! its consumer expects.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
