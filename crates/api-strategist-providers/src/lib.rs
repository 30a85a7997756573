// crates/api-strategist-providers/src/lib.rs
// ============================================================================
// Module: API Strategist Providers
// Description: FakeStore repository, API test catalog, and chat model transport.
// Purpose: Supply concrete implementations of the core strategist interfaces.
// Dependencies: api-strategist-core, reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! This crate ships the concrete pieces a strategy run needs against the
//! public FakeStore API: an async repository client, nine catalog functions
//! that exercise it, and an OpenAI-compatible chat model that dispatches the
//! catalog through function calling. All outbound HTTP enforces scheme
//! restrictions, timeouts, and response size limits.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod fakestore;
mod http;
pub mod models;
pub mod openai;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::ApiTestFunction;
pub use catalog::ApiTestKind;
pub use catalog::LoginCredentials;
pub use catalog::register_api_test_functions;
pub use fakestore::FakeStoreClient;
pub use fakestore::FakeStoreConfig;
pub use fakestore::FakeStoreRepository;
pub use fakestore::RepositoryError;
pub use models::Cart;
pub use models::CartItem;
pub use models::LoginRequest;
pub use models::LoginResponse;
pub use models::Product;
pub use models::User;
pub use openai::OpenAiChatModel;
pub use openai::OpenAiConfig;
