// crates/api-strategist-providers/src/fakestore.rs
// ============================================================================
// Module: FakeStore Repository
// Description: Async client for the FakeStore REST API.
// Purpose: Give catalog functions typed access to products, carts, users, and auth.
// Dependencies: async-trait, reqwest, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`FakeStoreRepository`] is the seam catalog functions depend on;
//! [`FakeStoreClient`] implements it over HTTP. Lookups by id return
//! `Ok(None)` when the API answers with a non-success status or an empty
//! body, which is how FakeStore reports unknown ids. Every other failure is a
//! [`RepositoryError`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::Method;
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::http::body_preview;
use crate::http::parse_endpoint;
use crate::http::read_body_with_limit;
use crate::models::Cart;
use crate::models::LoginRequest;
use crate::models::LoginResponse;
use crate::models::Product;
use crate::models::User;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Public FakeStore endpoint.
pub const DEFAULT_FAKESTORE_URL: &str = "https://fakestoreapi.com";

/// Configuration for the FakeStore client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FakeStoreConfig {
    /// API base URL.
    pub base_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Allow cleartext HTTP (disabled by default).
    pub allow_http: bool,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
}

impl Default for FakeStoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FAKESTORE_URL.to_string(),
            timeout_ms: 10_000,
            allow_http: false,
            max_response_bytes: 4 * 1024 * 1024,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// FakeStore repository errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The configured base URL is unusable.
    #[error("invalid fakestore base url: {0}")]
    InvalidBaseUrl(String),
    /// The request could not be sent or the body could not be read.
    #[error("fakestore transport error: {0}")]
    Transport(String),
    /// The API answered with a non-success status.
    #[error("fakestore returned an error status: {0}")]
    Status(String),
    /// The response body did not match the expected model.
    #[error("fakestore response decode failed: {0}")]
    Decode(String),
}

// ============================================================================
// SECTION: Repository Interface
// ============================================================================

/// Typed access to the FakeStore API.
#[async_trait]
pub trait FakeStoreRepository: Send + Sync {
    /// Lists every product.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the request or decode fails.
    async fn get_all_products(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Fetches one product, or `None` when the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] on transport or decode failures.
    async fn get_product_by_id(&self, id: u64) -> Result<Option<Product>, RepositoryError>;

    /// Creates a product and returns the stored copy.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the request or decode fails.
    async fn create_product(&self, product: &Product) -> Result<Product, RepositoryError>;

    /// Replaces a product and returns the stored copy.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the request or decode fails.
    async fn update_product(&self, id: u64, product: &Product) -> Result<Product, RepositoryError>;

    /// Deletes a product.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the request fails.
    async fn delete_product(&self, id: u64) -> Result<(), RepositoryError>;

    /// Lists every cart.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the request or decode fails.
    async fn get_all_carts(&self) -> Result<Vec<Cart>, RepositoryError>;

    /// Fetches one cart, or `None` when the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] on transport or decode failures.
    async fn get_cart_by_id(&self, id: u64) -> Result<Option<Cart>, RepositoryError>;

    /// Lists every user.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the request or decode fails.
    async fn get_all_users(&self) -> Result<Vec<User>, RepositoryError>;

    /// Fetches one user, or `None` when the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] on transport or decode failures.
    async fn get_user_by_id(&self, id: u64) -> Result<Option<User>, RepositoryError>;

    /// Exchanges credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the credentials are rejected or the
    /// request fails.
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, RepositoryError>;
}

// ============================================================================
// SECTION: HTTP Client
// ============================================================================

/// HTTP implementation of [`FakeStoreRepository`].
#[derive(Debug, Clone)]
pub struct FakeStoreClient {
    /// Base URL with a trailing slash so relative paths join beneath it.
    base_url: Url,
    /// HTTP client used for outbound requests.
    client: Client,
    /// Maximum response size allowed, in bytes.
    max_response_bytes: usize,
}

impl FakeStoreClient {
    /// Creates a client for the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::InvalidBaseUrl`] when the URL is malformed
    /// or uses a disallowed scheme, and [`RepositoryError::Transport`] when
    /// the HTTP client cannot be built.
    pub fn new(config: &FakeStoreConfig) -> Result<Self, RepositoryError> {
        let mut base_url = parse_endpoint(&config.base_url, config.allow_http)
            .map_err(RepositoryError::InvalidBaseUrl)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .redirect(Policy::none())
            .build()
            .map_err(|err| RepositoryError::Transport(format!("http client build failed: {err}")))?;
        Ok(Self {
            base_url,
            client,
            max_response_bytes: config.max_response_bytes,
        })
    }

    /// Returns the normalized base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Sends a request and returns the status with the bounded body.
    async fn send<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(StatusCode, Vec<u8>), RepositoryError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|err| RepositoryError::InvalidBaseUrl(format!("{path}: {err}")))?;
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let mut response = request
            .send()
            .await
            .map_err(|err| RepositoryError::Transport(format!("{path}: {err}")))?;
        let status = response.status();
        let bytes = read_body_with_limit(&mut response, self.max_response_bytes)
            .await
            .map_err(RepositoryError::Transport)?;
        Ok((status, bytes))
    }

    /// Sends a request that must succeed and decodes its body.
    async fn required<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, RepositoryError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let (status, bytes) = self.send(method, path, body).await?;
        if !status.is_success() {
            return Err(RepositoryError::Status(format!(
                "{path}: status {status} with body {}",
                body_preview(&bytes)
            )));
        }
        decode(path, &bytes)?.ok_or_else(|| RepositoryError::Decode(format!("{path}: empty body")))
    }

    /// Fetches a resource that may not exist.
    async fn optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, RepositoryError> {
        let (status, bytes) = self.send::<()>(Method::GET, path, None).await?;
        if !status.is_success() {
            return Ok(None);
        }
        decode(path, &bytes)
    }
}

#[async_trait]
impl FakeStoreRepository for FakeStoreClient {
    async fn get_all_products(&self) -> Result<Vec<Product>, RepositoryError> {
        self.required::<_, ()>(Method::GET, "products", None).await
    }

    async fn get_product_by_id(&self, id: u64) -> Result<Option<Product>, RepositoryError> {
        self.optional(&format!("products/{id}")).await
    }

    async fn create_product(&self, product: &Product) -> Result<Product, RepositoryError> {
        self.required(Method::POST, "products", Some(product)).await
    }

    async fn update_product(&self, id: u64, product: &Product) -> Result<Product, RepositoryError> {
        self.required(Method::PUT, &format!("products/{id}"), Some(product)).await
    }

    async fn delete_product(&self, id: u64) -> Result<(), RepositoryError> {
        let path = format!("products/{id}");
        let (status, bytes) = self.send::<()>(Method::DELETE, &path, None).await?;
        if status.is_success() {
            Ok(())
        } else {
            Err(RepositoryError::Status(format!(
                "{path}: status {status} with body {}",
                body_preview(&bytes)
            )))
        }
    }

    async fn get_all_carts(&self) -> Result<Vec<Cart>, RepositoryError> {
        self.required::<_, ()>(Method::GET, "carts", None).await
    }

    async fn get_cart_by_id(&self, id: u64) -> Result<Option<Cart>, RepositoryError> {
        self.optional(&format!("carts/{id}")).await
    }

    async fn get_all_users(&self) -> Result<Vec<User>, RepositoryError> {
        self.required::<_, ()>(Method::GET, "users", None).await
    }

    async fn get_user_by_id(&self, id: u64) -> Result<Option<User>, RepositoryError> {
        self.optional(&format!("users/{id}")).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, RepositoryError> {
        self.required(Method::POST, "auth/login", Some(request)).await
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes a JSON body; blank bodies and JSON `null` decode to `None`.
fn decode<T: DeserializeOwned>(path: &str, bytes: &[u8]) -> Result<Option<T>, RepositoryError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice::<Option<T>>(bytes)
        .map_err(|err| RepositoryError::Decode(format!("{path}: {err}")))
}
