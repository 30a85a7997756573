// crates/api-strategist-providers/src/catalog.rs
// ============================================================================
// Module: API Test Catalog
// Description: FakeStore API tests exposed as catalog functions.
// Purpose: Give the model a fixed set of test functions it can elect to run.
// Dependencies: api-strategist-core, async-trait, serde_json
// ============================================================================

//! ## Overview
//! Each [`ApiTestKind`] is one arrange-act-assert test against the FakeStore
//! repository. A passing test returns a small JSON summary; a failed check
//! returns [`FunctionError::AssertionFailed`] and a repository failure returns
//! [`FunctionError::Execution`]. Function names are stable identifiers that
//! callers list as expected invocations.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use api_strategist_core::CatalogError;
use api_strategist_core::CatalogFunction;
use api_strategist_core::FunctionArguments;
use api_strategist_core::FunctionCatalogBuilder;
use api_strategist_core::FunctionDescriptor;
use api_strategist_core::FunctionError;
use api_strategist_core::FunctionOutput;
use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;

use crate::fakestore::FakeStoreRepository;
use crate::fakestore::RepositoryError;
use crate::models::LoginRequest;
use crate::models::Product;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Product id known to exist.
pub const VALID_PRODUCT_ID: u64 = 1;
/// Product id known not to exist.
pub const INVALID_PRODUCT_ID: u64 = 999_999;
/// Default id for cart and user lookups.
const DEFAULT_LOOKUP_ID: u64 = 1;

/// Demo username accepted by the public FakeStore API.
const DEFAULT_USERNAME: &str = "mor_2314";
/// Demo password accepted by the public FakeStore API.
const DEFAULT_PASSWORD: &str = "83r5^_";

// ============================================================================
// SECTION: Credentials
// ============================================================================

/// Credentials used by the login test.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
}

impl Default for LoginCredentials {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
        }
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// SECTION: Test Kinds
// ============================================================================

/// The API tests available to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiTestKind {
    /// Lists products and checks the first has a title.
    GetAllProducts,
    /// Fetches a known product.
    GetProductByValidId,
    /// Fetches an unknown product and expects nothing back.
    GetProductByInvalidId,
    /// Creates a product and checks the echo.
    CreateProduct,
    /// Lists carts.
    GetAllCarts,
    /// Fetches one cart.
    GetCartById,
    /// Lists users and checks usernames.
    GetAllUsers,
    /// Fetches one user.
    GetUserById,
    /// Logs in with the configured credentials.
    Login,
}

impl ApiTestKind {
    /// Every test, in catalog order.
    pub const ALL: [Self; 9] = [
        Self::GetAllProducts,
        Self::GetProductByValidId,
        Self::GetProductByInvalidId,
        Self::CreateProduct,
        Self::GetAllCarts,
        Self::GetCartById,
        Self::GetAllUsers,
        Self::GetUserById,
        Self::Login,
    ];

    /// Returns the stable function name.
    #[must_use]
    pub const fn function_name(self) -> &'static str {
        match self {
            Self::GetAllProducts => "GetAllProducts_ShouldReturnProducts",
            Self::GetProductByValidId => "GetProductById_WithValidId_ShouldReturnProduct",
            Self::GetProductByInvalidId => "GetProductById_WithInvalidId_ShouldReturnNull",
            Self::CreateProduct => "CreateProduct_ShouldReturnCreatedProduct",
            Self::GetAllCarts => "GetAllCarts_ShouldReturnCarts",
            Self::GetCartById => "GetCartByIdAsync",
            Self::GetAllUsers => "GetAllUsers_ShouldReturnUsers",
            Self::GetUserById => "GetUserByIdAsync",
            Self::Login => "Login_WithValidCredentials_ShouldReturnToken",
        }
    }

    /// Returns the description shown to the model.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::GetAllProducts => {
                "Retrieve a list of all available products from the FakeStore API"
            }
            Self::GetProductByValidId => {
                "Retrieve details of a specific product by ID from the FakeStore API"
            }
            Self::GetProductByInvalidId => {
                "Verify that requesting a non-existent product ID returns null"
            }
            Self::CreateProduct => "Create a new product via POST request to the FakeStore API",
            Self::GetAllCarts => "Retrieve a list of all shopping carts from the FakeStore API",
            Self::GetCartById => "Retrieve a specific shopping cart by ID from the FakeStore API",
            Self::GetAllUsers => "Retrieve a list of all users from the FakeStore API",
            Self::GetUserById => "Retrieve a specific user by ID from the FakeStore API",
            Self::Login => "Authenticate a user with valid credentials and receive a JWT token",
        }
    }

    /// Returns the resource area used to group the test in prompts.
    #[must_use]
    pub const fn area(self) -> &'static str {
        match self {
            Self::GetAllProducts
            | Self::GetProductByValidId
            | Self::GetProductByInvalidId
            | Self::CreateProduct => "Product Tests",
            Self::GetAllCarts | Self::GetCartById => "Cart Tests",
            Self::GetAllUsers | Self::GetUserById => "User Tests",
            Self::Login => "Authentication Tests",
        }
    }

    /// Returns the default id when the test accepts an `id` argument.
    const fn default_id(self) -> Option<u64> {
        match self {
            Self::GetProductByValidId => Some(VALID_PRODUCT_ID),
            Self::GetCartById | Self::GetUserById => Some(DEFAULT_LOOKUP_ID),
            _ => None,
        }
    }

    /// Builds the model-facing descriptor.
    #[must_use]
    pub fn descriptor(self) -> FunctionDescriptor {
        let descriptor =
            FunctionDescriptor::new(self.function_name(), self.description(), self.area());
        match self.default_id() {
            Some(default) => descriptor.with_parameters(json!({
                "type": "object",
                "properties": {
                    "id": {
                        "type": "integer",
                        "minimum": 1,
                        "description": format!("Identifier to look up (default {default})"),
                    }
                }
            })),
            None => descriptor,
        }
    }
}

// ============================================================================
// SECTION: Catalog Function
// ============================================================================

/// Catalog function that runs one API test.
pub struct ApiTestFunction {
    /// Test to run.
    kind: ApiTestKind,
    /// Descriptor built from the kind.
    descriptor: FunctionDescriptor,
    /// Repository under test.
    repository: Arc<dyn FakeStoreRepository>,
    /// Credentials for the login test.
    credentials: LoginCredentials,
}

impl ApiTestFunction {
    /// Creates the function for `kind`.
    #[must_use]
    pub fn new(
        kind: ApiTestKind,
        repository: Arc<dyn FakeStoreRepository>,
        credentials: LoginCredentials,
    ) -> Self {
        Self {
            kind,
            descriptor: kind.descriptor(),
            repository,
            credentials,
        }
    }

    /// Returns the test kind.
    #[must_use]
    pub const fn kind(&self) -> ApiTestKind {
        self.kind
    }

    /// Runs the test body.
    async fn run(&self, arguments: &FunctionArguments) -> Result<Value, FunctionError> {
        let repo = self.repository.as_ref();
        match self.kind {
            ApiTestKind::GetAllProducts => {
                let products = repo.get_all_products().await.map_err(execution)?;
                let first = products
                    .first()
                    .ok_or_else(|| assertion("expected at least one product"))?;
                ensure(!first.title.trim().is_empty(), "first product has an empty title")?;
                Ok(json!({ "product_count": products.len(), "first_title": first.title }))
            }
            ApiTestKind::GetProductByValidId => {
                let id = lookup_id(arguments, VALID_PRODUCT_ID)?;
                let product = repo
                    .get_product_by_id(id)
                    .await
                    .map_err(execution)?
                    .ok_or_else(|| assertion(&format!("product {id} was not found")))?;
                ensure(product.id == id, &format!("expected product {id}, got {}", product.id))?;
                ensure(!product.title.trim().is_empty(), "product has an empty title")?;
                Ok(json!({ "id": product.id, "title": product.title }))
            }
            ApiTestKind::GetProductByInvalidId => {
                let product =
                    repo.get_product_by_id(INVALID_PRODUCT_ID).await.map_err(execution)?;
                ensure(
                    product.is_none(),
                    &format!("product {INVALID_PRODUCT_ID} should not exist"),
                )?;
                Ok(json!({ "id": INVALID_PRODUCT_ID, "found": false }))
            }
            ApiTestKind::CreateProduct => {
                let draft = sample_product();
                let created = repo.create_product(&draft).await.map_err(execution)?;
                ensure(
                    created.title == draft.title,
                    &format!("expected title {:?}, got {:?}", draft.title, created.title),
                )?;
                ensure(
                    (created.price - draft.price).abs() < f64::EPSILON,
                    &format!("expected price {}, got {}", draft.price, created.price),
                )?;
                Ok(json!({ "id": created.id, "title": created.title, "price": created.price }))
            }
            ApiTestKind::GetAllCarts => {
                let carts = repo.get_all_carts().await.map_err(execution)?;
                ensure(!carts.is_empty(), "expected at least one cart")?;
                Ok(json!({ "cart_count": carts.len() }))
            }
            ApiTestKind::GetCartById => {
                let id = lookup_id(arguments, DEFAULT_LOOKUP_ID)?;
                let cart = repo
                    .get_cart_by_id(id)
                    .await
                    .map_err(execution)?
                    .ok_or_else(|| assertion(&format!("cart {id} was not found")))?;
                Ok(json!({ "id": cart.id, "user_id": cart.user_id, "items": cart.products.len() }))
            }
            ApiTestKind::GetAllUsers => {
                let users = repo.get_all_users().await.map_err(execution)?;
                ensure(!users.is_empty(), "expected at least one user")?;
                ensure(
                    users.iter().all(|user| !user.username.trim().is_empty()),
                    "every user must have a username",
                )?;
                Ok(json!({ "user_count": users.len() }))
            }
            ApiTestKind::GetUserById => {
                let id = lookup_id(arguments, DEFAULT_LOOKUP_ID)?;
                let user = repo
                    .get_user_by_id(id)
                    .await
                    .map_err(execution)?
                    .ok_or_else(|| assertion(&format!("user {id} was not found")))?;
                Ok(json!({ "id": user.id, "username": user.username }))
            }
            ApiTestKind::Login => {
                let request = LoginRequest {
                    username: self.credentials.username.clone(),
                    password: self.credentials.password.clone(),
                };
                let response = repo.login(&request).await.map_err(execution)?;
                ensure(!response.token.trim().is_empty(), "login returned an empty token")?;
                Ok(json!({ "token_length": response.token.len() }))
            }
        }
    }
}

#[async_trait]
impl CatalogFunction for ApiTestFunction {
    fn descriptor(&self) -> &FunctionDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, arguments: &FunctionArguments) -> Result<FunctionOutput, FunctionError> {
        let details = self.run(arguments).await?;
        Ok(FunctionOutput::new(json!({
            "test": self.kind.function_name(),
            "passed": true,
            "details": details,
        })))
    }
}

/// Registers every API test against `repository`.
///
/// # Errors
///
/// Returns [`CatalogError`] when a test name collides with one already
/// registered on the builder.
pub fn register_api_test_functions(
    builder: &mut FunctionCatalogBuilder,
    repository: &Arc<dyn FakeStoreRepository>,
    credentials: &LoginCredentials,
) -> Result<(), CatalogError> {
    for kind in ApiTestKind::ALL {
        builder.register(ApiTestFunction::new(kind, Arc::clone(repository), credentials.clone()))?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Product payload used by the create test.
fn sample_product() -> Product {
    Product {
        id: 0,
        title: "Test Product".to_string(),
        price: 29.99,
        description: "Test Description".to_string(),
        category: "electronics".to_string(),
        image: "https://example.com/image.jpg".to_string(),
    }
}

/// Reads the optional `id` argument.
fn lookup_id(arguments: &FunctionArguments, default: u64) -> Result<u64, FunctionError> {
    match arguments.get("id") {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value.as_u64().filter(|id| *id > 0).ok_or_else(|| {
            FunctionError::InvalidArguments(format!("id must be a positive integer, got {value}"))
        }),
    }
}

/// Returns an assertion failure unless `condition` holds.
fn ensure(condition: bool, message: &str) -> Result<(), FunctionError> {
    if condition { Ok(()) } else { Err(assertion(message)) }
}

/// Builds an assertion failure.
fn assertion(message: &str) -> FunctionError {
    FunctionError::AssertionFailed(message.to_string())
}

/// Maps a repository error to an execution failure.
fn execution(err: RepositoryError) -> FunctionError {
    FunctionError::Execution(err.to_string())
}
