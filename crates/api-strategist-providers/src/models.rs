// crates/api-strategist-providers/src/models.rs
// ============================================================================
// Module: FakeStore Models
// Description: Wire models for FakeStore products, carts, users, and auth.
// Purpose: Decode and encode FakeStore JSON payloads.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Field names follow the FakeStore wire format. Fields the API sometimes
//! omits (for example on create responses) default rather than failing the
//! decode; unknown fields such as `rating` or `address` are ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Store product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier.
    #[serde(default)]
    pub id: u64,
    /// Product title.
    #[serde(default)]
    pub title: String,
    /// Unit price.
    #[serde(default)]
    pub price: f64,
    /// Long description.
    #[serde(default)]
    pub description: String,
    /// Category label.
    #[serde(default)]
    pub category: String,
    /// Image URL.
    #[serde(default)]
    pub image: String,
}

/// Product line within a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Referenced product identifier.
    pub product_id: u64,
    /// Quantity ordered.
    pub quantity: u32,
}

/// Shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Cart identifier.
    #[serde(default)]
    pub id: u64,
    /// Owning user identifier.
    #[serde(default)]
    pub user_id: u64,
    /// Product lines.
    #[serde(default)]
    pub products: Vec<CartItem>,
}

// ============================================================================
// SECTION: Users
// ============================================================================

/// Store user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    #[serde(default)]
    pub id: u64,
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Password as returned by the API.
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Login request body.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Login response body.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token.
    #[serde(default)]
    pub token: String,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse").field("token", &"<redacted>").finish()
    }
}
