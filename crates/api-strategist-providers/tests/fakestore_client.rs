// crates/api-strategist-providers/tests/fakestore_client.rs
// ============================================================================
// Module: FakeStore Client Tests
// Description: HTTP behavior of the FakeStore repository client.
// Purpose: Validate routing, decoding, absent-resource handling, and limits.
// Dependencies: api-strategist-providers, tiny_http, tokio
// ============================================================================

//! ## Overview
//! Tests the FakeStore client against a local stub for:
//! - Happy path: list, lookup, create, update, delete, and login calls.
//! - Absent resources: empty bodies and error statuses decode to `None`.
//! - Boundaries: scheme policy, size limits, and malformed payloads.

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

mod common;

use api_strategist_providers::FakeStoreClient;
use api_strategist_providers::FakeStoreConfig;
use api_strategist_providers::FakeStoreRepository;
use api_strategist_providers::LoginRequest;
use api_strategist_providers::Product;
use api_strategist_providers::RepositoryError;
use serde_json::json;

use crate::common::StubResponse;
use crate::common::spawn_stub;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Creates a client pointed at a local stub.
fn local_client(url: &str) -> FakeStoreClient {
    FakeStoreClient::new(&FakeStoreConfig {
        base_url: url.to_string(),
        allow_http: true,
        timeout_ms: 5_000,
        ..FakeStoreConfig::default()
    })
    .unwrap()
}

fn product_json(id: u64, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "price": 109.95,
        "description": "desc",
        "category": "men's clothing",
        "image": "https://fakestoreapi.com/img/1.jpg",
        "rating": { "rate": 3.9, "count": 120 }
    })
}

// ============================================================================
// SECTION: Products
// ============================================================================

#[tokio::test]
async fn get_all_products_decodes_the_list() {
    let stub = spawn_stub(|_, _| {
        StubResponse::json(&json!([product_json(1, "Backpack"), product_json(2, "Shirt")]))
    });
    let client = local_client(&stub.url);

    let products = client.get_all_products().await.unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].title, "Backpack");

    let requests = stub.requests();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/products");
}

#[tokio::test]
async fn get_product_by_id_returns_the_product() {
    let stub = spawn_stub(|_, _| StubResponse::json(&product_json(1, "Backpack")));
    let client = local_client(&stub.url);

    let product = client.get_product_by_id(1).await.unwrap().unwrap();
    assert_eq!(product.id, 1);
    assert_eq!(stub.requests()[0].path, "/products/1");
}

#[tokio::test]
async fn unknown_product_with_empty_body_is_none() {
    let stub = spawn_stub(|_, _| StubResponse::raw(200, ""));
    let client = local_client(&stub.url);
    assert!(client.get_product_by_id(999_999).await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_product_with_null_body_is_none() {
    let stub = spawn_stub(|_, _| StubResponse::raw(200, "null"));
    let client = local_client(&stub.url);
    assert!(client.get_product_by_id(999_999).await.unwrap().is_none());
}

#[tokio::test]
async fn lookup_error_status_is_none() {
    let stub = spawn_stub(|_, _| StubResponse::raw(404, "not found"));
    let client = local_client(&stub.url);
    assert!(client.get_user_by_id(42).await.unwrap().is_none());
    assert!(client.get_cart_by_id(42).await.unwrap().is_none());
}

#[tokio::test]
async fn create_product_posts_json_and_decodes_echo() {
    let stub = spawn_stub(|_, request| {
        let mut echo = request.json();
        echo["id"] = json!(21);
        StubResponse::json(&echo)
    });
    let client = local_client(&stub.url);
    let draft = Product {
        id: 0,
        title: "Test Product".to_string(),
        price: 29.99,
        description: "Test Description".to_string(),
        category: "electronics".to_string(),
        image: "https://example.com/image.jpg".to_string(),
    };

    let created = client.create_product(&draft).await.unwrap();
    assert_eq!(created.id, 21);
    assert_eq!(created.title, "Test Product");

    let request = &stub.requests()[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/products");
    assert_eq!(request.json()["category"], json!("electronics"));
}

#[tokio::test]
async fn update_and_delete_route_by_id() {
    let stub = spawn_stub(|index, request| match index {
        0 => StubResponse::json(&request.json()),
        _ => StubResponse::raw(200, "{}"),
    });
    let client = local_client(&stub.url);
    let product = Product {
        id: 7,
        title: "Renamed".to_string(),
        price: 1.0,
        description: String::new(),
        category: String::new(),
        image: String::new(),
    };

    let updated = client.update_product(7, &product).await.unwrap();
    assert_eq!(updated.title, "Renamed");
    client.delete_product(7).await.unwrap();

    let requests = stub.requests();
    assert_eq!(requests[0].method, "PUT");
    assert_eq!(requests[0].path, "/products/7");
    assert_eq!(requests[1].method, "DELETE");
    assert_eq!(requests[1].path, "/products/7");
}

#[tokio::test]
async fn delete_failure_reports_status() {
    let stub = spawn_stub(|_, _| StubResponse::raw(500, "boom"));
    let client = local_client(&stub.url);
    let err = client.delete_product(1).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Status(message) if message.contains("boom")));
}

// ============================================================================
// SECTION: Carts, Users, Auth
// ============================================================================

#[tokio::test]
async fn carts_decode_wire_format() {
    let stub = spawn_stub(|_, _| {
        StubResponse::json(&json!([{
            "id": 1,
            "userId": 3,
            "date": "2020-03-02T00:00:00.000Z",
            "products": [{ "productId": 1, "quantity": 4 }],
            "__v": 0
        }]))
    });
    let client = local_client(&stub.url);
    let carts = client.get_all_carts().await.unwrap();
    assert_eq!(carts[0].user_id, 3);
    assert_eq!(carts[0].products[0].product_id, 1);
    assert_eq!(carts[0].products[0].quantity, 4);
}

#[tokio::test]
async fn users_ignore_unknown_fields() {
    let stub = spawn_stub(|_, _| {
        StubResponse::json(&json!([{
            "id": 1,
            "email": "john@gmail.com",
            "username": "johnd",
            "password": "m38rmF$",
            "name": { "firstname": "john", "lastname": "doe" },
            "address": { "city": "kilcoole" }
        }]))
    });
    let client = local_client(&stub.url);
    let users = client.get_all_users().await.unwrap();
    assert_eq!(users[0].username, "johnd");
    assert!(!format!("{:?}", users[0]).contains("m38rmF$"));
}

#[tokio::test]
async fn login_returns_token() {
    let stub = spawn_stub(|_, _| StubResponse::json(&json!({ "token": "eyJhbGciOi" })));
    let client = local_client(&stub.url);
    let response = client
        .login(&LoginRequest {
            username: "mor_2314".to_string(),
            password: "83r5^_".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(response.token, "eyJhbGciOi");

    let request = &stub.requests()[0];
    assert_eq!(request.path, "/auth/login");
    assert_eq!(request.json()["username"], json!("mor_2314"));
}

#[tokio::test]
async fn rejected_login_is_a_status_error() {
    let stub = spawn_stub(|_, _| StubResponse::raw(401, "username or password is incorrect"));
    let client = local_client(&stub.url);
    let err = client
        .login(&LoginRequest {
            username: "nobody".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Status(_)));
}

// ============================================================================
// SECTION: Boundaries
// ============================================================================

#[tokio::test]
async fn malformed_list_is_a_decode_error() {
    let stub = spawn_stub(|_, _| StubResponse::raw(200, "{\"not\": \"a list\"}"));
    let client = local_client(&stub.url);
    let err = client.get_all_products().await.unwrap_err();
    assert!(matches!(err, RepositoryError::Decode(_)));
}

#[tokio::test]
async fn empty_list_body_is_a_decode_error() {
    let stub = spawn_stub(|_, _| StubResponse::raw(200, ""));
    let client = local_client(&stub.url);
    let err = client.get_all_users().await.unwrap_err();
    assert!(matches!(err, RepositoryError::Decode(_)));
}

#[tokio::test]
async fn oversized_response_is_rejected() {
    let stub = spawn_stub(|_, _| StubResponse::raw(200, &"x".repeat(2_048)));
    let client = FakeStoreClient::new(&FakeStoreConfig {
        base_url: stub.url.clone(),
        allow_http: true,
        max_response_bytes: 1_024,
        ..FakeStoreConfig::default()
    })
    .unwrap();
    let err = client.get_all_products().await.unwrap_err();
    assert!(matches!(err, RepositoryError::Transport(message) if message.contains("size limit")));
}

#[tokio::test]
async fn base_path_prefix_is_preserved() {
    let stub = spawn_stub(|_, _| StubResponse::json(&json!([])));
    let client = local_client(&format!("{}/api", stub.url));
    assert_eq!(client.base_url().path(), "/api/");
    client.get_all_carts().await.unwrap();
    assert_eq!(stub.requests()[0].path, "/api/carts");
}

#[test]
fn cleartext_base_url_requires_opt_in() {
    let err = FakeStoreClient::new(&FakeStoreConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        ..FakeStoreConfig::default()
    })
    .unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidBaseUrl(_)));
}

#[test]
fn unsupported_scheme_is_rejected() {
    let err = FakeStoreClient::new(&FakeStoreConfig {
        base_url: "ftp://fakestoreapi.com".to_string(),
        allow_http: true,
        ..FakeStoreConfig::default()
    })
    .unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidBaseUrl(_)));
}
