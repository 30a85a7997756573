// crates/api-strategist-providers/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Local HTTP stub server for provider tests.
// Purpose: Exercise real HTTP paths without reaching external services.
// Dependencies: tiny_http
// ============================================================================

//! ## Overview
//! [`spawn_stub`] starts a `tiny_http` server on an ephemeral port. Each
//! request is captured and answered by a handler that also receives the
//! zero-based request index, so tests can script multi-step exchanges.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Stub Server
// ============================================================================

/// Request as seen by the stub server.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// HTTP method.
    pub method: String,
    /// Request path and query.
    pub path: String,
    /// Authorization header, if any.
    pub authorization: Option<String>,
    /// Raw request body.
    pub body: String,
}

impl CapturedRequest {
    /// Parses the body as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Scripted response.
pub struct StubResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl StubResponse {
    /// JSON response with status 200.
    pub fn json(value: &serde_json::Value) -> Self {
        Self {
            status: 200,
            body: value.to_string(),
        }
    }

    /// Raw response with the given status.
    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

/// Running stub server.
pub struct StubServer {
    /// Base URL, without a trailing slash.
    pub url: String,
    /// Requests received so far.
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl StubServer {
    /// Returns the requests received so far.
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Spawns a stub server answering every request with `handler`.
pub fn spawn_stub<F>(handler: F) -> StubServer
where
    F: Fn(usize, &CapturedRequest) -> StubResponse + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let captured = Arc::clone(&requests);

    thread::spawn(move || {
        for (index, mut request) in server.incoming_requests().enumerate() {
            let mut body = String::new();
            let _ = request.as_reader().read_to_string(&mut body);
            let authorization = request
                .headers()
                .iter()
                .find(|header| header.field.equiv("Authorization"))
                .map(|header| header.value.as_str().to_string());
            let seen = CapturedRequest {
                method: request.method().to_string(),
                path: request.url().to_string(),
                authorization,
                body,
            };
            let reply = handler(index, &seen);
            captured.lock().unwrap().push(seen);
            let content_type =
                Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
            let response = Response::from_string(reply.body)
                .with_status_code(reply.status)
                .with_header(content_type);
            let _ = request.respond(response);
        }
    });

    StubServer {
        url: format!("http://{addr}"),
        requests,
    }
}
