// crates/resource-relay-broker/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared helpers for resource-relay-broker tests.
// Purpose: Provide one-shot HTTP servers and request fixtures.
// Dependencies: serde_json, tiny_http
// ============================================================================

//! ## Overview
//! Provides a single-request `tiny_http` server that records what it received
//! and answers with a scripted response.

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

use std::thread::JoinHandle;
use std::time::Duration;

use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Captured Requests
// ============================================================================

/// Request observed by a test server.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// HTTP method.
    pub method: String,
    /// Request path and query.
    pub url: String,
    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: Vec<u8>,
}

impl CapturedRequest {
    /// Returns the first header value matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Parses the body as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("json body")
    }
}

// ============================================================================
// SECTION: Scripted Server
// ============================================================================

/// Scripted reply for a one-shot server.
#[derive(Debug, Clone)]
pub struct Reply {
    /// Status code.
    pub status: u16,
    /// Extra response headers.
    pub headers: Vec<(&'static str, &'static str)>,
    /// Response body.
    pub body: String,
    /// Delay before answering.
    pub delay: Duration,
}

impl Reply {
    /// Creates a reply with the given status and body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    /// Adds a response header.
    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((name, value));
        self
    }

    /// Delays the reply.
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Starts a server that answers one request; returns its base URL.
pub fn serve_once(reply: Reply) -> (String, JoinHandle<CapturedRequest>) {
    let server = Server::http("127.0.0.1:0").expect("http server");
    let base = format!("http://{}", server.server_addr());
    let handle = std::thread::spawn(move || {
        let mut request = server.recv().expect("request");
        let mut body = Vec::new();
        request.as_reader().read_to_end(&mut body).expect("body");
        let captured = CapturedRequest {
            method: request.method().to_string(),
            url: request.url().to_string(),
            headers: request
                .headers()
                .iter()
                .map(|header| (header.field.to_string(), header.value.to_string()))
                .collect(),
            body,
        };
        std::thread::sleep(reply.delay);
        let mut response = Response::from_string(reply.body).with_status_code(reply.status);
        for (name, value) in reply.headers {
            response = response
                .with_header(Header::from_bytes(name.as_bytes(), value.as_bytes()).expect("header"));
        }
        // Client may have hung up after a timeout.
        let _ = request.respond(response);
        captured
    });
    (base, handle)
}

/// Returns a loopback URL with nothing listening on it.
pub fn closed_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}/invoke")
}

// ============================================================================
// SECTION: Request Fixtures
// ============================================================================

/// Creates a sample request whose callback targets `response_url`.
pub fn sample_request(request_type: &str, response_url: &str) -> Value {
    let mut request = json!({
        "RequestType": request_type,
        "ResponseURL": response_url,
        "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/demo/guid",
        "RequestId": "unique-request-id",
        "ResourceType": "Custom::Demo",
        "LogicalResourceId": "DemoResource",
        "ResourceProperties": {"Name": "demo"}
    });
    if request_type != "Create" {
        request["PhysicalResourceId"] = json!("existing-physical-id");
    }
    request
}
