// crates/resource-relay-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared fixtures and in-memory collaborators for core tests.
// Purpose: Provide reusable requests, transports, and invokers.
// Dependencies: resource-relay-core, serde_json
// ============================================================================

//! ## Overview
//! Provides sample requests plus recording fakes for the callback transport
//! and function invoker seams.

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

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use resource_relay_core::CallbackTransport;
use resource_relay_core::ChainTimeouts;
use resource_relay_core::ChildOutcome;
use resource_relay_core::DeliveryReceipt;
use resource_relay_core::ExecutionContext;
use resource_relay_core::FunctionInvoker;
use resource_relay_core::InvokeError;
use resource_relay_core::TransportError;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Request Fixtures
// ============================================================================

/// Callback URL used by sample requests.
pub const RESPONSE_URL: &str = "https://callback.example.com/response?signature=abc";

/// Creates a sample request of the given kind.
pub fn sample_request(request_type: &str) -> Value {
    let mut request = json!({
        "RequestType": request_type,
        "ResponseURL": RESPONSE_URL,
        "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/demo/guid",
        "RequestId": "unique-request-id",
        "ResourceType": "Custom::Demo",
        "LogicalResourceId": "DemoResource",
        "ResourceProperties": {
            "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:demo",
            "Name": "demo",
            "Secret": "hunter2"
        }
    });
    if request_type != "Create" {
        request["PhysicalResourceId"] = json!("existing-physical-id");
    }
    if request_type == "Update" {
        request["OldResourceProperties"] = json!({"Name": "old", "Secret": "old-secret"});
    }
    request
}

/// Creates a sample execution context with ample remaining time.
pub fn sample_context() -> ExecutionContext {
    ExecutionContext::new("demo-function", "2026/10/19/[$LATEST]stream", "ctx-request-id", Duration::from_secs(30))
}

// ============================================================================
// SECTION: Recording Transport
// ============================================================================

/// A single captured PUT.
#[derive(Debug, Clone)]
pub struct RecordedPut {
    /// Target URL.
    pub url: String,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl RecordedPut {
    /// Parses the body as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("body is json")
    }
}

/// Transport that records every PUT and returns a scripted result.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    puts: Arc<Mutex<Vec<RecordedPut>>>,
    failure: Option<TransportError>,
}

impl RecordingTransport {
    /// Creates a transport that accepts every PUT.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport that rejects every PUT with `failure`.
    pub fn failing(failure: TransportError) -> Self {
        Self {
            puts: Arc::new(Mutex::new(Vec::new())),
            failure: Some(failure),
        }
    }

    /// Returns captured PUTs.
    pub fn puts(&self) -> Vec<RecordedPut> {
        self.puts.lock().expect("puts lock").clone()
    }

    /// Returns the bodies of captured PUTs as JSON.
    pub fn bodies(&self) -> Vec<Value> {
        self.puts().iter().map(RecordedPut::json).collect()
    }
}

impl CallbackTransport for RecordingTransport {
    fn put(&self, url: &str, body: &[u8]) -> Result<DeliveryReceipt, TransportError> {
        self.puts.lock().expect("puts lock").push(RecordedPut {
            url: url.to_string(),
            body: body.to_vec(),
        });
        match &self.failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(DeliveryReceipt {
                status_code: 200,
                bytes_sent: body.len(),
            }),
        }
    }
}

// ============================================================================
// SECTION: Scripted Invoker
// ============================================================================

/// A single captured child invocation.
#[derive(Debug, Clone)]
pub struct RecordedInvocation {
    /// Child payload.
    pub payload: Value,
    /// Timeouts applied.
    pub timeouts: ChainTimeouts,
}

/// Invoker that records calls and returns a scripted result.
#[derive(Clone)]
pub struct ScriptedInvoker {
    calls: Arc<Mutex<Vec<RecordedInvocation>>>,
    result: Result<ChildOutcome, InvokeError>,
}

impl ScriptedInvoker {
    /// Creates an invoker returning `result` for every call.
    pub fn new(result: Result<ChildOutcome, InvokeError>) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            result,
        }
    }

    /// Returns captured invocations.
    pub fn calls(&self) -> Vec<RecordedInvocation> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl FunctionInvoker for ScriptedInvoker {
    fn invoke_child(
        &self,
        payload: &Value,
        timeouts: ChainTimeouts,
    ) -> Result<ChildOutcome, InvokeError> {
        self.calls.lock().expect("calls lock").push(RecordedInvocation {
            payload: payload.clone(),
            timeouts,
        });
        self.result.clone()
    }
}
