// crates/resource-relay-broker/tests/transports/callback_tests.rs
// ============================================================================
// Module: Closure Transport Tests
// Description: Tests for the closure-backed callback transport.
// Purpose: Validate delegation and error propagation.
// Dependencies: resource-relay-broker, resource-relay-core
// ============================================================================

//! ## Overview
//! Exercises [`resource_relay_broker::FnTransport`].

use std::sync::Arc;
use std::sync::Mutex;

use resource_relay_broker::FnTransport;
use resource_relay_core::CallbackTransport;
use resource_relay_core::DeliveryReceipt;
use resource_relay_core::TransportError;

#[test]
fn closure_receives_url_and_body() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let transport = FnTransport::new(move |url, body| {
        sink.lock().unwrap().push((url.to_string(), body.to_vec()));
        Ok(DeliveryReceipt {
            status_code: 204,
            bytes_sent: body.len(),
        })
    });
    let receipt = transport.put("https://callback.example.com/r", b"abc").unwrap();
    assert_eq!(receipt.status_code, 204);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.as_slice(), &[("https://callback.example.com/r".to_string(), b"abc".to_vec())]);
}

#[test]
fn closure_errors_propagate() {
    let transport = FnTransport::new(|_, _| Err(TransportError::Transport("offline".to_string())));
    let err = transport.put("https://callback.example.com/r", b"abc").unwrap_err();
    assert_eq!(err, TransportError::Transport("offline".to_string()));
}
