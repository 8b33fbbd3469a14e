// crates/resource-relay-broker/tests/transports/http_tests.rs
// ============================================================================
// Module: HTTP Callback Transport Tests
// Description: Wire behavior of the HTTP PUT transport.
// Purpose: Pin headers, method, and status handling for callback delivery.
// Dependencies: resource-relay-broker, resource-relay-core, tiny_http
// ============================================================================

//! ## Overview
//! Exercises [`resource_relay_broker::HttpCallbackTransport`] against a local
//! server.

use resource_relay_broker::HttpCallbackTransport;
use resource_relay_core::CallbackTransport;
use resource_relay_core::TransportError;

use super::common::Reply;
use super::common::serve_once;

#[test]
fn put_sends_body_with_empty_content_type() {
    let (base, handle) = serve_once(Reply::new(200, ""));
    let transport = HttpCallbackTransport::new().unwrap();
    let body = br#"{"Status":"SUCCESS"}"#;
    let receipt = transport.put(&format!("{base}/callback?sig=abc"), body).unwrap();
    assert_eq!(receipt.status_code, 200);
    assert_eq!(receipt.bytes_sent, body.len());

    let captured = handle.join().unwrap();
    assert_eq!(captured.method, "PUT");
    assert_eq!(captured.url, "/callback?sig=abc");
    assert_eq!(captured.header("content-type"), Some(""));
    assert_eq!(captured.header("content-length"), Some(body.len().to_string().as_str()));
    assert_eq!(captured.body, body);
}

#[test]
fn non_success_status_is_reported() {
    let (base, handle) = serve_once(Reply::new(403, "denied"));
    let transport = HttpCallbackTransport::new().unwrap();
    let err = transport.put(&format!("{base}/callback"), b"{}").unwrap_err();
    assert_eq!(
        err,
        TransportError::Status {
            status: 403,
            reason: "Forbidden".to_string(),
        }
    );
    handle.join().unwrap();
}

#[test]
fn redirects_are_not_followed() {
    let (base, handle) =
        serve_once(Reply::new(302, "").with_header("Location", "http://127.0.0.1:9/elsewhere"));
    let transport = HttpCallbackTransport::new().unwrap();
    let err = transport.put(&format!("{base}/callback"), b"{}").unwrap_err();
    assert!(matches!(err, TransportError::Status { status: 302, .. }));
    handle.join().unwrap();
}

#[test]
fn invalid_url_is_a_transport_failure() {
    let transport = HttpCallbackTransport::new().unwrap();
    let err = transport.put("not a url", b"{}").unwrap_err();
    assert!(matches!(err, TransportError::Transport(ref message) if message.contains("invalid")));
}
