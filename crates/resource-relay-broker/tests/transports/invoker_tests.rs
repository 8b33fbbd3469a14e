// crates/resource-relay-broker/tests/transports/invoker_tests.rs
// ============================================================================
// Module: HTTP Function Invoker Tests
// Description: Chained invocation outcomes and failure mapping.
// Purpose: Pin how invoke replies map onto child outcomes and errors.
// Dependencies: resource-relay-broker, resource-relay-core, serde_json, tiny_http
// ============================================================================

//! ## Overview
//! Exercises [`resource_relay_broker::HttpFunctionInvoker`] against local
//! servers.

use std::time::Duration;

use resource_relay_broker::FUNCTION_ERROR_HEADER;
use resource_relay_broker::HttpFunctionInvoker;
use resource_relay_core::ChainTimeouts;
use resource_relay_core::ChildOutcome;
use resource_relay_core::FunctionInvoker;
use resource_relay_core::InvokeError;
use serde_json::json;

use super::common::Reply;
use super::common::closed_endpoint;
use super::common::serve_once;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const TIMEOUTS: ChainTimeouts = ChainTimeouts {
    connect: Duration::from_secs(2),
    read: Duration::from_secs(5),
};

fn invoke(reply: Reply, timeouts: ChainTimeouts) -> Result<ChildOutcome, InvokeError> {
    let (base, handle) = serve_once(reply);
    let invoker = HttpFunctionInvoker::new(&format!("{base}/invoke")).unwrap();
    let result = invoker.invoke_child(&json!({"RequestId": "r-1"}), timeouts);
    handle.join().unwrap();
    result
}

// ============================================================================
// SECTION: Returned Invocations
// ============================================================================

#[test]
fn completed_child_returns_parsed_payload() {
    let (base, handle) = serve_once(Reply::new(200, r#"{"done":true}"#));
    let invoker = HttpFunctionInvoker::new(&format!("{base}/invoke")).unwrap();
    let outcome = invoker.invoke_child(&json!({"RequestId": "r-1"}), TIMEOUTS).unwrap();
    assert_eq!(outcome, ChildOutcome::Completed(json!({"done": true})));

    let captured = handle.join().unwrap();
    assert_eq!(captured.method, "POST");
    assert_eq!(captured.header("content-type"), Some("application/json"));
    assert_eq!(captured.json(), json!({"RequestId": "r-1"}));
}

#[test]
fn function_error_header_reports_child_failure() {
    let reply = Reply::new(200, r#"{"errorMessage":"child exploded","errorType":"Error"}"#)
        .with_header(FUNCTION_ERROR_HEADER, "Unhandled");
    let outcome = invoke(reply, TIMEOUTS).unwrap();
    assert_eq!(outcome, ChildOutcome::FunctionError("child exploded".to_string()));
}

// ============================================================================
// SECTION: Failure Mapping
// ============================================================================

#[test]
fn service_statuses_map_to_invoke_errors() {
    assert!(matches!(invoke(Reply::new(403, "no"), TIMEOUTS), Err(InvokeError::PermissionDenied(_))));
    assert!(matches!(invoke(Reply::new(429, "slow"), TIMEOUTS), Err(InvokeError::Throttled(_))));
    assert!(matches!(invoke(Reply::new(400, "bad"), TIMEOUTS), Err(InvokeError::BadRequest(_))));
    assert!(matches!(invoke(Reply::new(500, "oops"), TIMEOUTS), Err(InvokeError::Unknown(_))));
}

#[test]
fn slow_child_is_a_read_timeout() {
    let timeouts = ChainTimeouts {
        connect: Duration::from_secs(2),
        read: Duration::from_millis(150),
    };
    let reply = Reply::new(200, "{}").with_delay(Duration::from_millis(800));
    assert_eq!(invoke(reply, timeouts), Err(InvokeError::ReadTimeout(timeouts.read)));
}

#[test]
fn unreachable_endpoint_is_a_connection_failure() {
    let invoker = HttpFunctionInvoker::new(&closed_endpoint()).unwrap();
    let err = invoker.invoke_child(&json!({}), TIMEOUTS).unwrap_err();
    assert!(matches!(err, InvokeError::ConnectionFailure(_)), "unexpected: {err:?}");
}
