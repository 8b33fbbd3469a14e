// crates/resource-relay-broker/tests/transports/channel_tests.rs
// ============================================================================
// Module: Channel Transport Tests
// Description: Tests for the channel-backed callback transport.
// Purpose: Validate message forwarding and full-channel failures.
// Dependencies: resource-relay-broker, resource-relay-core, tokio
// ============================================================================

//! ## Overview
//! Exercises [`resource_relay_broker::ChannelTransport`] delivery behavior.

use resource_relay_broker::CallbackMessage;
use resource_relay_broker::ChannelTransport;
use resource_relay_core::CallbackTransport;
use resource_relay_core::TransportError;

#[test]
fn channel_transport_forwards_message() {
    let (tx, mut rx) = tokio::sync::mpsc::channel::<CallbackMessage>(1);
    let transport = ChannelTransport::new(tx);
    let receipt = transport.put("https://callback.example.com/r", b"envelope").unwrap();

    let message = rx.try_recv().expect("channel recv");
    assert_eq!(message.url, "https://callback.example.com/r");
    assert_eq!(message.body, b"envelope");
    assert_eq!(message.receipt, receipt);
    assert_eq!(receipt.bytes_sent, 8);
}

#[test]
fn full_channel_fails_delivery() {
    let (tx, _rx) = tokio::sync::mpsc::channel::<CallbackMessage>(1);
    let transport = ChannelTransport::new(tx);
    transport.put("https://callback.example.com/r", b"first").unwrap();
    let err = transport.put("https://callback.example.com/r", b"second").unwrap_err();
    assert!(matches!(err, TransportError::Transport(_)));
}

#[test]
fn closed_channel_fails_delivery() {
    let (tx, rx) = tokio::sync::mpsc::channel::<CallbackMessage>(1);
    drop(rx);
    let transport = ChannelTransport::new(tx);
    assert!(transport.put("https://callback.example.com/r", b"x").is_err());
}
