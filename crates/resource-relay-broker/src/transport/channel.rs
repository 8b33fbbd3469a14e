// crates/resource-relay-broker/src/transport/channel.rs
// ============================================================================
// Module: Channel Callback Transport
// Description: Transport that forwards envelopes over a Tokio channel.
// Purpose: Hand envelopes to async consumers without performing I/O.
// Dependencies: resource-relay-core, tokio
// ============================================================================

//! ## Overview
//! [`ChannelTransport`] pushes each delivery onto a bounded
//! [`tokio::sync::mpsc`] channel. Sending never blocks: a full or closed
//! channel fails the delivery.

// ============================================================================
// SECTION: Imports
// ============================================================================

use resource_relay_core::CallbackTransport;
use resource_relay_core::DeliveryReceipt;
use resource_relay_core::TransportError;
use tokio::sync::mpsc::Sender;

// ============================================================================
// SECTION: Callback Message
// ============================================================================

/// Delivery forwarded by [`ChannelTransport`].
///
/// # Invariants
/// - `receipt.bytes_sent` equals `body.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackMessage {
    /// Callback URL.
    pub url: String,
    /// Serialized envelope.
    pub body: Vec<u8>,
    /// Receipt returned to the caller.
    pub receipt: DeliveryReceipt,
}

// ============================================================================
// SECTION: Channel Transport
// ============================================================================

/// Transport that forwards envelopes to a channel.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    /// Channel sender for deliveries.
    sender: Sender<CallbackMessage>,
}

impl ChannelTransport {
    /// Creates a channel transport from a sender.
    #[must_use]
    pub const fn new(sender: Sender<CallbackMessage>) -> Self {
        Self {
            sender,
        }
    }
}

impl CallbackTransport for ChannelTransport {
    fn put(&self, url: &str, body: &[u8]) -> Result<DeliveryReceipt, TransportError> {
        let receipt = DeliveryReceipt {
            status_code: 200,
            bytes_sent: body.len(),
        };
        let message = CallbackMessage {
            url: url.to_string(),
            body: body.to_vec(),
            receipt,
        };
        self.sender.try_send(message).map_err(|err| TransportError::Transport(err.to_string()))?;
        Ok(receipt)
    }
}
