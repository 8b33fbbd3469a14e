// crates/resource-relay-core/src/runtime/delivery.rs
// ============================================================================
// Module: Resource Relay Envelope Delivery
// Description: Size-checked serialization and callback PUT of envelopes.
// Purpose: Send exactly one envelope per attempt to the callback endpoint.
// Dependencies: crate::core, crate::interfaces, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`deliver`] serializes an envelope, enforces the byte ceiling, flushes the
//! process output streams, and hands the body to a [`CallbackTransport`].
//! Invariants:
//! - Oversized envelopes fail before the transport is touched.
//! - The envelope is returned only after the endpoint acknowledged it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::Write;

use thiserror::Error;

use crate::core::MAX_RESPONSE_BYTES;
use crate::core::ProtocolError;
use crate::core::ResponseEnvelope;
use crate::interfaces::CallbackTransport;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Envelope delivery failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Only [`DeliveryError::Protocol`] is recoverable by a FAILED rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// Envelope violated the response protocol.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    /// Envelope could not be serialized.
    #[error("envelope encoding failed: {0}")]
    Encoding(String),
    /// Callback endpoint did not accept the envelope.
    #[error("failed to send response: {0}")]
    DeliveryFailed(String),
}

// ============================================================================
// SECTION: Encoding
// ============================================================================

/// Serializes an envelope and enforces [`MAX_RESPONSE_BYTES`].
///
/// # Errors
///
/// Returns [`DeliveryError::Encoding`] when serialization fails and
/// [`ProtocolError::ResponseTooLong`] when the body reaches the ceiling.
pub fn encode_envelope(envelope: &ResponseEnvelope) -> Result<Vec<u8>, DeliveryError> {
    let body =
        serde_json::to_vec(envelope).map_err(|err| DeliveryError::Encoding(err.to_string()))?;
    if body.len() >= MAX_RESPONSE_BYTES {
        return Err(ProtocolError::ResponseTooLong {
            max_bytes: MAX_RESPONSE_BYTES,
            actual_bytes: body.len(),
        }
        .into());
    }
    Ok(body)
}

// ============================================================================
// SECTION: Delivery
// ============================================================================

/// Delivers an envelope to `url` and returns it once acknowledged.
///
/// # Errors
///
/// Returns [`DeliveryError`] when encoding fails, the envelope is too long,
/// or the transport reports a failure.
pub fn deliver(
    envelope: ResponseEnvelope,
    url: &str,
    transport: &dyn CallbackTransport,
) -> Result<ResponseEnvelope, DeliveryError> {
    let body = encode_envelope(&envelope)?;
    flush_output_streams();
    tracing::debug!(
        status = envelope.status.as_str(),
        bytes = body.len(),
        "sending callback response"
    );
    let receipt = transport.put(url, &body).map_err(|err| {
        tracing::error!(error = %err, "callback response was not accepted");
        DeliveryError::DeliveryFailed(err.to_string())
    })?;
    tracing::info!(
        status = envelope.status.as_str(),
        status_code = receipt.status_code,
        bytes = receipt.bytes_sent,
        "callback response delivered"
    );
    Ok(envelope)
}

/// Flushes stdout and stderr so buffered output lands before the process may freeze.
fn flush_output_streams() {
    if let Err(err) = io::stdout().flush() {
        tracing::warn!(error = %err, "stdout flush failed");
    }
    if let Err(err) = io::stderr().flush() {
        tracing::warn!(error = %err, "stderr flush failed");
    }
}
