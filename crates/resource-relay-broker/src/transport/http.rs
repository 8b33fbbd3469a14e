// crates/resource-relay-broker/src/transport/http.rs
// ============================================================================
// Module: HTTP Callback Transport
// Description: Blocking HTTP PUT delivery of serialized envelopes.
// Purpose: Send response envelopes to pre-signed callback URLs.
// Dependencies: reqwest, resource-relay-core, url
// ============================================================================

//! ## Overview
//! [`HttpCallbackTransport`] issues a single PUT per envelope. Pre-signed
//! callback URLs are signed without a content type, so the transport sends an
//! empty `content-type` header and an explicit `content-length`.
//! Invariants:
//! - Redirects are not followed.
//! - Non-2xx statuses fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_LENGTH;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use resource_relay_core::CallbackTransport;
use resource_relay_core::DeliveryReceipt;
use resource_relay_core::TransportError;
use url::Url;

use crate::transport::BrokerError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default end-to-end timeout for a callback PUT.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// SECTION: HTTP Transport
// ============================================================================

/// Callback transport backed by a blocking HTTP client.
///
/// # Invariants
/// - Exactly one PUT is issued per call.
#[derive(Debug, Clone)]
pub struct HttpCallbackTransport {
    /// HTTP client used for callback requests.
    client: Client,
}

impl HttpCallbackTransport {
    /// Builds a transport with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError`] when the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, BrokerError> {
        Self::with_timeout(DEFAULT_DELIVERY_TIMEOUT)
    }

    /// Builds a transport with a specific request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError`] when the HTTP client cannot be constructed.
    pub fn with_timeout(timeout: Duration) -> Result<Self, BrokerError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|err| BrokerError::Client(err.to_string()))?;
        Ok(Self {
            client,
        })
    }

    /// Creates a transport with a preconfigured client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self {
            client,
        }
    }
}

impl CallbackTransport for HttpCallbackTransport {
    fn put(&self, url: &str, body: &[u8]) -> Result<DeliveryReceipt, TransportError> {
        let url = Url::parse(url)
            .map_err(|err| TransportError::Transport(format!("invalid callback url: {err}")))?;
        let response = self
            .client
            .put(url.as_str())
            .header(CONTENT_TYPE, "")
            .header(CONTENT_LENGTH, body.len())
            .body(body.to_vec())
            .send()
            .map_err(|err| TransportError::Transport(err.to_string()))?;
        let status = response.status();
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "callback put answered");
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }
        Ok(DeliveryReceipt {
            status_code: status.as_u16(),
            bytes_sent: body.len(),
        })
    }
}
