// crates/resource-relay-broker/src/transport/callback.rs
// ============================================================================
// Module: Closure Callback Transport
// Description: Transport that delegates delivery to a closure.
// Purpose: Plug custom delivery code in without a new type.
// Dependencies: resource-relay-core
// ============================================================================

//! ## Overview
//! [`FnTransport`] invokes a user-supplied closure for every delivery.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use resource_relay_core::CallbackTransport;
use resource_relay_core::DeliveryReceipt;
use resource_relay_core::TransportError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Delivery closure signature.
type DeliveryFn = dyn Fn(&str, &[u8]) -> Result<DeliveryReceipt, TransportError> + Send + Sync;

// ============================================================================
// SECTION: Closure Transport
// ============================================================================

/// Transport that delegates to a closure.
#[derive(Clone)]
pub struct FnTransport {
    /// Delivery handler.
    handler: Arc<DeliveryFn>,
}

impl FnTransport {
    /// Creates a transport from a delivery closure.
    #[must_use]
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&str, &[u8]) -> Result<DeliveryReceipt, TransportError> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
        }
    }
}

impl std::fmt::Debug for FnTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTransport").finish_non_exhaustive()
    }
}

impl CallbackTransport for FnTransport {
    fn put(&self, url: &str, body: &[u8]) -> Result<DeliveryReceipt, TransportError> {
        (self.handler)(url, body)
    }
}
