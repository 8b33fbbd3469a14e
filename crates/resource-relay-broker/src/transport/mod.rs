// crates/resource-relay-broker/src/transport/mod.rs
// ============================================================================
// Module: Resource Relay Broker Transports
// Description: Transport implementations and shared broker errors.
// Purpose: Group the concrete delivery and invocation backends.
// Dependencies: resource-relay-core, thiserror
// ============================================================================

//! ## Overview
//! Each submodule implements one backend for the core transport seams. HTTP
//! backends fail closed on non-success statuses and never follow redirects.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Broker Errors
// ============================================================================

/// Errors raised while constructing broker backends.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    /// HTTP client could not be built.
    #[error("http client construction failed: {0}")]
    Client(String),
    /// Endpoint URL is unusable.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

// ============================================================================
// SECTION: Implementations
// ============================================================================

pub mod callback;
pub mod channel;
pub mod http;
pub mod invoker;

pub use callback::FnTransport;
pub use channel::CallbackMessage;
pub use channel::ChannelTransport;
pub use http::DEFAULT_DELIVERY_TIMEOUT;
pub use http::HttpCallbackTransport;
pub use invoker::FUNCTION_ERROR_HEADER;
pub use invoker::HttpFunctionInvoker;
