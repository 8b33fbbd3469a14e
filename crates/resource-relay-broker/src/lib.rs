// crates/resource-relay-broker/src/lib.rs
// ============================================================================
// Module: Resource Relay Broker Library
// Description: Concrete callback transports and chained invocation clients.
// Purpose: Deliver response envelopes and invoke chained children over HTTP.
// Dependencies: resource-relay-core, reqwest, tokio, url
// ============================================================================

//! ## Overview
//! Resource Relay Broker provides ready-made
//! [`resource_relay_core::CallbackTransport`] and
//! [`resource_relay_core::FunctionInvoker`] implementations.
//! Invariants:
//! - Transports return receipts only after the endpoint acknowledged the body.
//! - Redirects are never followed.
//! - Invokers issue exactly one request per call.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod transport;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use transport::BrokerError;
pub use transport::CallbackMessage;
pub use transport::ChannelTransport;
pub use transport::DEFAULT_DELIVERY_TIMEOUT;
pub use transport::FUNCTION_ERROR_HEADER;
pub use transport::FnTransport;
pub use transport::HttpCallbackTransport;
pub use transport::HttpFunctionInvoker;

#[cfg(test)]
mod tests;
