// crates/resource-relay-core/src/interfaces/mod.rs
// ============================================================================
// Module: Resource Relay Interfaces
// Description: Backend-agnostic seams for user logic, delivery, and chaining.
// Purpose: Define the contract surfaces used by the relay runtime.
// Dependencies: crate::core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Interfaces keep the runtime independent of any HTTP client or compute
//! platform. The broker crate supplies concrete implementations; tests supply
//! in-memory ones.
//! Invariants:
//! - Transports report success only after the endpoint acknowledged the body.
//! - Invokers never retry; one call per chained invocation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::error::Error as StdError;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::core::ExecutionContext;
use crate::core::Outcome;
use crate::core::RequestObject;

// ============================================================================
// SECTION: Resource Handler
// ============================================================================

/// Error type user logic may return.
pub type HandlerError = Box<dyn StdError + Send + Sync>;

/// User logic implementing a custom resource.
pub trait ResourceHandler: Send + Sync {
    /// Returns the handler identity used in failure reasons.
    fn name(&self) -> &str;

    /// Handles one request.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] when the operation fails; the orchestrator
    /// converts it into a FAILED envelope.
    fn handle(
        &self,
        request: &RequestObject,
        context: Option<&ExecutionContext>,
    ) -> Result<Outcome, HandlerError>;
}

/// Closure-backed [`ResourceHandler`].
pub struct FnHandler<F> {
    /// Handler identity.
    name: String,
    /// Wrapped closure.
    handler: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&RequestObject, Option<&ExecutionContext>) -> Result<Outcome, HandlerError>
        + Send
        + Sync,
{
    /// Wraps a closure under the given name.
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<F> ResourceHandler for FnHandler<F>
where
    F: Fn(&RequestObject, Option<&ExecutionContext>) -> Result<Outcome, HandlerError>
        + Send
        + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(
        &self,
        request: &RequestObject,
        context: Option<&ExecutionContext>,
    ) -> Result<Outcome, HandlerError> {
        (self.handler)(request, context)
    }
}

// ============================================================================
// SECTION: Callback Transport
// ============================================================================

/// Acknowledgement returned by a successful PUT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// HTTP status code returned by the endpoint.
    pub status_code: u16,
    /// Bytes sent in the body.
    pub bytes_sent: usize,
}

/// Callback transport failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Endpoint answered with a non-2xx status.
    #[error("callback endpoint returned status {status}: {reason}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase.
        reason: String,
    },
    /// Request could not be completed.
    #[error("callback transport failure: {0}")]
    Transport(String),
}

/// Sends serialized envelopes to callback URLs.
///
/// Implementations issue a single PUT with an empty `content-type` header and
/// an explicit `content-length`.
pub trait CallbackTransport: Send + Sync {
    /// PUTs `body` to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on non-2xx responses or transport failures.
    fn put(&self, url: &str, body: &[u8]) -> Result<DeliveryReceipt, TransportError>;
}

// ============================================================================
// SECTION: Function Invoker
// ============================================================================

/// Timeouts applied to a chained invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainTimeouts {
    /// Connection establishment timeout.
    pub connect: Duration,
    /// Time to wait for the child's reply.
    pub read: Duration,
}

/// Result of a chained invocation that returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildOutcome {
    /// Child finished and delivered its own response; carries its payload.
    Completed(Value),
    /// Child raised an application-level error.
    FunctionError(String),
}

/// Chained invocation failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokeError {
    /// Caller lacks permission to invoke.
    #[error("invocation permission denied: {0}")]
    PermissionDenied(String),
    /// Invocation was throttled.
    #[error("invocation throttled: {0}")]
    Throttled(String),
    /// Invocation request was rejected as malformed.
    #[error("invocation rejected: {0}")]
    BadRequest(String),
    /// Endpoint was unreachable.
    #[error("invocation connection failure: {0}")]
    ConnectionFailure(String),
    /// Child did not reply before the read timeout.
    #[error("invocation read timed out after {} ms", .0.as_millis())]
    ReadTimeout(Duration),
    /// Any other failure.
    #[error("invocation failed: {0}")]
    Unknown(String),
}

/// Invokes the running function again as a chained child.
pub trait FunctionInvoker: Send + Sync {
    /// Invokes the child synchronously with `payload`, without retries.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError`] when the invocation does not return.
    fn invoke_child(
        &self,
        payload: &Value,
        timeouts: ChainTimeouts,
    ) -> Result<ChildOutcome, InvokeError>;
}
