// crates/resource-relay-core/src/runtime/orchestrator.rs
// ============================================================================
// Module: Resource Relay Orchestrator
// Description: Invocation state machine from raw request to delivered envelope.
// Purpose: Guarantee exactly one callback delivery per valid request.
// Dependencies: crate::core, crate::interfaces, crate::runtime, thiserror, tracing, uuid
// ============================================================================

//! ## Overview
//! The [`Orchestrator`] validates the request, optionally hands it to a
//! chained child, runs the middleware pipeline and user logic, normalizes the
//! outcome, applies the delete guard, and delivers the envelope. Protocol
//! violations are rewritten to a FAILED envelope and retried once.
//! Invariants:
//! - Invalid requests fail before any envelope exists; nothing is delivered.
//! - Every valid request yields at most two delivery attempts.
//! - User logic errors and panics never escape; they become FAILED envelopes.
//!
//! Phases: `Received -> Validated -> Chained? -> Executing -> Normalizing ->
//! DeleteGuard -> Delivering -> Done`, with `DeliveryFallback` between
//! `Delivering` and `Done` when the first envelope was malformed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::fmt;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::core::ExecutionContext;
use crate::core::HandlerResponse;
use crate::core::InvalidRequestError;
use crate::core::Outcome;
use crate::core::ProtocolError;
use crate::core::RETURN_KEY;
use crate::core::Redactor;
use crate::core::RequestObject;
use crate::core::RequestType;
use crate::core::ResponseEnvelope;
use crate::core::ResponseStatus;
use crate::core::build_envelope;
use crate::interfaces::CallbackTransport;
use crate::interfaces::ChildOutcome;
use crate::interfaces::FunctionInvoker;
use crate::interfaces::InvokeError;
use crate::interfaces::ResourceHandler;
use crate::runtime::chain::ChainConfig;
use crate::runtime::delivery::DeliveryError;
use crate::runtime::delivery::deliver;
use crate::runtime::pipeline::Exchange;
use crate::runtime::pipeline::Middleware;
use crate::runtime::pipeline::Pipeline;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Reason reported when a failed delete is reported as a success.
pub const HIDDEN_DELETE_FAILURE_REASON: &str = "There may be resources created by this Custom \
                                                Resource that have not been cleaned up despite \
                                                the fact this resource is in DELETE_COMPLETE";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Orchestrator behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Report FAILED unless user logic returns [`Outcome::Envelope`].
    pub enforce_structured_result: bool,
    /// Report failed deletes as SUCCESS.
    pub hide_delete_failure: bool,
    /// Self-chaining settings; `None` disables chaining.
    pub chaining: Option<ChainConfig>,
}

/// Diagnostic request logging capability.
#[derive(Clone, Default)]
pub enum Diagnostics {
    /// Request bodies are not logged.
    #[default]
    Disabled,
    /// Request bodies are logged verbatim.
    Plain,
    /// Request bodies are logged after redaction.
    Redacted(Arc<dyn Redactor>),
}

impl Diagnostics {
    /// Wraps a redactor as a diagnostics capability.
    #[must_use]
    pub fn redacted(redactor: impl Redactor + 'static) -> Self {
        Self::Redacted(Arc::new(redactor))
    }

    /// Returns true when request bodies are logged.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// Returns the request body as it would be logged.
    #[must_use]
    pub fn render(&self, request: &RequestObject) -> Option<Value> {
        match self {
            Self::Disabled => None,
            Self::Plain => Some(request.to_value()),
            Self::Redacted(redactor) => Some(Value::Object(redactor.redact(request.as_map()))),
        }
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("Disabled"),
            Self::Plain => f.write_str("Plain"),
            Self::Redacted(_) => f.write_str("Redacted"),
        }
    }
}

// ============================================================================
// SECTION: Phases and Results
// ============================================================================

/// Invocation state machine phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationPhase {
    /// Raw request accepted.
    Received,
    /// Request passed validation.
    Validated,
    /// Request handed to a chained child.
    Chained,
    /// Middleware and user logic running.
    Executing,
    /// User logic result being coerced into a response.
    Normalizing,
    /// Delete failure hiding being evaluated.
    DeleteGuard,
    /// Envelope being delivered.
    Delivering,
    /// Malformed envelope being replaced by a FAILED one.
    DeliveryFallback,
    /// Invocation finished.
    Done,
}

impl InvocationPhase {
    /// Returns the stable phase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::Chained => "chained",
            Self::Executing => "executing",
            Self::Normalizing => "normalizing",
            Self::DeleteGuard => "delete_guard",
            Self::Delivering => "delivering",
            Self::DeliveryFallback => "delivery_fallback",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for InvocationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of a successful invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationOutcome {
    /// This process delivered the envelope.
    Delivered(ResponseEnvelope),
    /// A chained child handled the request and returned this payload.
    Chained(Value),
}

/// Orchestrator failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    /// Request failed validation; nothing was delivered.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidRequestError),
    /// The fallback envelope also violated the protocol.
    #[error(transparent)]
    Protocol(ProtocolError),
    /// Delivery could not complete.
    #[error(transparent)]
    Delivery(DeliveryError),
}

impl From<DeliveryError> for OrchestratorError {
    fn from(err: DeliveryError) -> Self {
        match err {
            DeliveryError::Protocol(protocol) => Self::Protocol(protocol),
            other => Self::Delivery(other),
        }
    }
}

/// Orchestrator construction failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BuildError {
    /// No resource handler was registered.
    #[error("orchestrator handler is not configured")]
    MissingHandler,
    /// No callback transport was registered.
    #[error("orchestrator callback transport is not configured")]
    MissingTransport,
    /// Chaining is enabled without a function invoker.
    #[error("chaining is enabled but no function invoker is configured")]
    MissingInvoker,
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builder for an [`Orchestrator`].
///
/// # Invariants
/// - `build` succeeds only when a handler and a transport are configured.
/// - Middleware runs in registration order.
#[derive(Default)]
pub struct OrchestratorBuilder {
    /// User logic.
    handler: Option<Arc<dyn ResourceHandler>>,
    /// Callback delivery transport.
    transport: Option<Arc<dyn CallbackTransport>>,
    /// Chained invocation client.
    invoker: Option<Arc<dyn FunctionInvoker>>,
    /// Middleware run ahead of user logic.
    pipeline: Pipeline,
    /// Behavior switches.
    config: OrchestratorConfig,
    /// Request logging capability.
    diagnostics: Diagnostics,
}

impl OrchestratorBuilder {
    /// Registers the user logic.
    #[must_use]
    pub fn handler(mut self, handler: impl ResourceHandler + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Registers the callback transport.
    #[must_use]
    pub fn transport(mut self, transport: impl CallbackTransport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Registers the chained invocation client.
    #[must_use]
    pub fn invoker(mut self, invoker: impl FunctionInvoker + 'static) -> Self {
        self.invoker = Some(Arc::new(invoker));
        self
    }

    /// Appends a middleware stage.
    #[must_use]
    pub fn middleware(mut self, stage: impl Middleware + 'static) -> Self {
        self.pipeline.push(stage);
        self
    }

    /// Replaces the middleware pipeline.
    #[must_use]
    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Sets the behavior switches.
    #[must_use]
    pub const fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the request logging capability.
    #[must_use]
    pub fn diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Builds the orchestrator.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] when a required collaborator is missing.
    pub fn build(self) -> Result<Orchestrator, BuildError> {
        let handler = self.handler.ok_or(BuildError::MissingHandler)?;
        let transport = self.transport.ok_or(BuildError::MissingTransport)?;
        if self.config.chaining.is_some() && self.invoker.is_none() {
            return Err(BuildError::MissingInvoker);
        }
        Ok(Orchestrator {
            handler,
            transport,
            invoker: self.invoker,
            pipeline: self.pipeline,
            config: self.config,
            diagnostics: self.diagnostics,
        })
    }
}

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Drives one request to exactly one delivered envelope.
///
/// # Invariants
/// - Shared collaborators are never mutated by the orchestrator.
pub struct Orchestrator {
    /// User logic.
    handler: Arc<dyn ResourceHandler>,
    /// Callback delivery transport.
    transport: Arc<dyn CallbackTransport>,
    /// Chained invocation client.
    invoker: Option<Arc<dyn FunctionInvoker>>,
    /// Middleware run ahead of user logic.
    pipeline: Pipeline,
    /// Behavior switches.
    config: OrchestratorConfig,
    /// Request logging capability.
    diagnostics: Diagnostics,
}

/// Result of the chaining phase.
enum ChainStep {
    /// Child handled the request.
    Returned(Value),
    /// Parent must report this response.
    Report(HandlerResponse),
}

impl Orchestrator {
    /// Returns a builder for the orchestrator.
    #[must_use]
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    /// Returns the behavior switches.
    #[must_use]
    pub const fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Runs one invocation.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::InvalidRequest`] for invalid requests,
    /// [`OrchestratorError::Protocol`] when the fallback envelope is also
    /// malformed, and [`OrchestratorError::Delivery`] when delivery fails.
    pub fn run(
        &self,
        request: Value,
        context: Option<&ExecutionContext>,
    ) -> Result<InvocationOutcome, OrchestratorError> {
        enter(InvocationPhase::Received);
        tracing::info!("request received, processing");
        let request = RequestObject::parse(request)
            .inspect_err(|err| tracing::error!(error = %err, "rejecting invalid request"))?;
        enter(InvocationPhase::Validated);
        self.log_request(&request);

        match self.chain(&request, context) {
            Some(ChainStep::Returned(payload)) => {
                enter(InvocationPhase::Done);
                return Ok(InvocationOutcome::Chained(payload));
            }
            Some(ChainStep::Report(response)) => {
                return self.respond(&request, &response, context);
            }
            None => {}
        }

        let (request, response) = self.execute(request, context);
        let response = self.guard_delete(&request, response);
        self.respond(&request, &response, context)
    }

    /// Emits the diagnostic request dump when enabled.
    fn log_request(&self, request: &RequestObject) {
        if let Some(body) = self.diagnostics.render(request) {
            tracing::debug!(request = %body, "request body");
        }
    }

    // ------------------------------------------------------------------------
    // Chaining
    // ------------------------------------------------------------------------

    /// Hands the request to a chained child when chaining applies.
    fn chain(
        &self,
        request: &RequestObject,
        context: Option<&ExecutionContext>,
    ) -> Option<ChainStep> {
        let config = self.config.chaining.as_ref()?;
        let invoker = self.invoker.as_deref()?;
        let context = context?;
        if request.is_chained_child() {
            return None;
        }
        enter(InvocationPhase::Chained);
        let timeouts = config.timeouts(context.remaining_time());
        let payload = request.chained_payload(context.request_id());
        tracing::debug!(
            read_timeout_ms = timeouts.read.as_millis(),
            connect_timeout_ms = timeouts.connect.as_millis(),
            "invoking chained child"
        );
        match invoker.invoke_child(&payload, timeouts) {
            Ok(ChildOutcome::Completed(returned)) => {
                tracing::info!("chained child completed the request");
                Some(ChainStep::Returned(returned))
            }
            Ok(ChildOutcome::FunctionError(message)) => {
                tracing::error!(error = %message, "chained child failed");
                Some(ChainStep::Report(HandlerResponse::failed().with_reason(message)))
            }
            Err(InvokeError::ReadTimeout(after)) => {
                let reason = format!(
                    "Function {} timed out after waiting {} ms for the chained invocation",
                    self.handler.name(),
                    after.as_millis()
                );
                tracing::error!(reason = %reason, "chained child timed out");
                Some(ChainStep::Report(HandlerResponse::failed().with_reason(reason)))
            }
            Err(
                err @ (InvokeError::PermissionDenied(_)
                | InvokeError::Throttled(_)
                | InvokeError::BadRequest(_)
                | InvokeError::ConnectionFailure(_)
                | InvokeError::Unknown(_)),
            ) => {
                tracing::warn!(error = %err, "chained invocation unavailable, running locally");
                None
            }
        }
    }

    // ------------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------------

    /// Runs middleware and user logic, returning the working request and response.
    fn execute(
        &self,
        request: RequestObject,
        context: Option<&ExecutionContext>,
    ) -> (RequestObject, HandlerResponse) {
        enter(InvocationPhase::Executing);
        let Exchange {
            request,
            outcome,
            ..
        } = self.pipeline.run(Exchange::new(request, context));
        let outcome = match outcome {
            Some(outcome) => Ok(outcome),
            None => self.invoke_handler(&request, context),
        };
        let response = match outcome {
            Ok(outcome) => self.normalize(outcome, context),
            Err(response) => response,
        };
        (request, response)
    }

    /// Calls user logic, converting errors and panics into FAILED responses.
    fn invoke_handler(
        &self,
        request: &RequestObject,
        context: Option<&ExecutionContext>,
    ) -> Result<Outcome, HandlerResponse> {
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.handler.handle(request, context)));
        let text = match result {
            Ok(Ok(outcome)) => return Ok(outcome),
            Ok(Err(err)) => err.to_string(),
            Err(payload) => panic_text(payload.as_ref()),
        };
        let reason = format!("Function {} failed due to exception \"{text}\"", self.handler.name());
        tracing::error!(reason = %reason, "handler failed");
        let physical_id = (context.is_none() && request.physical_resource_id().is_none())
            .then(generate_physical_id);
        Err(HandlerResponse::failed().with_reason(reason).with_optional_physical_resource_id(physical_id))
    }

    /// Coerces a user logic outcome into a response.
    fn normalize(&self, outcome: Outcome, context: Option<&ExecutionContext>) -> HandlerResponse {
        enter(InvocationPhase::Normalizing);
        let kind = outcome.kind();
        let response = match outcome {
            Outcome::Envelope(response) => return response,
            _ if context.is_none() => HandlerResponse::failed().with_reason(format!(
                "Result of kind {kind} was not a structured response and there is no execution \
                 context"
            )),
            _ if self.config.enforce_structured_result => {
                HandlerResponse::failed().with_reason(format!(
                    "Result of kind {kind} was not a structured response and structured results \
                     are enforced"
                ))
            }
            Outcome::Rejected => {
                let reason = format!("Function {} returned False.", self.handler.name());
                tracing::debug!(reason = %reason, "handler rejected the request");
                return HandlerResponse::failed().with_reason(reason);
            }
            Outcome::RawData(data) => return HandlerResponse::success().with_data(data),
            Outcome::RawText(text) => {
                let mut data = Map::new();
                data.insert(RETURN_KEY.to_string(), Value::String(text));
                return HandlerResponse::success().with_data(data);
            }
            Outcome::Empty => return HandlerResponse::success(),
            Outcome::Unsupported(description) => HandlerResponse::failed().with_reason(format!(
                "Return value from Function {} is of unsupported type {description}",
                self.handler.name()
            )),
        };
        if let Some(reason) = response.reason() {
            tracing::error!(reason = %reason, "handler result rejected");
        }
        response
    }

    /// Reports failed deletes as SUCCESS when configured.
    fn guard_delete(&self, request: &RequestObject, response: HandlerResponse) -> HandlerResponse {
        enter(InvocationPhase::DeleteGuard);
        if !self.config.hide_delete_failure
            || request.request_type() != RequestType::Delete
            || response.status() != ResponseStatus::Failed
        {
            return response;
        }
        tracing::warn!(
            reason = response.reason().unwrap_or_default(),
            physical_resource_id = response.physical_resource_id().unwrap_or_default(),
            "hiding resource delete failure"
        );
        HandlerResponse::success()
            .with_reason(HIDDEN_DELETE_FAILURE_REASON)
            .with_optional_physical_resource_id(response.physical_resource_id().map(str::to_string))
    }

    // ------------------------------------------------------------------------
    // Delivery
    // ------------------------------------------------------------------------

    /// Delivers the response, falling back to a FAILED envelope once.
    fn respond(
        &self,
        request: &RequestObject,
        response: &HandlerResponse,
        context: Option<&ExecutionContext>,
    ) -> Result<InvocationOutcome, OrchestratorError> {
        enter(InvocationPhase::Delivering);
        let envelope = match self.send(request, response, context) {
            Ok(envelope) => envelope,
            Err(DeliveryError::Protocol(err)) => {
                enter(InvocationPhase::DeliveryFallback);
                tracing::error!(error = %err, "malformed response, sending failure instead");
                let physical_id = response.physical_resource_id().map(str::to_string).or_else(|| {
                    (request.physical_resource_id().is_none() && context.is_none())
                        .then(generate_physical_id)
                });
                let fallback = HandlerResponse::failed()
                    .with_reason(format!("Malformed request, Exception: {err}"))
                    .with_optional_physical_resource_id(physical_id);
                self.send(request, &fallback, context)?
            }
            Err(err) => return Err(err.into()),
        };
        enter(InvocationPhase::Done);
        Ok(InvocationOutcome::Delivered(envelope))
    }

    /// Builds and delivers one envelope.
    fn send(
        &self,
        request: &RequestObject,
        response: &HandlerResponse,
        context: Option<&ExecutionContext>,
    ) -> Result<ResponseEnvelope, DeliveryError> {
        let envelope = build_envelope(request, response, context)?;
        deliver(envelope, request.response_url(), self.transport.as_ref())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Logs a phase transition.
fn enter(phase: InvocationPhase) {
    tracing::debug!(phase = phase.as_str(), "invocation phase");
}

/// Returns a fresh hex physical resource id.
fn generate_physical_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Extracts a message from a panic payload.
fn panic_text(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".to_string())
}
