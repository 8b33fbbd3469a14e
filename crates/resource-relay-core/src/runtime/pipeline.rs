// crates/resource-relay-core/src/runtime/pipeline.rs
// ============================================================================
// Module: Resource Relay Middleware Pipeline
// Description: Ordered request middleware run ahead of user logic.
// Purpose: Compose pre-validation and short-circuit behaviors explicitly.
// Dependencies: crate::core, tracing, uuid
// ============================================================================

//! ## Overview
//! A [`Pipeline`] runs [`Middleware`] stages in registration order over an
//! [`Exchange`]. A stage may rewrite the working request or set an outcome;
//! once an outcome is set no later stage runs and user logic is skipped.
//! Invariants:
//! - The validated input request is never mutated; stages act on a copy.
//! - Stage order is registration order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use uuid::Uuid;

use crate::core::ExecutionContext;
use crate::core::HandlerResponse;
use crate::core::Outcome;
use crate::core::RequestObject;
use crate::core::RequestType;

// ============================================================================
// SECTION: Exchange
// ============================================================================

/// Working state threaded through the middleware stages.
#[derive(Debug, Clone)]
pub struct Exchange<'a> {
    /// Working copy of the request.
    pub request: RequestObject,
    /// Execution context, when running on a compute platform.
    pub context: Option<&'a ExecutionContext>,
    /// Outcome set by a short-circuiting stage.
    pub outcome: Option<Outcome>,
}

impl<'a> Exchange<'a> {
    /// Creates an exchange with no outcome.
    #[must_use]
    pub const fn new(request: RequestObject, context: Option<&'a ExecutionContext>) -> Self {
        Self {
            request,
            context,
            outcome: None,
        }
    }

    /// Returns true once a stage has produced an outcome.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.outcome.is_some()
    }
}

// ============================================================================
// SECTION: Middleware
// ============================================================================

/// A single pipeline stage.
pub trait Middleware: Send + Sync {
    /// Returns a stable stage name for logs.
    fn name(&self) -> &'static str;

    /// Processes the exchange.
    fn process<'a>(&self, exchange: Exchange<'a>) -> Exchange<'a>;
}

/// Ordered middleware stages.
#[derive(Default)]
pub struct Pipeline {
    /// Stages in execution order.
    stages: Vec<Box<dyn Middleware>>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage.
    #[must_use]
    pub fn with(mut self, stage: impl Middleware + 'static) -> Self {
        self.push(stage);
        self
    }

    /// Appends a stage in place.
    pub fn push(&mut self, stage: impl Middleware + 'static) {
        self.stages.push(Box::new(stage));
    }

    /// Returns the stage names in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true when no stages are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs the stages until one resolves the exchange.
    #[must_use]
    pub fn run<'a>(&self, mut exchange: Exchange<'a>) -> Exchange<'a> {
        for stage in &self.stages {
            if exchange.is_resolved() {
                break;
            }
            exchange = stage.process(exchange);
            if exchange.is_resolved() {
                tracing::debug!(stage = stage.name(), "middleware resolved the request");
            }
        }
        exchange
    }
}

// ============================================================================
// SECTION: Built-In Stages
// ============================================================================

/// Assigns a random hex id when the request has no physical resource id.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratePhysicalId;

impl Middleware for GeneratePhysicalId {
    fn name(&self) -> &'static str {
        "generate_physical_id"
    }

    fn process<'a>(&self, mut exchange: Exchange<'a>) -> Exchange<'a> {
        if !exchange.request.has_physical_resource_id() {
            let id = Uuid::new_v4().simple().to_string();
            tracing::info!(physical_resource_id = %id, "generated physical resource id");
            exchange.request = exchange.request.with_physical_resource_id(id);
        }
        exchange
    }
}

/// Answers Delete requests with SUCCESS without running user logic.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandleDelete;

impl Middleware for HandleDelete {
    fn name(&self) -> &'static str {
        "handle_delete"
    }

    fn process<'a>(&self, mut exchange: Exchange<'a>) -> Exchange<'a> {
        if exchange.request.request_type() == RequestType::Delete {
            tracing::info!("delete request answered without calling the handler");
            let response = HandlerResponse::success().with_optional_physical_resource_id(
                exchange.request.physical_resource_id().map(str::to_string),
            );
            exchange.outcome = Some(Outcome::Envelope(response));
        }
        exchange
    }
}

/// Fails the request when expected resource properties are absent.
#[derive(Debug, Clone, Default)]
pub struct RequireProperties {
    /// Property names that must be present.
    expected: Vec<String>,
}

impl RequireProperties {
    /// Creates a stage requiring the given property names.
    #[must_use]
    pub fn new<I, S>(expected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            expected: expected.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the expected property names.
    #[must_use]
    pub fn expected(&self) -> &[String] {
        &self.expected
    }
}

impl Middleware for RequireProperties {
    fn name(&self) -> &'static str {
        "require_properties"
    }

    fn process<'a>(&self, mut exchange: Exchange<'a>) -> Exchange<'a> {
        let properties = exchange.request.resource_properties();
        let missing = self
            .expected
            .iter()
            .find(|name| properties.is_none_or(|props| !props.contains_key(name.as_str())));
        if let Some(name) = missing {
            let reason = format!("Property {name} missing, sending failure signal");
            tracing::info!(property = %name, "expected resource property missing");
            let response = HandlerResponse::failed()
                .with_reason(reason)
                .with_optional_physical_resource_id(
                    exchange.request.physical_resource_id().map(str::to_string),
                );
            exchange.outcome = Some(Outcome::Envelope(response));
        }
        exchange
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
