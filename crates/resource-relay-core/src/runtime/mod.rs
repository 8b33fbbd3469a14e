// crates/resource-relay-core/src/runtime/mod.rs
// ============================================================================
// Module: Resource Relay Runtime
// Description: Orchestrator, middleware pipeline, chaining, and delivery.
// Purpose: Drive a request from validation to exactly one callback delivery.
// Dependencies: crate::{core, interfaces}, tracing, uuid
// ============================================================================

//! ## Overview
//! Runtime modules implement the invocation state machine. Concrete HTTP
//! transports live in `resource-relay-broker`; the runtime only sees the
//! traits in [`crate::interfaces`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod chain;
pub mod delivery;
pub mod orchestrator;
pub mod pipeline;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use chain::ChainConfig;
pub use chain::DEFAULT_CONNECT_TIMEOUT;
pub use chain::DEFAULT_MIN_READ_TIMEOUT;
pub use chain::DEFAULT_SAFETY_THRESHOLD;
pub use delivery::DeliveryError;
pub use delivery::deliver;
pub use delivery::encode_envelope;
pub use orchestrator::BuildError;
pub use orchestrator::Diagnostics;
pub use orchestrator::HIDDEN_DELETE_FAILURE_REASON;
pub use orchestrator::InvocationOutcome;
pub use orchestrator::InvocationPhase;
pub use orchestrator::Orchestrator;
pub use orchestrator::OrchestratorBuilder;
pub use orchestrator::OrchestratorConfig;
pub use orchestrator::OrchestratorError;
pub use pipeline::Exchange;
pub use pipeline::GeneratePhysicalId;
pub use pipeline::HandleDelete;
pub use pipeline::Middleware;
pub use pipeline::Pipeline;
pub use pipeline::RequireProperties;
