// crates/resource-relay-core/src/lib.rs
// ============================================================================
// Module: Resource Relay Core Library
// Description: Public API surface for the Resource Relay core.
// Purpose: Expose protocol types, interfaces, and the invocation runtime.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Resource Relay core implements the function side of the custom-resource
//! callback protocol: request validation, result normalization, diagnostic
//! redaction, and delivery of exactly one response envelope per request. It
//! is transport-agnostic and integrates through explicit interfaces.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::CallbackTransport;
pub use interfaces::ChainTimeouts;
pub use interfaces::ChildOutcome;
pub use interfaces::DeliveryReceipt;
pub use interfaces::FnHandler;
pub use interfaces::FunctionInvoker;
pub use interfaces::HandlerError;
pub use interfaces::InvokeError;
pub use interfaces::ResourceHandler;
pub use interfaces::TransportError;
pub use runtime::BuildError;
pub use runtime::ChainConfig;
pub use runtime::DeliveryError;
pub use runtime::Diagnostics;
pub use runtime::Exchange;
pub use runtime::GeneratePhysicalId;
pub use runtime::HandleDelete;
pub use runtime::InvocationOutcome;
pub use runtime::InvocationPhase;
pub use runtime::Middleware;
pub use runtime::Orchestrator;
pub use runtime::OrchestratorBuilder;
pub use runtime::OrchestratorConfig;
pub use runtime::OrchestratorError;
pub use runtime::Pipeline;
pub use runtime::RequireProperties;
