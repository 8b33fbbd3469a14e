// crates/resource-relay-config/src/relay.rs
// ============================================================================
// Module: Relay Assembly
// Description: Builds a ready-to-run orchestrator from configuration.
// Purpose: Wire HTTP transports, middleware, and diagnostics in one call.
// Dependencies: resource-relay-broker, resource-relay-core, thiserror
// ============================================================================

//! ## Overview
//! [`build_orchestrator`] turns a validated [`RelayConfig`] and user logic
//! into an [`Orchestrator`] backed by the HTTP callback transport and, when
//! chaining is enabled, the HTTP function invoker.

// ============================================================================
// SECTION: Imports
// ============================================================================

use resource_relay_broker::BrokerError;
use resource_relay_broker::HttpCallbackTransport;
use resource_relay_broker::HttpFunctionInvoker;
use resource_relay_core::BuildError;
use resource_relay_core::Orchestrator;
use resource_relay_core::ResourceHandler;
use thiserror::Error;

use crate::config::ConfigError;
use crate::config::RelayConfig;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while assembling an orchestrator.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// Configuration was invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A transport backend could not be constructed.
    #[error(transparent)]
    Broker(#[from] BrokerError),
    /// The orchestrator builder rejected the collaborators.
    #[error(transparent)]
    Build(#[from] BuildError),
}

// ============================================================================
// SECTION: Assembly
// ============================================================================

/// Builds an orchestrator for `handler` from `config`.
///
/// # Errors
///
/// Returns [`AssemblyError`] when the config is invalid or a backend cannot be
/// constructed.
pub fn build_orchestrator(
    config: &RelayConfig,
    handler: impl ResourceHandler + 'static,
) -> Result<Orchestrator, AssemblyError> {
    config.validate()?;
    let transport = HttpCallbackTransport::with_timeout(config.delivery_timeout())?;
    let mut builder = Orchestrator::builder()
        .handler(handler)
        .transport(transport)
        .pipeline(config.pipeline())
        .config(config.orchestrator_config())
        .diagnostics(config.diagnostics()?);
    if config.chaining.enabled
        && let Some(endpoint) = config.chaining.endpoint.as_deref()
    {
        builder = builder.invoker(HttpFunctionInvoker::new(endpoint)?);
    }
    let orchestrator = builder.build()?;
    tracing::debug!(
        stages = config.pipeline().len(),
        chaining = config.chaining.enabled,
        "relay orchestrator assembled"
    );
    Ok(orchestrator)
}
