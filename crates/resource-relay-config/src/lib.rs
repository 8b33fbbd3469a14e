// crates/resource-relay-config/src/lib.rs
// ============================================================================
// Module: Resource Relay Config Library
// Description: Canonical config model, validation, and runtime assembly.
// Purpose: Single source of truth for resource-relay.toml semantics.
// Dependencies: resource-relay-broker, resource-relay-core, serde, toml
// ============================================================================

//! ## Overview
//! `resource-relay-config` defines the configuration model for Resource Relay
//! handlers. It provides strict, fail-closed validation and converts a loaded
//! config into core runtime types or a fully wired orchestrator.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod relay;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use relay::AssemblyError;
pub use relay::build_orchestrator;
