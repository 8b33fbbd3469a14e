// crates/resource-relay-core/src/core/mod.rs
// ============================================================================
// Module: Resource Relay Core Types
// Description: Request, envelope, outcome, redaction, and context types.
// Purpose: Provide the canonical protocol types shared by every crate.
// Dependencies: regex, serde, serde_json, url
// ============================================================================

//! ## Overview
//! Core types define the custom-resource request, the response envelope, the
//! handler outcome sum type, and redaction policy. Runtime and transport
//! crates build on these types rather than raw JSON.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod context;
pub mod envelope;
pub mod outcome;
pub mod redaction;
pub mod request;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use context::ExecutionContext;
pub use envelope::EXCEPTION_THROWN_KEY;
pub use envelope::HandlerResponse;
pub use envelope::MAX_RESPONSE_BYTES;
pub use envelope::ProtocolError;
pub use envelope::RETURN_KEY;
pub use envelope::ResponseEnvelope;
pub use envelope::ResponseStatus;
pub use envelope::build_envelope;
pub use envelope::collapse_data;
pub use outcome::Outcome;
pub use redaction::CATCH_ALL_RESOURCE_PATTERN;
pub use redaction::REDACTED_MARKER;
pub use redaction::RedactMode;
pub use redaction::RedactionConfig;
pub use redaction::RedactionError;
pub use redaction::RedactionRuleSet;
pub use redaction::Redactor;
pub use redaction::StandaloneRedactionConfig;
pub use request::PARENT_REQUEST_ID_FIELD;
pub use request::RequestObject;
pub use request::RequestType;
pub use validation::InvalidRequestError;
pub use validation::validate;
pub use validation::validate_value;
