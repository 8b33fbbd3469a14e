// crates/resource-relay-core/src/core/outcome.rs
// ============================================================================
// Module: Resource Relay Handler Outcomes
// Description: Closed set of results user logic may return.
// Purpose: Replace runtime type inspection with an explicit sum type.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Handlers return an [`Outcome`]. Anything other than
//! [`Outcome::Envelope`] is coerced by the orchestrator during normalization.
//! [`Outcome::from_value`] is the boundary adapter for handlers that produce
//! loosely typed JSON.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::core::envelope::HandlerResponse;

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Result of user logic.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Fully specified response.
    Envelope(HandlerResponse),
    /// Mapping to report as SUCCESS data.
    RawData(Map<String, Value>),
    /// Text to report as SUCCESS data under the return key.
    RawText(String),
    /// No result (or an explicit `true`); reported as an empty SUCCESS.
    Empty,
    /// Explicit `false`; reported as FAILED.
    Rejected,
    /// Any other value; reported as FAILED citing the description.
    Unsupported(String),
}

impl Outcome {
    /// Maps a JSON value onto the outcome variants.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::RawData(map),
            Value::String(text) => Self::RawText(text),
            Value::Null | Value::Bool(true) => Self::Empty,
            Value::Bool(false) => Self::Rejected,
            Value::Number(_) => Self::Unsupported("number".to_string()),
            Value::Array(_) => Self::Unsupported("array".to_string()),
        }
    }

    /// Returns a short label naming the variant.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Envelope(_) => "envelope",
            Self::RawData(_) => "mapping",
            Self::RawText(_) => "string",
            Self::Empty => "empty",
            Self::Rejected => "false",
            Self::Unsupported(_) => "unsupported",
        }
    }
}

impl From<HandlerResponse> for Outcome {
    fn from(response: HandlerResponse) -> Self {
        Self::Envelope(response)
    }
}

impl From<Map<String, Value>> for Outcome {
    fn from(map: Map<String, Value>) -> Self {
        Self::RawData(map)
    }
}

impl From<String> for Outcome {
    fn from(text: String) -> Self {
        Self::RawText(text)
    }
}

impl From<&str> for Outcome {
    fn from(text: &str) -> Self {
        Self::RawText(text.to_string())
    }
}

impl From<bool> for Outcome {
    fn from(flag: bool) -> Self {
        if flag { Self::Empty } else { Self::Rejected }
    }
}

impl From<()> for Outcome {
    fn from((): ()) -> Self {
        Self::Empty
    }
}
