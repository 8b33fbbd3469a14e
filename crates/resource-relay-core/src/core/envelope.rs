// crates/resource-relay-core/src/core/envelope.rs
// ============================================================================
// Module: Resource Relay Response Envelope
// Description: Wire-exact result envelope and its construction rules.
// Purpose: Turn handler results into the single envelope sent to the callback.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`HandlerResponse`] is what user logic (or the orchestrator on its behalf)
//! produces. [`build_envelope`] resolves reasons and the physical resource id
//! against the request and execution context, collapses nested data, and
//! yields the [`ResponseEnvelope`] that goes on the wire.
//! Invariants:
//! - `PhysicalResourceId` is always present in a built envelope.
//! - `Data` is a flat mapping; nested mappings are collapsed to dotted keys.
//! - Serialized envelopes must stay below [`MAX_RESPONSE_BYTES`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::context::ExecutionContext;
use crate::core::request::RequestObject;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Serialized envelopes must be strictly smaller than this many bytes.
pub const MAX_RESPONSE_BYTES: usize = 4096;
/// Data key whose value names a failed operation.
pub const EXCEPTION_THROWN_KEY: &str = "ExceptionThrown";
/// Data key used when a handler returns plain text.
pub const RETURN_KEY: &str = "Return";
/// Reason used for failures that supplied none.
const UNKNOWN_FAILURE_REASON: &str = "Unknown failure occurred";

// ============================================================================
// SECTION: Protocol Errors
// ============================================================================

/// Violations of the response protocol contract.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Every variant is locally recoverable by sending a FAILED envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// No physical resource id could be resolved.
    #[error("no physical resource id was supplied, present in the request, or derivable from a context")]
    NoPhysicalResourceId,
    /// A status label was neither SUCCESS nor FAILED.
    #[error("{0} is not a valid response status")]
    InvalidResponseStatus(String),
    /// Data was supplied but is not a mapping.
    #[error("data provided was not a mapping")]
    DataNotMapping,
    /// Serialized envelope reached the size ceiling.
    #[error("response too long ({actual_bytes} bytes, limit {max_bytes})")]
    ResponseTooLong {
        /// Exclusive byte ceiling.
        max_bytes: usize,
        /// Serialized envelope size in bytes.
        actual_bytes: usize,
    },
}

// ============================================================================
// SECTION: Response Status
// ============================================================================

/// Terminal status reported to the provisioning engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Failed,
}

impl ResponseStatus {
    /// Returns the stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseStatus {
    type Err = ProtocolError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "SUCCESS" => Ok(Self::Success),
            "FAILED" => Ok(Self::Failed),
            other => Err(ProtocolError::InvalidResponseStatus(other.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Handler Response
// ============================================================================

/// Result produced by user logic before envelope construction.
///
/// # Invariants
/// - `data`, when set, is validated as a mapping only in [`build_envelope`].
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    /// Reported status.
    status: ResponseStatus,
    /// Optional human-readable reason.
    reason: Option<String>,
    /// Optional output data.
    data: Option<Value>,
    /// Optional explicit physical resource id.
    physical_resource_id: Option<String>,
    /// Optional flag masking output data in engine consoles.
    no_echo: Option<bool>,
}

impl HandlerResponse {
    /// Creates a response with the given status and nothing else.
    #[must_use]
    pub const fn new(status: ResponseStatus) -> Self {
        Self {
            status,
            reason: None,
            data: None,
            physical_resource_id: None,
            no_echo: None,
        }
    }

    /// Creates an empty SUCCESS response.
    #[must_use]
    pub const fn success() -> Self {
        Self::new(ResponseStatus::Success)
    }

    /// Creates an empty FAILED response.
    #[must_use]
    pub const fn failed() -> Self {
        Self::new(ResponseStatus::Failed)
    }

    /// Sets the reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Sets mapping data.
    #[must_use]
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(Value::Object(data));
        self
    }

    /// Sets arbitrary data; non-mappings are rejected when the envelope is built.
    #[must_use]
    pub fn with_data_value(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets the physical resource id.
    #[must_use]
    pub fn with_physical_resource_id(mut self, id: impl Into<String>) -> Self {
        self.physical_resource_id = Some(id.into());
        self
    }

    /// Sets the physical resource id when one is provided.
    #[must_use]
    pub fn with_optional_physical_resource_id(mut self, id: Option<String>) -> Self {
        self.physical_resource_id = id;
        self
    }

    /// Sets the `NoEcho` flag.
    #[must_use]
    pub const fn with_no_echo(mut self, no_echo: bool) -> Self {
        self.no_echo = Some(no_echo);
        self
    }

    /// Parses a JSON-shaped response (`Status`, `Reason`, `Data`,
    /// `PhysicalResourceId`, `NoEcho`). A missing status means SUCCESS.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidResponseStatus`] when `Status` is not a
    /// recognized label.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, ProtocolError> {
        let status = match map.get("Status") {
            None => ResponseStatus::Success,
            Some(Value::String(label)) => label.parse()?,
            Some(other) => return Err(ProtocolError::InvalidResponseStatus(other.to_string())),
        };
        Ok(Self {
            status,
            reason: map.get("Reason").and_then(Value::as_str).map(str::to_string),
            data: map.get("Data").cloned(),
            physical_resource_id: map
                .get("PhysicalResourceId")
                .and_then(Value::as_str)
                .map(str::to_string),
            no_echo: map.get("NoEcho").and_then(Value::as_bool),
        })
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> ResponseStatus {
        self.status
    }

    /// Returns the reason.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Returns the data.
    #[must_use]
    pub const fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Returns the physical resource id.
    #[must_use]
    pub fn physical_resource_id(&self) -> Option<&str> {
        self.physical_resource_id.as_deref()
    }

    /// Returns the `NoEcho` flag.
    #[must_use]
    pub const fn no_echo(&self) -> Option<bool> {
        self.no_echo
    }
}

impl Default for HandlerResponse {
    fn default() -> Self {
        Self::success()
    }
}

// ============================================================================
// SECTION: Response Envelope
// ============================================================================

/// Wire envelope PUT to the callback URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseEnvelope {
    /// Terminal status.
    pub status: ResponseStatus,
    /// Reason, required by the engine for failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Physical resource id.
    pub physical_resource_id: String,
    /// Stack id echoed from the request.
    pub stack_id: Value,
    /// Request id echoed from the request.
    pub request_id: Value,
    /// Logical resource id echoed from the request.
    pub logical_resource_id: Value,
    /// Flat output data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    /// Output masking flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_echo: Option<bool>,
}

/// Builds the wire envelope for a handler response.
///
/// # Errors
///
/// Returns [`ProtocolError::NoPhysicalResourceId`] when no id resolves and
/// [`ProtocolError::DataNotMapping`] when data is not a mapping.
pub fn build_envelope(
    request: &RequestObject,
    response: &HandlerResponse,
    context: Option<&ExecutionContext>,
) -> Result<ResponseEnvelope, ProtocolError> {
    let physical_resource_id = response
        .physical_resource_id()
        .or_else(|| request.physical_resource_id())
        .or_else(|| context.map(ExecutionContext::log_stream_name))
        .ok_or(ProtocolError::NoPhysicalResourceId)?
        .to_string();

    let data = match response.data() {
        None => None,
        Some(Value::Object(map)) => Some(map),
        Some(_) => return Err(ProtocolError::DataNotMapping),
    };

    let reason = resolve_reason(response.status(), response.reason(), data, context);

    Ok(ResponseEnvelope {
        status: response.status(),
        reason,
        physical_resource_id,
        stack_id: request.stack_id(),
        request_id: request.request_id(),
        logical_resource_id: request.logical_resource_id(),
        data: data.map(collapse_data),
        no_echo: response.no_echo(),
    })
}

/// Derives the envelope reason from status, data, and context.
fn resolve_reason(
    status: ResponseStatus,
    reason: Option<&str>,
    data: Option<&Map<String, Value>>,
    context: Option<&ExecutionContext>,
) -> Option<String> {
    match status {
        ResponseStatus::Failed => {
            let base = reason.map_or_else(
                || {
                    data.and_then(|map| map.get(EXCEPTION_THROWN_KEY)).map_or_else(
                        || UNKNOWN_FAILURE_REASON.to_string(),
                        |thrown| {
                            format!(
                                "There was an exception thrown in execution of '{}'",
                                value_text(thrown)
                            )
                        },
                    )
                },
                str::to_string,
            );
            Some(match context {
                Some(ctx) => format!("{base} -- {}", log_pointer(ctx)),
                None => base,
            })
        }
        ResponseStatus::Success => {
            reason.map(str::to_string).or_else(|| context.map(log_pointer))
        }
    }
}

/// Returns the diagnostic log pointer for a context.
fn log_pointer(context: &ExecutionContext) -> String {
    format!("See the details in the log stream: {}", context.log_stream_name())
}

/// Renders a JSON value as plain text (strings unquoted).
fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// SECTION: Data Collapsing
// ============================================================================

/// Flattens nested mappings into dotted keys.
///
/// Explicit keys always win over keys synthesized from nesting, and empty
/// nested mappings produce no entries.
#[must_use]
pub fn collapse_data(data: &Map<String, Value>) -> Map<String, Value> {
    let mut collapsed = Map::new();
    for (key, value) in data {
        if !value.is_object() {
            collapsed.insert(key.clone(), value.clone());
        }
    }
    for (key, value) in data {
        if let Value::Object(nested) = value {
            for (nested_key, nested_value) in collapse_data(nested) {
                collapsed.entry(format!("{key}.{nested_key}")).or_insert(nested_value);
            }
        }
    }
    collapsed
}
