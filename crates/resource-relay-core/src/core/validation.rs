// crates/resource-relay-core/src/core/validation.rs
// ============================================================================
// Module: Resource Relay Request Validation
// Description: Schema checks for inbound custom-resource requests.
// Purpose: Gate every invocation on a well-formed request object.
// Dependencies: serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! [`validate`] checks, in order: required top-level fields, a recognized
//! request kind, an `http`/`https` callback URL, and a physical resource id for
//! updates and deletes. It stops at the first failing check and reports only a
//! boolean.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::core::request::PHYSICAL_RESOURCE_ID_FIELD;
use crate::core::request::REQUEST_TYPE_FIELD;
use crate::core::request::REQUIRED_FIELDS;
use crate::core::request::RESPONSE_URL_FIELD;
use crate::core::request::RequestType;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Raised when a value is not a valid request object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("not a valid request object")]
pub struct InvalidRequestError;

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Returns true when the mapping is a well-formed request object.
#[must_use]
pub fn validate(request: &Map<String, Value>) -> bool {
    if REQUIRED_FIELDS.iter().any(|field| !request.contains_key(*field)) {
        return false;
    }
    let Some(request_type) =
        request.get(REQUEST_TYPE_FIELD).and_then(Value::as_str).and_then(RequestType::from_label)
    else {
        return false;
    };
    let Some(url) = request.get(RESPONSE_URL_FIELD).and_then(Value::as_str) else {
        return false;
    };
    if !is_http_url(url) {
        return false;
    }
    !(request_type.requires_physical_id() && !request.contains_key(PHYSICAL_RESOURCE_ID_FIELD))
}

/// Returns true when the JSON value is a mapping that passes [`validate`].
#[must_use]
pub fn validate_value(request: &Value) -> bool {
    request.as_object().is_some_and(validate)
}

/// Returns true when the string parses as an `http` or `https` URL.
fn is_http_url(raw: &str) -> bool {
    Url::parse(raw).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}
