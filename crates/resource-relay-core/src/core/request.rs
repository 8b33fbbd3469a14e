// crates/resource-relay-core/src/core/request.rs
// ============================================================================
// Module: Resource Relay Request Model
// Description: Inbound custom-resource request object and request kinds.
// Purpose: Provide typed, read-only access to validated request fields.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A request object is the JSON mapping the provisioning engine sends once per
//! invocation. [`RequestObject`] wraps a mapping that already passed
//! [`crate::core::validation::validate`]; accessors therefore never fail for
//! required fields.
//! Invariants:
//! - A constructed [`RequestObject`] always satisfies the validator.
//! - Mutations produce new values; the validated input is never edited in place.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::validation::InvalidRequestError;
use crate::core::validation::validate;

// ============================================================================
// SECTION: Field Names
// ============================================================================

/// Operation kind field.
pub const REQUEST_TYPE_FIELD: &str = "RequestType";
/// Callback URL field.
pub const RESPONSE_URL_FIELD: &str = "ResponseURL";
/// Stack identifier field.
pub const STACK_ID_FIELD: &str = "StackId";
/// Request identifier field.
pub const REQUEST_ID_FIELD: &str = "RequestId";
/// Resource type field.
pub const RESOURCE_TYPE_FIELD: &str = "ResourceType";
/// Logical resource identifier field.
pub const LOGICAL_RESOURCE_ID_FIELD: &str = "LogicalResourceId";
/// Physical resource identifier field.
pub const PHYSICAL_RESOURCE_ID_FIELD: &str = "PhysicalResourceId";
/// Current resource properties field.
pub const RESOURCE_PROPERTIES_FIELD: &str = "ResourceProperties";
/// Previous resource properties field (updates only).
pub const OLD_RESOURCE_PROPERTIES_FIELD: &str = "OldResourceProperties";
/// Tag marking a chained child invocation; holds the parent's request id.
pub const PARENT_REQUEST_ID_FIELD: &str = "LambdaParentRequestId";

/// Fields every request must carry.
pub const REQUIRED_FIELDS: [&str; 6] = [
    REQUEST_TYPE_FIELD,
    RESPONSE_URL_FIELD,
    STACK_ID_FIELD,
    REQUEST_ID_FIELD,
    RESOURCE_TYPE_FIELD,
    LOGICAL_RESOURCE_ID_FIELD,
];

// ============================================================================
// SECTION: Request Kinds
// ============================================================================

/// Custom-resource operation kind.
///
/// # Invariants
/// - Wire labels (`Create`, `Update`, `Delete`) are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestType {
    /// Resource creation.
    Create,
    /// Resource update.
    Update,
    /// Resource deletion.
    Delete,
}

impl RequestType {
    /// Returns the stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }

    /// Parses a wire label; returns `None` for unrecognized kinds.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Create" => Some(Self::Create),
            "Update" => Some(Self::Update),
            "Delete" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Returns true when the kind must carry a physical resource id.
    #[must_use]
    pub const fn requires_physical_id(self) -> bool {
        matches!(self, Self::Update | Self::Delete)
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Request Object
// ============================================================================

/// Validated custom-resource request.
///
/// # Invariants
/// - `fields` passed [`validate`] at construction.
/// - `request_type` and `response_url` mirror the corresponding fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestObject {
    /// Raw request mapping.
    fields: Map<String, Value>,
    /// Parsed operation kind.
    request_type: RequestType,
    /// Callback URL copied out of the mapping.
    response_url: String,
}

impl RequestObject {
    /// Validates a JSON value and wraps it as a request.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequestError`] when the value is not a mapping or fails
    /// validation.
    pub fn parse(value: Value) -> Result<Self, InvalidRequestError> {
        match value {
            Value::Object(fields) => Self::from_map(fields),
            _ => Err(InvalidRequestError),
        }
    }

    /// Validates a JSON mapping and wraps it as a request.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequestError`] when validation fails.
    pub fn from_map(mut fields: Map<String, Value>) -> Result<Self, InvalidRequestError> {
        if !validate(&fields) {
            return Err(InvalidRequestError);
        }
        stringify_physical_id(&mut fields);
        let request_type = fields
            .get(REQUEST_TYPE_FIELD)
            .and_then(Value::as_str)
            .and_then(RequestType::from_label)
            .ok_or(InvalidRequestError)?;
        let response_url = fields
            .get(RESPONSE_URL_FIELD)
            .and_then(Value::as_str)
            .ok_or(InvalidRequestError)?
            .to_string();
        Ok(Self {
            fields,
            request_type,
            response_url,
        })
    }

    /// Returns the operation kind.
    #[must_use]
    pub const fn request_type(&self) -> RequestType {
        self.request_type
    }

    /// Returns the callback URL.
    #[must_use]
    pub fn response_url(&self) -> &str {
        &self.response_url
    }

    /// Returns a raw field value.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns a field value when it is a string.
    #[must_use]
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Returns a required field, or `Null` if absent.
    fn required(&self, name: &str) -> Value {
        self.fields.get(name).cloned().unwrap_or(Value::Null)
    }

    /// Returns the stack identifier as sent.
    #[must_use]
    pub fn stack_id(&self) -> Value {
        self.required(STACK_ID_FIELD)
    }

    /// Returns the request identifier as sent.
    #[must_use]
    pub fn request_id(&self) -> Value {
        self.required(REQUEST_ID_FIELD)
    }

    /// Returns the logical resource identifier as sent.
    #[must_use]
    pub fn logical_resource_id(&self) -> Value {
        self.required(LOGICAL_RESOURCE_ID_FIELD)
    }

    /// Returns the resource type when it is a string.
    #[must_use]
    pub fn resource_type(&self) -> Option<&str> {
        self.str_field(RESOURCE_TYPE_FIELD)
    }

    /// Returns the physical resource id when present as a string.
    ///
    /// Numeric and boolean ids are stored in their textual form at
    /// construction; structured or null ids read as absent.
    #[must_use]
    pub fn physical_resource_id(&self) -> Option<&str> {
        self.str_field(PHYSICAL_RESOURCE_ID_FIELD)
    }

    /// Returns true when the request carries any physical resource id field.
    #[must_use]
    pub fn has_physical_resource_id(&self) -> bool {
        self.fields.contains_key(PHYSICAL_RESOURCE_ID_FIELD)
    }

    /// Returns the current resource properties when they form a mapping.
    #[must_use]
    pub fn resource_properties(&self) -> Option<&Map<String, Value>> {
        self.fields.get(RESOURCE_PROPERTIES_FIELD).and_then(Value::as_object)
    }

    /// Returns true when this request is a chained child invocation.
    #[must_use]
    pub fn is_chained_child(&self) -> bool {
        self.fields.contains_key(PARENT_REQUEST_ID_FIELD)
    }

    /// Returns the underlying mapping.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Returns the request as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// Returns a copy carrying the provided physical resource id.
    #[must_use]
    pub fn with_physical_resource_id(&self, id: impl Into<String>) -> Self {
        let mut fields = self.fields.clone();
        fields.insert(PHYSICAL_RESOURCE_ID_FIELD.to_string(), Value::String(id.into()));
        Self {
            fields,
            request_type: self.request_type,
            response_url: self.response_url.clone(),
        }
    }

    /// Builds the chained child payload tagged with the parent request id.
    #[must_use]
    pub fn chained_payload(&self, parent_request_id: &str) -> Value {
        let mut fields = self.fields.clone();
        fields.insert(
            PARENT_REQUEST_ID_FIELD.to_string(),
            Value::String(parent_request_id.to_string()),
        );
        Value::Object(fields)
    }
}

/// Rewrites a scalar physical resource id into its textual form.
fn stringify_physical_id(fields: &mut Map<String, Value>) {
    if let Some(value) = fields.get_mut(PHYSICAL_RESOURCE_ID_FIELD) {
        let text = match value {
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            _ => return,
        };
        *value = Value::String(text);
    }
}
