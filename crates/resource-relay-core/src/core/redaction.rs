// crates/resource-relay-core/src/core/redaction.rs
// ============================================================================
// Module: Resource Relay Redaction
// Description: Rule sets and disclosure policies for sanitizing requests.
// Purpose: Produce log-safe copies of inbound requests.
// Dependencies: regex, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`RedactionRuleSet`] pairs a resource-type pattern with ordered property
//! patterns. A [`RedactionConfig`] collects rule sets under a [`RedactMode`]
//! and derives sanitized request copies. [`StandaloneRedactionConfig`] is the
//! single-rule-set variant pinned to every resource type.
//! Invariants:
//! - Redaction never mutates the input request.
//! - Resource patterns are unique within a config.
//! - Matching rule sets apply cumulatively, in attachment order.
//!
//! Security posture: request properties may carry secrets; only sanitized
//! copies should reach diagnostic logs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use regex::Regex;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::request::OLD_RESOURCE_PROPERTIES_FIELD;
use crate::core::request::RESOURCE_PROPERTIES_FIELD;
use crate::core::request::RESOURCE_TYPE_FIELD;
use crate::core::request::RESPONSE_URL_FIELD;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Replacement written over hidden values.
pub const REDACTED_MARKER: &str = "[REDACTED]";
/// Resource pattern matching every resource type.
pub const CATCH_ALL_RESOURCE_PATTERN: &str = "^.*$";
/// Request fields holding resource properties.
const PROPERTY_FIELDS: [&str; 2] = [RESOURCE_PROPERTIES_FIELD, OLD_RESOURCE_PROPERTIES_FIELD];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Redaction configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RedactionError {
    /// A pattern or property name was rejected.
    #[error("invalid rule argument: {0}")]
    InvalidRuleArgument(String),
    /// A rule set for the resource pattern is already attached.
    #[error("a rule set is already attached for resource pattern {0}")]
    ConflictingRuleSet(String),
    /// Standalone configs hold exactly one rule set.
    #[error("cannot attach a rule set to a standalone redaction config")]
    StandaloneRuleSetLocked,
}

// ============================================================================
// SECTION: Redaction Mode
// ============================================================================

/// Disclosure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactMode {
    /// Hide matched properties; reveal everything else.
    #[default]
    Blocklist,
    /// Reveal matched properties; hide everything else.
    Allowlist,
}

// ============================================================================
// SECTION: Rule Sets
// ============================================================================

/// Resource-type pattern plus the property patterns it governs.
#[derive(Debug, Clone)]
pub struct RedactionRuleSet {
    /// Resource-type pattern.
    resource: Regex,
    /// Ordered property-name patterns.
    properties: Vec<Regex>,
}

impl RedactionRuleSet {
    /// Creates a rule set applying to every resource type.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the catch-all pattern is a valid expression.
    pub fn new() -> Result<Self, RedactionError> {
        Self::for_resource(CATCH_ALL_RESOURCE_PATTERN)
    }

    /// Creates a rule set for resource types matching `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`RedactionError::InvalidRuleArgument`] for invalid expressions.
    pub fn for_resource(pattern: &str) -> Result<Self, RedactionError> {
        Ok(Self {
            resource: compile(pattern)?,
            properties: Vec::new(),
        })
    }

    /// Adds a property-name pattern.
    ///
    /// # Errors
    ///
    /// Returns [`RedactionError::InvalidRuleArgument`] for invalid expressions.
    pub fn property_regex(mut self, pattern: &str) -> Result<Self, RedactionError> {
        self.properties.push(compile(pattern)?);
        Ok(self)
    }

    /// Adds an exact property name (anchored on both ends).
    ///
    /// # Errors
    ///
    /// Returns [`RedactionError::InvalidRuleArgument`] for empty names.
    pub fn property(self, name: &str) -> Result<Self, RedactionError> {
        if name.is_empty() {
            return Err(RedactionError::InvalidRuleArgument(
                "property name must not be empty".to_string(),
            ));
        }
        let anchored = format!("^{}$", regex::escape(name));
        self.property_regex(&anchored)
    }

    /// Returns the resource-type pattern.
    #[must_use]
    pub fn resource_pattern(&self) -> &str {
        self.resource.as_str()
    }

    /// Returns the property patterns in attachment order.
    #[must_use]
    pub fn property_patterns(&self) -> Vec<&str> {
        self.properties.iter().map(Regex::as_str).collect()
    }
}

/// Compiles a pattern, mapping failures to rule argument errors.
fn compile(pattern: &str) -> Result<Regex, RedactionError> {
    Regex::new(pattern).map_err(|err| RedactionError::InvalidRuleArgument(err.to_string()))
}

// ============================================================================
// SECTION: Redactor Trait
// ============================================================================

/// Produces sanitized request copies for diagnostic logging.
pub trait Redactor: Send + Sync {
    /// Returns a sanitized copy of `request`; the input is left untouched.
    fn redact(&self, request: &Map<String, Value>) -> Map<String, Value>;
}

// ============================================================================
// SECTION: Redaction Config
// ============================================================================

/// Disclosure policy plus attached rule sets.
///
/// # Invariants
/// - Resource patterns are unique.
/// - Rule sets keep attachment order.
#[derive(Debug, Clone, Default)]
pub struct RedactionConfig {
    /// Disclosure mode.
    mode: RedactMode,
    /// Whether the callback URL is dropped from sanitized copies.
    redact_response_url: bool,
    /// Attached rule sets.
    rules: Vec<RedactionRuleSet>,
}

impl RedactionConfig {
    /// Creates an empty config.
    #[must_use]
    pub const fn new(mode: RedactMode, redact_response_url: bool) -> Self {
        Self {
            mode,
            redact_response_url,
            rules: Vec::new(),
        }
    }

    /// Attaches a rule set.
    ///
    /// # Errors
    ///
    /// Returns [`RedactionError::ConflictingRuleSet`] when a rule set with the
    /// same resource pattern is already attached.
    pub fn add_rule_set(&mut self, rule_set: RedactionRuleSet) -> Result<(), RedactionError> {
        if self.rules.iter().any(|rule| rule.resource_pattern() == rule_set.resource_pattern()) {
            return Err(RedactionError::ConflictingRuleSet(rule_set.resource_pattern().to_string()));
        }
        self.rules.push(rule_set);
        Ok(())
    }

    /// Attaches a rule set, builder style.
    ///
    /// # Errors
    ///
    /// See [`RedactionConfig::add_rule_set`].
    pub fn with_rule_set(mut self, rule_set: RedactionRuleSet) -> Result<Self, RedactionError> {
        self.add_rule_set(rule_set)?;
        Ok(self)
    }

    /// Returns the disclosure mode.
    #[must_use]
    pub const fn mode(&self) -> RedactMode {
        self.mode
    }

    /// Returns whether the callback URL is removed.
    #[must_use]
    pub const fn redacts_response_url(&self) -> bool {
        self.redact_response_url
    }

    /// Returns the property patterns attached for a resource pattern.
    #[must_use]
    pub fn property_patterns(&self, resource_pattern: &str) -> Option<Vec<&str>> {
        self.rules
            .iter()
            .find(|rule| rule.resource_pattern() == resource_pattern)
            .map(RedactionRuleSet::property_patterns)
    }

    /// Returns a sanitized copy of a JSON request; non-mappings pass through.
    #[must_use]
    pub fn redact_value(&self, request: &Value) -> Value {
        match request {
            Value::Object(map) => Value::Object(self.redact(map)),
            other => other.clone(),
        }
    }
}

impl Redactor for RedactionConfig {
    fn redact(&self, request: &Map<String, Value>) -> Map<String, Value> {
        let mut sanitized = request.clone();
        if self.mode == RedactMode::Allowlist {
            for field in PROPERTY_FIELDS {
                if let Some(slot) = sanitized.get_mut(field) {
                    *slot = if slot.is_object() {
                        Value::Object(Map::new())
                    } else {
                        Value::String(REDACTED_MARKER.to_string())
                    };
                }
            }
        }

        if let Some(resource_type) = request.get(RESOURCE_TYPE_FIELD).and_then(Value::as_str) {
            for rule in self.rules.iter().filter(|rule| rule.resource.is_match(resource_type)) {
                for pattern in &rule.properties {
                    for field in PROPERTY_FIELDS {
                        apply_pattern(self.mode, pattern, field, request, &mut sanitized);
                    }
                }
            }
        }

        if self.mode == RedactMode::Allowlist {
            for field in PROPERTY_FIELDS {
                fill_hidden(field, request, &mut sanitized);
            }
        }

        if self.redact_response_url {
            sanitized.remove(RESPONSE_URL_FIELD);
        }
        sanitized
    }
}

/// Applies one property pattern to one properties block.
fn apply_pattern(
    mode: RedactMode,
    pattern: &Regex,
    field: &str,
    original: &Map<String, Value>,
    sanitized: &mut Map<String, Value>,
) {
    let Some(Value::Object(source)) = original.get(field) else {
        return;
    };
    let Some(Value::Object(target)) = sanitized.get_mut(field) else {
        return;
    };
    for (name, value) in source.iter().filter(|(name, _)| pattern.is_match(name)) {
        let replacement = match mode {
            RedactMode::Blocklist => Value::String(REDACTED_MARKER.to_string()),
            RedactMode::Allowlist => value.clone(),
        };
        target.insert(name.clone(), replacement);
    }
}

/// Marks every original property not yet revealed as redacted.
fn fill_hidden(field: &str, original: &Map<String, Value>, sanitized: &mut Map<String, Value>) {
    let Some(Value::Object(source)) = original.get(field) else {
        return;
    };
    let Some(Value::Object(target)) = sanitized.get_mut(field) else {
        return;
    };
    for name in source.keys() {
        if !target.contains_key(name) {
            target.insert(name.clone(), Value::String(REDACTED_MARKER.to_string()));
        }
    }
}

// ============================================================================
// SECTION: Standalone Config
// ============================================================================

/// Redaction config holding exactly one catch-all rule set.
///
/// # Invariants
/// - The single rule set is pinned to [`CATCH_ALL_RESOURCE_PATTERN`].
/// - No further rule sets can be attached.
#[derive(Debug, Clone)]
pub struct StandaloneRedactionConfig {
    /// Wrapped config with one rule set.
    inner: RedactionConfig,
}

impl StandaloneRedactionConfig {
    /// Creates a standalone config; the rule set's property patterns are
    /// pinned to the catch-all resource pattern.
    ///
    /// # Errors
    ///
    /// Returns [`RedactionError::InvalidRuleArgument`] if the catch-all pattern
    /// cannot be compiled.
    pub fn new(
        rule_set: RedactionRuleSet,
        mode: RedactMode,
        redact_response_url: bool,
    ) -> Result<Self, RedactionError> {
        let pinned = RedactionRuleSet {
            resource: compile(CATCH_ALL_RESOURCE_PATTERN)?,
            properties: rule_set.properties,
        };
        let inner = RedactionConfig::new(mode, redact_response_url).with_rule_set(pinned)?;
        Ok(Self {
            inner,
        })
    }

    /// Always rejects additional rule sets.
    ///
    /// # Errors
    ///
    /// Always returns [`RedactionError::StandaloneRuleSetLocked`].
    pub fn add_rule_set(&mut self, _rule_set: RedactionRuleSet) -> Result<(), RedactionError> {
        Err(RedactionError::StandaloneRuleSetLocked)
    }

    /// Returns the wrapped config for inspection.
    #[must_use]
    pub const fn config(&self) -> &RedactionConfig {
        &self.inner
    }
}

impl Redactor for StandaloneRedactionConfig {
    fn redact(&self, request: &Map<String, Value>) -> Map<String, Value> {
        self.inner.redact(request)
    }
}
