// crates/resource-relay-config/src/config.rs
// ============================================================================
// Module: Resource Relay Configuration
// Description: Configuration loading and validation for relay handlers.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: resource-relay-broker, resource-relay-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits
//! and converted into core runtime types. Missing or invalid configuration
//! fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use resource_relay_broker::HttpFunctionInvoker;
use resource_relay_core::CATCH_ALL_RESOURCE_PATTERN;
use resource_relay_core::ChainConfig;
use resource_relay_core::Diagnostics;
use resource_relay_core::GeneratePhysicalId;
use resource_relay_core::HandleDelete;
use resource_relay_core::OrchestratorConfig;
use resource_relay_core::Pipeline;
use resource_relay_core::RedactMode;
use resource_relay_core::RedactionConfig;
use resource_relay_core::RedactionRuleSet;
use resource_relay_core::Redactor;
use resource_relay_core::RequireProperties;
use resource_relay_core::StandaloneRedactionConfig;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "resource-relay.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "RESOURCE_RELAY_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of expected properties.
pub(crate) const MAX_EXPECTED_PROPERTIES: usize = 128;
/// Maximum number of redaction rule sets.
pub(crate) const MAX_RULE_SETS: usize = 64;
/// Maximum number of property rules in one rule set.
pub(crate) const MAX_RULE_PROPERTIES: usize = 128;
/// Maximum length of a chaining endpoint URL.
pub(crate) const MAX_ENDPOINT_LENGTH: usize = 2048;
/// Default chained invocation connect timeout in milliseconds.
pub(crate) const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2_000;
/// Minimum chained invocation connect timeout in milliseconds.
pub(crate) const MIN_CONNECT_TIMEOUT_MS: u64 = 100;
/// Maximum chained invocation connect timeout in milliseconds.
pub(crate) const MAX_CONNECT_TIMEOUT_MS: u64 = 10_000;
/// Default safety threshold in milliseconds.
pub(crate) const DEFAULT_SAFETY_THRESHOLD_MS: u64 = 500;
/// Maximum safety threshold in milliseconds.
pub(crate) const MAX_SAFETY_THRESHOLD_MS: u64 = 60_000;
/// Default read timeout floor in milliseconds.
pub(crate) const DEFAULT_MIN_READ_TIMEOUT_MS: u64 = 100;
/// Minimum read timeout floor in milliseconds.
pub(crate) const MIN_MIN_READ_TIMEOUT_MS: u64 = 1;
/// Maximum read timeout floor in milliseconds.
pub(crate) const MAX_MIN_READ_TIMEOUT_MS: u64 = 60_000;
/// Default callback delivery timeout in milliseconds.
pub(crate) const DEFAULT_DELIVERY_TIMEOUT_MS: u64 = 30_000;
/// Minimum callback delivery timeout in milliseconds.
pub(crate) const MIN_DELIVERY_TIMEOUT_MS: u64 = 100;
/// Maximum callback delivery timeout in milliseconds.
pub(crate) const MAX_DELIVERY_TIMEOUT_MS: u64 = 300_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Resource Relay configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayConfig {
    /// Result handling switches.
    #[serde(default)]
    pub handler: HandlerConfig,
    /// Resource middleware settings.
    #[serde(default)]
    pub resource: ResourceConfig,
    /// Self-chaining settings.
    #[serde(default)]
    pub chaining: ChainingConfig,
    /// Callback delivery settings.
    #[serde(default)]
    pub delivery: DeliveryConfig,
    /// Diagnostic request logging.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    /// Redaction applied to diagnostic request logs.
    #[serde(default)]
    pub redaction: RedactionSettings,
}

impl RelayConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit `path`, then `RESOURCE_RELAY_CONFIG`, then
    /// `resource-relay.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config = Self::parse(content)?;
        tracing::info!(path = %resolved.display(), "relay config loaded");
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resource.validate()?;
        self.chaining.validate()?;
        self.delivery.validate()?;
        self.redaction.validate()?;
        Ok(())
    }

    /// Returns the orchestrator behavior switches.
    #[must_use]
    pub const fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            enforce_structured_result: self.handler.enforce_structured_result,
            hide_delete_failure: self.handler.hide_delete_failure,
            chaining: self.chain_config(),
        }
    }

    /// Returns the chaining settings, or `None` when chaining is disabled.
    #[must_use]
    pub const fn chain_config(&self) -> Option<ChainConfig> {
        if !self.chaining.enabled {
            return None;
        }
        Some(
            ChainConfig::new()
                .with_connect_timeout(Duration::from_millis(self.chaining.connect_timeout_ms))
                .with_safety_threshold(Duration::from_millis(self.chaining.safety_threshold_ms))
                .with_min_read_timeout(Duration::from_millis(self.chaining.min_read_timeout_ms)),
        )
    }

    /// Builds the resource middleware pipeline.
    ///
    /// Stage order is physical id generation, delete short-circuit, then the
    /// expected property check.
    #[must_use]
    pub fn pipeline(&self) -> Pipeline {
        let mut pipeline = Pipeline::new();
        if self.resource.generate_physical_id {
            pipeline.push(GeneratePhysicalId);
        }
        if self.resource.handle_delete {
            pipeline.push(HandleDelete);
        }
        if !self.resource.expected_properties.is_empty() {
            pipeline.push(RequireProperties::new(self.resource.expected_properties.iter().cloned()));
        }
        pipeline
    }

    /// Returns the callback delivery timeout.
    #[must_use]
    pub const fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery.timeout_ms)
    }

    /// Builds the diagnostics capability.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when redaction rules cannot be built.
    pub fn diagnostics(&self) -> Result<Diagnostics, ConfigError> {
        if !self.diagnostics.enabled {
            return Ok(Diagnostics::Disabled);
        }
        match self.redaction.build()? {
            Some(redactor) => Ok(Diagnostics::Redacted(redactor)),
            None => Ok(Diagnostics::Plain),
        }
    }
}

/// Result handling switches.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HandlerConfig {
    /// Report FAILED unless user logic returns a structured response.
    #[serde(default)]
    pub enforce_structured_result: bool,
    /// Report failed deletes as SUCCESS.
    #[serde(default)]
    pub hide_delete_failure: bool,
}

/// Resource middleware settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    /// Generate a physical id when the request carries none.
    #[serde(default = "default_true")]
    pub generate_physical_id: bool,
    /// Short-circuit Delete requests with SUCCESS.
    #[serde(default)]
    pub handle_delete: bool,
    /// Property names every request must carry.
    #[serde(default)]
    pub expected_properties: Vec<String>,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            generate_physical_id: true,
            handle_delete: false,
            expected_properties: Vec::new(),
        }
    }
}

impl ResourceConfig {
    /// Validates expected property names.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.expected_properties.len() > MAX_EXPECTED_PROPERTIES {
            return Err(ConfigError::Invalid(format!(
                "resource.expected_properties exceeds {MAX_EXPECTED_PROPERTIES} entries"
            )));
        }
        if self.expected_properties.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "resource.expected_properties entries must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Self-chaining settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainingConfig {
    /// Enables chained invocation.
    #[serde(default)]
    pub enabled: bool,
    /// Invoke endpoint for the running function.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Time reserved for the parent to report in milliseconds.
    #[serde(default = "default_safety_threshold_ms")]
    pub safety_threshold_ms: u64,
    /// Read timeout floor in milliseconds.
    #[serde(default = "default_min_read_timeout_ms")]
    pub min_read_timeout_ms: u64,
}

impl Default for ChainingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            safety_threshold_ms: DEFAULT_SAFETY_THRESHOLD_MS,
            min_read_timeout_ms: DEFAULT_MIN_READ_TIMEOUT_MS,
        }
    }
}

impl ChainingConfig {
    /// Validates chaining timeouts and the endpoint.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_range(
            "chaining.connect_timeout_ms",
            self.connect_timeout_ms,
            MIN_CONNECT_TIMEOUT_MS,
            MAX_CONNECT_TIMEOUT_MS,
        )?;
        validate_range(
            "chaining.safety_threshold_ms",
            self.safety_threshold_ms,
            0,
            MAX_SAFETY_THRESHOLD_MS,
        )?;
        validate_range(
            "chaining.min_read_timeout_ms",
            self.min_read_timeout_ms,
            MIN_MIN_READ_TIMEOUT_MS,
            MAX_MIN_READ_TIMEOUT_MS,
        )?;
        if let Some(endpoint) = &self.endpoint {
            if endpoint.len() > MAX_ENDPOINT_LENGTH {
                return Err(ConfigError::Invalid(
                    "chaining.endpoint exceeds max length".to_string(),
                ));
            }
            HttpFunctionInvoker::new(endpoint)
                .map_err(|err| ConfigError::Invalid(format!("chaining.endpoint: {err}")))?;
        } else if self.enabled {
            return Err(ConfigError::Invalid("chaining requires an endpoint".to_string()));
        }
        Ok(())
    }
}

/// Callback delivery settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    /// End-to-end PUT timeout in milliseconds.
    #[serde(default = "default_delivery_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_DELIVERY_TIMEOUT_MS,
        }
    }
}

impl DeliveryConfig {
    /// Validates the delivery timeout.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_range(
            "delivery.timeout_ms",
            self.timeout_ms,
            MIN_DELIVERY_TIMEOUT_MS,
            MAX_DELIVERY_TIMEOUT_MS,
        )
    }
}

/// Diagnostic request logging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiagnosticsConfig {
    /// Log incoming requests at debug level.
    #[serde(default)]
    pub enabled: bool,
}

/// Redaction applied to diagnostic request logs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedactionSettings {
    /// Applies redaction to diagnostic request logs.
    #[serde(default)]
    pub enabled: bool,
    /// Disclosure policy.
    #[serde(default)]
    pub mode: RedactMode,
    /// Masks the callback URL in logged requests.
    #[serde(default)]
    pub redact_response_url: bool,
    /// Builds a single catch-all rule set that cannot be extended.
    #[serde(default)]
    pub standalone: bool,
    /// Rule sets keyed by resource-type pattern.
    #[serde(default)]
    pub rule_sets: Vec<RuleSetConfig>,
}

impl RedactionSettings {
    /// Validates rule set bounds and compiles every rule.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.rule_sets.len() > MAX_RULE_SETS {
            return Err(ConfigError::Invalid(format!(
                "redaction.rule_sets exceeds {MAX_RULE_SETS} entries"
            )));
        }
        for rule_set in &self.rule_sets {
            rule_set.validate()?;
        }
        if self.standalone {
            let [rule_set] = self.rule_sets.as_slice() else {
                return Err(ConfigError::Invalid(
                    "standalone redaction requires exactly one rule set".to_string(),
                ));
            };
            if rule_set.resource_pattern.is_some() {
                return Err(ConfigError::Invalid(
                    "standalone redaction rule sets apply to every resource type".to_string(),
                ));
            }
        }
        if self.standalone {
            self.standalone_config()?;
        } else {
            self.redaction_config()?;
        }
        Ok(())
    }

    /// Builds the configured redactor, or `None` when redaction is disabled.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a rule cannot be compiled or attached.
    pub fn build(&self) -> Result<Option<Arc<dyn Redactor>>, ConfigError> {
        if !self.enabled {
            return Ok(None);
        }
        let redactor: Arc<dyn Redactor> = if self.standalone {
            Arc::new(self.standalone_config()?)
        } else {
            Arc::new(self.redaction_config()?)
        };
        Ok(Some(redactor))
    }

    /// Builds a multi-rule-set redaction config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a rule cannot be compiled or two rule sets
    /// share a resource pattern.
    pub fn redaction_config(&self) -> Result<RedactionConfig, ConfigError> {
        let mut config = RedactionConfig::new(self.mode, self.redact_response_url);
        for rule_set in &self.rule_sets {
            config.add_rule_set(rule_set.build()?).map_err(redaction_error)?;
        }
        Ok(config)
    }

    /// Builds a standalone redaction config from the single rule set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the rule set is missing or invalid.
    pub fn standalone_config(&self) -> Result<StandaloneRedactionConfig, ConfigError> {
        let [rule_set] = self.rule_sets.as_slice() else {
            return Err(ConfigError::Invalid(
                "standalone redaction requires exactly one rule set".to_string(),
            ));
        };
        StandaloneRedactionConfig::new(rule_set.build()?, self.mode, self.redact_response_url)
            .map_err(redaction_error)
    }
}

/// One redaction rule set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleSetConfig {
    /// Resource-type pattern; omitted means every resource type.
    #[serde(default)]
    pub resource_pattern: Option<String>,
    /// Exact property names.
    #[serde(default)]
    pub properties: Vec<String>,
    /// Property-name regular expressions.
    #[serde(default)]
    pub property_patterns: Vec<String>,
}

impl RuleSetConfig {
    /// Validates rule counts.
    fn validate(&self) -> Result<(), ConfigError> {
        let total = self.properties.len() + self.property_patterns.len();
        if total > MAX_RULE_PROPERTIES {
            return Err(ConfigError::Invalid(format!(
                "redaction rule set exceeds {MAX_RULE_PROPERTIES} property rules"
            )));
        }
        Ok(())
    }

    /// Compiles the rule set.
    fn build(&self) -> Result<RedactionRuleSet, ConfigError> {
        let pattern = self.resource_pattern.as_deref().unwrap_or(CATCH_ALL_RESOURCE_PATTERN);
        let mut rule_set = RedactionRuleSet::for_resource(pattern).map_err(redaction_error)?;
        for name in &self.properties {
            rule_set = rule_set.property(name).map_err(redaction_error)?;
        }
        for pattern in &self.property_patterns {
            rule_set = rule_set.property_regex(pattern).map_err(redaction_error)?;
        }
        Ok(rule_set)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates an inclusive millisecond range.
fn validate_range(field: &str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::Invalid(format!("{field} must be between {min} and {max}")));
    }
    Ok(())
}

/// Maps redaction rule failures onto config errors.
fn redaction_error(err: resource_relay_core::RedactionError) -> ConfigError {
    ConfigError::Invalid(format!("redaction: {err}"))
}

/// Serde default for enabled-by-default switches.
const fn default_true() -> bool {
    true
}

/// Serde default for the chained connect timeout.
const fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

/// Serde default for the safety threshold.
const fn default_safety_threshold_ms() -> u64 {
    DEFAULT_SAFETY_THRESHOLD_MS
}

/// Serde default for the read timeout floor.
const fn default_min_read_timeout_ms() -> u64 {
    DEFAULT_MIN_READ_TIMEOUT_MS
}

/// Serde default for the delivery timeout.
const fn default_delivery_timeout_ms() -> u64 {
    DEFAULT_DELIVERY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Tests
// ============================================================================
