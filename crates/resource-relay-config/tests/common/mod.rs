// crates/resource-relay-config/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared helpers for resource-relay-config tests.
// Purpose: Provide config fixtures written to temporary files.
// Dependencies: resource-relay-config, tempfile
// ============================================================================

//! ## Overview
//! Provides TOML fixtures and temp-file helpers for config tests.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::io::Write;

use resource_relay_config::ConfigError;
use resource_relay_config::RelayConfig;
use tempfile::NamedTempFile;

/// Result type used by config tests.
pub type TestResult = Result<(), String>;

/// A config exercising every section.
pub const FULL_CONFIG: &str = r#"
[handler]
enforce_structured_result = true
hide_delete_failure = true

[resource]
generate_physical_id = true
handle_delete = false
expected_properties = ["BucketName", "Region"]

[chaining]
enabled = true
endpoint = "http://127.0.0.1:9001/invoke"
connect_timeout_ms = 1500
safety_threshold_ms = 750
min_read_timeout_ms = 200

[delivery]
timeout_ms = 5000

[diagnostics]
enabled = true

[redaction]
enabled = true
mode = "blocklist"
redact_response_url = true

[[redaction.rule_sets]]
resource_pattern = "^Custom::Bucket$"
properties = ["Secret"]
property_patterns = ["^Api.*Key$"]
"#;

/// Writes `content` to a temp file.
pub fn write_config(content: &[u8]) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content).map_err(|err| err.to_string())?;
    Ok(file)
}

/// Parses the minimal (empty) config.
pub fn minimal_config() -> Result<RelayConfig, ConfigError> {
    RelayConfig::parse("")
}

/// Asserts that a result is an error whose message contains `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error '{message}' did not contain '{needle}'"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
