// crates/resource-relay-core/src/core/context.rs
// ============================================================================
// Module: Resource Relay Execution Context
// Description: Per-invocation metadata supplied by the compute platform.
// Purpose: Expose the remaining time budget and diagnostic log location.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`ExecutionContext`] carries the platform-provided facts the orchestrator
//! needs: the function identity, the log stream used as a diagnostic pointer
//! and fallback physical id, the invocation request id, and the deadline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;
use std::time::Instant;

// ============================================================================
// SECTION: Execution Context
// ============================================================================

/// Compute-platform metadata for a single invocation.
///
/// # Invariants
/// - `deadline` is fixed at construction; remaining time only decreases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Name of the running function.
    function_name: String,
    /// Log stream receiving this invocation's diagnostics.
    log_stream_name: String,
    /// Platform request id for this invocation.
    request_id: String,
    /// Instant at which the platform terminates the invocation.
    deadline: Instant,
}

impl ExecutionContext {
    /// Creates a context whose deadline is `remaining` from now.
    #[must_use]
    pub fn new(
        function_name: impl Into<String>,
        log_stream_name: impl Into<String>,
        request_id: impl Into<String>,
        remaining: Duration,
    ) -> Self {
        Self::with_deadline(function_name, log_stream_name, request_id, Instant::now() + remaining)
    }

    /// Creates a context with an explicit deadline.
    #[must_use]
    pub fn with_deadline(
        function_name: impl Into<String>,
        log_stream_name: impl Into<String>,
        request_id: impl Into<String>,
        deadline: Instant,
    ) -> Self {
        Self {
            function_name: function_name.into(),
            log_stream_name: log_stream_name.into(),
            request_id: request_id.into(),
            deadline,
        }
    }

    /// Returns the function name.
    #[must_use]
    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Returns the log stream name.
    #[must_use]
    pub fn log_stream_name(&self) -> &str {
        &self.log_stream_name
    }

    /// Returns the platform request id.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the time left before the deadline (zero once passed).
    #[must_use]
    pub fn remaining_time(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}
