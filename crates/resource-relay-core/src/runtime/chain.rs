// crates/resource-relay-core/src/runtime/chain.rs
// ============================================================================
// Module: Resource Relay Self-Chaining
// Description: Timeout budgeting for chained child invocations.
// Purpose: Leave enough budget for the parent to report a timeout itself.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! When chaining is enabled the parent invokes itself once and waits for the
//! child. The read timeout is the remaining budget minus a safety threshold,
//! never below a floor.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use crate::interfaces::ChainTimeouts;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default budget reserved for the parent after the child times out.
pub const DEFAULT_SAFETY_THRESHOLD: Duration = Duration::from_millis(500);
/// Default lower bound for the child read timeout.
pub const DEFAULT_MIN_READ_TIMEOUT: Duration = Duration::from_millis(100);
/// Default connect timeout for the child invocation.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

// ============================================================================
// SECTION: Chain Configuration
// ============================================================================

/// Chained invocation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainConfig {
    /// Connect timeout for the child invocation.
    connect_timeout: Duration,
    /// Budget withheld from the child read timeout.
    safety_threshold: Duration,
    /// Floor applied to the child read timeout.
    min_read_timeout: Duration,
}

impl ChainConfig {
    /// Creates a configuration with the default timeouts.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            safety_threshold: DEFAULT_SAFETY_THRESHOLD,
            min_read_timeout: DEFAULT_MIN_READ_TIMEOUT,
        }
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the safety threshold.
    #[must_use]
    pub const fn with_safety_threshold(mut self, threshold: Duration) -> Self {
        self.safety_threshold = threshold;
        self
    }

    /// Sets the read timeout floor.
    #[must_use]
    pub const fn with_min_read_timeout(mut self, timeout: Duration) -> Self {
        self.min_read_timeout = timeout;
        self
    }

    /// Returns the connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the safety threshold.
    #[must_use]
    pub const fn safety_threshold(&self) -> Duration {
        self.safety_threshold
    }

    /// Returns the read timeout floor.
    #[must_use]
    pub const fn min_read_timeout(&self) -> Duration {
        self.min_read_timeout
    }

    /// Computes the child read timeout for the remaining budget.
    #[must_use]
    pub fn read_timeout(&self, remaining: Duration) -> Duration {
        remaining.saturating_sub(self.safety_threshold).max(self.min_read_timeout)
    }

    /// Computes both timeouts for the remaining budget.
    #[must_use]
    pub fn timeouts(&self, remaining: Duration) -> ChainTimeouts {
        ChainTimeouts {
            connect: self.connect_timeout,
            read: self.read_timeout(remaining),
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
