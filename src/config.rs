//! Planner configuration.

use serde::{Deserialize, Serialize};

/// Knobs controlling plan synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Skip static mutants instead of running them with a full reload.
    pub ignore_static: bool,
    /// Keep running tests after the first failing one.
    pub disable_bail: bool,
    /// Base timeout granted to every mutant run.
    pub timeout_ms: u64,
    /// Multiplier applied to a mutant's estimated net time.
    pub timeout_factor: f64,
    /// Fixed overhead of spinning up a test environment, measured by
    /// the host and supplied per injection.
    pub time_overhead_ms: u64,
    /// Emit a warning when static mutants dominate estimated run time.
    pub warn_slow: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            ignore_static: false,
            disable_bail: false,
            timeout_ms: 5000,
            timeout_factor: 1.5,
            time_overhead_ms: 0,
            warn_slow: true,
        }
    }
}

impl PlannerConfig {
    /// Set `ignore_static`.
    pub fn with_ignore_static(mut self, ignore_static: bool) -> Self {
        self.ignore_static = ignore_static;
        self
    }

    /// Set `disable_bail`.
    pub fn with_disable_bail(mut self, disable_bail: bool) -> Self {
        self.disable_bail = disable_bail;
        self
    }

    /// Set the base timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the net-time multiplier.
    pub fn with_timeout_factor(mut self, timeout_factor: f64) -> Self {
        self.timeout_factor = timeout_factor;
        self
    }

    /// Set the measured environment overhead.
    pub fn with_time_overhead_ms(mut self, time_overhead_ms: u64) -> Self {
        self.time_overhead_ms = time_overhead_ms;
        self
    }

    /// Set `warn_slow`.
    pub fn with_warn_slow(mut self, warn_slow: bool) -> Self {
        self.warn_slow = warn_slow;
        self
    }
}
