//! Scheduler configuration.

use std::time::Duration;

use tracing::warn;

use crate::error::{Result, RuntimeError};

/// Environment variable overriding the tick period, in seconds.
pub const TICK_SECS_ENV: &str = "DOTOI_TICK_SECS";

/// Environment variable overriding the shutdown timeout, in seconds.
pub const SHUTDOWN_TIMEOUT_SECS_ENV: &str = "DOTOI_SHUTDOWN_TIMEOUT_SECS";

/// Configuration for the maintenance scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Fixed period between ticks.
    pub period: Duration,
    /// How long shutdown waits for a running tick before cancelling it.
    pub shutdown_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(60),
            shutdown_timeout: Duration::from_secs(10),
        }
    }
}

impl SchedulerConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `DOTOI_TICK_SECS` and
    /// `DOTOI_SHUTDOWN_TIMEOUT_SECS` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the env keys.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(secs) = parse_secs(&lookup, TICK_SECS_ENV) {
            config.period = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_secs(&lookup, SHUTDOWN_TIMEOUT_SECS_ENV) {
            config.shutdown_timeout = Duration::from_secs(secs);
        }

        config
    }

    /// Sets the tick period.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Sets the shutdown timeout.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Rejects a zero period.
    pub fn validate(&self) -> Result<()> {
        if self.period.is_zero() {
            return Err(RuntimeError::InvalidConfig(
                "scheduler period must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(secs) => Some(secs),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "ignoring invalid duration override");
            None
        }
    }
}
