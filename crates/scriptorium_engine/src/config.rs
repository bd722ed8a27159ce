//! Scheduler configuration.

use scriptorium_error::ConfigError;
use serde::{Deserialize, Serialize};

/// Limits for standalone jobs and the progress channel.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into), default)]
pub struct SchedulerConfig {
    /// Standalone jobs allowed to run at once
    #[serde(default = "default_max_concurrent")]
    max_concurrent: usize,

    /// Amount adaptive batches widen or narrow by per finished job
    #[serde(default = "default_adaptive_step")]
    adaptive_step: usize,

    /// Progress events buffered per subscriber before it lags
    #[serde(default = "default_event_capacity")]
    event_capacity: usize,
}

fn default_max_concurrent() -> usize {
    4
}

fn default_adaptive_step() -> usize {
    1
}

fn default_event_capacity() -> usize {
    256
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            adaptive_step: default_adaptive_step(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl SchedulerConfig {
    /// Start building a configuration from defaults.
    pub fn builder() -> SchedulerConfigBuilder {
        SchedulerConfigBuilder::default()
    }

    /// Reject zero limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent == 0 {
            return Err(ConfigError::new("scheduler.max_concurrent must be positive"));
        }
        if self.adaptive_step == 0 {
            return Err(ConfigError::new("scheduler.adaptive_step must be positive"));
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::new("scheduler.event_capacity must be positive"));
        }
        Ok(())
    }
}
