//! Router configuration.

use crate::RoutingStrategy;
use scriptorium_error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Routing and health-tracking settings.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into), default)]
pub struct RouterConfig {
    /// Strategy used when the caller does not name one
    #[serde(default)]
    strategy: RoutingStrategy,

    /// Provider calls allowed per draft before giving up
    #[serde(default = "default_max_provider_attempts")]
    max_provider_attempts: u32,

    /// Consecutive failures that take a provider out of rotation
    #[serde(default = "default_failure_threshold")]
    failure_threshold: u32,

    /// Seconds a provider stays out of rotation
    #[serde(default = "default_cooldown_secs")]
    cooldown_secs: u64,

    /// Provider ids in descending quality order, used by quality-first routing
    #[serde(default)]
    quality_ranking: Vec<String>,

    /// Smoothing factor for rolling latency and cost averages
    #[serde(default = "default_ewma_alpha")]
    ewma_alpha: f64,
}

fn default_max_provider_attempts() -> u32 {
    3
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_cooldown_secs() -> u64 {
    60
}

fn default_ewma_alpha() -> f64 {
    0.3
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            strategy: RoutingStrategy::default(),
            max_provider_attempts: default_max_provider_attempts(),
            failure_threshold: default_failure_threshold(),
            cooldown_secs: default_cooldown_secs(),
            quality_ranking: Vec::new(),
            ewma_alpha: default_ewma_alpha(),
        }
    }
}

impl RouterConfig {
    /// Start building a configuration from defaults.
    pub fn builder() -> RouterConfigBuilder {
        RouterConfigBuilder::default()
    }

    /// Cool-down window as a duration.
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    /// Reject settings the router cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_provider_attempts == 0 {
            return Err(ConfigError::new(
                "router.max_provider_attempts must be at least 1",
            ));
        }
        if self.failure_threshold == 0 {
            return Err(ConfigError::new("router.failure_threshold must be at least 1"));
        }
        if !(self.ewma_alpha > 0.0 && self.ewma_alpha <= 1.0) {
            return Err(ConfigError::new(format!(
                "router.ewma_alpha must be in (0, 1], got {}",
                self.ewma_alpha
            )));
        }
        Ok(())
    }
}
