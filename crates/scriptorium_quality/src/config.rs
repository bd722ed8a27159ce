//! Quality gate configuration.

use scriptorium_core::DEFAULT_QUALITY_THRESHOLD;
use scriptorium_error::ConfigError;
use serde::{Deserialize, Serialize};

/// Acceptance threshold and regeneration policy.
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
pub struct QualityConfig {
    /// Composite score a draft must reach
    #[serde(default = "default_threshold")]
    threshold: f64,

    /// Extra drafts requested when a draft falls below the threshold
    #[serde(default = "default_max_regenerate_attempts")]
    max_regenerate_attempts: u32,

    /// Prefer a different provider for each regeneration
    #[serde(default = "default_true")]
    regenerate_with_different_provider: bool,
}

fn default_threshold() -> f64 {
    DEFAULT_QUALITY_THRESHOLD
}

fn default_max_regenerate_attempts() -> u32 {
    2
}

fn default_true() -> bool {
    true
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            max_regenerate_attempts: default_max_regenerate_attempts(),
            regenerate_with_different_provider: true,
        }
    }
}

impl QualityConfig {
    /// Start building a configuration from defaults.
    pub fn builder() -> QualityConfigBuilder {
        QualityConfigBuilder::default()
    }

    /// Reject thresholds outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::new(format!(
                "quality.threshold must be in [0, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}
