//! Routing strategies and per-request constraints.

use crate::ProviderRef;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How the router ranks candidate providers.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RoutingStrategy {
    /// Lowest rolling cost per token, ties broken by latency
    CostOptimized,
    /// First available provider in the configured quality ranking
    QualityFirst,
    /// Lowest rolling latency
    SpeedFirst,
    /// Weighted blend of cost, latency and quality
    #[default]
    Balanced,
}

/// Constraints a selected provider must satisfy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingRequirements {
    exclude: HashSet<ProviderRef>,
    max_cost_per_token: Option<f64>,
    min_quality: Option<f64>,
}

impl RoutingRequirements {
    /// No constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Never select `provider`.
    pub fn excluding(mut self, provider: ProviderRef) -> Self {
        self.exclude.insert(provider);
        self
    }

    /// Add `provider` to the exclusion set in place.
    pub fn exclude(&mut self, provider: ProviderRef) {
        self.exclude.insert(provider);
    }

    /// Only select providers whose rolling cost per token is at most `limit`.
    pub fn with_max_cost_per_token(mut self, limit: f64) -> Self {
        self.max_cost_per_token = Some(limit);
        self
    }

    /// Only select providers whose quality rank input is at least `floor`.
    pub fn with_min_quality(mut self, floor: f64) -> Self {
        self.min_quality = Some(floor);
        self
    }

    /// Excluded providers.
    pub fn excluded(&self) -> &HashSet<ProviderRef> {
        &self.exclude
    }

    /// Whether `provider` is excluded.
    pub fn is_excluded(&self, provider: ProviderRef) -> bool {
        self.exclude.contains(&provider)
    }

    /// Cost ceiling, if any.
    pub fn max_cost_per_token(&self) -> Option<f64> {
        self.max_cost_per_token
    }

    /// Quality floor, if any.
    pub fn min_quality(&self) -> Option<f64> {
        self.min_quality
    }
}
