//! Per-provider health records.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Routability of a provider.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Availability {
    /// Last call succeeded
    Healthy,
    /// Recent failures, or on probation after a cool-down
    Degraded,
    /// Out of rotation until the cool-down expires
    Unavailable,
}

/// Static description of a provider, seeding its rolling averages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProviderProfile {
    /// Quality rank input in `[0, 1]`
    pub quality: f64,
    /// Expected cost per token
    pub cost_per_token: f64,
    /// Expected call latency
    pub expected_latency: Duration,
}

impl Default for ProviderProfile {
    fn default() -> Self {
        Self {
            quality: 0.5,
            cost_per_token: 0.0,
            expected_latency: Duration::from_secs(5),
        }
    }
}

impl ProviderProfile {
    /// Profile from expected quality, cost and latency. Quality is clamped to `[0, 1]`.
    pub fn new(quality: f64, cost_per_token: f64, expected_latency: Duration) -> Self {
        Self {
            quality: quality.clamp(0.0, 1.0),
            cost_per_token: cost_per_token.max(0.0),
            expected_latency,
        }
    }
}

/// Snapshot of a provider's health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderHealth {
    /// Routability
    pub availability: Availability,
    /// Rolling average latency in milliseconds
    pub avg_latency_ms: f64,
    /// Rolling average cost per token
    pub avg_cost_per_token: f64,
    /// Quality rank input
    pub quality: f64,
    /// Failures since the last success
    pub consecutive_failures: u32,
    /// Time left before the provider is readmitted
    pub cooldown_remaining: Option<Duration>,
    /// Reason for the most recent failure
    pub last_failure: Option<String>,
    /// Successful calls recorded
    pub successes: u64,
    /// Failed calls recorded
    pub failures: u64,
}

/// Mutable health state behind one provider's lock.
#[derive(Debug, Clone)]
pub(crate) struct HealthRecord {
    profile: ProviderProfile,
    availability: Availability,
    avg_latency_ms: f64,
    avg_cost_per_token: f64,
    consecutive_failures: u32,
    unavailable_until: Option<Instant>,
    last_failure: Option<String>,
    successes: u64,
    failures: u64,
}

impl HealthRecord {
    pub(crate) fn new(profile: ProviderProfile) -> Self {
        Self {
            avg_latency_ms: profile.expected_latency.as_secs_f64() * 1000.0,
            avg_cost_per_token: profile.cost_per_token,
            profile,
            availability: Availability::Healthy,
            consecutive_failures: 0,
            unavailable_until: None,
            last_failure: None,
            successes: 0,
            failures: 0,
        }
    }

    /// Readmit on probation once the cool-down has passed.
    fn refresh(&mut self, now: Instant) {
        if self.availability == Availability::Unavailable {
            if let Some(until) = self.unavailable_until {
                if now >= until {
                    self.availability = Availability::Degraded;
                    self.unavailable_until = None;
                }
            }
        }
    }

    pub(crate) fn is_routable(&mut self, now: Instant) -> bool {
        self.refresh(now);
        self.availability != Availability::Unavailable
    }

    pub(crate) fn quality(&self) -> f64 {
        self.profile.quality
    }

    pub(crate) fn avg_latency_ms(&self) -> f64 {
        self.avg_latency_ms
    }

    pub(crate) fn avg_cost_per_token(&self) -> f64 {
        self.avg_cost_per_token
    }

    pub(crate) fn record_success(
        &mut self,
        latency: Option<Duration>,
        cost_per_token: Option<f64>,
        alpha: f64,
    ) {
        self.consecutive_failures = 0;
        self.availability = Availability::Healthy;
        self.unavailable_until = None;
        self.successes += 1;
        if let Some(latency) = latency {
            let sample = latency.as_secs_f64() * 1000.0;
            self.avg_latency_ms = alpha * sample + (1.0 - alpha) * self.avg_latency_ms;
        }
        if let Some(cost) = cost_per_token {
            self.avg_cost_per_token = alpha * cost + (1.0 - alpha) * self.avg_cost_per_token;
        }
    }

    /// Returns `true` when this failure took the provider out of rotation.
    pub(crate) fn record_failure(
        &mut self,
        reason: String,
        threshold: u32,
        cooldown: Duration,
        now: Instant,
    ) -> bool {
        self.refresh(now);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.failures += 1;
        self.last_failure = Some(reason);

        if self.consecutive_failures >= threshold {
            let opened = self.availability != Availability::Unavailable;
            self.availability = Availability::Unavailable;
            self.unavailable_until = Some(now + cooldown);
            opened
        } else {
            self.availability = Availability::Degraded;
            false
        }
    }

    pub(crate) fn snapshot(&mut self, now: Instant) -> ProviderHealth {
        self.refresh(now);
        ProviderHealth {
            availability: self.availability,
            avg_latency_ms: self.avg_latency_ms,
            avg_cost_per_token: self.avg_cost_per_token,
            quality: self.profile.quality,
            consecutive_failures: self.consecutive_failures,
            cooldown_remaining: self
                .unavailable_until
                .map(|until| until.saturating_duration_since(now)),
            last_failure: self.last_failure.clone(),
            successes: self.successes,
            failures: self.failures,
        }
    }
}
