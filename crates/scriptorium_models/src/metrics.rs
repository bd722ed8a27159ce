//! Metrics for provider calls.
//!
//! OpenTelemetry counters and histograms labeled with provider id and model name.

use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram, Meter},
};
use std::sync::OnceLock;

static METRICS: OnceLock<ProviderMetrics> = OnceLock::new();

/// Metrics for provider interactions.
#[derive(Clone)]
pub struct ProviderMetrics {
    /// Meter handle kept alive for metric instruments
    _meter: Meter,
    /// Successful provider calls
    pub requests: Counter<u64>,
    /// Failed provider calls
    pub errors: Counter<u64>,
    /// Provider call duration in seconds
    pub duration: Histogram<f64>,
    /// Tokens consumed
    pub tokens_used: Counter<u64>,
    /// Estimated spend
    pub cost: Histogram<f64>,
}

impl ProviderMetrics {
    fn init() -> Self {
        let meter = global::meter("scriptorium_providers");

        Self {
            _meter: meter.clone(),
            requests: meter
                .u64_counter("provider.requests")
                .with_description("Successful provider calls")
                .build(),
            errors: meter
                .u64_counter("provider.errors")
                .with_description("Failed provider calls")
                .build(),
            duration: meter
                .f64_histogram("provider.duration")
                .with_unit("seconds")
                .with_description("Provider call duration")
                .build(),
            tokens_used: meter
                .u64_counter("provider.tokens")
                .with_description("Tokens consumed (prompt + completion)")
                .build(),
            cost: meter
                .f64_histogram("provider.cost")
                .with_description("Estimated cost per call")
                .build(),
        }
    }

    /// Get the global provider metrics instance.
    pub fn get() -> &'static Self {
        METRICS.get_or_init(Self::init)
    }

    /// Record a successful call.
    pub fn record_success(
        &self,
        provider: &str,
        model: &str,
        duration_secs: f64,
        tokens: u32,
        cost: f64,
    ) {
        let labels = &[
            KeyValue::new("provider", provider.to_string()),
            KeyValue::new("model", model.to_string()),
        ];
        self.requests.add(1, labels);
        self.duration.record(duration_secs, labels);
        self.tokens_used.add(u64::from(tokens), labels);
        self.cost.record(cost, labels);
    }

    /// Record a failed call, classified by error label.
    pub fn record_error(&self, provider: &str, model: &str, error_type: &str) {
        let labels = &[
            KeyValue::new("provider", provider.to_string()),
            KeyValue::new("model", model.to_string()),
            KeyValue::new("error_type", error_type.to_string()),
        ];
        self.errors.add(1, labels);
    }
}

impl Default for ProviderMetrics {
    fn default() -> Self {
        Self::get().clone()
    }
}
