//! The provider router.

use crate::health::HealthRecord;
use crate::{ProviderHealth, ProviderProfile, RouterConfig, RoutingRequirements, RoutingStrategy};
use parking_lot::Mutex;
use scriptorium_error::{ProviderError, ProviderErrorKind, RouterError, RouterErrorKind};
use scriptorium_interface::{
    GenerationConstraints, Prompt, ProviderAdapter, ProviderHealthStatus, ProviderReply,
};
use scriptorium_models::ProviderMetrics;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Slack between the adapter's deadline and the router's hard cut-off.
pub const TIMEOUT_GRACE: Duration = Duration::from_millis(250);

/// Handle to a registered provider.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display,
)]
#[display("provider#{}", _0)]
pub struct ProviderRef(usize);

impl ProviderRef {
    /// Position of the provider in registration order.
    pub fn index(&self) -> usize {
        self.0
    }
}

struct ProviderEntry {
    adapter: Arc<dyn ProviderAdapter>,
    health: Mutex<HealthRecord>,
}

/// Candidate values read from a health record for one selection.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    reference: ProviderRef,
    quality: f64,
    latency_ms: f64,
    cost_per_token: f64,
}

/// Health-aware provider selection.
///
/// # Examples
///
/// ```
/// use scriptorium_models::MockProvider;
/// use scriptorium_router::{
///     ProviderProfile, ProviderRouter, RouterConfig, RoutingRequirements, RoutingStrategy,
/// };
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let mut router = ProviderRouter::new(RouterConfig::default());
/// let cheap = router
///     .register(
///         Arc::new(MockProvider::new("cheap")),
///         ProviderProfile::new(0.6, 0.000_001, Duration::from_secs(4)),
///     )
///     .unwrap();
/// router
///     .register(
///         Arc::new(MockProvider::new("premium")),
///         ProviderProfile::new(0.95, 0.000_015, Duration::from_secs(2)),
///     )
///     .unwrap();
///
/// let chosen = router
///     .select(&RoutingRequirements::new(), RoutingStrategy::CostOptimized)
///     .unwrap();
/// assert_eq!(chosen, cheap);
/// ```
pub struct ProviderRouter {
    entries: Vec<ProviderEntry>,
    index: HashMap<String, ProviderRef>,
    config: RouterConfig,
}

impl std::fmt::Debug for ProviderRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRouter")
            .field("providers", &self.index.keys().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}

impl ProviderRouter {
    /// Create an empty router.
    pub fn new(config: RouterConfig) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            config,
        }
    }

    /// Register a provider. Ids must be unique.
    #[instrument(skip(self, adapter), fields(provider = %adapter.id()))]
    pub fn register(
        &mut self,
        adapter: Arc<dyn ProviderAdapter>,
        profile: ProviderProfile,
    ) -> Result<ProviderRef, RouterError> {
        let id = adapter.id().to_string();
        if self.index.contains_key(&id) {
            return Err(RouterError::new(RouterErrorKind::DuplicateProvider(id)));
        }

        let reference = ProviderRef(self.entries.len());
        self.entries.push(ProviderEntry {
            adapter,
            health: Mutex::new(HealthRecord::new(profile)),
        });
        self.index.insert(id, reference);
        debug!(%reference, "Registered provider");
        Ok(reference)
    }

    /// Router configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no provider is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a provider by id.
    pub fn resolve(&self, id: &str) -> Result<ProviderRef, RouterError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| RouterError::new(RouterErrorKind::UnknownProvider(id.to_string())))
    }

    /// Registered providers in registration order.
    pub fn providers(&self) -> impl Iterator<Item = (ProviderRef, &str)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (ProviderRef(i), entry.adapter.id()))
    }

    /// Provider id for a handle.
    pub fn provider_id(&self, reference: ProviderRef) -> Option<&str> {
        self.entries
            .get(reference.0)
            .map(|entry| entry.adapter.id())
    }

    /// Adapter for a handle.
    pub fn adapter(&self, reference: ProviderRef) -> Option<Arc<dyn ProviderAdapter>> {
        self.entries
            .get(reference.0)
            .map(|entry| Arc::clone(&entry.adapter))
    }

    fn entry(&self, reference: ProviderRef) -> Result<&ProviderEntry, RouterError> {
        self.entries.get(reference.0).ok_or_else(|| {
            RouterError::new(RouterErrorKind::UnknownProvider(reference.to_string()))
        })
    }

    /// Pick a provider.
    ///
    /// Candidates are registered providers that are not unavailable, not excluded,
    /// and satisfy the requirement's cost and quality bounds. Fails with
    /// [`RouterErrorKind::NoProviderAvailable`] when none remain.
    #[instrument(skip(self, requirements), fields(excluded = requirements.excluded().len()))]
    pub fn select(
        &self,
        requirements: &RoutingRequirements,
        strategy: RoutingStrategy,
    ) -> Result<ProviderRef, RouterError> {
        let candidates = self.candidates(requirements);

        let chosen = match strategy {
            RoutingStrategy::CostOptimized => candidates.iter().min_by(|a, b| {
                a.cost_per_token
                    .total_cmp(&b.cost_per_token)
                    .then_with(|| a.latency_ms.total_cmp(&b.latency_ms))
            }),
            RoutingStrategy::SpeedFirst => candidates.iter().min_by(|a, b| {
                a.latency_ms
                    .total_cmp(&b.latency_ms)
                    .then_with(|| a.cost_per_token.total_cmp(&b.cost_per_token))
            }),
            RoutingStrategy::QualityFirst => candidates.iter().min_by(|a, b| {
                self.ranking_position(a.reference)
                    .cmp(&self.ranking_position(b.reference))
                    .then_with(|| b.quality.total_cmp(&a.quality))
            }),
            RoutingStrategy::Balanced => Self::most_balanced(&candidates),
        };

        match chosen {
            Some(candidate) => {
                debug!(
                    provider = self.provider_id(candidate.reference).unwrap_or_default(),
                    %strategy,
                    "Selected provider"
                );
                Ok(candidate.reference)
            }
            None => {
                warn!(%strategy, registered = self.entries.len(), "No provider available");
                Err(RouterError::new(RouterErrorKind::NoProviderAvailable {
                    strategy: strategy.to_string(),
                    registered: self.entries.len(),
                }))
            }
        }
    }

    fn candidates(&self, requirements: &RoutingRequirements) -> Vec<Candidate> {
        let now = Instant::now();
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| {
                let reference = ProviderRef(i);
                if requirements.is_excluded(reference) {
                    return None;
                }
                let mut record = entry.health.lock();
                if !record.is_routable(now) {
                    return None;
                }
                let candidate = Candidate {
                    reference,
                    quality: record.quality(),
                    latency_ms: record.avg_latency_ms(),
                    cost_per_token: record.avg_cost_per_token(),
                };
                drop(record);

                if let Some(limit) = requirements.max_cost_per_token() {
                    if candidate.cost_per_token > limit {
                        return None;
                    }
                }
                if let Some(floor) = requirements.min_quality() {
                    if candidate.quality < floor {
                        return None;
                    }
                }
                Some(candidate)
            })
            .collect()
    }

    fn ranking_position(&self, reference: ProviderRef) -> usize {
        let id = self.provider_id(reference).unwrap_or_default();
        self.config
            .quality_ranking()
            .iter()
            .position(|ranked| ranked == id)
            .unwrap_or(usize::MAX)
    }

    /// Score = 0.4 * cost term + 0.3 * latency term + 0.3 * quality, where the cost
    /// and latency terms are the cheapest/fastest candidate's value divided by this
    /// candidate's, so each lies in `[0, 1]`. Ties go to the earlier registration.
    fn most_balanced(candidates: &[Candidate]) -> Option<&Candidate> {
        let min_cost = candidates
            .iter()
            .map(|c| c.cost_per_token)
            .fold(f64::INFINITY, f64::min);
        let min_latency = candidates
            .iter()
            .map(|c| c.latency_ms)
            .fold(f64::INFINITY, f64::min);

        let mut best: Option<(&Candidate, f64)> = None;
        for candidate in candidates {
            let score = 0.4 * relative(min_cost, candidate.cost_per_token)
                + 0.3 * relative(min_latency, candidate.latency_ms)
                + 0.3 * candidate.quality;
            match best {
                Some((_, best_score)) if score.total_cmp(&best_score) != Ordering::Greater => {}
                _ => best = Some((candidate, score)),
            }
        }
        best.map(|(candidate, _)| candidate)
    }

    /// Record a successful call.
    pub fn record_success(&self, reference: ProviderRef, latency: Duration, reply: &ProviderReply) {
        let Ok(entry) = self.entry(reference) else {
            return;
        };
        entry.health.lock().record_success(
            Some(latency),
            reply.cost_per_token(),
            *self.config.ewma_alpha(),
        );
        ProviderMetrics::get().record_success(
            entry.adapter.id(),
            entry.adapter.model_name(),
            latency.as_secs_f64(),
            reply.token_count,
            reply.cost_estimate,
        );
    }

    /// Record a failed call.
    pub fn record_failure(&self, reference: ProviderRef, error: &ProviderError) {
        let Ok(entry) = self.entry(reference) else {
            return;
        };
        let opened = entry.health.lock().record_failure(
            error.kind.to_string(),
            *self.config.failure_threshold(),
            self.config.cooldown(),
            Instant::now(),
        );
        ProviderMetrics::get().record_error(
            entry.adapter.id(),
            entry.adapter.model_name(),
            error.kind.label(),
        );
        if opened {
            info!(
                provider = entry.adapter.id(),
                cooldown_secs = *self.config.cooldown_secs(),
                "Provider taken out of rotation"
            );
        }
    }

    /// Call a provider under a hard timeout and record the outcome.
    ///
    /// The adapter receives `timeout` and is expected to report its own
    /// timeout. The router cuts the call off [`TIMEOUT_GRACE`] later for
    /// adapters that overrun it.
    ///
    /// Health is updated before this returns, so a following [`Self::select`]
    /// already sees the result.
    #[instrument(skip(self, prompt, constraints), fields(provider))]
    pub async fn call(
        &self,
        reference: ProviderRef,
        prompt: &Prompt,
        constraints: &GenerationConstraints,
        timeout: Duration,
    ) -> Result<ProviderReply, ProviderError> {
        let entry = self.entry(reference).map_err(|e| {
            ProviderError::new(ProviderErrorKind::Rejected {
                status: 0,
                message: e.kind.to_string(),
            })
        })?;
        tracing::Span::current().record("provider", entry.adapter.id());

        let started = Instant::now();
        let result = tokio::time::timeout(
            timeout + TIMEOUT_GRACE,
            entry.adapter.generate(prompt, constraints, timeout),
        )
        .await
        .unwrap_or_else(|_| {
            Err(ProviderError::new(ProviderErrorKind::Timeout(
                timeout.as_millis() as u64,
            )))
        });

        match &result {
            Ok(reply) => {
                let latency = started.elapsed();
                debug!(latency_ms = latency.as_millis() as u64, tokens = reply.token_count, "Provider call succeeded");
                self.record_success(reference, latency, reply);
            }
            Err(error) => {
                warn!(error = %error.kind, "Provider call failed");
                self.record_failure(reference, error);
            }
        }
        result
    }

    /// Health snapshot of one provider.
    pub fn health(&self, reference: ProviderRef) -> Option<ProviderHealth> {
        let now = Instant::now();
        self.entries
            .get(reference.0)
            .map(|entry| entry.health.lock().snapshot(now))
    }

    /// Health snapshot of every provider, in registration order.
    pub fn health_snapshot(&self) -> Vec<(String, ProviderHealth)> {
        let now = Instant::now();
        self.entries
            .iter()
            .map(|entry| {
                (
                    entry.adapter.id().to_string(),
                    entry.health.lock().snapshot(now),
                )
            })
            .collect()
    }

    /// Probe every provider and fold the results into the health table.
    ///
    /// A healthy probe counts as a success without a latency sample; an unhealthy
    /// probe counts as a failure.
    #[instrument(skip(self))]
    pub async fn health_check_all(&self) -> Vec<(String, ProviderHealthStatus)> {
        let probes = self
            .entries
            .iter()
            .map(|entry| entry.adapter.health_check());
        let statuses = futures::future::join_all(probes).await;

        let now = Instant::now();
        self.entries
            .iter()
            .zip(statuses)
            .map(|(entry, status)| {
                match &status {
                    ProviderHealthStatus::Healthy => {
                        entry
                            .health
                            .lock()
                            .record_success(None, None, *self.config.ewma_alpha());
                    }
                    ProviderHealthStatus::Unavailable { reason } => {
                        entry.health.lock().record_failure(
                            format!("health check failed: {}", reason),
                            *self.config.failure_threshold(),
                            self.config.cooldown(),
                            now,
                        );
                    }
                }
                (entry.adapter.id().to_string(), status)
            })
            .collect()
    }
}

fn relative(best: f64, value: f64) -> f64 {
    if value <= f64::EPSILON {
        1.0
    } else {
        (best.max(0.0) / value).clamp(0.0, 1.0)
    }
}
