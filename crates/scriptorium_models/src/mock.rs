//! Scripted in-memory provider.

use async_trait::async_trait;
use parking_lot::Mutex;
use scriptorium_error::{ProviderError, ProviderErrorKind};
use scriptorium_interface::{
    GenerationConstraints, Prompt, ProviderAdapter, ProviderHealthStatus, ProviderReply,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, instrument};

/// One scripted response.
#[derive(Debug, Clone, PartialEq)]
pub enum MockStep {
    /// Reply with this text
    Reply(String),
    /// Fail with this error
    Fail(ProviderErrorKind),
    /// Never answer; the call ends at its timeout
    Hang,
}

/// Provider that replays a script of replies and failures.
///
/// Steps are consumed in order; once the script is empty every call returns the
/// fallback reply, or [`ProviderErrorKind::InvalidResponse`] when none is set.
/// Calls can be held behind a gate to observe concurrency.
///
/// # Examples
///
/// ```
/// use scriptorium_core::ContentType;
/// use scriptorium_interface::{GenerationConstraints, Prompt, ProviderAdapter};
/// use scriptorium_models::MockProvider;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let provider = MockProvider::new("mock").with_fallback_reply("A short caption.");
/// let prompt = Prompt::new("system", "user", ContentType::Caption);
/// let reply = provider
///     .generate(&prompt, &GenerationConstraints::default(), Duration::from_secs(1))
///     .await
///     .unwrap();
/// assert_eq!(reply.text, "A short caption.");
/// assert_eq!(provider.calls(), 1);
/// # }
/// ```
#[derive(Debug)]
pub struct MockProvider {
    id: String,
    model: String,
    script: Mutex<VecDeque<MockStep>>,
    fallback: Mutex<Option<String>>,
    latency: Mutex<Duration>,
    cost_per_token: f64,
    healthy: Mutex<bool>,
    prompts: Mutex<Vec<Prompt>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    gate: watch::Sender<bool>,
}

impl MockProvider {
    /// Create a provider with an empty script and an open gate.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let (gate, _) = watch::channel(true);
        Self {
            model: format!("{}-model", id),
            id,
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(None),
            latency: Mutex::new(Duration::ZERO),
            cost_per_token: 0.0,
            healthy: Mutex::new(true),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            gate,
        }
    }

    /// Reply returned once the script is exhausted.
    pub fn with_fallback_reply(self, text: impl Into<String>) -> Self {
        *self.fallback.lock() = Some(text.into());
        self
    }

    /// Simulated latency applied to every call.
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock() = latency;
        self
    }

    /// Price used for cost estimates.
    pub fn with_cost_per_token(mut self, cost_per_token: f64) -> Self {
        self.cost_per_token = cost_per_token;
        self
    }

    /// Append a scripted reply.
    pub fn reply(&self, text: impl Into<String>) -> &Self {
        self.script.lock().push_back(MockStep::Reply(text.into()));
        self
    }

    /// Append a scripted failure.
    pub fn fail(&self, kind: ProviderErrorKind) -> &Self {
        self.script.lock().push_back(MockStep::Fail(kind));
        self
    }

    /// Append a call that never answers.
    pub fn hang(&self) -> &Self {
        self.script.lock().push_back(MockStep::Hang);
        self
    }

    /// Set the result of [`ProviderAdapter::health_check`].
    pub fn set_healthy(&self, healthy: bool) {
        *self.healthy.lock() = healthy;
    }

    /// Hold every new call until [`MockProvider::open_gate`].
    pub fn close_gate(&self) {
        self.gate.send_replace(false);
    }

    /// Release held calls.
    pub fn open_gate(&self) {
        self.gate.send_replace(true);
    }

    /// Number of calls started.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of calls currently in progress.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().clone()
    }

    fn next_step(&self) -> MockStep {
        if let Some(step) = self.script.lock().pop_front() {
            return step;
        }
        match self.fallback.lock().clone() {
            Some(text) => MockStep::Reply(text),
            None => MockStep::Fail(ProviderErrorKind::InvalidResponse(
                "mock script exhausted".to_string(),
            )),
        }
    }

    async fn respond(&self) -> Result<ProviderReply, ProviderError> {
        let mut gate = self.gate.subscribe();
        // The sender lives in self, so the wait only ends when the gate opens.
        let _ = gate.wait_for(|open| *open).await;

        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        match self.next_step() {
            MockStep::Reply(text) => {
                let token_count = text.split_whitespace().count() as u32;
                Ok(ProviderReply {
                    cost_estimate: f64::from(token_count) * self.cost_per_token,
                    token_count,
                    text,
                })
            }
            MockStep::Fail(kind) => Err(ProviderError::new(kind)),
            MockStep::Hang => std::future::pending().await,
        }
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    #[instrument(skip(self, prompt, _constraints), fields(provider = %self.id))]
    async fn generate(
        &self,
        prompt: &Prompt,
        _constraints: &GenerationConstraints,
        timeout: Duration,
    ) -> Result<ProviderReply, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.clone());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let result = tokio::time::timeout(timeout, self.respond())
            .await
            .unwrap_or_else(|_| {
                Err(ProviderError::new(ProviderErrorKind::Timeout(
                    timeout.as_millis() as u64,
                )))
            });
        debug!(ok = result.is_ok(), "Mock call finished");
        result
    }

    async fn health_check(&self) -> ProviderHealthStatus {
        if *self.healthy.lock() {
            ProviderHealthStatus::Healthy
        } else {
            ProviderHealthStatus::Unavailable {
                reason: "mock marked unhealthy".to_string(),
            }
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
