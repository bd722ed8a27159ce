//! Route, generate, validate, regenerate.

use crate::{PromptBuilder, TimeoutPolicy};
use scriptorium_core::{GenerationRequest, QualityResult};
use scriptorium_error::{GenerationError, GenerationErrorKind, RouterError};
use scriptorium_interface::{GenerationConstraints, Prompt};
use scriptorium_quality::{QualityConfig, QualityPipeline};
use scriptorium_router::{ProviderRef, ProviderRouter, RoutingRequirements};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Accepted content for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    /// The returned draft
    pub content: String,
    /// Its quality
    pub quality: QualityResult,
    /// Provider that produced it
    pub provider: String,
    /// Drafts produced
    pub drafts: u32,
    /// Provider calls made, failed ones included
    pub provider_attempts: u32,
}

impl GenerationOutcome {
    /// Failovers plus regenerations.
    pub fn retries(&self) -> u32 {
        self.provider_attempts.saturating_sub(1)
    }
}

#[derive(Debug)]
struct Draft {
    content: String,
    quality: QualityResult,
    provider: String,
}

/// Drives one request through routing, generation and the quality gate.
///
/// Two bounded loops: the outer one produces at most
/// `1 + max_regenerate_attempts` drafts, the inner one makes at most
/// `max_provider_attempts` provider calls per draft, never retrying a provider
/// that already failed for this draft.
#[derive(Debug)]
pub struct GenerationEngine {
    router: Arc<ProviderRouter>,
    pipeline: QualityPipeline,
    quality: QualityConfig,
    timeouts: TimeoutPolicy,
    prompts: PromptBuilder,
}

impl GenerationEngine {
    /// Create an engine with the default timeout policy.
    pub fn new(router: Arc<ProviderRouter>, pipeline: QualityPipeline, quality: QualityConfig) -> Self {
        Self {
            router,
            pipeline,
            quality,
            timeouts: TimeoutPolicy::default(),
            prompts: PromptBuilder::new(),
        }
    }

    /// Replace the timeout policy.
    pub fn with_timeouts(mut self, timeouts: TimeoutPolicy) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// The router this engine calls through.
    pub fn router(&self) -> &Arc<ProviderRouter> {
        &self.router
    }

    /// The quality pipeline.
    pub fn pipeline(&self) -> &QualityPipeline {
        &self.pipeline
    }

    /// The timeout policy.
    pub fn timeouts(&self) -> &TimeoutPolicy {
        &self.timeouts
    }

    /// Generate content for `request`.
    ///
    /// Returns the first draft that passes the quality gate, or the best-scoring
    /// draft once regenerations run out. `cancel` is checked before every
    /// provider call and again when the call resolves; an in-flight call is
    /// never abandoned, but its result is discarded.
    ///
    /// # Errors
    ///
    /// - [`GenerationErrorKind::Prompt`] when the request cannot be turned into a prompt
    /// - [`GenerationErrorKind::ProviderUnavailable`] when no draft could be produced
    /// - [`GenerationErrorKind::Cancelled`] when `cancel` fired
    #[instrument(
        skip(self, request, cancel),
        fields(content_type = %request.content_type(), topic = %request.topic())
    )]
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerationOutcome, GenerationError> {
        let prompt = self.prompts.build(request)?;
        let constraints = self.prompts.constraints(request);
        let timeout = self.timeouts.for_content(*request.content_type());
        let max_drafts = self.quality.max_regenerate_attempts().saturating_add(1);

        let mut attempts = 0u32;
        let mut drafts = 0u32;
        let mut used: Vec<ProviderRef> = Vec::new();
        let mut best: Option<Draft> = None;

        while drafts < max_drafts {
            let avoid: &[ProviderRef] = if drafts > 0 && *self.quality.regenerate_with_different_provider() {
                &used
            } else {
                &[]
            };

            let (reference, text) = match self
                .produce_draft(&prompt, &constraints, timeout, avoid, cancel, &mut attempts)
                .await
            {
                Ok(produced) => produced,
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => match best {
                    Some(draft) => {
                        warn!(error = %e.kind, drafts, "Regeneration failed, keeping best draft");
                        return Ok(Self::outcome(draft, drafts, attempts));
                    }
                    None => return Err(e),
                },
            };
            drafts += 1;
            if !used.contains(&reference) {
                used.push(reference);
            }

            let quality = self.pipeline.evaluate(&text, request).await;
            let provider = self
                .router
                .provider_id(reference)
                .unwrap_or_default()
                .to_string();
            info!(
                draft = drafts,
                provider = %provider,
                composite = quality.composite(),
                passed = quality.passed(),
                "Draft scored"
            );

            let draft = Draft {
                content: text,
                quality,
                provider,
            };
            if draft.quality.passed() {
                return Ok(Self::outcome(draft, drafts, attempts));
            }
            best = match best {
                Some(current) if current.quality.composite() >= draft.quality.composite() => {
                    Some(current)
                }
                _ => Some(draft),
            };
        }

        match best {
            Some(draft) => {
                info!(
                    drafts,
                    composite = draft.quality.composite(),
                    "Regenerations exhausted, returning best draft"
                );
                Ok(Self::outcome(draft, drafts, attempts))
            }
            // max_drafts is at least one, so a draft exists or an error returned.
            None => Err(GenerationError::new(GenerationErrorKind::ProviderUnavailable {
                attempts,
                last_error: "no draft produced".to_string(),
            })),
        }
    }

    fn outcome(draft: Draft, drafts: u32, attempts: u32) -> GenerationOutcome {
        GenerationOutcome {
            content: draft.content,
            quality: draft.quality,
            provider: draft.provider,
            drafts,
            provider_attempts: attempts,
        }
    }

    /// Inner failover loop for one draft.
    async fn produce_draft(
        &self,
        prompt: &Prompt,
        constraints: &GenerationConstraints,
        timeout: Duration,
        avoid: &[ProviderRef],
        cancel: &CancellationToken,
        attempts: &mut u32,
    ) -> Result<(ProviderRef, String), GenerationError> {
        let max_attempts = *self.router.config().max_provider_attempts();
        let mut failed: Vec<ProviderRef> = Vec::new();
        let mut last_error = String::from("no provider attempted");

        for _ in 0..max_attempts {
            if cancel.is_cancelled() {
                return Err(GenerationError::new(GenerationErrorKind::Cancelled));
            }

            let reference = match self.pick(&failed, avoid) {
                Ok(reference) => reference,
                Err(e) => {
                    last_error = e.kind.to_string();
                    break;
                }
            };

            *attempts += 1;
            let result = self.router.call(reference, prompt, constraints, timeout).await;
            if cancel.is_cancelled() {
                debug!("Discarding provider result after cancellation");
                return Err(GenerationError::new(GenerationErrorKind::Cancelled));
            }

            match result {
                Ok(reply) => return Ok((reference, reply.text)),
                Err(e) => {
                    warn!(provider = %reference, error = %e.kind, "Failing over");
                    last_error = e.kind.to_string();
                    failed.push(reference);
                }
            }
        }

        Err(GenerationError::new(GenerationErrorKind::ProviderUnavailable {
            attempts: *attempts,
            last_error,
        }))
    }

    /// Select a provider, preferring ones not in `avoid` but falling back to them.
    fn pick(&self, failed: &[ProviderRef], avoid: &[ProviderRef]) -> Result<ProviderRef, RouterError> {
        let strategy = *self.router.config().strategy();
        let mut requirements = RoutingRequirements::new();
        for reference in failed {
            requirements.exclude(*reference);
        }

        if !avoid.is_empty() {
            let mut fresh = requirements.clone();
            for reference in avoid {
                fresh.exclude(*reference);
            }
            if let Ok(reference) = self.router.select(&fresh, strategy) {
                return Ok(reference);
            }
            debug!("No unused provider available, reusing one");
        }

        self.router.select(&requirements, strategy)
    }
}
