//! Trait definitions for providers, validators and knowledge bases.

use crate::{
    FactCheckResult, GenerationConstraints, Prompt, ProviderHealthStatus, ProviderReply,
    ValidatorScore,
};
use async_trait::async_trait;
use scriptorium_core::{GenerationRequest, ValidatorKind};
use scriptorium_error::{ProviderError, ValidationError};
use std::time::Duration;

/// A single LLM backend.
///
/// Implementations must be safe to call concurrently and must give up once
/// `timeout` has elapsed, reporting [`scriptorium_error::ProviderErrorKind::Timeout`].
/// The router cuts off calls that overrun the deadline by more than a short grace period.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Generate draft text for a prompt.
    async fn generate(
        &self,
        prompt: &Prompt,
        constraints: &GenerationConstraints,
        timeout: Duration,
    ) -> Result<ProviderReply, ProviderError>;

    /// Probe whether the backend is reachable.
    async fn health_check(&self) -> ProviderHealthStatus;

    /// Stable provider identifier (e.g. "groq", "local-llama").
    fn id(&self) -> &str;

    /// Model identifier used for generation.
    fn model_name(&self) -> &str;
}

/// One quality dimension.
///
/// Returning an error marks the dimension as degraded; the pipeline substitutes
/// a neutral score rather than failing the draft.
#[async_trait]
pub trait Validator: Send + Sync {
    /// Dimension this validator scores.
    fn kind(&self) -> ValidatorKind;

    /// Score a draft against the request it was generated for.
    async fn score(
        &self,
        text: &str,
        request: &GenerationRequest,
    ) -> Result<ValidatorScore, ValidationError>;
}

/// Read-only fact store.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Check claims made about a topic.
    ///
    /// Returns one result per claim, in the order given.
    async fn query_facts(
        &self,
        topic: &str,
        claims: &[String],
    ) -> Result<Vec<FactCheckResult>, ValidationError>;
}
