//! Value types exchanged across the trait boundaries.

use scriptorium_core::ContentType;
use serde::{Deserialize, Serialize};

/// A prompt ready to send to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Prompt {
    /// System instructions
    system: String,
    /// User message
    user: String,
    /// Content type the prompt was built for
    content_type: ContentType,
}

impl Prompt {
    /// Create a prompt.
    pub fn new(
        system: impl Into<String>,
        user: impl Into<String>,
        content_type: ContentType,
    ) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            content_type,
        }
    }
}

/// Sampling constraints for a provider call.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct GenerationConstraints {
    /// Upper bound on generated tokens
    #[builder(default)]
    max_tokens: Option<u32>,
    /// Sampling temperature
    #[builder(default = "0.7")]
    temperature: f32,
}

impl Default for GenerationConstraints {
    fn default() -> Self {
        Self {
            max_tokens: None,
            temperature: 0.7,
        }
    }
}

impl GenerationConstraints {
    /// Start building constraints.
    pub fn builder() -> GenerationConstraintsBuilder {
        GenerationConstraintsBuilder::default()
    }
}

/// Successful provider response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderReply {
    /// Generated text
    pub text: String,
    /// Tokens consumed (prompt plus completion)
    pub token_count: u32,
    /// Estimated cost of the call
    pub cost_estimate: f64,
}

impl ProviderReply {
    /// Cost per token, or `None` when no tokens were reported.
    pub fn cost_per_token(&self) -> Option<f64> {
        (self.token_count > 0).then(|| self.cost_estimate / f64::from(self.token_count))
    }
}

/// Result of a provider health probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ProviderHealthStatus {
    /// Reachable
    #[strum(serialize = "healthy")]
    Healthy,
    /// Not reachable
    #[strum(serialize = "unavailable")]
    Unavailable {
        /// Why the probe failed
        reason: String,
    },
}

impl ProviderHealthStatus {
    /// Whether the probe succeeded.
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Score produced by one validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorScore {
    /// Score in `[0, 1]`
    pub score: f64,
    /// Improvement suggestions
    pub suggestions: Vec<String>,
}

impl ValidatorScore {
    /// Score with no suggestions. Out-of-range values are clamped.
    pub fn new(score: f64) -> Self {
        Self {
            score: score.clamp(0.0, 1.0),
            suggestions: Vec::new(),
        }
    }

    /// Attach a suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}

/// Knowledge-base judgement on one claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FactVerdict {
    /// The claim agrees with known facts
    Supported,
    /// The claim conflicts with known facts
    Contradicted,
    /// Nothing is known about the claim
    Unknown,
}

/// Outcome of checking one claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactCheckResult {
    /// The claim as submitted
    pub claim: String,
    /// Verdict
    pub verdict: FactVerdict,
    /// Correct statement, when the claim was contradicted
    pub correction: Option<String>,
}
