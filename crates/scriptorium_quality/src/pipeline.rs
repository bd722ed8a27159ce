//! Concurrent validator pipeline.

use crate::{
    BrandVoiceValidator, FactConsistencyValidator, ReadabilityValidator, SeoValidator,
    TemplateComplianceValidator,
};
use scriptorium_core::{GenerationRequest, NEUTRAL_SCORE, QualityResult, ValidatorKind};
use scriptorium_interface::{KnowledgeBase, Validator};
use std::collections::BTreeMap;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{info, instrument, warn};

/// Runs every validator over a draft and combines the scores.
///
/// # Examples
///
/// ```
/// use scriptorium_core::{ContentType, GenerationRequest, ValidatorKind};
/// use scriptorium_quality::{QualityPipeline, ReadabilityValidator};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() {
/// let pipeline = QualityPipeline::new(0.7).with_validator(Arc::new(ReadabilityValidator::new()));
/// let request = GenerationRequest::builder()
///     .content_type(ContentType::Caption)
///     .topic("Sourdough")
///     .build()
///     .unwrap();
///
/// let result = pipeline.evaluate("Our bread is made by hand each day.", &request).await;
/// assert!(result.degraded().contains(&ValidatorKind::Seo));
/// assert!((0.0..=1.0).contains(&result.composite()));
/// # }
/// ```
#[derive(Clone)]
pub struct QualityPipeline {
    validators: Vec<Arc<dyn Validator>>,
    threshold: f64,
}

impl std::fmt::Debug for QualityPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QualityPipeline")
            .field(
                "validators",
                &self.validators.iter().map(|v| v.kind()).collect::<Vec<_>>(),
            )
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl QualityPipeline {
    /// Empty pipeline. Dimensions without a validator score as neutral.
    pub fn new(threshold: f64) -> Self {
        Self {
            validators: Vec::new(),
            threshold,
        }
    }

    /// Pipeline with the full standard validator set.
    pub fn standard(knowledge_base: Arc<dyn KnowledgeBase>, threshold: f64) -> Self {
        Self::new(threshold)
            .with_validator(Arc::new(FactConsistencyValidator::new(knowledge_base)))
            .with_validator(Arc::new(BrandVoiceValidator::new()))
            .with_validator(Arc::new(ReadabilityValidator::new()))
            .with_validator(Arc::new(SeoValidator::new()))
            .with_validator(Arc::new(TemplateComplianceValidator::new()))
    }

    /// Add a validator. The first validator registered for a dimension wins.
    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validators.push(validator);
        self
    }

    /// Acceptance threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score a draft.
    ///
    /// Never fails: a validator error scores its dimension as neutral, adds a
    /// suggestion naming the validator and lists the dimension as degraded.
    #[instrument(
        skip(self, draft, request),
        fields(content_type = %request.content_type(), draft_words = crate::text::word_count(draft))
    )]
    pub async fn evaluate(&self, draft: &str, request: &GenerationRequest) -> QualityResult {
        let runs = self.validators.iter().map(|validator| {
            let validator = Arc::clone(validator);
            async move { (validator.kind(), validator.score(draft, request).await) }
        });
        let outcomes = futures::future::join_all(runs).await;

        let mut scores = BTreeMap::new();
        let mut suggestions = Vec::new();
        let mut degraded = Vec::new();

        for (kind, outcome) in outcomes {
            if scores.contains_key(&kind) {
                continue;
            }
            match outcome {
                Ok(score) => {
                    scores.insert(kind, score.score);
                    suggestions.extend(score.suggestions);
                }
                Err(error) => {
                    warn!(validator = %kind, error = %error.kind, "Validator unavailable");
                    scores.insert(kind, NEUTRAL_SCORE);
                    suggestions.push(format!(
                        "{} check could not run ({}); scored as neutral",
                        kind, error.kind
                    ));
                    degraded.push(kind);
                }
            }
        }

        for kind in ValidatorKind::iter() {
            if !scores.contains_key(&kind) {
                suggestions.push(format!("No {} validator configured; scored as neutral", kind));
                degraded.push(kind);
            }
        }

        let result = QualityResult::new(scores, suggestions, degraded, self.threshold);
        info!(
            composite = result.composite(),
            passed = result.passed(),
            degraded = result.degraded().len(),
            "Draft evaluated"
        );
        result
    }
}
