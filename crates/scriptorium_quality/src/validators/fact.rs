//! Fact consistency against a knowledge base.

use crate::text;
use async_trait::async_trait;
use scriptorium_core::{GenerationRequest, ValidatorKind};
use scriptorium_error::{ValidationError, ValidationErrorKind};
use scriptorium_interface::{FactVerdict, KnowledgeBase, Validator, ValidatorScore};
use std::sync::Arc;
use tracing::{debug, instrument};

const DEFINITIONAL: [&str; 4] = [" is ", " are ", " was ", " were "];

/// Scores the share of checkable claims the knowledge base supports.
///
/// Checkable claims are sentences containing a figure or date, or a definitional
/// "is/are" statement. Claims the knowledge base knows nothing about are not
/// counted. A draft with nothing checkable scores 1.0.
pub struct FactConsistencyValidator {
    knowledge_base: Arc<dyn KnowledgeBase>,
}

impl std::fmt::Debug for FactConsistencyValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactConsistencyValidator").finish_non_exhaustive()
    }
}

impl FactConsistencyValidator {
    /// Create a validator backed by `knowledge_base`.
    pub fn new(knowledge_base: Arc<dyn KnowledgeBase>) -> Self {
        Self { knowledge_base }
    }

    /// Sentences worth checking.
    pub fn extract_claims(draft: &str) -> Vec<String> {
        text::sentences(draft)
            .into_iter()
            .filter(|sentence| {
                let padded = format!(" {} ", sentence.to_lowercase());
                sentence.chars().any(|c| c.is_ascii_digit())
                    || DEFINITIONAL.iter().any(|marker| padded.contains(marker))
            })
            .collect()
    }
}

#[async_trait]
impl Validator for FactConsistencyValidator {
    fn kind(&self) -> ValidatorKind {
        ValidatorKind::FactAccuracy
    }

    #[instrument(skip(self, draft, request), fields(topic = %request.topic()))]
    async fn score(
        &self,
        draft: &str,
        request: &GenerationRequest,
    ) -> Result<ValidatorScore, ValidationError> {
        let claims = Self::extract_claims(draft);
        if claims.is_empty() {
            return Ok(ValidatorScore::new(1.0));
        }

        let results = self
            .knowledge_base
            .query_facts(request.topic(), &claims)
            .await
            .map_err(|e| {
                ValidationError::new(ValidationErrorKind::Unavailable {
                    validator: ValidatorKind::FactAccuracy.to_string(),
                    reason: e.kind.to_string(),
                })
            })?;

        let mut supported = 0usize;
        let mut checked = 0usize;
        let mut score = ValidatorScore::new(1.0);
        for result in &results {
            match result.verdict {
                FactVerdict::Supported => {
                    supported += 1;
                    checked += 1;
                }
                FactVerdict::Contradicted => {
                    checked += 1;
                    let suggestion = match &result.correction {
                        Some(correction) => format!(
                            "Claim contradicts known facts: \"{}\" (expected: {})",
                            result.claim, correction
                        ),
                        None => format!("Claim contradicts known facts: \"{}\"", result.claim),
                    };
                    score = score.with_suggestion(suggestion);
                }
                FactVerdict::Unknown => {}
            }
        }

        if checked > 0 {
            score.score = supported as f64 / checked as f64;
        }
        debug!(claims = claims.len(), checked, supported, "Fact check complete");
        Ok(score)
    }
}
