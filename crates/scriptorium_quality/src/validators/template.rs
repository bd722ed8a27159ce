//! Structural compliance with the content type's template.

use crate::text;
use async_trait::async_trait;
use scriptorium_core::{ContentType, GenerationRequest, ValidatorKind};
use scriptorium_error::ValidationError;
use scriptorium_interface::{Validator, ValidatorScore};
use tracing::instrument;

const CAPTION_CHAR_LIMIT: usize = 280;

/// Checks length bounds and required structure for each content type.
///
/// | Type | Words | Structure |
/// |---|---|---|
/// | article | 600-2500 | headings |
/// | blog-post | 400-2000 | headings |
/// | guide | 500-3000 | headings, list of steps |
/// | review | 250-1500 | |
/// | digest | 300-2000 | at least three list items |
/// | interview | 400-3000 | Q/A markers |
/// | community-post | 50-500 | |
/// | caption | 5-60 | at most 280 characters |
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateComplianceValidator;

impl TemplateComplianceValidator {
    /// Create the validator.
    pub fn new() -> Self {
        Self
    }

    /// Expected word range for a content type.
    pub fn word_bounds(content_type: ContentType) -> (usize, usize) {
        match content_type {
            ContentType::Article => (600, 2500),
            ContentType::BlogPost => (400, 2000),
            ContentType::Guide => (500, 3000),
            ContentType::Review => (250, 1500),
            ContentType::Digest => (300, 2000),
            ContentType::Interview => (400, 3000),
            ContentType::CommunityPost => (50, 500),
            ContentType::Caption => (5, 60),
        }
    }

    fn qa_markers(draft: &str) -> usize {
        draft
            .lines()
            .map(|line| line.trim_start().trim_start_matches(['*', '#', ' ']))
            .filter(|line| {
                let upper = line.to_uppercase();
                upper.starts_with("Q:") || upper.starts_with("A:")
            })
            .count()
    }
}

#[async_trait]
impl Validator for TemplateComplianceValidator {
    fn kind(&self) -> ValidatorKind {
        ValidatorKind::TemplateCompliance
    }

    #[instrument(skip(self, draft, request), fields(content_type = %request.content_type()))]
    async fn score(
        &self,
        draft: &str,
        request: &GenerationRequest,
    ) -> Result<ValidatorScore, ValidationError> {
        let content_type = *request.content_type();
        let words = text::word_count(draft);
        let (min, max) = Self::word_bounds(content_type);
        let mut penalty = 0.0;
        let mut suggestions = Vec::new();

        if words < min {
            penalty += 0.4 * (1.0 - words as f64 / min as f64);
            suggestions.push(format!(
                "Expand to at least {} words for a {} ({} now)",
                min, content_type, words
            ));
        } else if words > max {
            penalty += 0.4 * ((words - max) as f64 / max as f64).min(1.0);
            suggestions.push(format!(
                "Trim to at most {} words for a {} ({} now)",
                max, content_type, words
            ));
        }

        if let Some(limit) = request.max_length() {
            if words > *limit {
                penalty += 0.3;
                suggestions.push(format!(
                    "Respect the requested length of {} words ({} now)",
                    limit, words
                ));
            }
        }

        match content_type {
            ContentType::Article | ContentType::BlogPost | ContentType::Guide => {
                if text::headings(draft).is_empty() {
                    penalty += 0.3;
                    suggestions.push("Break the text into sections with headings".to_string());
                }
                if content_type == ContentType::Guide && text::list_items(draft) == 0 {
                    penalty += 0.15;
                    suggestions.push("Present the steps as a list".to_string());
                }
            }
            ContentType::Interview => {
                if Self::qa_markers(draft) < 2 {
                    penalty += 0.3;
                    suggestions.push("Mark questions and answers with Q: and A:".to_string());
                }
            }
            ContentType::Digest => {
                if text::list_items(draft) < 3 {
                    penalty += 0.2;
                    suggestions.push("List at least three digest items".to_string());
                }
            }
            ContentType::Caption => {
                if draft.trim().chars().count() > CAPTION_CHAR_LIMIT {
                    penalty += 0.3;
                    suggestions.push(format!(
                        "Keep captions within {} characters",
                        CAPTION_CHAR_LIMIT
                    ));
                }
            }
            ContentType::Review | ContentType::CommunityPost => {}
        }

        Ok(ValidatorScore {
            score: f64::clamp(1.0 - penalty, 0.0, 1.0),
            suggestions,
        })
    }
}
