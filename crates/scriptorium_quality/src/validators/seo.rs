//! Search optimization signals.

use crate::text;
use async_trait::async_trait;
use scriptorium_core::{GenerationRequest, OptimizationStrategy, ValidatorKind};
use scriptorium_error::ValidationError;
use scriptorium_interface::{Validator, ValidatorScore};
use tracing::{debug, instrument};

const MIN_DENSITY: f64 = 0.005;
const MAX_DENSITY: f64 = 0.03;

/// Signal weights: coverage, density, placement, structure.
#[derive(Debug, Clone, Copy)]
struct SignalWeights {
    coverage: f64,
    density: f64,
    placement: f64,
    structure: f64,
}

impl SignalWeights {
    fn for_strategy(strategy: Option<OptimizationStrategy>) -> Self {
        match strategy {
            Some(OptimizationStrategy::Seo) => Self {
                coverage: 0.35,
                density: 0.25,
                placement: 0.2,
                structure: 0.2,
            },
            Some(OptimizationStrategy::Engagement) => Self {
                coverage: 0.3,
                density: 0.1,
                placement: 0.2,
                structure: 0.4,
            },
            Some(OptimizationStrategy::Balanced) | None => Self {
                coverage: 0.3,
                density: 0.2,
                placement: 0.2,
                structure: 0.3,
            },
        }
    }
}

/// Scores keyword coverage, keyword density, keyword placement and structure.
///
/// Signal weights shift with the request's optimization strategy. Requests
/// without keywords are judged on structure alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SeoValidator;

impl SeoValidator {
    /// Create the validator.
    pub fn new() -> Self {
        Self
    }

    fn density_score(density: f64) -> f64 {
        if density < MIN_DENSITY {
            density / MIN_DENSITY
        } else if density <= MAX_DENSITY {
            1.0
        } else {
            (1.0 - (density - MAX_DENSITY) / MAX_DENSITY).max(0.0)
        }
    }
}

#[async_trait]
impl Validator for SeoValidator {
    fn kind(&self) -> ValidatorKind {
        ValidatorKind::Seo
    }

    #[instrument(skip(self, draft, request), fields(keywords = request.seo_keywords().len()))]
    async fn score(
        &self,
        draft: &str,
        request: &GenerationRequest,
    ) -> Result<ValidatorScore, ValidationError> {
        let mut suggestions = Vec::new();
        let weights = SignalWeights::for_strategy(request.effective_strategy());

        let headings = text::headings(draft);
        let structure = if request.content_type().is_long_form() {
            if headings.is_empty() {
                suggestions.push("Add section headings".to_string());
                0.0
            } else {
                1.0
            }
        } else {
            1.0
        };

        let keywords: Vec<&String> = request
            .seo_keywords()
            .iter()
            .filter(|k| !k.trim().is_empty())
            .collect();
        if keywords.is_empty() {
            return Ok(ValidatorScore {
                score: structure,
                suggestions,
            });
        }

        let present: Vec<&&String> = keywords
            .iter()
            .filter(|k| text::count_phrase(draft, k) > 0)
            .collect();
        let coverage = present.len() as f64 / keywords.len() as f64;
        for missing in keywords.iter().filter(|k| text::count_phrase(draft, k) == 0) {
            suggestions.push(format!("Mention keyword \"{}\"", missing));
        }

        let total_words = text::word_count(draft).max(1) as f64;
        let keyword_words: usize = keywords
            .iter()
            .map(|k| text::count_phrase(draft, k) * text::word_count(k).max(1))
            .sum();
        let density = keyword_words as f64 / total_words;
        let density_score = Self::density_score(density);
        if density > MAX_DENSITY {
            suggestions.push(format!(
                "Reduce keyword stuffing ({:.1}% density)",
                density * 100.0
            ));
        }

        let lead = text::paragraphs(draft).into_iter().next().unwrap_or_default();
        let placed = keywords.iter().any(|k| {
            text::count_phrase(&lead, k) > 0 || headings.iter().any(|h| text::count_phrase(h, k) > 0)
        });
        let placement = if placed {
            1.0
        } else {
            suggestions.push("Use a keyword in the opening paragraph or a heading".to_string());
            0.0
        };

        let value = weights.coverage * coverage
            + weights.density * density_score
            + weights.placement * placement
            + weights.structure * structure;
        debug!(coverage, density, placement, structure, value, "SEO scored");

        Ok(ValidatorScore {
            score: value.clamp(0.0, 1.0),
            suggestions,
        })
    }
}
