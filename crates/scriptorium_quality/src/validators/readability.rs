//! Readability for the target audience.

use crate::text;
use async_trait::async_trait;
use scriptorium_core::{Audience, GenerationRequest, ValidatorKind};
use scriptorium_error::ValidationError;
use scriptorium_interface::{Validator, ValidatorScore};
use tracing::{debug, instrument};

const LONG_SENTENCE_WORDS: usize = 30;
/// Flesch points outside the target band that bring the score to zero.
const BAND_FALLOFF: f64 = 40.0;

/// Compares Flesch reading ease against a band chosen for the audience.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadabilityValidator;

impl ReadabilityValidator {
    /// Create the validator.
    pub fn new() -> Self {
        Self
    }

    /// Acceptable Flesch reading-ease band for an audience.
    pub fn target_band(audience: &Audience) -> (f64, f64) {
        match audience {
            Audience::Beginner => (70.0, 120.0),
            Audience::General | Audience::Custom(_) => (60.0, 80.0),
            Audience::Enthusiast => (50.0, 70.0),
            Audience::Professional => (30.0, 60.0),
        }
    }
}

#[async_trait]
impl Validator for ReadabilityValidator {
    fn kind(&self) -> ValidatorKind {
        ValidatorKind::Readability
    }

    #[instrument(skip(self, draft, request))]
    async fn score(
        &self,
        draft: &str,
        request: &GenerationRequest,
    ) -> Result<ValidatorScore, ValidationError> {
        let Some(ease) = text::flesch_reading_ease(draft) else {
            return Ok(ValidatorScore::new(0.0).with_suggestion("Draft contains no readable text"));
        };

        let (low, high) = Self::target_band(request.audience());
        let mut score = if ease < low {
            ValidatorScore::new(1.0 - (low - ease) / BAND_FALLOFF).with_suggestion(format!(
                "Simplify wording for {} (reading ease {:.0}, target {:.0}-{:.0})",
                request.audience(),
                ease,
                low,
                high
            ))
        } else if ease > high {
            ValidatorScore::new(1.0 - (ease - high) / BAND_FALLOFF).with_suggestion(format!(
                "Add depth for {} (reading ease {:.0}, target {:.0}-{:.0})",
                request.audience(),
                ease,
                low,
                high
            ))
        } else {
            ValidatorScore::new(1.0)
        };

        let sentences = text::sentences(draft);
        let long = sentences
            .iter()
            .filter(|s| text::word_count(s) > LONG_SENTENCE_WORDS)
            .count();
        if long > 0 {
            let share = long as f64 / sentences.len().max(1) as f64;
            score.score = (score.score - 0.5 * share).clamp(0.0, 1.0);
            score = score.with_suggestion(format!(
                "Split {} sentence(s) longer than {} words",
                long, LONG_SENTENCE_WORDS
            ));
        }

        debug!(ease, score = score.score, "Readability scored");
        Ok(score)
    }
}
