//! Brand voice consistency.

use crate::text;
use async_trait::async_trait;
use regex::RegexBuilder;
use scriptorium_core::{GenerationRequest, ValidatorKind};
use scriptorium_error::{ValidationError, ValidationErrorKind};
use scriptorium_interface::{Validator, ValidatorScore};
use tracing::instrument;

const AVOIDED_PHRASE_PENALTY: f64 = 0.25;
const SHOUTING_PENALTY: f64 = 0.1;
const MAX_SHOUTING_PENALTY: f64 = 0.3;
const EXCLAMATION_RATIO: f64 = 0.2;
const EXCLAMATION_PENALTY: f64 = 0.15;

/// Checks a draft against the request's brand voice.
///
/// Penalizes avoided phrases, all-caps shouting and exclamation overuse. When
/// tone markers are given, drafts that echo them score higher.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrandVoiceValidator;

impl BrandVoiceValidator {
    /// Create the validator.
    pub fn new() -> Self {
        Self
    }

    fn avoided_occurrences(draft: &str, phrase: &str) -> Result<usize, ValidationError> {
        let pattern = format!(r"\b{}\b", regex::escape(phrase.trim()));
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                ValidationError::new(ValidationErrorKind::Configuration(format!(
                    "Invalid avoided phrase '{}': {}",
                    phrase, e
                )))
            })?;
        Ok(regex.find_iter(draft).count())
    }
}

#[async_trait]
impl Validator for BrandVoiceValidator {
    fn kind(&self) -> ValidatorKind {
        ValidatorKind::BrandConsistency
    }

    #[instrument(skip(self, draft, request))]
    async fn score(
        &self,
        draft: &str,
        request: &GenerationRequest,
    ) -> Result<ValidatorScore, ValidationError> {
        let mut suggestions = Vec::new();
        let mut value = 1.0;

        if let Some(voice) = request.brand_voice() {
            if !voice.tone.is_empty() {
                let echoed = voice
                    .tone
                    .iter()
                    .filter(|marker| text::count_phrase(draft, marker) > 0)
                    .count();
                value = 0.85 + 0.15 * (echoed as f64 / voice.tone.len() as f64);
                if echoed == 0 {
                    suggestions.push(format!(
                        "Lean into the brand tone ({})",
                        voice.tone.join(", ")
                    ));
                }
            }

            for phrase in voice.avoid.iter().filter(|p| !p.trim().is_empty()) {
                let hits = Self::avoided_occurrences(draft, phrase)?;
                if hits > 0 {
                    value -= AVOIDED_PHRASE_PENALTY * hits as f64;
                    suggestions.push(format!("Remove off-brand phrase \"{}\"", phrase));
                }
            }
        }

        let shouting = text::shouting_words(draft);
        if shouting > 0 {
            value -= (SHOUTING_PENALTY * shouting as f64).min(MAX_SHOUTING_PENALTY);
            suggestions.push("Avoid all-caps words".to_string());
        }

        let sentences = text::sentences(draft);
        if !sentences.is_empty() {
            let exclaimed = sentences.iter().filter(|s| s.ends_with('!')).count();
            if exclaimed as f64 / sentences.len() as f64 > EXCLAMATION_RATIO {
                value -= EXCLAMATION_PENALTY;
                suggestions.push("Use fewer exclamation marks".to_string());
            }
        }

        Ok(ValidatorScore {
            score: f64::clamp(value, 0.0, 1.0),
            suggestions,
        })
    }
}
