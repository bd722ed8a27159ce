//! Quality scoring results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Score assigned to a validator that could not run.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Composite score a draft must reach to pass.
pub const DEFAULT_QUALITY_THRESHOLD: f64 = 0.70;

/// The fixed set of quality dimensions, each with a fixed weight.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ValidatorKind {
    /// Claims agree with the knowledge base
    FactAccuracy,
    /// Text matches the brand voice
    BrandConsistency,
    /// Text suits the audience's reading level
    Readability,
    /// Keyword coverage and structure
    Seo,
    /// Shape matches the content type's template
    TemplateCompliance,
}

impl ValidatorKind {
    /// Weight of this dimension in the composite score. Weights sum to 1.0.
    pub fn weight(&self) -> f64 {
        match self {
            ValidatorKind::FactAccuracy => 0.25,
            ValidatorKind::BrandConsistency => 0.20,
            ValidatorKind::Readability => 0.20,
            ValidatorKind::Seo => 0.20,
            ValidatorKind::TemplateCompliance => 0.15,
        }
    }
}

/// Outcome of running the validator set over one draft.
///
/// # Examples
///
/// ```
/// use scriptorium_core::{QualityResult, ValidatorKind};
/// use std::collections::BTreeMap;
///
/// let mut scores = BTreeMap::new();
/// scores.insert(ValidatorKind::FactAccuracy, 1.0);
/// scores.insert(ValidatorKind::BrandConsistency, 1.0);
/// scores.insert(ValidatorKind::Readability, 1.0);
/// scores.insert(ValidatorKind::Seo, 1.0);
/// scores.insert(ValidatorKind::TemplateCompliance, 1.0);
///
/// let result = QualityResult::new(scores, vec![], vec![], 0.7);
/// assert!((result.composite() - 1.0).abs() < 1e-9);
/// assert!(result.passed());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityResult {
    scores: BTreeMap<ValidatorKind, f64>,
    composite: f64,
    suggestions: Vec<String>,
    degraded: Vec<ValidatorKind>,
    threshold: f64,
    passed: bool,
}

impl QualityResult {
    /// Build a result, computing the weighted composite.
    ///
    /// Every dimension contributes with its fixed weight. Dimensions missing
    /// from `scores` contribute [`NEUTRAL_SCORE`] and are recorded in the
    /// stored score map with that value. Scores are clamped to `[0, 1]`.
    pub fn new(
        scores: BTreeMap<ValidatorKind, f64>,
        suggestions: Vec<String>,
        degraded: Vec<ValidatorKind>,
        threshold: f64,
    ) -> Self {
        use strum::IntoEnumIterator;

        let mut complete = BTreeMap::new();
        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        for kind in ValidatorKind::iter() {
            let score = scores
                .get(&kind)
                .copied()
                .filter(|s| s.is_finite())
                .unwrap_or(NEUTRAL_SCORE)
                .clamp(0.0, 1.0);
            complete.insert(kind, score);
            weighted += kind.weight() * score;
            total_weight += kind.weight();
        }
        let composite = (weighted / total_weight).clamp(0.0, 1.0);

        Self {
            scores: complete,
            composite,
            suggestions,
            degraded,
            threshold,
            passed: composite >= threshold,
        }
    }

    /// Per-dimension scores.
    pub fn scores(&self) -> &BTreeMap<ValidatorKind, f64> {
        &self.scores
    }

    /// Score for one dimension.
    pub fn score(&self, kind: ValidatorKind) -> f64 {
        self.scores.get(&kind).copied().unwrap_or(NEUTRAL_SCORE)
    }

    /// Weighted composite score in `[0, 1]`.
    pub fn composite(&self) -> f64 {
        self.composite
    }

    /// Human-readable improvement suggestions.
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// Dimensions whose validator could not run.
    pub fn degraded(&self) -> &[ValidatorKind] {
        &self.degraded
    }

    /// Threshold the composite was compared against.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether the composite reached the threshold.
    pub fn passed(&self) -> bool {
        self.passed
    }
}
