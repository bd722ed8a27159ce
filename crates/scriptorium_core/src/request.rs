//! The immutable generation request.

use crate::{Audience, BrandVoice, ContentType, OptimizationStrategy};
use scriptorium_error::{BuilderError, BuilderErrorKind};
use serde::{Deserialize, Serialize};

/// A request to generate one piece of content.
///
/// Requests are immutable once built. Optional fields are defaulted by the
/// builder, so downstream code never has to guess at missing values.
///
/// # Examples
///
/// ```
/// use scriptorium_core::{ContentType, GenerationRequestBuilder, OptimizationStrategy};
///
/// let request = GenerationRequestBuilder::default()
///     .content_type(ContentType::Guide)
///     .topic("Overwintering dahlia tubers")
///     .seo_keywords(vec!["dahlia".to_string(), "tubers".to_string()])
///     .max_length(900usize)
///     .build()
///     .unwrap();
///
/// assert_eq!(*request.content_type(), ContentType::Guide);
/// assert_eq!(*request.optimization_strategy(), OptimizationStrategy::Balanced);
/// assert!(*request.optimize());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct GenerationRequest {
    /// Kind of content to generate.
    content_type: ContentType,

    /// Subject of the content.
    #[builder(setter(into))]
    topic: String,

    /// Intended readership.
    #[serde(default)]
    #[builder(default)]
    audience: Audience,

    /// Keywords the content should rank for.
    #[serde(default)]
    #[builder(default)]
    seo_keywords: Vec<String>,

    /// Optional brand-voice descriptor.
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    brand_voice: Option<BrandVoice>,

    /// Optional upper bound on length, in words.
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    max_length: Option<usize>,

    /// Whether to apply the optimization strategy at all.
    #[serde(default = "default_optimize")]
    #[builder(default = "true")]
    optimize: bool,

    /// Optimization target when `optimize` is set.
    #[serde(default)]
    #[builder(default)]
    optimization_strategy: OptimizationStrategy,
}

fn default_optimize() -> bool {
    true
}

impl GenerationRequest {
    /// Start building a request.
    pub fn builder() -> GenerationRequestBuilder {
        GenerationRequestBuilder::default()
    }

    /// Effective optimization strategy, or `None` when optimization is disabled.
    pub fn effective_strategy(&self) -> Option<OptimizationStrategy> {
        self.optimize.then_some(self.optimization_strategy)
    }
}

impl GenerationRequestBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(topic) = &self.topic {
            if topic.trim().is_empty() {
                return Err("topic must not be blank".to_string());
            }
        }
        if let Some(Some(0)) = self.max_length {
            return Err("max_length must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl From<GenerationRequestBuilderError> for BuilderError {
    #[track_caller]
    fn from(err: GenerationRequestBuilderError) -> Self {
        let kind = match err {
            GenerationRequestBuilderError::UninitializedField(field) => {
                BuilderErrorKind::MissingField(field.to_string())
            }
            GenerationRequestBuilderError::ValidationError(reason) => {
                BuilderErrorKind::Rejected(reason)
            }
        };
        BuilderError::new(kind)
    }
}
