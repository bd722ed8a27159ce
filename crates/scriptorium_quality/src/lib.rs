//! Quality gates for generated drafts.
//!
//! A [`QualityPipeline`] runs a set of [`Validator`]s concurrently over a draft and
//! folds their scores into a [`QualityResult`] using fixed per-dimension weights.
//! A validator that cannot run never fails the draft: its dimension is scored as
//! neutral and flagged as degraded.
//!
//! The standard validator set covers fact consistency (against a
//! [`KnowledgeBase`]), brand voice, readability, SEO and template compliance.
//!
//! [`Validator`]: scriptorium_interface::Validator
//! [`KnowledgeBase`]: scriptorium_interface::KnowledgeBase
//! [`QualityResult`]: scriptorium_core::QualityResult

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod knowledge;
mod pipeline;
pub mod text;
mod validators;

pub use config::{QualityConfig, QualityConfigBuilder};
pub use knowledge::InMemoryKnowledgeBase;
pub use pipeline::QualityPipeline;
pub use validators::{
    BrandVoiceValidator, FactConsistencyValidator, ReadabilityValidator, SeoValidator,
    TemplateComplianceValidator,
};
