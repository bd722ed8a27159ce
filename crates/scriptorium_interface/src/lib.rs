//! Trait interfaces consumed by the Scriptorium orchestration engine.
//!
//! The engine never talks to an LLM vendor, a quality heuristic or a fact store
//! directly. It goes through the traits defined here:
//!
//! - [`ProviderAdapter`] - one LLM backend that turns a prompt into draft text
//! - [`Validator`] - one quality dimension scored over a draft
//! - [`KnowledgeBase`] - the fact store used by fact-consistency validation

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;

pub use traits::{KnowledgeBase, ProviderAdapter, Validator};
pub use types::{
    FactCheckResult, FactVerdict, GenerationConstraints, GenerationConstraintsBuilder, Prompt,
    ProviderHealthStatus, ProviderReply, ValidatorScore,
};
