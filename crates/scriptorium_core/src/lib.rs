//! Core data types for the Scriptorium content generation engine.
//!
//! This crate provides the foundation data types shared by the router, the quality
//! pipeline and the job scheduler: generation requests, job and batch snapshots,
//! quality results and progress events.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod batch;
mod content;
mod events;
mod ids;
mod job;
mod quality;
mod request;

pub use batch::{BatchCounts, BatchRequest, BatchStatus, BatchView, ProcessingMode};
pub use content::{Audience, BrandVoice, ContentType, OptimizationStrategy};
pub use events::{EventSubject, ProgressEvent, Transition};
pub use ids::{BatchId, JobId};
pub use job::{GenerationJob, JobFailure, JobFailureKind, JobState, JobView};
pub use quality::{DEFAULT_QUALITY_THRESHOLD, NEUTRAL_SCORE, QualityResult, ValidatorKind};
pub use request::{GenerationRequest, GenerationRequestBuilder, GenerationRequestBuilderError};
