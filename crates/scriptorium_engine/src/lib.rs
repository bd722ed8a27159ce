//! Generation engine and job scheduler for Scriptorium.
//!
//! The [`GenerationEngine`] turns one [`GenerationRequest`](scriptorium_core::GenerationRequest)
//! into accepted content: it builds the prompt, routes it to a provider with
//! failover, scores the draft through the quality pipeline and regenerates while
//! the draft falls short. The [`Scheduler`] runs engine jobs singly or in
//! batches under a concurrency limit, tracks their state and broadcasts
//! progress.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod admission;
mod config;
mod engine;
mod prompt;
mod scheduler;
mod timeout;

pub use admission::{AdmissionController, AdmissionPermit};
pub use config::{SchedulerConfig, SchedulerConfigBuilder};
pub use engine::{GenerationEngine, GenerationOutcome};
pub use prompt::PromptBuilder;
pub use scheduler::{CancelAck, CancelTarget, ProgressStream, Scheduler};
pub use timeout::TimeoutPolicy;
