//! Scriptorium - multi-provider LLM content generation
//!
//! Scriptorium turns content requests into validated drafts. Each request is
//! routed to one of several interchangeable LLM providers, the draft is scored
//! by a quality pipeline, and weak drafts are regenerated. Requests run alone
//! or in batches with bounded concurrency, progress events and cancellation.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use scriptorium::{BatchRequest, ContentType, GenerationRequest, Scriptorium, ScriptoriumConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scriptorium = Scriptorium::from_config(&ScriptoriumConfig::load()?)?;
//!
//!     let requests = ["Pruning roses", "Composting basics"]
//!         .into_iter()
//!         .map(|topic| {
//!             GenerationRequest::builder()
//!                 .content_type(ContentType::Guide)
//!                 .topic(topic)
//!                 .build()
//!         })
//!         .collect::<Result<Vec<_>, _>>()?;
//!
//!     let batch = scriptorium.scheduler().submit_batch(BatchRequest::new(requests))?;
//!     let view = scriptorium.scheduler().wait_for_batch(batch).await?;
//!     println!("{:?}", view.status);
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `observability` - export tracing spans through OpenTelemetry (stdout)
//! - `api` - enable tests that call real provider APIs
//!
//! # Architecture
//!
//! - `scriptorium_error` - Error types
//! - `scriptorium_core` - Requests, jobs, batches, quality results, progress events
//! - `scriptorium_interface` - Provider, validator and knowledge base traits
//! - `scriptorium_models` - Provider adapters
//! - `scriptorium_router` - Provider health and routing strategies
//! - `scriptorium_quality` - Validators and the quality pipeline
//! - `scriptorium_engine` - Generation engine and job scheduler
//!
//! This crate re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
pub mod observability;
mod runtime;

pub use config::{ProviderSettings, ScriptoriumConfig};
pub use runtime::{Scriptorium, require_providers};

pub use scriptorium_core::*;
pub use scriptorium_engine::*;
pub use scriptorium_error::*;
pub use scriptorium_interface::*;
pub use scriptorium_models::*;
pub use scriptorium_quality::*;
pub use scriptorium_router::*;
