//! Error types for the Scriptorium library.
//!
//! This crate provides the foundation error types used throughout the Scriptorium workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use scriptorium_error::{ScriptoriumResult, ConfigError};
//!
//! fn load() -> ScriptoriumResult<String> {
//!     Err(ConfigError::new("missing [router] section"))?
//! }
//!
//! match load() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod error;
mod generation;
mod provider;
mod router;
mod scheduler;
mod validation;

pub use builder::{BuilderError, BuilderErrorKind};
pub use config::ConfigError;
pub use error::{ScriptoriumError, ScriptoriumErrorKind, ScriptoriumResult};
pub use generation::{GenerationError, GenerationErrorKind};
pub use provider::{ProviderError, ProviderErrorKind};
pub use router::{RouterError, RouterErrorKind};
pub use scheduler::{SchedulerError, SchedulerErrorKind};
pub use validation::{ValidationError, ValidationErrorKind};
