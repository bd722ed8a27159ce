//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the scriptorium binary.

mod batch;
mod commands;
mod generate;
mod providers;

pub use batch::run_batch;
pub use commands::{Cli, Commands};
pub use generate::{GenerateOptions, run_generate};
pub use providers::probe_providers;

use scriptorium::{ScriptoriumConfig, ScriptoriumResult};
use std::path::Path;

/// Load configuration from `path` when given, otherwise from the standard locations.
pub fn load_config(path: Option<&Path>) -> ScriptoriumResult<ScriptoriumConfig> {
    match path {
        Some(path) => ScriptoriumConfig::from_file(path),
        None => ScriptoriumConfig::load(),
    }
}
