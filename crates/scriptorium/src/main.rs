//! Scriptorium CLI binary.
//!
//! This binary provides command-line access to Scriptorium's functionality:
//! - Generate a single piece of content
//! - Run batches from TOML files with live progress
//! - Probe provider health

use clap::Parser;
use scriptorium::observability::{
    ObservabilityConfig, init_observability_with_config, shutdown_observability,
};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, GenerateOptions, load_config, probe_providers, run_batch, run_generate};

    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut observability = ObservabilityConfig::default().with_json_logs(cli.json_logs);
    if cli.verbose {
        observability = observability.with_log_level("debug");
    }
    init_observability_with_config(observability)?;

    let config = load_config(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Generate {
            topic,
            content_type,
            audience,
            keywords,
            strategy,
            max_length,
            no_optimize,
        } => {
            let options = GenerateOptions {
                topic,
                content_type,
                audience,
                keywords,
                strategy,
                max_length,
                no_optimize,
            };
            run_generate(&config, options).await
        }

        Commands::Batch {
            file,
            mode,
            max_concurrent,
            fail_fast,
        } => run_batch(&config, &file, mode, max_concurrent, fail_fast).await,

        Commands::Providers => probe_providers(&config).await,
    };

    shutdown_observability();
    result
}
