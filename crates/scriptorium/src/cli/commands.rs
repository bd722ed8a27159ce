//! CLI command definitions.

use clap::{Parser, Subcommand};
use scriptorium::{Audience, ContentType, OptimizationStrategy, ProcessingMode};
use std::path::PathBuf;

/// Scriptorium - generate validated content through multiple LLM providers
#[derive(Parser, Debug)]
#[command(name = "scriptorium")]
#[command(about = "Generate validated content through multiple LLM providers", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file layered over the bundled defaults
    #[arg(short, long, global = true, env = "SCRIPTORIUM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate one piece of content and print the job as JSON
    Generate {
        /// Subject of the content
        #[arg(long)]
        topic: String,

        /// Kind of content (article, caption, guide, review, blog-post,
        /// community-post, digest, interview)
        #[arg(long)]
        content_type: ContentType,

        /// Target audience (general, beginner, enthusiast, professional, or free text)
        #[arg(long, value_parser = parse_audience, default_value = "general")]
        audience: Audience,

        /// SEO keywords, comma separated
        #[arg(long, value_delimiter = ',')]
        keywords: Vec<String>,

        /// Optimization strategy (seo, engagement, balanced)
        #[arg(long)]
        strategy: Option<OptimizationStrategy>,

        /// Upper bound on length, in words
        #[arg(long)]
        max_length: Option<usize>,

        /// Skip optimization entirely
        #[arg(long)]
        no_optimize: bool,
    },

    /// Run a batch of requests from a TOML file, streaming progress
    Batch {
        /// Path to the batch TOML file
        #[arg(long)]
        file: PathBuf,

        /// Admission mode (concurrent, sequential, adaptive), overriding the file
        #[arg(long)]
        mode: Option<ProcessingMode>,

        /// Concurrency ceiling, overriding the file
        #[arg(long)]
        max_concurrent: Option<usize>,

        /// Cancel queued jobs on the first failure
        #[arg(long)]
        fail_fast: bool,
    },

    /// Probe every configured provider and print its health
    Providers,
}

/// Parse an audience name, falling back to a free-form description.
pub fn parse_audience(value: &str) -> Result<Audience, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("audience must not be blank".to_string());
    }
    Ok(match trimmed.to_ascii_lowercase().as_str() {
        "general" => Audience::General,
        "beginner" | "beginners" => Audience::Beginner,
        "enthusiast" | "enthusiasts" => Audience::Enthusiast,
        "professional" | "professionals" => Audience::Professional,
        _ => Audience::Custom(trimmed.to_string()),
    })
}
