//! Single request command handler.

use scriptorium::{
    Audience, BuilderError, CancelTarget, ContentType, GenerationRequest, JobState, OptimizationStrategy,
    Scriptorium, ScriptoriumConfig, require_providers,
};
use tracing::{info, warn};

/// Request fields collected from the command line.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Subject of the content
    pub topic: String,
    /// Kind of content
    pub content_type: ContentType,
    /// Target audience
    pub audience: Audience,
    /// SEO keywords
    pub keywords: Vec<String>,
    /// Strategy override
    pub strategy: Option<OptimizationStrategy>,
    /// Length limit in words
    pub max_length: Option<usize>,
    /// Disable optimization
    pub no_optimize: bool,
}

impl GenerateOptions {
    fn into_request(self) -> Result<GenerationRequest, Box<dyn std::error::Error>> {
        let mut builder = GenerationRequest::builder();
        builder
            .content_type(self.content_type)
            .topic(self.topic)
            .audience(self.audience)
            .seo_keywords(self.keywords)
            .optimize(!self.no_optimize);
        if let Some(strategy) = self.strategy {
            builder.optimization_strategy(strategy);
        }
        if let Some(limit) = self.max_length {
            builder.max_length(limit);
        }
        Ok(builder.build().map_err(BuilderError::from)?)
    }
}

/// Run one job to completion and print its view as JSON.
///
/// Ctrl-C cancels the job; the view is still printed.
pub async fn run_generate(
    config: &ScriptoriumConfig,
    options: GenerateOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    require_providers(config)?;
    let request = options.into_request()?;
    let scriptorium = Scriptorium::from_config(config)?;
    let scheduler = scriptorium.scheduler();

    let id = scheduler.submit(request);
    info!(job = %id, "Job submitted");

    let wait = scheduler.wait_for_job(id);
    tokio::pin!(wait);
    let view = tokio::select! {
        view = &mut wait => view?,
        _ = tokio::signal::ctrl_c() => {
            warn!(job = %id, "Interrupted, cancelling");
            scheduler.cancel(CancelTarget::Job(id))?;
            wait.await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&view)?);

    match view.state {
        JobState::Completed => {
            if view.below_threshold() {
                warn!("Content is below the quality threshold");
            }
            Ok(())
        }
        JobState::Failed => {
            let message = view
                .error
                .map(|failure| failure.message)
                .unwrap_or_else(|| "unknown failure".to_string());
            Err(format!("generation failed: {}", message).into())
        }
        state => Err(format!("generation ended {}", state).into()),
    }
}
