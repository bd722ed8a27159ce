//! Wiring configuration into a running engine.

use crate::{ProviderSettings, ScriptoriumConfig};
use scriptorium_engine::{GenerationEngine, Scheduler};
use scriptorium_error::{ConfigError, ScriptoriumResult};
use scriptorium_interface::KnowledgeBase;
use scriptorium_models::OpenAiCompatibleProvider;
use scriptorium_quality::{InMemoryKnowledgeBase, QualityPipeline};
use scriptorium_router::ProviderRouter;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Router, engine and scheduler built from one configuration.
///
/// # Example
///
/// ```no_run
/// use scriptorium::{ContentType, GenerationRequest, Scriptorium, ScriptoriumConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let scriptorium = Scriptorium::from_config(&ScriptoriumConfig::load()?)?;
/// let request = GenerationRequest::builder()
///     .content_type(ContentType::Caption)
///     .topic("Spring seed swap")
///     .build()?;
///
/// let id = scriptorium.scheduler().submit(request);
/// let view = scriptorium.scheduler().wait_for_job(id).await?;
/// println!("{:?}", view.content);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Scriptorium {
    router: Arc<ProviderRouter>,
    scheduler: Scheduler,
}

impl Scriptorium {
    /// Build from configuration, registering an OpenAI-compatible adapter per provider.
    ///
    /// Fact checks run against an empty in-memory knowledge base; use
    /// [`Scriptorium::with_knowledge_base`] to supply a real one.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a provider id repeats.
    pub fn from_config(config: &ScriptoriumConfig) -> ScriptoriumResult<Self> {
        Self::with_knowledge_base(config, Arc::new(InMemoryKnowledgeBase::new()))
    }

    /// Build from configuration with the given knowledge base.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a provider id repeats.
    #[instrument(skip_all, fields(providers = config.providers().len()))]
    pub fn with_knowledge_base(
        config: &ScriptoriumConfig,
        knowledge_base: Arc<dyn KnowledgeBase>,
    ) -> ScriptoriumResult<Self> {
        config.validate()?;

        let mut router = ProviderRouter::new(config.router().clone());
        for settings in config.providers() {
            router.register(Arc::new(Self::adapter(settings)), settings.profile())?;
        }
        if router.is_empty() {
            warn!("No providers configured, every job will fail");
        }

        Self::with_router(config, router, knowledge_base)
    }

    /// Build around an already populated router.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheduler section is invalid.
    pub fn with_router(
        config: &ScriptoriumConfig,
        router: ProviderRouter,
        knowledge_base: Arc<dyn KnowledgeBase>,
    ) -> ScriptoriumResult<Self> {
        let router = Arc::new(router);
        let pipeline = QualityPipeline::standard(knowledge_base, *config.quality().threshold());
        let engine = GenerationEngine::new(Arc::clone(&router), pipeline, config.quality().clone())
            .with_timeouts(config.timeouts().clone());
        let scheduler = Scheduler::new(Arc::new(engine), config.scheduler().clone())?;

        info!(providers = router.len(), "Scriptorium ready");
        Ok(Self { router, scheduler })
    }

    fn adapter(settings: &ProviderSettings) -> OpenAiCompatibleProvider {
        let provider = OpenAiCompatibleProvider::new(
            settings.id().clone(),
            settings.base_url().clone(),
            settings.model().clone(),
        )
        .with_cost_per_token(*settings.cost_per_token());

        match (settings.api_key(), settings.api_key_env()) {
            (Some(key), _) => provider.with_api_key(key),
            (None, Some(var)) => {
                warn!(provider = %settings.id(), var = %var, "API key variable is not set");
                provider
            }
            (None, None) => provider,
        }
    }

    /// The provider router.
    pub fn router(&self) -> &Arc<ProviderRouter> {
        &self.router
    }

    /// The job scheduler.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
}

/// Reject configurations that cannot generate anything.
pub fn require_providers(config: &ScriptoriumConfig) -> Result<(), ConfigError> {
    if config.providers().is_empty() {
        return Err(ConfigError::new(
            "no [[providers]] configured; add one to scriptorium.toml",
        ));
    }
    Ok(())
}
