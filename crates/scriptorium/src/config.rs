//! Layered configuration for the whole engine.
//!
//! Sources, later overriding earlier:
//! 1. Bundled defaults (`scriptorium.toml` shipped with the crate)
//! 2. `~/.config/scriptorium/scriptorium.toml`
//! 3. `./scriptorium.toml`
//! 4. `SCRIPTORIUM_<SECTION>__<KEY>` environment variables

use config::{Config, Environment, File, FileFormat};
use scriptorium_engine::{SchedulerConfig, TimeoutPolicy};
use scriptorium_error::{ConfigError, ScriptoriumError, ScriptoriumResult};
use scriptorium_quality::QualityConfig;
use scriptorium_router::{ProviderProfile, RouterConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../scriptorium.toml");

fn default_expected_latency_ms() -> u64 {
    5_000
}

fn default_provider_quality() -> f64 {
    0.5
}

/// One OpenAI-compatible provider endpoint.
///
/// ```toml
/// [[providers]]
/// id = "groq"
/// base_url = "https://api.groq.com/openai/v1"
/// model = "llama-3.3-70b-versatile"
/// api_key_env = "GROQ_API_KEY"
/// cost_per_token = 0.0000008
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ProviderSettings {
    /// Unique provider id
    id: String,
    /// Base URL of the chat-completions API
    base_url: String,
    /// Model name sent with each request
    model: String,
    /// Environment variable holding the API key
    #[serde(default)]
    api_key_env: Option<String>,
    /// Price per token, used for routing and cost estimates
    #[serde(default)]
    cost_per_token: f64,
    /// Latency assumed before the first call completes
    #[serde(default = "default_expected_latency_ms")]
    expected_latency_ms: u64,
    /// Quality rank input in `[0, 1]`
    #[serde(default = "default_provider_quality")]
    quality: f64,
}

impl ProviderSettings {
    /// Settings for an unauthenticated endpoint with default profile values.
    pub fn new(id: impl Into<String>, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            base_url: base_url.into(),
            model: model.into(),
            api_key_env: None,
            cost_per_token: 0.0,
            expected_latency_ms: default_expected_latency_ms(),
            quality: default_provider_quality(),
        }
    }

    /// Read the API key from `var`.
    pub fn with_api_key_env(mut self, var: impl Into<String>) -> Self {
        self.api_key_env = Some(var.into());
        self
    }

    /// Set the price per token.
    pub fn with_cost_per_token(mut self, cost_per_token: f64) -> Self {
        self.cost_per_token = cost_per_token;
        self
    }

    /// Set the quality rank input.
    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality = quality;
        self
    }

    /// Routing profile seeded from these settings.
    pub fn profile(&self) -> ProviderProfile {
        ProviderProfile::new(
            self.quality,
            self.cost_per_token,
            Duration::from_millis(self.expected_latency_ms),
        )
    }

    /// API key from the configured environment variable, if both are set.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.trim().is_empty())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::new("providers.id must not be blank"));
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::new(format!(
                "providers.{}.base_url must not be blank",
                self.id
            )));
        }
        if self.cost_per_token < 0.0 {
            return Err(ConfigError::new(format!(
                "providers.{}.cost_per_token must not be negative",
                self.id
            )));
        }
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(ConfigError::new(format!(
                "providers.{}.quality must be in [0, 1], got {}",
                self.id, self.quality
            )));
        }
        Ok(())
    }
}

/// Top-level Scriptorium configuration.
///
/// # Example
///
/// ```no_run
/// use scriptorium::ScriptoriumConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ScriptoriumConfig::load()?;
/// println!("threshold: {}", config.quality().threshold());
/// # Ok(())
/// # }
/// ```
#[derive(
    Debug, Clone, PartialEq, Default, Serialize, Deserialize, derive_getters::Getters,
)]
pub struct ScriptoriumConfig {
    /// Routing and health tracking
    #[serde(default)]
    router: RouterConfig,
    /// Quality gate
    #[serde(default)]
    quality: QualityConfig,
    /// Standalone job limits and progress channel
    #[serde(default)]
    scheduler: SchedulerConfig,
    /// Provider call deadlines
    #[serde(default)]
    timeouts: TimeoutPolicy,
    /// Provider endpoints
    #[serde(default)]
    providers: Vec<ProviderSettings>,
}

impl ScriptoriumConfig {
    /// Assemble a configuration from its sections.
    pub fn new(
        router: RouterConfig,
        quality: QualityConfig,
        scheduler: SchedulerConfig,
        timeouts: TimeoutPolicy,
    ) -> Self {
        Self {
            router,
            quality,
            scheduler,
            timeouts,
            providers: Vec::new(),
        }
    }

    /// Add a provider endpoint.
    pub fn with_provider(mut self, provider: ProviderSettings) -> Self {
        self.providers.push(provider);
        self
    }

    /// Load with precedence: environment > current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and skipped when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the result fails validation.
    #[instrument]
    pub fn load() -> ScriptoriumResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/scriptorium/scriptorium.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("scriptorium").required(false))
            .add_source(Self::environment());

        Self::finish(builder)
    }

    /// Load bundled defaults overlaid with one file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unparsable, or fails validation.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> ScriptoriumResult<Self> {
        debug!("Loading configuration from file");

        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()))
            .add_source(Self::environment());

        Self::finish(builder).map_err(|e| {
            ScriptoriumError::from(ConfigError::new(format!(
                "{}: {}",
                path.as_ref().display(),
                e
            )))
        })
    }

    /// Parse a TOML document overlaid on the bundled defaults.
    ///
    /// Environment variables are not consulted.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is unparsable or fails validation.
    pub fn from_toml_str(document: &str) -> ScriptoriumResult<Self> {
        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(document, FileFormat::Toml));
        Self::finish(builder)
    }

    fn environment() -> Environment {
        Environment::with_prefix("SCRIPTORIUM")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> ScriptoriumResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| {
                ScriptoriumError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                ScriptoriumError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;
        config.validate()?;
        debug!(providers = config.providers.len(), "Configuration loaded");
        Ok(config)
    }

    /// Check every section.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.router.validate()?;
        self.quality.validate()?;
        self.scheduler.validate()?;
        self.timeouts.validate()?;

        let mut seen = HashSet::new();
        for provider in &self.providers {
            provider.validate()?;
            if !seen.insert(provider.id.as_str()) {
                return Err(ConfigError::new(format!(
                    "provider id \"{}\" is declared twice",
                    provider.id
                )));
            }
        }
        Ok(())
    }
}
