//! Tracing subscriber setup.
//!
//! Always installs an env-filtered fmt layer (plain or JSON). With the
//! `observability` feature, spans are also bridged to OpenTelemetry and
//! exported to stdout.

use std::env;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration for logging and span export.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name for telemetry attribution
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Log level filter (e.g., "info", "scriptorium_engine=debug")
    pub log_level: String,
    /// Enable JSON-formatted logs for structured logging
    pub json_logs: bool,
}

impl ObservabilityConfig {
    /// Create a new configuration with the given service name.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            json_logs: false,
        }
    }

    /// Set the service version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable JSON-formatted logs.
    pub fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }

    fn filter(&self) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&self.log_level))
    }

    fn fmt_layer<S>(&self) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    {
        if self.json_logs {
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_level(true)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .boxed()
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"))
    }
}

/// Initialize logging with default configuration.
pub fn init_observability() -> Result<(), Box<dyn std::error::Error>> {
    init_observability_with_config(ObservabilityConfig::default())
}

/// Initialize logging, plus OpenTelemetry span export when the
/// `observability` feature is enabled.
#[cfg(feature = "observability")]
pub fn init_observability_with_config(
    config: ObservabilityConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    use opentelemetry::{KeyValue, global, trace::TracerProvider};
    use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
    use opentelemetry_stdout::SpanExporter;

    let resource = Resource::builder()
        .with_service_name(config.service_name.clone())
        .with_attributes(vec![KeyValue::new(
            "service.version",
            config.service_version.clone(),
        )])
        .build();

    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(SpanExporter::default())
        .with_resource(resource)
        .build();
    global::set_tracer_provider(provider.clone());

    let tracer = provider.tracer(config.service_name.clone());
    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    tracing_subscriber::registry()
        .with(config.filter()?)
        .with(config.fmt_layer())
        .with(otel_layer)
        .try_init()?;

    Ok(())
}

/// Initialize logging.
#[cfg(not(feature = "observability"))]
pub fn init_observability_with_config(
    config: ObservabilityConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(config.filter()?)
        .with(config.fmt_layer())
        .try_init()?;

    Ok(())
}

/// Flush exporters before exit.
///
/// The stdout exporter flushes when its provider drops, so there is nothing to do.
pub fn shutdown_observability() {}
