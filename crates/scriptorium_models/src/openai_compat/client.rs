//! HTTP client for OpenAI-compatible endpoints.

use super::dto::{ChatMessage, ChatRequest, ChatResponse, ChatRole};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scriptorium_error::{ProviderError, ProviderErrorKind};
use scriptorium_interface::{
    GenerationConstraints, Prompt, ProviderAdapter, ProviderHealthStatus, ProviderReply,
};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Provider speaking the OpenAI chat-completions protocol.
///
/// # Examples
///
/// ```
/// use scriptorium_interface::ProviderAdapter;
/// use scriptorium_models::OpenAiCompatibleProvider;
///
/// let provider = OpenAiCompatibleProvider::new(
///     "groq",
///     "https://api.groq.com/openai/v1",
///     "llama-3.3-70b-versatile",
/// )
/// .with_api_key("gsk-test")
/// .with_cost_per_token(0.000_000_59);
///
/// assert_eq!(provider.id(), "groq");
/// assert_eq!(provider.model_name(), "llama-3.3-70b-versatile");
/// ```
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: Client,
    id: String,
    base_url: String,
    model: String,
    api_key: Option<String>,
    cost_per_token: f64,
}

impl OpenAiCompatibleProvider {
    /// Create a provider for `base_url` (e.g. `https://api.groq.com/openai/v1`).
    pub fn new(id: impl Into<String>, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            id: id.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: None,
            cost_per_token: 0.0,
        }
    }

    /// Authenticate with a bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Use a preconfigured HTTP client (proxies, TLS roots, pooling).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Price used for cost estimates.
    pub fn with_cost_per_token(mut self, cost_per_token: f64) -> Self {
        self.cost_per_token = cost_per_token;
        self
    }

    /// Endpoint base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    fn transport_error(error: reqwest::Error, timeout: Duration) -> ProviderError {
        if error.is_timeout() {
            ProviderError::new(ProviderErrorKind::Timeout(timeout.as_millis() as u64))
        } else {
            ProviderError::new(ProviderErrorKind::Transport(error.to_string()))
        }
    }

    fn status_error(status: StatusCode, message: String) -> ProviderError {
        let kind = if status == StatusCode::TOO_MANY_REQUESTS {
            ProviderErrorKind::RateLimited(message)
        } else if status.is_server_error() {
            ProviderErrorKind::Server {
                status: status.as_u16(),
                message,
            }
        } else {
            ProviderErrorKind::Rejected {
                status: status.as_u16(),
                message,
            }
        };
        ProviderError::new(kind)
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiCompatibleProvider {
    #[instrument(
        skip(self, prompt, constraints),
        fields(provider = %self.id, model = %self.model, timeout_ms = timeout.as_millis() as u64)
    )]
    async fn generate(
        &self,
        prompt: &Prompt,
        constraints: &GenerationConstraints,
        timeout: Duration,
    ) -> Result<ProviderReply, ProviderError> {
        let body = ChatRequest::builder()
            .model(self.model.clone())
            .messages(vec![
                ChatMessage::new(ChatRole::System, prompt.system().as_str()),
                ChatMessage::new(ChatRole::User, prompt.user().as_str()),
            ])
            .max_tokens(*constraints.max_tokens())
            .temperature(Some(*constraints.temperature()))
            .build()
            .map_err(|e| ProviderError::new(ProviderErrorKind::InvalidResponse(e.to_string())))?;

        let url = format!("{}/chat/completions", self.base_url);
        debug!(url = %url, "Sending chat completion request");

        let response = self
            .authorize(self.client.post(&url))
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::transport_error(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Provider returned error status");
            return Err(Self::status_error(status, message));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Self::transport_error(e, timeout))?;

        let text = parsed
            .choices()
            .first()
            .map(|choice| choice.message().content().clone())
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::new(ProviderErrorKind::InvalidResponse(
                    "response contained no completion text".to_string(),
                ))
            })?;

        let token_count = match parsed.usage() {
            Some(usage) if *usage.total_tokens() > 0 => *usage.total_tokens(),
            Some(usage) => usage.prompt_tokens() + usage.completion_tokens(),
            None => 0,
        };
        let cost_estimate = f64::from(token_count) * self.cost_per_token;

        debug!(token_count, cost_estimate, "Chat completion received");
        Ok(ProviderReply {
            text,
            token_count,
            cost_estimate,
        })
    }

    #[instrument(skip(self), fields(provider = %self.id))]
    async fn health_check(&self) -> ProviderHealthStatus {
        let url = format!("{}/models", self.base_url);
        let result = self
            .authorize(self.client.get(&url))
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => ProviderHealthStatus::Healthy,
            Ok(response) => ProviderHealthStatus::Unavailable {
                reason: format!("health check returned {}", response.status()),
            },
            Err(e) => ProviderHealthStatus::Unavailable {
                reason: e.to_string(),
            },
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
