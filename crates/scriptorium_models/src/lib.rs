//! Provider adapters for Scriptorium.
//!
//! - [`OpenAiCompatibleProvider`] speaks the OpenAI chat-completions protocol, which
//!   covers Groq, OpenRouter, Together, vLLM, Ollama and most hosted gateways.
//! - [`MockProvider`] is a scripted in-memory provider for tests and dry runs.
//!
//! [`ProviderMetrics`] records OpenTelemetry counters for every provider call.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod metrics;
mod mock;
mod openai_compat;

pub use metrics::ProviderMetrics;
pub use mock::{MockProvider, MockStep};
pub use openai_compat::OpenAiCompatibleProvider;
