//! Chat-completions wire types.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ChatRole {
    /// System instructions
    System,
    /// User message
    User,
    /// Model reply
    Assistant,
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub(crate) struct ChatMessage {
    role: ChatRole,
    content: String,
}

impl ChatMessage {
    pub(crate) fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Chat-completions request body.
#[derive(Debug, Clone, Serialize, Builder)]
#[builder(setter(into))]
pub(crate) struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl ChatRequest {
    pub(crate) fn builder() -> ChatRequestBuilder {
        ChatRequestBuilder::default()
    }
}

/// Token usage block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Getters)]
pub(crate) struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

/// One completion choice.
#[derive(Debug, Clone, Deserialize, Getters)]
pub(crate) struct ChatChoice {
    message: ChatMessage,
}

/// Chat-completions response body.
#[derive(Debug, Clone, Deserialize, Getters)]
pub(crate) struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}
