//! OpenAI-compatible chat-completions provider.

mod client;
mod dto;

pub use client::OpenAiCompatibleProvider;
