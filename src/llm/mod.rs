//! Chat completion providers.

pub mod groq;

use async_trait::async_trait;
use serde::Serialize;

use crate::session::Turn;
use crate::upstream::ProviderError;

pub use groq::GroqClient;

/// Model used for every chat turn.
pub const CHAT_MODEL: &str = "llama-3.1-8b-instant";
/// Sampling temperature for chat turns.
pub const CHAT_TEMPERATURE: f32 = 0.7;
/// Reply length cap, in tokens.
pub const CHAT_MAX_TOKENS: u32 = 300;

/// One completion call: the transcript so far plus sampling settings.
///
/// Serializes to the OpenAI-compatible `chat/completions` request body.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest<'a> {
    /// Model identifier.
    pub model: &'a str,
    /// Transcript, system turn first.
    pub messages: &'a [Turn],
    /// Sampling temperature.
    pub temperature: f32,
    /// Reply length cap, in tokens.
    pub max_tokens: u32,
}

impl<'a> CompletionRequest<'a> {
    /// Request a reply to `messages` with the fixed chat settings.
    #[must_use]
    pub const fn chat(messages: &'a [Turn]) -> Self {
        Self {
            model: CHAT_MODEL,
            messages,
            temperature: CHAT_TEMPERATURE,
            max_tokens: CHAT_MAX_TOKENS,
        }
    }
}

/// A hosted model that turns a transcript into the next assistant reply.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Produce the assistant reply for `request`.
    ///
    /// # Errors
    /// Returns an error on transport failure, a non-success status, or a
    /// response without reply text.
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_body() {
        let turns = vec![Turn::system("sys"), Turn::user("hi")];
        let body = serde_json::to_value(CompletionRequest::chat(&turns)).unwrap_or_default();

        assert_eq!(body["model"], "llama-3.1-8b-instant");
        assert_eq!(body["max_tokens"], 300);
        assert!((body["temperature"].as_f64().unwrap_or_default() - 0.7).abs() < 1e-6);
        assert_eq!(
            body["messages"],
            serde_json::json!([
                {"role": "system", "content": "sys"},
                {"role": "user", "content": "hi"}
            ])
        );
    }
}
