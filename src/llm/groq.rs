//! Groq chat completions client (OpenAI-compatible API).

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{CompletionProvider, CompletionRequest};
use crate::upstream::ProviderError;

/// Provider display name used in errors.
const PROVIDER: &str = "Groq";

/// Public Groq endpoint.
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Async client for `POST {base_url}/chat/completions`.
///
/// Does not derive `Debug` so the API key never ends up in logs.
pub struct GroqClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GroqClient {
    /// Create a client. A `None` key makes every call fail with
    /// [`ProviderError::MissingCredential`].
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Whether a credential is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionProvider for GroqClient {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential(PROVIDER))?;

        let started = Instant::now();
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Completion request rejected");
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse =
            response
                .json()
                .await
                .map_err(|err| ProviderError::MalformedResponse {
                    provider: PROVIDER,
                    detail: err.to_string(),
                })?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::MalformedResponse {
                provider: PROVIDER,
                detail: "no reply content in choices".to_string(),
            })?;

        debug!(
            model = request.model,
            turns = request.messages.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Completion received"
        );
        Ok(reply)
    }
}
