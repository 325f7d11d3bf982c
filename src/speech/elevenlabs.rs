//! ElevenLabs text-to-speech client.

use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use super::SpeechProvider;
use crate::upstream::ProviderError;

/// Provider display name used in errors.
const PROVIDER: &str = "ElevenLabs";

/// Public ElevenLabs endpoint.
pub const DEFAULT_ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";
/// Voice used for every synthesis.
pub const VOICE_ID: &str = "xctasy8XvGp2cVO9HL9k";
/// Synthesis model.
pub const TTS_MODEL: &str = "eleven_monolingual_v1";
/// MIME type of synthesized audio.
pub const AUDIO_MPEG: &str = "audio/mpeg";

const VOICE_STABILITY: f32 = 0.5;
const VOICE_SIMILARITY_BOOST: f32 = 0.5;

#[derive(Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

/// Async client for `POST {base_url}/v1/text-to-speech/{voice_id}`.
///
/// Does not derive `Debug` so the API key never ends up in logs.
pub struct ElevenLabsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ElevenLabsClient {
    /// Create a client. Pass the key through
    /// [`usable_api_key`](crate::upstream::usable_api_key) first so that
    /// placeholders count as missing.
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/text-to-speech/{VOICE_ID}",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn synthesize(&self, text: &str) -> Result<Bytes, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential(PROVIDER))?;

        let payload = SynthesisRequest {
            text,
            model_id: TTS_MODEL,
            voice_settings: VoiceSettings {
                stability: VOICE_STABILITY,
                similarity_boost: VOICE_SIMILARITY_BOOST,
            },
        };

        let started = Instant::now();
        let response = self
            .client
            .post(self.endpoint())
            .header(ACCEPT, AUDIO_MPEG)
            .header("xi-api-key", api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Speech synthesis rejected");
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body,
            });
        }

        let audio = response.bytes().await?;
        debug!(
            bytes = audio.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Speech synthesized"
        );
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, key: Option<&str>) -> ElevenLabsClient {
        ElevenLabsClient::new(Client::new(), server.uri(), key.map(str::to_string))
    }

    #[tokio::test]
    async fn test_synthesize_returns_audio_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/text-to-speech/xctasy8XvGp2cVO9HL9k"))
            .and(header("xi-api-key", "el-test"))
            .and(header("accept", "audio/mpeg"))
            .and(body_json(json!({
                "text": "Take a slow breath.",
                "model_id": "eleven_monolingual_v1",
                "voice_settings": {"stability": 0.5, "similarity_boost": 0.5}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(vec![0xFF_u8, 0xFB, 0x90, 0x00], "audio/mpeg"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let audio = client_for(&server, Some("el-test"))
            .synthesize("Take a slow breath.")
            .await;

        assert_eq!(audio.ok().as_deref(), Some(&[0xFF_u8, 0xFB, 0x90, 0x00][..]));
    }

    #[tokio::test]
    async fn test_non_ok_status_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let err = client_for(&server, Some("bad"))
            .synthesize("hello")
            .await
            .err();

        assert_eq!(err.as_ref().and_then(ProviderError::status), Some(401));
        assert_eq!(
            err.map(|e| e.to_string()).as_deref(),
            Some("ElevenLabs API error: 401 - invalid api key")
        );
    }

    #[tokio::test]
    async fn test_accepted_but_not_ok_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let err = client_for(&server, Some("el-test"))
            .synthesize("hello")
            .await
            .err();

        assert_eq!(err.as_ref().and_then(ProviderError::status), Some(202));
    }

    #[tokio::test]
    async fn test_missing_key_is_reported() {
        let server = MockServer::start().await;
        let client = client_for(&server, None);

        assert!(!client.is_configured());
        let err = client.synthesize("hello").await.err();
        assert!(matches!(err, Some(ProviderError::MissingCredential("ElevenLabs"))));
    }
}
