//! Stateless text-to-speech passthrough.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};

use crate::relay::error::{RelayError, RelayResult};
use crate::speech::SpeechProvider;
use crate::upstream::ProviderError;

/// Forwards text to a speech provider and hands back the audio.
pub struct SpeechRelay {
    provider: Arc<dyn SpeechProvider>,
}

impl SpeechRelay {
    /// Create a relay.
    #[must_use]
    pub fn new(provider: Arc<dyn SpeechProvider>) -> Self {
        Self { provider }
    }

    /// Whether speech synthesis can be attempted at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.provider.is_configured()
    }

    /// Synthesize `text` as MPEG audio.
    ///
    /// # Errors
    /// - [`RelayError::Configuration`] when no usable credential is set.
    /// - [`RelayError::Upstream`] when the provider call fails or answers with
    ///   anything but `200 OK`; the status and body text are carried along.
    pub async fn synthesize(&self, text: &str) -> RelayResult<Bytes> {
        if !self.provider.is_configured() {
            return Err(ProviderError::MissingCredential(self.provider.name()).into());
        }

        match self.provider.synthesize(text).await {
            Ok(audio) => {
                info!(chars = text.chars().count(), bytes = audio.len(), "Speech relayed");
                Ok(audio)
            }
            Err(err) => {
                warn!(status = ?err.status(), error = %err, "Speech synthesis failed");
                Err(RelayError::from(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubVoice {
        configured: bool,
        status: Option<u16>,
        calls: AtomicUsize,
    }

    impl StubVoice {
        fn new(configured: bool, status: Option<u16>) -> Self {
            Self {
                configured,
                status,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SpeechProvider for StubVoice {
        fn name(&self) -> &'static str {
            "ElevenLabs"
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn synthesize(&self, text: &str) -> Result<Bytes, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.status {
                Some(status) => Err(ProviderError::Status {
                    provider: "ElevenLabs",
                    status,
                    body: "quota exceeded".to_string(),
                }),
                None => Ok(Bytes::from(format!("mp3:{text}"))),
            }
        }
    }

    #[tokio::test]
    async fn test_unconfigured_voice_is_configuration_error() {
        let voice = Arc::new(StubVoice::new(false, None));
        let relay = SpeechRelay::new(Arc::clone(&voice) as Arc<dyn SpeechProvider>);

        assert!(!relay.is_enabled());
        let err = relay.synthesize("hello").await.err();
        assert!(matches!(
            err,
            Some(RelayError::Configuration(ref m)) if m.ends_with("not configured")
        ));
        assert_eq!(voice.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_returns_provider_bytes() {
        let relay = SpeechRelay::new(Arc::new(StubVoice::new(true, None)));
        let audio = relay.synthesize("calm").await;
        assert_eq!(audio.ok(), Some(Bytes::from_static(b"mp3:calm")));
    }

    #[tokio::test]
    async fn test_provider_status_is_carried() {
        let relay = SpeechRelay::new(Arc::new(StubVoice::new(true, Some(429))));
        let err = relay.synthesize("calm").await.err();

        assert_eq!(err.as_ref().and_then(RelayError::upstream_status), Some(429));
        assert!(err.is_some_and(|e| e.to_string().contains("429")));
    }
}
