//! Application state shared across all request handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::RelayConfig;
use crate::llm::{CompletionProvider, GroqClient};
use crate::relay::{ChatRelay, SpeechRelay};
use crate::session::SessionStore;
use crate::speech::{ElevenLabsClient, SpeechProvider};
use crate::upstream::{ProviderError, build_http_client};

/// Shared application state.
pub struct AppState {
    /// Conversation store, owned here and torn down on shutdown.
    pub sessions: Arc<SessionStore>,
    /// Chat turn orchestration.
    pub chat: ChatRelay,
    /// Text-to-speech passthrough.
    pub speech: SpeechRelay,
    /// Root directory for static files.
    pub static_dir: PathBuf,
}

impl AppState {
    /// Create the application state with the hosted providers.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &RelayConfig) -> Result<Arc<Self>, ProviderError> {
        let client = build_http_client(config.http_timeout)?;

        let completion = GroqClient::new(
            client.clone(),
            config.groq_base_url.as_str(),
            config.groq_api_key.clone(),
        );
        if !completion.is_configured() {
            tracing::warn!("GROQ_API_KEY is not set; chat requests will be rejected");
        }

        let voice = ElevenLabsClient::new(
            client,
            config.elevenlabs_base_url.as_str(),
            config.elevenlabs_api_key.clone(),
        );
        if !voice.is_configured() {
            tracing::warn!("ELEVENLABS_API_KEY is not set; text-to-speech is disabled");
        }

        Ok(Self::from_parts(
            Arc::new(SessionStore::with_defaults()),
            Arc::new(completion),
            Arc::new(voice),
            &config.static_dir,
        ))
    }

    /// Assemble state from explicit collaborators.
    #[must_use]
    pub fn from_parts(
        sessions: Arc<SessionStore>,
        completion: Arc<dyn CompletionProvider>,
        voice: Arc<dyn SpeechProvider>,
        static_dir: &Path,
    ) -> Arc<Self> {
        Arc::new(Self {
            chat: ChatRelay::new(Arc::clone(&sessions), completion),
            speech: SpeechRelay::new(voice),
            sessions,
            static_dir: static_dir.to_path_buf(),
        })
    }
}
