//! Text-to-speech providers.

pub mod elevenlabs;

use async_trait::async_trait;
use bytes::Bytes;

use crate::upstream::ProviderError;

pub use elevenlabs::ElevenLabsClient;

/// A hosted voice that renders text as MPEG audio.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Display name used in error messages.
    fn name(&self) -> &'static str;

    /// Whether a usable credential is configured.
    fn is_configured(&self) -> bool;

    /// Synthesize `text` and return the raw audio body.
    ///
    /// # Errors
    /// Returns an error if the credential is missing, on transport failure,
    /// or when the provider answers with anything but `200 OK`.
    async fn synthesize(&self, text: &str) -> Result<Bytes, ProviderError>;
}
