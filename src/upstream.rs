//! Shared plumbing for the hosted AI providers: HTTP client construction and
//! the provider error type.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

/// Connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Placeholder shipped in sample `.env` files; treated as "no key".
pub const PLACEHOLDER_API_KEY: &str = "your_elevenlabs_api_key_here";

/// Errors produced while talking to a provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider credential is absent or a placeholder.
    #[error("{0} API key not configured")]
    MissingCredential(&'static str),

    /// Transport failure (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("{provider} API error: {status} - {body}")]
    Status {
        /// Provider display name.
        provider: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// The provider answered 2xx but the payload was unusable.
    #[error("{provider} returned a malformed response: {detail}")]
    MalformedResponse {
        /// Provider display name.
        provider: &'static str,
        /// What was wrong with the payload.
        detail: String,
    },
}

impl ProviderError {
    /// Upstream HTTP status, when the provider produced one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            Self::MissingCredential(_) | Self::MalformedResponse { .. } => None,
        }
    }
}

/// Build the pooled HTTP client used for provider calls.
///
/// # Errors
/// Returns an error if the TLS backend cannot be initialised.
pub fn build_http_client(timeout: Duration) -> Result<Client, ProviderError> {
    let client = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Normalise a configured credential: blank or placeholder values become `None`.
#[must_use]
pub fn usable_api_key(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|key| !key.is_empty() && *key != PLACEHOLDER_API_KEY)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_api_key_filters_placeholders() {
        assert_eq!(usable_api_key(None), None);
        assert_eq!(usable_api_key(Some("")), None);
        assert_eq!(usable_api_key(Some("  ")), None);
        assert_eq!(usable_api_key(Some(PLACEHOLDER_API_KEY)), None);
        assert_eq!(usable_api_key(Some(" sk-123 ")), Some("sk-123".to_string()));
    }

    #[test]
    fn test_status_error_message() {
        let err = ProviderError::Status {
            provider: "ElevenLabs",
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "ElevenLabs API error: 401 - unauthorized");
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_missing_credential_message() {
        let err = ProviderError::MissingCredential("ElevenLabs");
        assert_eq!(err.to_string(), "ElevenLabs API key not configured");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_client_builds() {
        assert!(build_http_client(Duration::from_secs(5)).is_ok());
    }
}
