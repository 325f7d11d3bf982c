//! Error type for the chat and speech relays.

use thiserror::Error;

use crate::upstream::ProviderError;

/// Failure of one relay operation. Never fatal to the process.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The request was missing or had an unusable field.
    #[error("{0}")]
    InvalidInput(String),

    /// A provider credential is missing.
    #[error("{0}")]
    Configuration(String),

    /// The provider failed: transport error, non-success status or a
    /// malformed response.
    #[error("{message}")]
    Upstream {
        /// Provider HTTP status, when one was received.
        status: Option<u16>,
        /// Human-readable description.
        message: String,
    },
}

impl RelayError {
    /// Upstream HTTP status carried by this error, if any.
    #[must_use]
    pub const fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => *status,
            Self::InvalidInput(_) | Self::Configuration(_) => None,
        }
    }
}

impl From<ProviderError> for RelayError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::MissingCredential(_) => Self::Configuration(err.to_string()),
            other => Self::Upstream {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}

/// Convenience result alias for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;
