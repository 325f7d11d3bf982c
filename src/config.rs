//! Environment-driven configuration for the relay server.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::llm::groq::DEFAULT_GROQ_BASE_URL;
use crate::speech::elevenlabs::DEFAULT_ELEVENLABS_BASE_URL;
use crate::upstream::usable_api_key;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 5000;
/// Default static file root.
pub const DEFAULT_STATIC_DIR: &str = "static";
/// Default timeout for provider calls.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

const ENV_GROQ_API_KEY: &str = "GROQ_API_KEY";
const ENV_ELEVENLABS_API_KEY: &str = "ELEVENLABS_API_KEY";
const ENV_GROQ_BASE_URL: &str = "GROQ_BASE_URL";
const ENV_ELEVENLABS_BASE_URL: &str = "ELEVENLABS_BASE_URL";
const ENV_PORT: &str = "RELAY_PORT";
const ENV_STATIC_DIR: &str = "RELAY_STATIC_DIR";
const ENV_HTTP_TIMEOUT: &str = "RELAY_HTTP_TIMEOUT_SECS";
const ENV_SESSION_IDLE_TTL: &str = "RELAY_SESSION_IDLE_TTL_SECS";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set to a value that cannot be used.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// A base URL does not parse.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

/// Relay settings, read once at start-up.
#[derive(Clone)]
pub struct RelayConfig {
    /// Completion provider credential.
    pub groq_api_key: Option<String>,
    /// Speech provider credential; `None` disables text-to-speech.
    pub elevenlabs_api_key: Option<String>,
    /// Completion API base URL.
    pub groq_base_url: String,
    /// Speech API base URL.
    pub elevenlabs_base_url: String,
    /// Listen port.
    pub port: u16,
    /// Root directory for `/` and `/<filename>`.
    pub static_dir: PathBuf,
    /// Timeout applied to every provider call.
    pub http_timeout: Duration,
    /// Evict sessions idle for longer than this; `None` keeps them forever.
    pub session_idle_ttl: Option<Duration>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            groq_api_key: None,
            elevenlabs_api_key: None,
            groq_base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            elevenlabs_base_url: DEFAULT_ELEVENLABS_BASE_URL.to_string(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            session_idle_ttl: None,
        }
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("groq_api_key", &self.groq_api_key.as_ref().map(|_| "<redacted>"))
            .field(
                "elevenlabs_api_key",
                &self.elevenlabs_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("groq_base_url", &self.groq_base_url)
            .field("elevenlabs_base_url", &self.elevenlabs_base_url)
            .field("port", &self.port)
            .field("static_dir", &self.static_dir)
            .field("http_timeout", &self.http_timeout)
            .field("session_idle_ttl", &self.session_idle_ttl)
            .finish()
    }
}

impl RelayConfig {
    /// Read the process environment.
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            groq_api_key: usable_api_key(lookup(ENV_GROQ_API_KEY).as_deref()),
            elevenlabs_api_key: usable_api_key(lookup(ENV_ELEVENLABS_API_KEY).as_deref()),
            groq_base_url: lookup(ENV_GROQ_BASE_URL).unwrap_or(defaults.groq_base_url),
            elevenlabs_base_url: lookup(ENV_ELEVENLABS_BASE_URL)
                .unwrap_or(defaults.elevenlabs_base_url),
            port: parse_var(&lookup, ENV_PORT)?.unwrap_or(defaults.port),
            static_dir: lookup(ENV_STATIC_DIR).map_or(defaults.static_dir, PathBuf::from),
            http_timeout: parse_var::<u64, _>(&lookup, ENV_HTTP_TIMEOUT)?
                .map_or(defaults.http_timeout, Duration::from_secs),
            session_idle_ttl: parse_var::<u64, _>(&lookup, ENV_SESSION_IDLE_TTL)?
                .map(Duration::from_secs),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http_timeout.is_zero() {
            return Err(ConfigError::Invalid(format!("{ENV_HTTP_TIMEOUT} must be > 0")));
        }

        if self.session_idle_ttl.is_some_and(|ttl| ttl.is_zero()) {
            return Err(ConfigError::Invalid(format!(
                "{ENV_SESSION_IDLE_TTL} must be > 0"
            )));
        }

        Url::parse(&self.groq_base_url)?;
        Url::parse(&self.elevenlabs_base_url)?;

        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| ConfigError::Invalid(format!("{key} has unparsable value {raw:?}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_empty() {
        let config = RelayConfig::from_lookup(lookup_from(&[]));
        assert!(config.is_ok());
        let Ok(config) = config else { return };
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.static_dir, PathBuf::from("static"));
        assert_eq!(config.http_timeout, DEFAULT_HTTP_TIMEOUT);
        assert!(config.groq_api_key.is_none());
        assert!(config.elevenlabs_api_key.is_none());
        assert!(config.session_idle_ttl.is_none());
    }

    #[test]
    fn test_reads_all_variables() {
        let config = RelayConfig::from_lookup(lookup_from(&[
            ("GROQ_API_KEY", "gsk-1"),
            ("ELEVENLABS_API_KEY", "el-1"),
            ("GROQ_BASE_URL", "http://127.0.0.1:9000/v1"),
            ("ELEVENLABS_BASE_URL", "http://127.0.0.1:9001"),
            ("RELAY_PORT", "8080"),
            ("RELAY_STATIC_DIR", "/srv/www"),
            ("RELAY_HTTP_TIMEOUT_SECS", "15"),
            ("RELAY_SESSION_IDLE_TTL_SECS", "1800"),
        ]));
        let Ok(config) = config else {
            unreachable!("valid environment must parse")
        };
        assert_eq!(config.groq_api_key.as_deref(), Some("gsk-1"));
        assert_eq!(config.elevenlabs_api_key.as_deref(), Some("el-1"));
        assert_eq!(config.groq_base_url, "http://127.0.0.1:9000/v1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.static_dir, PathBuf::from("/srv/www"));
        assert_eq!(config.http_timeout, Duration::from_secs(15));
        assert_eq!(config.session_idle_ttl, Some(Duration::from_secs(1800)));
    }

    #[test]
    fn test_placeholder_key_disables_speech() {
        let config = RelayConfig::from_lookup(lookup_from(&[(
            "ELEVENLABS_API_KEY",
            "your_elevenlabs_api_key_here",
        )]));
        assert!(config.is_ok_and(|c| c.elevenlabs_api_key.is_none()));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(RelayConfig::from_lookup(lookup_from(&[("RELAY_PORT", "http")])).is_err());
        assert!(
            RelayConfig::from_lookup(lookup_from(&[("RELAY_HTTP_TIMEOUT_SECS", "0")])).is_err()
        );
        assert!(
            RelayConfig::from_lookup(lookup_from(&[("RELAY_SESSION_IDLE_TTL_SECS", "0")]))
                .is_err()
        );
        assert!(RelayConfig::from_lookup(lookup_from(&[("GROQ_BASE_URL", "not a url")])).is_err());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = RelayConfig {
            groq_api_key: Some("gsk-secret".to_string()),
            ..RelayConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("gsk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
