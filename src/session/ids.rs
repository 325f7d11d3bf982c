//! Session identifier type.
//!
//! Client-supplied identifiers are opaque strings and are kept verbatim.
//! Identifiers minted by the store are UUIDs.
//!
//! ## Cargo features used by this module
//! - `uuid_v7`: mint time-ordered `UUIDv7` identifiers instead of v4.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a fresh UUID for a new session.
///
/// With feature `uuid_v7` enabled, this uses `Uuid::now_v7()`.
/// Otherwise it falls back to `Uuid::new_v4()`.
#[inline]
#[must_use]
fn uuid_for_session() -> Uuid {
    #[cfg(feature = "uuid_v7")]
    {
        Uuid::now_v7()
    }
    #[cfg(not(feature = "uuid_v7"))]
    {
        Uuid::new_v4()
    }
}

/// Opaque conversation identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Mint a new, globally unique identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid_for_session().to_string())
    }

    /// Wrap a caller-supplied identifier.
    ///
    /// Returns `None` for blank input, which callers treat as "no session yet".
    #[must_use]
    pub fn from_client(raw: Option<&str>) -> Option<Self> {
        raw.filter(|value| !value.trim().is_empty())
            .map(|value| Self(value.to_string()))
    }

    /// Borrow the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract the identifier text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_are_uuids() {
        let id = SessionId::generate();
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: HashSet<SessionId> = (0..1000).map(|_| SessionId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_blank_client_id_is_absent() {
        assert!(SessionId::from_client(None).is_none());
        assert!(SessionId::from_client(Some("")).is_none());
        assert!(SessionId::from_client(Some("   ")).is_none());
    }

    #[test]
    fn test_client_id_kept_verbatim() {
        let id = SessionId::from_client(Some("browser-tab-7"));
        assert_eq!(id.map(SessionId::into_string), Some("browser-tab-7".to_string()));
    }

    #[test]
    fn test_serde_transparent() {
        let id = SessionId::from("abc".to_string());
        assert_eq!(serde_json::to_string(&id).unwrap_or_default(), "\"abc\"");
    }
}
