//! Opaque session identifiers

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

/// Random bytes behind every generated session id
pub const SESSION_ID_BYTES: usize = 16;

/// Key shared by all callers when sessions are not required
pub const DEFAULT_SESSION_KEY: &str = "default";

/// Unguessable key identifying one conversation window.
///
/// Carries no identity or credential meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Mint a fresh id from the operating system's CSPRNG.
    ///
    /// Encodes [`SESSION_ID_BYTES`] random bytes as URL-safe base64 without
    /// padding, so the id can travel in a cookie unescaped.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// The shared key used by the single-session variant
    pub fn default_session() -> Self {
        Self(DEFAULT_SESSION_KEY.to_string())
    }

    /// Accept an id presented by a caller; blank values are rejected
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_are_url_safe_and_sized() {
        let id = SessionId::generate();
        // 16 bytes -> 22 base64 characters without padding
        assert_eq!(id.as_str().len(), 22);
        assert!(
            id.as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_generated_ids_do_not_repeat() {
        let ids: HashSet<SessionId> = (0..256).map(|_| SessionId::generate()).collect();
        assert_eq!(ids.len(), 256);
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert!(SessionId::parse("").is_none());
        assert!(SessionId::parse("   ").is_none());
        assert_eq!(
            SessionId::parse(" abc ").map(|id| id.to_string()),
            Some("abc".to_string())
        );
    }
}
