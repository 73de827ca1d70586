//! Guard identity and session key derivation.

use sha2::{Digest, Sha256};
use std::fmt;

/// Prefix of every guard's session key.
pub const DEFAULT_KEY_PREFIX: &str = "login_";

/// The identity of a guard and the session key derived from it.
///
/// The key is `prefix + hex(SHA-256(identity))`. It depends only on the
/// identity string, so it is stable across restarts and independent of any
/// guard instance state. Distinct identities ("web", "api") get distinct
/// slots in a shared session store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GuardName {
    identity: String,
    session_key: String,
}

impl GuardName {
    /// Derive a name from an identity using the default `login_` prefix.
    pub fn new(identity: impl Into<String>) -> Self {
        Self::with_prefix(identity, DEFAULT_KEY_PREFIX)
    }

    /// Derive a name from an identity with a custom key prefix.
    pub fn with_prefix(identity: impl Into<String>, prefix: &str) -> Self {
        let identity = identity.into();
        let digest = Sha256::digest(identity.as_bytes());
        let session_key = format!("{}{}", prefix, hex::encode(digest));
        Self {
            identity,
            session_key,
        }
    }

    /// The identity this name was derived from.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// The session key holding the logged-in user's identifier.
    pub fn session_key(&self) -> &str {
        &self.session_key
    }
}

impl fmt::Display for GuardName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_deterministic() {
        assert_eq!(
            GuardName::new("web").session_key(),
            GuardName::new("web").session_key()
        );
    }

    #[test]
    fn test_key_format() {
        let name = GuardName::new("web");
        let key = name.session_key();
        assert!(key.starts_with("login_"));
        assert_eq!(key.len(), "login_".len() + 64);
        assert!(key["login_".len()..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_known_digest() {
        // sha256("web")
        assert_eq!(
            GuardName::new("web").session_key(),
            "login_4b5e57f6eb2f42b9039b3d1e13929295f231749c510cbe341cd68036d9af97e2"
        );
    }

    #[test]
    fn test_distinct_identities_distinct_keys() {
        assert_ne!(
            GuardName::new("web").session_key(),
            GuardName::new("api").session_key()
        );
    }

    #[test]
    fn test_custom_prefix() {
        let name = GuardName::with_prefix("admin", "auth_");
        assert!(name.session_key().starts_with("auth_"));
        assert_eq!(name.identity(), "admin");
        assert_eq!(name.to_string(), "admin");
    }
}
