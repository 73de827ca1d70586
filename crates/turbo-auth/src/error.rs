//! Authentication errors.

use thiserror::Error;

/// Authentication error type.
///
/// "No user is logged in" is never an error: the guard reports it as
/// `Ok(None)` or `Ok(false)`. Variants here are either misconfiguration,
/// a failed credential check, or a collaborator failure passed through.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The guard was used before a session store was attached.
    #[error("no session instance set on guard")]
    MissingSession,

    /// Invalid credentials provided.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The session store failed.
    #[error("session store error: {0}")]
    Session(#[from] turbo_cache::CacheError),

    /// The user provider failed for a reason other than "not found".
    #[error("user provider error: {0}")]
    Provider(String),

    /// Password too weak.
    #[error("password too weak: {0}")]
    WeakPassword(String),

    /// Password hashing or hash parsing failed.
    #[error("password hash error: {0}")]
    Hash(String),

    /// Guard configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl AuthError {
    /// Check if this is an authentication failure.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AuthError::InvalidCredentials)
    }

    /// Check if this signals a wiring bug rather than a runtime condition.
    pub fn is_misconfiguration(&self) -> bool {
        matches!(self, AuthError::MissingSession | AuthError::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(AuthError::InvalidCredentials.is_auth_failure());
        assert!(!AuthError::InvalidCredentials.is_misconfiguration());

        assert!(AuthError::MissingSession.is_misconfiguration());
        assert!(!AuthError::MissingSession.is_auth_failure());

        let store = AuthError::from(turbo_cache::CacheError::StoreError("down".into()));
        assert!(!store.is_auth_failure());
        assert!(!store.is_misconfiguration());
    }

    #[test]
    fn test_missing_session_message() {
        assert_eq!(
            AuthError::MissingSession.to_string(),
            "no session instance set on guard"
        );
    }
}
