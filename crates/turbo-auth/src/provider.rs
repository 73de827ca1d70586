//! User providers: resolving users by identifier or by credentials.

use crate::password::PasswordHasher;
use crate::user::{Authenticatable, GenericUser, UserId};
use crate::AuthError;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Claim names mapped to values, e.g. `email` and `password`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials(BTreeMap<String, String>);

impl Credentials {
    /// Claim carrying the plaintext password.
    pub const PASSWORD: &'static str = "password";

    /// Create an empty credential set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a claim.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Get a claim.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// The plaintext password claim.
    pub fn password(&self) -> Option<&str> {
        self.get(Self::PASSWORD)
    }

    /// Every claim except the password.
    pub fn without_password(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter(|(name, _)| name.as_str() != Self::PASSWORD)
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Whether no claims are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Credentials {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Source of users for a guard.
///
/// "Not found" and "credentials do not match" are `Ok(None)`. `Err` is
/// reserved for failures of the provider itself (storage down, corrupt
/// record) and is passed to the guard's caller untouched.
pub trait UserProvider {
    /// The user type this provider yields.
    type User: Authenticatable;

    /// Resolve a user by the identifier stored in the session.
    fn retrieve_by_id(&self, id: &UserId) -> Result<Option<Self::User>, AuthError>;

    /// Resolve a user whose credentials match.
    fn retrieve_by_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<Self::User>, AuthError>;
}

impl<P: UserProvider + ?Sized> UserProvider for Arc<P> {
    type User = P::User;

    fn retrieve_by_id(&self, id: &UserId) -> Result<Option<Self::User>, AuthError> {
        (**self).retrieve_by_id(id)
    }

    fn retrieve_by_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<Self::User>, AuthError> {
        (**self).retrieve_by_credentials(credentials)
    }
}

/// Provider over an in-memory set of [`GenericUser`]s.
///
/// A credential set matches a user when every non-password claim equals the
/// user's attribute of the same name (the `id` claim matches the identifier)
/// and the password verifies against the user's stored hash.
///
/// Users are scanned in identifier order, so when several users share the
/// claims the one with the lowest identifier whose password verifies wins.
/// A user whose stored hash cannot be parsed is skipped with a warning
/// rather than failing the whole lookup.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserProvider {
    users: BTreeMap<UserId, GenericUser>,
    hasher: PasswordHasher,
}

impl MemoryUserProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a user.
    pub fn insert(&mut self, user: GenericUser) {
        self.users.insert(user.id.clone(), user);
    }

    /// Add a user with the given plaintext password, hashing it first.
    ///
    /// Fails with [`AuthError::WeakPassword`] if the password does not meet
    /// the strength rules of [`PasswordHasher::validate_password`].
    pub fn insert_with_password(
        &mut self,
        user: GenericUser,
        password: &str,
    ) -> Result<(), AuthError> {
        PasswordHasher::validate_password(password)?;
        let hash = self.hasher.hash(password)?;
        self.insert(user.with_attribute(GenericUser::PASSWORD_ATTRIBUTE, hash));
        Ok(())
    }

    /// Remove a user, returning it if present.
    pub fn remove(&mut self, id: &UserId) -> Option<GenericUser> {
        self.users.remove(id)
    }

    /// Number of users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the provider holds no users.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn claims_match(user: &GenericUser, credentials: &Credentials) -> bool {
        credentials.without_password().all(|(name, value)| match name {
            "id" => user.id.as_str() == value,
            _ => user.attribute(name) == Some(value),
        })
    }
}

impl UserProvider for MemoryUserProvider {
    type User = GenericUser;

    fn retrieve_by_id(&self, id: &UserId) -> Result<Option<GenericUser>, AuthError> {
        Ok(self.users.get(id).cloned())
    }

    fn retrieve_by_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<GenericUser>, AuthError> {
        let Some(password) = credentials.password() else {
            return Ok(None);
        };
        if credentials.without_password().next().is_none() {
            return Ok(None);
        }

        for user in self.users.values() {
            if !Self::claims_match(user, credentials) {
                continue;
            }
            let Some(hash) = user.password_hash() else {
                continue;
            };
            match self.hasher.verify(password, hash) {
                Ok(true) => return Ok(Some(user.clone())),
                Ok(false) => {}
                Err(e) => {
                    warn!(user_id = %user.id, error = %e, "skipping user with unparsable password hash");
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> MemoryUserProvider {
        let mut provider = MemoryUserProvider::new();
        provider
            .insert_with_password(
                GenericUser::new("1").with_attribute("email", "ada@example.com"),
                "Secret123",
            )
            .unwrap();
        provider.insert(GenericUser::new("2").with_attribute("email", "nohash@example.com"));
        provider
    }

    #[test]
    fn test_retrieve_by_id() {
        let provider = provider();
        let user = provider.retrieve_by_id(&UserId::new("1")).unwrap().unwrap();
        assert_eq!(user.attribute("email"), Some("ada@example.com"));
        assert!(provider.retrieve_by_id(&UserId::new("99")).unwrap().is_none());
    }

    #[test]
    fn test_retrieve_by_valid_credentials() {
        let provider = provider();
        let credentials = Credentials::new()
            .with("email", "ada@example.com")
            .with("password", "Secret123");
        let user = provider.retrieve_by_credentials(&credentials).unwrap();
        assert_eq!(user.map(|u| u.id), Some(UserId::new("1")));
    }

    #[test]
    fn test_wrong_password_is_none() {
        let provider = provider();
        let credentials = Credentials::new()
            .with("email", "ada@example.com")
            .with("password", "nope");
        assert!(provider.retrieve_by_credentials(&credentials).unwrap().is_none());
    }

    #[test]
    fn test_missing_password_claim_is_none() {
        let provider = provider();
        let credentials = Credentials::new().with("email", "ada@example.com");
        assert!(provider.retrieve_by_credentials(&credentials).unwrap().is_none());
    }

    #[test]
    fn test_password_only_is_none() {
        let provider = provider();
        let credentials = Credentials::new().with("password", "Secret123");
        assert!(provider.retrieve_by_credentials(&credentials).unwrap().is_none());
    }

    #[test]
    fn test_user_without_hash_never_matches() {
        let provider = provider();
        let credentials = Credentials::new()
            .with("email", "nohash@example.com")
            .with("password", "anything");
        assert!(provider.retrieve_by_credentials(&credentials).unwrap().is_none());
    }

    #[test]
    fn test_id_claim_matches_identifier() {
        let provider = provider();
        let credentials = Credentials::new()
            .with("id", "1")
            .with("password", "Secret123");
        assert!(provider.retrieve_by_credentials(&credentials).unwrap().is_some());
    }

    #[test]
    fn test_weak_password_rejected_on_insert() {
        let mut provider = MemoryUserProvider::new();
        let err = provider
            .insert_with_password(GenericUser::new("3"), "short")
            .unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(_)));
        assert!(provider.is_empty());
    }

    #[test]
    fn test_unparsable_hash_does_not_block_other_users() {
        let mut provider = provider();
        provider.insert(
            GenericUser::new("0")
                .with_attribute("email", "ada@example.com")
                .with_attribute(GenericUser::PASSWORD_ATTRIBUTE, "not a phc string"),
        );
        let credentials = Credentials::new()
            .with("email", "ada@example.com")
            .with("password", "Secret123");
        let user = provider.retrieve_by_credentials(&credentials).unwrap();
        assert_eq!(user.map(|u| u.id), Some(UserId::new("1")));
    }

    #[test]
    fn test_shared_claims_resolve_lowest_identifier() {
        let mut provider = MemoryUserProvider::new();
        for id in ["b", "a", "c"] {
            provider
                .insert_with_password(
                    GenericUser::new(id).with_attribute("team", "ops"),
                    "Secret123",
                )
                .unwrap();
        }
        let credentials = Credentials::new()
            .with("team", "ops")
            .with("password", "Secret123");
        for _ in 0..3 {
            let user = provider.retrieve_by_credentials(&credentials).unwrap();
            assert_eq!(user.map(|u| u.id), Some(UserId::new("a")));
        }
    }

    #[test]
    fn test_credentials_from_iter() {
        let credentials: Credentials = [("email", "a@b.c"), ("password", "x")]
            .into_iter()
            .collect();
        assert_eq!(credentials.password(), Some("x"));
        assert_eq!(
            credentials.without_password().collect::<Vec<_>>(),
            vec![("email", "a@b.c")]
        );
    }
}
