//! Password hashing with Argon2id.

use crate::AuthError;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher as _, PasswordVerifier};
use rand::Rng;

/// Password hasher configuration.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    /// Salt length in bytes.
    pub salt_length: usize,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { salt_length: 16 }
    }
}

impl PasswordHasher {
    /// Hash a password.
    ///
    /// Returns a PHC string: `$argon2id$v=19$m=...,t=...,p=...$salt$hash`
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt_bytes: Vec<u8> = (0..self.salt_length)
            .map(|_| rand::thread_rng().gen())
            .collect();
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| AuthError::Hash(e.to_string()))?;

        let phc = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hash(e.to_string()))?;

        Ok(phc.to_string())
    }

    /// Verify a password against a PHC hash string.
    ///
    /// A malformed hash is an error; a wrong password is `Ok(false)`.
    pub fn verify(&self, password: &str, hash_str: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash_str).map_err(|e| AuthError::Hash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Validate password strength.
    pub fn validate_password(password: &str) -> Result<(), AuthError> {
        if password.len() < 8 {
            return Err(AuthError::WeakPassword(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        let has_upper = password.chars().any(|c| c.is_uppercase());
        let has_lower = password.chars().any(|c| c.is_lowercase());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());

        if !has_upper || !has_lower || !has_digit {
            return Err(AuthError::WeakPassword(
                "Password must contain uppercase, lowercase, and numbers".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let hasher = PasswordHasher::default();
        let password = "SecurePass123!";

        let hash = hasher.hash(password).unwrap();
        assert!(hash.starts_with("$argon2id$"));

        assert!(hasher.verify(password, &hash).unwrap());
        assert!(!hasher.verify("WrongPassword", &hash).unwrap());
    }

    #[test]
    fn test_password_validation() {
        assert!(PasswordHasher::validate_password("SecurePass1").is_ok());
        assert!(PasswordHasher::validate_password("short").is_err());
        assert!(PasswordHasher::validate_password("alllowercase1").is_err());
        assert!(PasswordHasher::validate_password("ALLUPPERCASE1").is_err());
        assert!(PasswordHasher::validate_password("NoNumbers").is_err());
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let hasher = PasswordHasher::default();
        let password = "TestPassword1";

        let hash1 = hasher.hash(password).unwrap();
        let hash2 = hasher.hash(password).unwrap();

        // Random salt
        assert_ne!(hash1, hash2);
        assert!(hasher.verify(password, &hash1).unwrap());
        assert!(hasher.verify(password, &hash2).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_error() {
        let hasher = PasswordHasher::default();
        let err = hasher.verify("anything", "not a phc string").unwrap_err();
        assert!(matches!(err, AuthError::Hash(_)));
    }
}
