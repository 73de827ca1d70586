//! Guard configuration.

use crate::name::{GuardName, DEFAULT_KEY_PREFIX};
use crate::AuthError;
use serde::{Deserialize, Serialize};

/// Configuration for a single guard.
///
/// ```toml
/// name = "web"
/// key_prefix = "login_"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Guard identity, e.g. "web" or "api".
    pub name: String,
    /// Prefix of the derived session key.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

impl GuardConfig {
    /// Create a configuration with the default key prefix.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_prefix: default_key_prefix(),
        }
    }

    /// Parse a configuration from TOML.
    pub fn from_toml_str(input: &str) -> Result<Self, AuthError> {
        let config: Self = toml::from_str(input).map_err(|e| AuthError::Config(e.to_string()))?;
        if config.name.trim().is_empty() {
            return Err(AuthError::Config("guard name must not be empty".to_string()));
        }
        Ok(config)
    }

    /// The guard name this configuration describes.
    pub fn guard_name(&self) -> GuardName {
        GuardName::with_prefix(self.name.as_str(), &self.key_prefix)
    }
}
