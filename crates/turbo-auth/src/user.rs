//! User types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Stable identifier naming a user across sessions.
///
/// Stored in the session as a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create a new ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Encode for storage in a session.
    pub fn to_value(&self) -> Value {
        Value::String(self.0.clone())
    }

    /// Decode a session value.
    ///
    /// Strings and integers are accepted; integers come from stores written
    /// by backends that keep numeric primary keys. Anything else is `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(Self(n.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for UserId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A user the guard can log in.
///
/// Users are identified only by [`identifier`](Authenticatable::identifier);
/// the guard never compares user values structurally.
pub trait Authenticatable {
    /// The identifier stored in the session for this user.
    fn identifier(&self) -> UserId;
}

/// A plain user record: an identifier plus string attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericUser {
    /// User ID.
    pub id: UserId,
    /// Arbitrary attributes (email, name, password hash, ...).
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl GenericUser {
    /// Attribute holding the user's password hash.
    pub const PASSWORD_ATTRIBUTE: &'static str = "password";

    /// Create a user with no attributes.
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            attributes: HashMap::new(),
        }
    }

    /// Set an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Get an attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The stored password hash, if any.
    pub fn password_hash(&self) -> Option<&str> {
        self.attribute(Self::PASSWORD_ATTRIBUTE)
    }
}

impl Authenticatable for GenericUser {
    fn identifier(&self) -> UserId {
        self.id.clone()
    }
}
