//! Session persistence using the Key-Value store.

use crate::store::SessionStore;
use crate::{Cache, CacheError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Maximum retry attempts for optimistic concurrency control.
const MAX_UPDATE_RETRIES: u32 = 3;

/// Attribute map persisted for one session.
pub type Attributes = HashMap<String, Value>;

/// A unique session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new session ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new cryptographically secure session ID.
    pub fn generate() -> Self {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        use rand::Rng;

        let bytes: [u8; 18] = rand::thread_rng().gen();
        Self(format!("sess_{}", URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Get the session ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Session record stored in the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    /// The session ID.
    pub id: SessionId,
    /// Session attributes, keyed by attribute name.
    pub attributes: Attributes,
    /// Version for optimistic concurrency control.
    pub version: u64,
    /// When the session was created (Unix timestamp).
    pub created_at: u64,
    /// When the session was last written (Unix timestamp).
    pub last_accessed: u64,
}

/// A session store bound to one session ID and persisted in a [`Cache`].
///
/// Every attribute write rewrites the whole session record under
/// `session:{id}` with a bumped version.
///
/// # Example
///
/// ```rust,ignore
/// use turbo_cache::{Cache, Session, SessionId, SessionStore};
///
/// let session = Session::new(Cache::open_default()?, SessionId::generate());
/// session.put("login_web", serde_json::json!("42"))?;
/// assert!(session.has("login_web")?);
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    cache: Cache,
    id: SessionId,
}

impl Session {
    /// Bind a session ID to a cache.
    pub fn new(cache: Cache, id: SessionId) -> Self {
        Self { cache, id }
    }

    /// Start a session with a freshly generated ID.
    pub fn start(cache: Cache) -> Self {
        Self::new(cache, SessionId::generate())
    }

    /// The session ID.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Load the full session record including version.
    pub fn load(&self) -> Result<Option<SessionData>, CacheError> {
        self.cache.get::<SessionData>(&self.key())
    }

    /// All attributes currently stored for this session.
    pub fn attributes(&self) -> Result<Attributes, CacheError> {
        Ok(self.load()?.map(|s| s.attributes).unwrap_or_default())
    }

    /// Whether a record for this session exists.
    pub fn exists(&self) -> Result<bool, CacheError> {
        self.cache.exists(&self.key())
    }

    /// Delete the whole session record.
    pub fn invalidate(&self) -> Result<(), CacheError> {
        self.cache.delete(&self.key())
    }

    /// Update the attributes with a closure, using optimistic concurrency control.
    ///
    /// Retries up to `MAX_UPDATE_RETRIES` times if a concurrent modification
    /// is detected.
    pub fn update<F>(&self, f: F) -> Result<Attributes, CacheError>
    where
        F: Fn(&mut Attributes),
    {
        let key = self.key();

        for _attempt in 0..MAX_UPDATE_RETRIES {
            let current = self.cache.get::<SessionData>(&key)?;
            let now = current_timestamp();

            let (mut attributes, expected_version, created_at) = match current {
                Some(data) => (data.attributes, data.version, data.created_at),
                None => (Attributes::new(), 0, now),
            };

            f(&mut attributes);

            let new_version = expected_version + 1;
            let record = SessionData {
                id: self.id.clone(),
                attributes: attributes.clone(),
                version: new_version,
                created_at,
                last_accessed: now,
            };

            self.cache.set(&key, &record)?;

            // Without CAS support this re-read is the best available check.
            match self.cache.get::<SessionData>(&key)? {
                Some(written) if written.version != new_version => continue,
                _ => return Ok(attributes),
            }
        }

        Err(CacheError::ConcurrentModification(
            "max retries exceeded".to_string(),
        ))
    }

    fn key(&self) -> String {
        crate::cache_key!("session", self.id)
    }
}

impl SessionStore for Session {
    fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        Ok(self
            .load()?
            .and_then(|mut data| data.attributes.remove(key)))
    }

    fn put(&self, key: &str, value: Value) -> Result<(), CacheError> {
        self.update(|attributes| {
            attributes.insert(key.to_string(), value.clone());
        })?;
        Ok(())
    }

    fn forget(&self, key: &str) -> Result<(), CacheError> {
        if self.load()?.is_none() {
            return Ok(());
        }
        self.update(|attributes| {
            attributes.remove(key);
        })?;
        Ok(())
    }
}

fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
