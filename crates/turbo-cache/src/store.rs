//! The session store capability and an in-process implementation.

use crate::CacheError;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

/// Key-value storage scoped to one logical session.
///
/// Values are opaque serializable scalars. Implementations report backend
/// failures as `Err`; a missing key is `Ok(None)`, never an error.
///
/// Methods take `&self` so a single store can be shared (behind an `Arc`)
/// by several consumers during one request.
pub trait SessionStore: Send + Sync {
    /// Read the value stored at `key`.
    fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Store `value` at `key`, replacing any previous value.
    fn put(&self, key: &str, value: Value) -> Result<(), CacheError>;

    /// Remove `key`. Removing a missing key succeeds.
    fn forget(&self, key: &str) -> Result<(), CacheError>;

    /// Check whether a value is stored at `key`.
    fn has(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key)?.is_some())
    }

    /// Read and remove the value at `key`.
    fn pull(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let value = self.get(key)?;
        if value.is_some() {
            self.forget(key)?;
        }
        Ok(value)
    }
}

/// Session store held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    attributes: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.attributes.read().len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.attributes.read().is_empty()
    }

    /// Remove every key.
    pub fn clear(&self) {
        self.attributes.write().clear();
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        Ok(self.attributes.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: Value) -> Result<(), CacheError> {
        self.attributes.write().insert(key.to_string(), value);
        Ok(())
    }

    fn forget(&self, key: &str) -> Result<(), CacheError> {
        self.attributes.write().remove(key);
        Ok(())
    }
}
