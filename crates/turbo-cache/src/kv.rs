//! Key-Value store wrapper with automatic serialization.

use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use parking_lot::{Mutex, RwLock};
#[cfg(not(target_arch = "wasm32"))]
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::sync::OnceLock;

#[cfg(not(target_arch = "wasm32"))]
type NativeStore = Arc<RwLock<HashMap<String, Vec<u8>>>>;

/// Name Spin gives the default Key-Value store.
pub const DEFAULT_STORE: &str = "default";

/// Process-wide named stores, so opening a name twice yields the same data
/// as Spin does across requests.
#[cfg(not(target_arch = "wasm32"))]
fn named_store(name: &str) -> NativeStore {
    static STORES: OnceLock<Mutex<HashMap<String, NativeStore>>> = OnceLock::new();
    STORES
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .entry(name.to_string())
        .or_default()
        .clone()
}

/// Type-safe cache backed by Spin's Key-Value Store.
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`. Outside of WASM a named store is an
/// in-process map shared by every `open` of that name for the life of the
/// process. Clones share the same underlying store.
#[derive(Clone)]
pub struct Cache {
    #[cfg(target_arch = "wasm32")]
    store: Arc<spin_sdk::key_value::Store>,
    #[cfg(not(target_arch = "wasm32"))]
    store: NativeStore,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}

impl Cache {
    /// Open the default Key-Value store.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cache = Cache::open_default()?;
    /// ```
    #[cfg(target_arch = "wasm32")]
    pub fn open_default() -> Result<Self, CacheError> {
        let store = spin_sdk::key_value::Store::open_default()
            .map_err(|e| CacheError::OpenError(e.to_string()))?;
        Ok(Self {
            store: Arc::new(store),
        })
    }

    /// Open a named Key-Value store.
    #[cfg(target_arch = "wasm32")]
    pub fn open(name: &str) -> Result<Self, CacheError> {
        let store = spin_sdk::key_value::Store::open(name)
            .map_err(|e| CacheError::OpenError(e.to_string()))?;
        Ok(Self {
            store: Arc::new(store),
        })
    }

    #[cfg(target_arch = "wasm32")]
    fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.store
            .get(key)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    #[cfg(target_arch = "wasm32")]
    fn set_raw(&self, key: &str, bytes: Vec<u8>) -> Result<(), CacheError> {
        self.store
            .set(key, &bytes)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    #[cfg(target_arch = "wasm32")]
    fn delete_raw(&self, key: &str) -> Result<(), CacheError> {
        self.store
            .delete(key)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    #[cfg(target_arch = "wasm32")]
    fn exists_raw(&self, key: &str) -> Result<bool, CacheError> {
        self.store
            .exists(key)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    #[cfg(target_arch = "wasm32")]
    fn keys_raw(&self) -> Result<Vec<String>, CacheError> {
        self.store
            .get_keys()
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    /// Open the default store.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open_default() -> Result<Self, CacheError> {
        Self::open(DEFAULT_STORE)
    }

    /// Open a named store. Every call with the same name sees the same data.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open(name: &str) -> Result<Self, CacheError> {
        Ok(Self {
            store: named_store(name),
        })
    }

    /// Create an empty in-process cache shared with nothing but its clones.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.store.read().get(key).cloned())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn set_raw(&self, key: &str, bytes: Vec<u8>) -> Result<(), CacheError> {
        self.store.write().insert(key.to_string(), bytes);
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn delete_raw(&self, key: &str) -> Result<(), CacheError> {
        self.store.write().remove(key);
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn exists_raw(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.store.read().contains_key(key))
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn keys_raw(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.store.read().keys().cloned().collect())
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let data: Option<SessionData<Attributes>> = cache.get("session:sess_abc")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.get_raw(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Set a value in the cache.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.set_raw(key, bytes)
    }

    /// Delete a value from the cache. Deleting a missing key is not an error.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.delete_raw(key)
    }

    /// Check if a key exists in the cache.
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.exists_raw(key)
    }

    /// Get all keys in the cache.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.keys_raw()
    }
}

/// Helper to build cache keys with namespacing.
///
/// # Example
///
/// ```rust,ignore
/// let key = cache_key!("session", session_id);
/// // Returns "session:sess_abc"
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let cache = Cache::in_memory();
        cache.set("answer", &42u32).unwrap();
        assert_eq!(cache.get::<u32>("answer").unwrap(), Some(42));
        assert!(cache.exists("answer").unwrap());
    }

    #[test]
    fn test_missing_key_is_none() {
        let cache = Cache::in_memory();
        assert_eq!(cache.get::<String>("nope").unwrap(), None);
        assert!(!cache.exists("nope").unwrap());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let cache = Cache::in_memory();
        cache.set("k", &"v").unwrap();
        cache.delete("k").unwrap();
        cache.delete("k").unwrap();
        assert!(cache.keys().unwrap().is_empty());
    }

    #[test]
    fn test_clones_share_storage() {
        let cache = Cache::in_memory();
        let other = cache.clone();
        cache.set("shared", &true).unwrap();
        assert_eq!(other.get::<bool>("shared").unwrap(), Some(true));
    }

    #[test]
    fn test_open_same_name_shares_data() {
        let first = Cache::open("kv-test-shared").unwrap();
        first.set("login", &"42").unwrap();

        let second = Cache::open("kv-test-shared").unwrap();
        assert_eq!(second.get::<String>("login").unwrap(), Some("42".to_string()));
    }

    #[test]
    fn test_open_distinct_names_are_isolated() {
        Cache::open("kv-test-left").unwrap().set("k", &1u8).unwrap();
        let right = Cache::open("kv-test-right").unwrap();
        assert_eq!(right.get::<u8>("k").unwrap(), None);
    }

    #[test]
    fn test_in_memory_is_not_registered() {
        let isolated = Cache::in_memory();
        isolated.set("k", &1u8).unwrap();
        assert!(!Cache::open(DEFAULT_STORE).unwrap().exists("k").unwrap());
    }

    #[test]
    fn test_type_mismatch_is_serialize_error() {
        let cache = Cache::in_memory();
        cache.set("k", &"text").unwrap();
        let err = cache.get::<u64>("k").unwrap_err();
        assert!(matches!(err, CacheError::SerializeError(_)));
    }

    #[test]
    fn test_cache_key_macro() {
        let key = cache_key!("session", "sess_abc");
        assert_eq!(key, "session:sess_abc");
    }
}
