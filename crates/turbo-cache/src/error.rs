//! Cache and session store error types.

use thiserror::Error;

/// Errors that can occur when reading or writing session state.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Failed to open the backing store.
    #[error("Failed to open store: {0}")]
    OpenError(String),

    /// Failed to serialize or deserialize a stored value.
    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// The backing store rejected an operation.
    #[error("Store operation failed: {0}")]
    StoreError(String),

    /// A versioned write lost against a concurrent writer.
    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),
}
