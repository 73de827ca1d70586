//! Session persistence layer for TurboCommerce.
//!
//! Provides the [`SessionStore`] capability consumed by the authentication
//! guard, an in-process [`MemoryStore`], and a [`Session`] that persists a
//! session's attributes in Spin's Key-Value Store through [`Cache`].
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_cache::{Cache, Session, SessionId, SessionStore};
//!
//! let cache = Cache::open_default()?;
//! let session = Session::new(cache, SessionId::from("sess_abc"));
//!
//! session.put("login_web", serde_json::json!("user_42"))?;
//! let id = session.get("login_web")?;
//! session.forget("login_web")?;
//! ```

mod error;
mod kv;
mod session;
mod store;

pub use error::CacheError;
pub use kv::{Cache, DEFAULT_STORE};
pub use session::{Attributes, Session, SessionData, SessionId};
pub use store::{MemoryStore, SessionStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, MemoryStore, Session, SessionId, SessionStore};
}
