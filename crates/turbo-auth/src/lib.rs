//! Authentication module for TurboCommerce.
//!
//! Provides a session-backed [`Guard`] that resolves the current user from a
//! [`SessionStore`](turbo_cache::SessionStore), caches it for the request, and
//! handles login and logout. Users come from a [`UserProvider`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use turbo_auth::{Credentials, Guard, GuardName, MemoryUserProvider};
//! use turbo_cache::MemoryStore;
//!
//! let mut guard = Guard::new(GuardName::new("web"), provider)
//!     .with_session(Arc::new(MemoryStore::new()));
//!
//! let credentials = Credentials::new()
//!     .with("email", "ada@example.com")
//!     .with("password", "Secret123");
//!
//! // attempt() only checks credentials; login() persists the result.
//! let user = guard.attempt(&credentials)?;
//! guard.login(user)?;
//! assert!(guard.check()?);
//! ```

mod config;
mod error;
mod guard;
mod name;
mod password;
mod provider;
mod user;

pub use config::GuardConfig;
pub use error::AuthError;
pub use guard::Guard;
pub use name::{GuardName, DEFAULT_KEY_PREFIX};
pub use password::PasswordHasher;
pub use provider::{Credentials, MemoryUserProvider, UserProvider};
pub use user::{Authenticatable, GenericUser, UserId};
