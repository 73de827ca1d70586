//! Session-backed authentication guard.
//!
//! A [`Guard`] answers "who is the current user" for one unit of work. It
//! reads the logged-in user's identifier from a [`SessionStore`], resolves it
//! through a [`UserProvider`], and memoizes the result until logout.
//!
//! Resolution states:
//!
//! - `Unresolved`: initial, and after [`Guard::logout`]. [`Guard::user`]
//!   reads the session on every call while in this state, because an absent
//!   session value or an identifier that no longer resolves is not memoized.
//! - `Resolved(user)`: entered when [`Guard::user`] resolves a user, or
//!   unconditionally through [`Guard::login`]. No further session reads occur.
//!
//! [`Guard::attempt`] only verifies credentials. It neither writes the
//! session nor caches the user; call [`Guard::login`] with the returned user
//! to establish the login.

use crate::config::GuardConfig;
use crate::name::GuardName;
use crate::provider::{Credentials, UserProvider};
use crate::user::{Authenticatable, UserId};
use crate::AuthError;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};
use turbo_cache::SessionStore;

enum Resolution<U> {
    Unresolved,
    Resolved(U),
}

/// Authentication guard over a session store and a user provider.
///
/// One guard serves one request. Methods that may populate or clear the
/// cached user take `&mut self`; share a guard across tasks only behind
/// external synchronization.
pub struct Guard<P: UserProvider> {
    name: GuardName,
    provider: P,
    session: Option<Arc<dyn SessionStore>>,
    state: Resolution<P::User>,
}

impl<P: UserProvider> Guard<P> {
    /// Create a guard with no session store and no cached user.
    pub fn new(name: GuardName, provider: P) -> Self {
        Self {
            name,
            provider,
            session: None,
            state: Resolution::Unresolved,
        }
    }

    /// Create a guard from configuration.
    pub fn from_config(config: &GuardConfig, provider: P) -> Self {
        Self::new(config.guard_name(), provider)
    }

    /// Attach a session store, replacing any previous one.
    pub fn with_session(mut self, session: Arc<dyn SessionStore>) -> Self {
        self.set_session(session);
        self
    }

    /// The guard's name, from which its session key is derived.
    pub fn name(&self) -> &GuardName {
        &self.name
    }

    /// The user provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Determine if the current user is authenticated.
    pub fn check(&mut self) -> Result<bool, AuthError> {
        Ok(self.user()?.is_some())
    }

    /// Determine if the current user is a guest.
    pub fn guest(&mut self) -> Result<bool, AuthError> {
        Ok(!self.check()?)
    }

    /// Get the currently authenticated user.
    ///
    /// Returns the cached user if one is resolved. Otherwise reads the
    /// identifier from the session and resolves it through the provider; a
    /// resolved user is cached, absence is not.
    pub fn user(&mut self) -> Result<Option<&P::User>, AuthError> {
        if let Resolution::Unresolved = self.state {
            if let Some(user) = self.resolve_from_session()? {
                self.state = Resolution::Resolved(user);
            }
        } else {
            debug!(guard = %self.name, "user served from cache");
        }

        Ok(match &self.state {
            Resolution::Resolved(user) => Some(user),
            Resolution::Unresolved => None,
        })
    }

    /// Identifier of the current user, resolving it if needed.
    pub fn id(&mut self) -> Result<Option<UserId>, AuthError> {
        Ok(self.user()?.map(|user| user.identifier()))
    }

    /// Check credentials against the provider.
    ///
    /// Succeeds with the matching user, or fails with
    /// [`AuthError::InvalidCredentials`]. This does not log the user in:
    /// neither the session nor the cached user is touched.
    pub fn attempt(&self, credentials: &Credentials) -> Result<P::User, AuthError> {
        match self.provider.retrieve_by_credentials(credentials)? {
            Some(user) => {
                debug!(guard = %self.name, user_id = %user.identifier(), "credentials accepted");
                Ok(user)
            }
            None => {
                debug!(guard = %self.name, "credentials rejected");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Boolean form of [`attempt`](Self::attempt).
    ///
    /// Provider failures are still errors.
    pub fn validate(&self, credentials: &Credentials) -> Result<bool, AuthError> {
        match self.attempt(credentials) {
            Ok(_) => Ok(true),
            Err(AuthError::InvalidCredentials) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Log a user into the application.
    ///
    /// Stores the user's identifier in the session and caches the user.
    pub fn login(&mut self, user: P::User) -> Result<(), AuthError> {
        let id = user.identifier();
        self.session()?
            .put(self.name.session_key(), id.to_value())?;

        debug!(guard = %self.name, user_id = %id, "logged in");
        self.state = Resolution::Resolved(user);
        Ok(())
    }

    /// Log the user out of the application.
    ///
    /// Removes the identifier from the session and clears the cached user.
    /// Logging out while logged out is a no-op.
    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.session()?.forget(self.name.session_key())?;

        debug!(guard = %self.name, "logged out");
        self.state = Resolution::Unresolved;
        Ok(())
    }

    /// Get the session store used by the guard.
    ///
    /// Fails with [`AuthError::MissingSession`] if none was attached.
    pub fn session(&self) -> Result<&Arc<dyn SessionStore>, AuthError> {
        self.session.as_ref().ok_or_else(|| {
            error!(guard = %self.name, "no session instance set on guard");
            AuthError::MissingSession
        })
    }

    /// Set the session store to be used by the guard.
    pub fn set_session(&mut self, session: Arc<dyn SessionStore>) {
        self.session = Some(session);
    }

    /// The cached user, without consulting the session.
    pub fn cached_user(&self) -> Option<&P::User> {
        match &self.state {
            Resolution::Resolved(user) => Some(user),
            Resolution::Unresolved => None,
        }
    }

    /// Set the cached user without writing the session.
    pub fn set_user(&mut self, user: P::User) {
        self.state = Resolution::Resolved(user);
    }

    fn resolve_from_session(&self) -> Result<Option<P::User>, AuthError> {
        let Some(value) = self.session()?.get(self.name.session_key())? else {
            debug!(guard = %self.name, "no identifier in session");
            return Ok(None);
        };

        let Some(id) = UserId::from_value(&value) else {
            warn!(guard = %self.name, value = %value, "ignoring undecodable session identifier");
            return Ok(None);
        };

        let user = self.provider.retrieve_by_id(&id)?;
        match &user {
            Some(_) => debug!(guard = %self.name, user_id = %id, "user resolved from session"),
            None => debug!(guard = %self.name, user_id = %id, "session identifier no longer resolves"),
        }
        Ok(user)
    }
}

impl<P: UserProvider> fmt::Debug for Guard<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("name", &self.name)
            .field("has_session", &self.session.is_some())
            .field("resolved", &self.cached_user().is_some())
            .finish_non_exhaustive()
    }
}
