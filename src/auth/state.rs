use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use super::config::{AuthConfig, AuthSettings};
use super::session::{Session, SessionLifetime, SessionStore};
use super::traits::UserStore;
use crate::oauth::AuthClient;

/// Request-handling context: the provider client, the user store, the
/// session codec and the settings. Cheap to clone.
pub struct AuthState<U> {
    pub(crate) client: Arc<AuthClient>,
    pub(crate) users: Arc<U>,
    pub(crate) sessions: SessionStore,
    pub(crate) settings: Arc<AuthSettings>,
}

impl<U: UserStore> AuthState<U> {
    #[must_use]
    pub fn new(config: AuthConfig, users: U) -> Self {
        Self::with_shared_store(config, Arc::new(users))
    }

    /// Build state around a user store the caller keeps a handle to.
    #[must_use]
    pub fn with_shared_store(config: AuthConfig, users: Arc<U>) -> Self {
        let sessions = SessionStore::new(
            config.settings.cookie_name.clone(),
            config.settings.secure_cookies,
        );
        Self {
            client: Arc::new(config.client),
            users,
            sessions,
            settings: Arc::new(config.settings),
        }
    }

    #[must_use]
    pub fn users(&self) -> &U {
        &self.users
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    #[must_use]
    pub fn cookie_key(&self) -> &Key {
        &self.settings.cookie_key
    }

    /// Authenticated sessions persist for the configured TTL; anonymous ones
    /// last as long as the browser session.
    pub(crate) fn lifetime_for(&self, session: &Session) -> SessionLifetime {
        if session.is_authenticated() {
            SessionLifetime::Persistent(self.settings.session_ttl)
        } else {
            SessionLifetime::Browser
        }
    }
}

// Manual Clone: avoid derive adding a `U: Clone` bound.
impl<U> Clone for AuthState<U> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            users: self.users.clone(),
            sessions: self.sessions.clone(),
            settings: self.settings.clone(),
        }
    }
}

// PrivateCookieJar requires Key to be extractable from state
impl<U: UserStore> FromRef<AuthState<U>> for Key {
    fn from_ref(state: &AuthState<U>) -> Self {
        state.settings.cookie_key.clone()
    }
}
