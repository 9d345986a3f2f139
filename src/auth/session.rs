use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::types::UserId;

/// Session state carried in the encrypted session cookie.
///
/// `user_id` present means authenticated; absent means anonymous.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Anti-CSRF token of the login attempt in flight. Single-use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl Session {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

/// How long the browser keeps the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionLifetime {
    /// No `Max-Age`; dropped when the browser closes.
    Browser,
    Persistent(Duration),
}

/// Reads and writes [`Session`] values through a private (encrypted and
/// authenticated) cookie.
#[derive(Debug, Clone)]
pub struct SessionStore {
    cookie_name: String,
    secure: bool,
}

impl SessionStore {
    #[must_use]
    pub fn new(cookie_name: impl Into<String>, secure: bool) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            secure,
        }
    }

    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Load the session from the request cookies.
    ///
    /// A missing, tampered, undecryptable or undecodable cookie yields an
    /// empty session.
    #[must_use]
    pub fn load(&self, jar: &PrivateCookieJar) -> Session {
        let Some(cookie) = jar.get(&self.cookie_name) else {
            return Session::default();
        };
        serde_json::from_str(cookie.value()).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Discarding undecodable session cookie");
            Session::default()
        })
    }

    /// Write `session` into the outgoing cookies.
    #[must_use]
    pub fn save(
        &self,
        jar: PrivateCookieJar,
        session: &Session,
        lifetime: SessionLifetime,
    ) -> PrivateCookieJar {
        // Serializing two optional strings cannot fail.
        let value = serde_json::to_string(session).unwrap_or_default();

        let mut builder = Cookie::build((self.cookie_name.clone(), value))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/");
        if let SessionLifetime::Persistent(max_age) = lifetime {
            builder = builder.max_age(max_age);
        }
        jar.add(builder.build())
    }

    /// Overwrite the session cookie with one the browser discards at once.
    #[must_use]
    pub fn expire(&self, jar: PrivateCookieJar) -> PrivateCookieJar {
        let cookie = Cookie::build((self.cookie_name.clone(), ""))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(Duration::seconds(-1))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .build();
        jar.add(cookie)
    }
}
