use std::collections::HashMap;

use axum_extra::extract::cookie::Key;
use time::Duration;
use url::Url;

use super::error::AuthError;
use crate::oauth::{AuthClient, OAuthConfig};

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "tracker";

const DEFAULT_AUTH_PATH: &str = "/auth";

/// Settings keys understood by [`AuthConfig::from_settings`], paired with the
/// environment variables [`AuthConfig::from_env`] reads them from.
const SETTINGS_ENV: &[(&str, &str)] = &[
    ("google_client_id", "GOOGLE_CLIENT_ID"),
    ("google_client_secret", "GOOGLE_CLIENT_SECRET"),
    ("host", "TRACKER_HOST"),
    ("session_key", "SESSION_KEY"),
    ("cookie_name", "TRACKER_COOKIE_NAME"),
    ("secure_cookies", "TRACKER_SECURE_COOKIES"),
    ("require_verified_email", "TRACKER_REQUIRE_VERIFIED_EMAIL"),
    ("auth_path", "TRACKER_AUTH_PATH"),
];

/// Shared auth settings used by both config and runtime state.
#[derive(Clone)]
pub(crate) struct AuthSettings {
    pub(crate) cookie_key: Key,
    pub(crate) cookie_name: String,
    pub(crate) session_ttl: Duration,
    pub(crate) secure_cookies: bool,
    pub(crate) auth_path: String,
    pub(crate) landing_page: String,
    pub(crate) logout_redirect: String,
    pub(crate) require_verified_email: bool,
}

impl AuthSettings {
    fn defaults() -> Self {
        Self {
            cookie_key: Key::generate(),
            cookie_name: DEFAULT_COOKIE_NAME.into(),
            session_ttl: Duration::days(7),
            secure_cookies: false,
            auth_path: DEFAULT_AUTH_PATH.into(),
            landing_page: "/show".into(),
            logout_redirect: "/".into(),
            require_verified_email: true,
        }
    }
}

/// Authentication configuration.
///
/// Use [`from_settings()`](AuthConfig::from_settings) or
/// [`from_env()`](AuthConfig::from_env) at startup, or
/// [`new()`](AuthConfig::new) with `with_*` methods for full control.
pub struct AuthConfig {
    pub(crate) client: AuthClient,
    pub(crate) settings: AuthSettings,
}

impl AuthConfig {
    /// Create config with the required `AuthClient`.
    ///
    /// The cookie key defaults to one generated for this process, so sessions
    /// do not survive a restart unless a key is supplied.
    #[must_use]
    pub fn new(client: AuthClient) -> Self {
        Self {
            client,
            settings: AuthSettings::defaults(),
        }
    }

    /// Create config from a settings map.
    ///
    /// # Required keys
    /// - `google_client_id`, `google_client_secret`: Google `OAuth2` credentials
    /// - `host`: public base URL; the redirect URI is
    ///   `{host}{auth_path}/authenticate`
    ///
    /// # Optional keys
    /// - `session_key`: cookie encryption key (at least 64 bytes)
    /// - `cookie_name`: session cookie name (default `tracker`)
    /// - `secure_cookies`: `true`/`false` (default: whether `host` is https)
    /// - `require_verified_email`: `true`/`false` (default `true`)
    /// - `auth_path`: prefix the auth routes are mounted under (default `/auth`)
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if a required key is missing or empty, or
    /// if a value does not parse.
    pub fn from_settings(settings: &HashMap<String, String>) -> Result<Self, AuthError> {
        let client_id = required(settings, "google_client_id")?;
        let client_secret = required(settings, "google_client_secret")?;
        let host: Url = required(settings, "host")?
            .parse()
            .map_err(|e| AuthError::Config(format!("host: {e}")))?;

        let redirect_uri: Url = format!(
            "{}{}/authenticate",
            host.as_str().trim_end_matches('/'),
            DEFAULT_AUTH_PATH
        )
        .parse()
        .map_err(|e| AuthError::Config(format!("host: {e}")))?;

        let client = AuthClient::new(OAuthConfig::new(client_id, client_secret, redirect_uri))
            .map_err(|e| AuthError::Config(e.to_string()))?;

        let mut config = Self::new(client)
            .with_secure_cookies(flag(settings, "secure_cookies", host.scheme() == "https")?)
            .with_require_verified_email(flag(settings, "require_verified_email", true)?);

        if let Some(key) = optional(settings, "session_key") {
            let key = Key::try_from(key.as_bytes()).map_err(|_| {
                AuthError::Config(
                    "session_key is set but invalid (must be at least 64 bytes). \
                     Remove it to use an ephemeral key, or provide a valid key."
                        .into(),
                )
            })?;
            config = config.with_cookie_key(key);
        }
        if let Some(name) = optional(settings, "cookie_name") {
            config = config.with_cookie_name(name);
        }
        if let Some(path) = optional(settings, "auth_path") {
            config = config.with_auth_path(path);
        }

        Ok(config)
    }

    /// Create config from environment variables.
    ///
    /// Reads `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`, `TRACKER_HOST`,
    /// `SESSION_KEY`, `TRACKER_COOKIE_NAME`, `TRACKER_SECURE_COOKIES`,
    /// `TRACKER_REQUIRE_VERIFIED_EMAIL` and `TRACKER_AUTH_PATH` into the keys of
    /// [`from_settings()`](AuthConfig::from_settings).
    ///
    /// # Errors
    ///
    /// See [`from_settings()`](AuthConfig::from_settings).
    pub fn from_env() -> Result<Self, AuthError> {
        let settings: HashMap<String, String> = SETTINGS_ENV
            .iter()
            .filter_map(|(key, var)| std::env::var(var).ok().map(|v| ((*key).to_string(), v)))
            .collect();
        Self::from_settings(&settings)
    }

    #[must_use]
    pub fn with_cookie_key(mut self, key: Key) -> Self {
        self.settings.cookie_key = key;
        self
    }

    #[must_use]
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.settings.cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.settings.session_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.settings.secure_cookies = secure;
        self
    }

    /// Mount the auth routes under `path` (default `/auth`).
    ///
    /// The client's redirect URI moves along with the callback route: its
    /// `{old path}/authenticate` suffix becomes `{path}/authenticate`, keeping
    /// any base path of the host in front of it.
    #[must_use]
    pub fn with_auth_path(mut self, path: impl AsRef<str>) -> Self {
        let trimmed = path.as_ref().trim().trim_matches('/');
        let path = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        };

        let old_callback = format!("{}/authenticate", self.settings.auth_path);
        let redirect_uri = self.client.redirect_uri_mut();
        let base = redirect_uri
            .path()
            .strip_suffix(&old_callback)
            .unwrap_or_default()
            .to_owned();
        redirect_uri.set_path(&format!("{base}{path}/authenticate"));

        self.settings.auth_path = path;
        self
    }

    #[must_use]
    pub fn with_landing_page(mut self, path: impl Into<String>) -> Self {
        self.settings.landing_page = path.into();
        self
    }

    #[must_use]
    pub fn with_logout_redirect(mut self, path: impl Into<String>) -> Self {
        self.settings.logout_redirect = path.into();
        self
    }

    /// Reject logins whose profile email is not verified (default: `true`).
    #[must_use]
    pub fn with_require_verified_email(mut self, required: bool) -> Self {
        self.settings.require_verified_email = required;
        self
    }
}

fn optional<'a>(settings: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    settings
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn required<'a>(settings: &'a HashMap<String, String>, key: &str) -> Result<&'a str, AuthError> {
    optional(settings, key).ok_or_else(|| AuthError::Config(format!("{key} is required")))
}

fn flag(settings: &HashMap<String, String>, key: &str, default: bool) -> Result<bool, AuthError> {
    match optional(settings, key) {
        None => Ok(default),
        Some("1" | "true") => Ok(true),
        Some("0" | "false") => Ok(false),
        Some(other) => Err(AuthError::Config(format!(
            "{key}: expected true or false, got {other:?}"
        ))),
    }
}
