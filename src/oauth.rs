use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;

/// Scope granting read access to the user's primary email address.
pub const EMAIL_SCOPE: &str = "https://www.googleapis.com/auth/userinfo.email";

/// Default bound on each provider round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Google `OAuth2` configuration.
///
/// Required fields are constructor parameters. Endpoints default to Google's
/// and can be overridden (tests point them at a mock server).
///
/// ```rust,ignore
/// use tracker_auth::OAuthConfig;
///
/// let config = OAuthConfig::new(
///     "client-id",
///     "client-secret",
///     "https://tracker.example.com/auth/authenticate".parse()?,
/// );
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub struct OAuthConfig {
    pub(crate) client_id: String,
    pub(crate) client_secret: SecretString,
    pub(crate) auth_url: Url,
    pub(crate) token_url: Url,
    pub(crate) userinfo_url: Url,
    pub(crate) redirect_uri: Url,
    pub(crate) scopes: Vec<String>,
    pub(crate) timeout: Duration,
}

impl OAuthConfig {
    /// Create a new `OAuth2` configuration against Google's endpoints.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: Url,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            redirect_uri,
            auth_url: "https://accounts.google.com/o/oauth2/auth"
                .parse()
                .expect("valid default URL"),
            token_url: "https://oauth2.googleapis.com/token"
                .parse()
                .expect("valid default URL"),
            userinfo_url: "https://www.googleapis.com/oauth2/v3/userinfo"
                .parse()
                .expect("valid default URL"),
            scopes: vec![EMAIL_SCOPE.into()],
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the authorization endpoint.
    #[must_use]
    pub fn with_auth_url(mut self, url: Url) -> Self {
        self.auth_url = url;
        self
    }

    /// Override the token endpoint.
    #[must_use]
    pub fn with_token_url(mut self, url: Url) -> Self {
        self.token_url = url;
        self
    }

    /// Override the userinfo endpoint.
    #[must_use]
    pub fn with_userinfo_url(mut self, url: Url) -> Self {
        self.userinfo_url = url;
        self
    }

    /// Override the requested scopes (default: the email-read scope).
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Override the per-request timeout (default: 10 seconds).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `OAuth2` client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Authorization endpoint URL.
    #[must_use]
    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    /// Token exchange endpoint URL.
    #[must_use]
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// User info endpoint URL.
    #[must_use]
    pub fn userinfo_url(&self) -> &Url {
        &self.userinfo_url
    }

    /// `OAuth2` redirect URI.
    #[must_use]
    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }

    /// Requested `OAuth2` scopes.
    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Per-request timeout for provider calls.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// `OAuth2` Authorization-Code client for Google.
pub struct AuthClient {
    config: OAuthConfig,
    http: reqwest::Client,
}

/// Token response from the token endpoint.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
}

/// Profile returned by the userinfo endpoint. Untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Profile {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

impl Profile {
    /// Create a profile with the required fields.
    #[must_use]
    pub fn new(sub: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            email: email.into(),
            email_verified: false,
            name: None,
            given_name: None,
            family_name: None,
            profile: None,
            picture: None,
            gender: None,
        }
    }

    /// Set the email_verified flag.
    #[must_use]
    pub fn with_email_verified(mut self, verified: bool) -> Self {
        self.email_verified = verified;
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl AuthClient {
    /// Create a client whose requests are bounded by the configured timeout.
    ///
    /// Redirects are never followed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn new(config: OAuthConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    #[must_use]
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    pub(crate) fn redirect_uri_mut(&mut self) -> &mut Url {
        &mut self.config.redirect_uri
    }

    /// Build the provider authorization URL carrying `state`.
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> Url {
        let scope = self.config.scopes.join(" ");

        let mut url = self.config.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", self.config.redirect_uri.as_str())
            .append_pair("scope", &scope)
            .append_pair("state", state);
        url
    }

    /// Exchange an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// [`Error::Http`] on transport failure or timeout, [`Error::Provider`]
    /// if the endpoint rejects the code, [`Error::Decode`] or
    /// [`Error::MissingField`] on a malformed response.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, Error> {
        const OPERATION: &str = "token exchange";

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret()),
        ];

        let response = self
            .http
            .post(self.config.token_url.clone())
            .form(&params)
            .send()
            .await
            .map_err(|source| Error::Http {
                operation: OPERATION,
                source,
            })?;

        let token: TokenResponse = Self::decode(response, OPERATION).await?;
        if token.access_token.is_empty() {
            return Err(Error::MissingField {
                operation: OPERATION,
                field: "access_token",
            });
        }
        Ok(token)
    }

    /// Fetch the profile of the user the access token belongs to.
    ///
    /// # Errors
    ///
    /// [`Error::Http`] on transport failure or timeout, [`Error::Provider`]
    /// on a non-success status, [`Error::Decode`] if the body is not a
    /// profile, [`Error::MissingField`] if the email is empty.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<Profile, Error> {
        const OPERATION: &str = "userinfo request";

        let response = self
            .http
            .get(self.config.userinfo_url.clone())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|source| Error::Http {
                operation: OPERATION,
                source,
            })?;

        let profile: Profile = Self::decode(response, OPERATION).await?;
        if profile.email.trim().is_empty() {
            return Err(Error::MissingField {
                operation: OPERATION,
                field: "email",
            });
        }
        Ok(profile)
    }

    /// Checks the status, then decodes the whole body as `T`.
    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<T, Error> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| Error::Http { operation, source })?;

        if !status.is_success() {
            return Err(Error::Provider {
                operation,
                status: status.as_u16(),
                detail: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        serde_json::from_slice(&body).map_err(|source| Error::Decode { operation, source })
    }
}
