use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Boxed error returned by [`UserStore`](super::UserStore) implementations.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Authentication errors for the controller layer.
///
/// The browser only ever sees a generic message; the detail carried here is
/// for the server log.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing or invalid configuration. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Callback state absent from the session or different from the stored one.
    #[error("State mismatch: {0}")]
    StateMismatch(&'static str),

    /// The provider redirected back with `error=`.
    #[error("Provider denied authorization: {0}")]
    ProviderDenied(String),

    /// Callback carried no authorization code.
    #[error("Callback is missing the authorization code")]
    MissingCode,

    /// Code-for-token exchange failed.
    #[error("Token exchange failed: {0}")]
    Exchange(#[source] crate::error::Error),

    /// Profile request failed or returned an unusable profile.
    #[error("Profile fetch failed: {0}")]
    ProfileFetch(#[source] crate::error::Error),

    /// The provider has not verified the profile's email.
    #[error("Email {0} is not verified by the provider")]
    UnverifiedEmail(String),

    /// User lookup or creation failed.
    #[error("User resolution failed: {0}")]
    UserResolution(#[source] StoreError),
}

impl AuthError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::StateMismatch(_) | Self::MissingCode => StatusCode::BAD_REQUEST,
            Self::ProviderDenied(_) | Self::UnverifiedEmail(_) => StatusCode::FORBIDDEN,
            Self::Exchange(_) | Self::ProfileFetch(_) => StatusCode::BAD_GATEWAY,
            Self::Config(_) | Self::UserResolution(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            Self::StateMismatch(_) | Self::MissingCode => {
                "Login request could not be verified. Please sign in again."
            }
            Self::ProviderDenied(_) => "Sign-in was cancelled or denied.",
            Self::UnverifiedEmail(_) => "Your account email is not verified.",
            Self::Exchange(_) | Self::ProfileFetch(_) => {
                "Could not complete sign-in with the identity provider."
            }
            Self::Config(_) | Self::UserResolution(_) => "Internal error",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::StateMismatch(_)
            | Self::MissingCode
            | Self::ProviderDenied(_)
            | Self::UnverifiedEmail(_) => {
                tracing::warn!(error = %self, "Login rejected");
            }
            Self::Exchange(_) | Self::ProfileFetch(_) => {
                tracing::error!(error = %self, "Identity provider error");
            }
            Self::Config(_) | Self::UserResolution(_) => {
                tracing::error!(error = %self, "Auth internal error");
            }
        }
        (self.status(), self.public_message()).into_response()
    }
}
