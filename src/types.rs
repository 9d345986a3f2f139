use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::oauth::Profile;

/// Email address reported by the identity provider.
///
/// The join key between a provider identity and a local [`User`].
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct Email(pub String);

impl Email {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Email {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<&Profile> for Email {
    /// Surrounding whitespace from the provider is not part of the key.
    fn from(profile: &Profile) -> Self {
        Self(profile.email.trim().to_owned())
    }
}

/// Stable identifier of an authenticated principal, as stored in the session.
///
/// Users are keyed by email, so this currently carries the user's email.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Local user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct User {
    pub email: Email,
    /// Provider subject (`sub`) seen when the user was first created.
    pub subject: String,
    pub name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture: Option<String>,
    /// Assigned out-of-band, never from provider data.
    pub admin: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl User {
    #[must_use]
    pub fn id(&self) -> UserId {
        UserId(self.email.0.clone())
    }

    /// Name to show in the UI, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.email.as_str())
    }
}

/// Fields for a user that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct NewUser {
    pub email: Email,
    pub subject: String,
    pub name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture: Option<String>,
}

impl NewUser {
    #[must_use]
    pub fn new(email: impl Into<Email>, subject: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            subject: subject.into(),
            name: None,
            given_name: None,
            family_name: None,
            picture: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Materialize the record; `admin` always starts out `false`.
    #[must_use]
    pub fn into_user(self, created_at: OffsetDateTime) -> User {
        User {
            email: self.email,
            subject: self.subject,
            name: self.name,
            given_name: self.given_name,
            family_name: self.family_name,
            picture: self.picture,
            admin: false,
            created_at,
        }
    }
}

impl From<&Profile> for NewUser {
    fn from(profile: &Profile) -> Self {
        Self {
            email: Email::from(profile),
            subject: profile.sub.clone(),
            name: profile.name.clone(),
            given_name: profile.given_name.clone(),
            family_name: profile.family_name.clone(),
            picture: profile.picture.clone(),
        }
    }
}
