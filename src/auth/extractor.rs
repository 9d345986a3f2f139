use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::PrivateCookieJar;
use serde::Serialize;

use super::state::AuthState;
use super::traits::UserStore;
use crate::types::User;

/// The user behind the current request, or the anonymous user.
///
/// Never rejects: a missing or invalid session, a user that no longer exists
/// and a failing user store all yield the anonymous user.
///
/// # Example
///
/// ```rust,ignore
/// async fn home(user: CurrentUser) -> String {
///     match user.user() {
///         Some(u) => format!("Hello, {}", u.display_name()),
///         None => "Hello, guest".to_string(),
///     }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    #[must_use]
    pub fn anonymous() -> Self {
        Self(None)
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.0.as_ref().is_some_and(|u| u.admin)
    }
}

impl<U: UserStore> FromRequestParts<AuthState<U>> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AuthState<U>,
    ) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::from_headers(&parts.headers, state.cookie_key().clone());
        Ok(current_user(state, &jar).await)
    }
}

/// Resolve the session's `user_id` to a local user.
pub async fn current_user<U: UserStore>(
    state: &AuthState<U>,
    jar: &PrivateCookieJar,
) -> CurrentUser {
    let Some(user_id) = state.sessions.load(jar).user_id else {
        return CurrentUser::anonymous();
    };

    match state.users.find_by_id(&user_id).await {
        Ok(user) => CurrentUser(user),
        Err(e) => {
            tracing::error!(
                error = %e,
                user_id = %user_id,
                "User lookup failed, serving as anonymous"
            );
            CurrentUser::anonymous()
        }
    }
}

/// JSON shape of [`CurrentUser`] served by the `me` route.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUserView {
    pub authenticated: bool,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub admin: bool,
}

impl From<&CurrentUser> for CurrentUserView {
    fn from(current: &CurrentUser) -> Self {
        match current.user() {
            Some(user) => Self {
                authenticated: true,
                email: Some(user.email.to_string()),
                name: Some(user.display_name().to_string()),
                picture: user.picture.clone(),
                admin: user.admin,
            },
            None => Self {
                authenticated: false,
                email: None,
                name: None,
                picture: None,
                admin: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;
    use axum::http::header::COOKIE;
    use axum::response::IntoResponse;
    use axum_extra::extract::cookie::Key;
    use time::OffsetDateTime;

    use super::*;
    use crate::auth::session::{Session, SessionLifetime};
    use crate::auth::{AuthConfig, StoreError};
    use crate::oauth::{AuthClient, OAuthConfig};
    use crate::store::MemoryUserStore;
    use crate::types::{Email, NewUser, UserId};

    fn state_with<U: UserStore>(users: U) -> AuthState<U> {
        let oauth = OAuthConfig::new(
            "id",
            "secret",
            "http://localhost/auth/authenticate".parse().unwrap(),
        );
        let config = AuthConfig::new(AuthClient::new(oauth).unwrap())
            .with_cookie_key(Key::generate());
        AuthState::new(config, users)
    }

    /// Parts of a request carrying `session` in its cookie.
    fn parts_with_session<U: UserStore>(state: &AuthState<U>, session: &Session) -> Parts {
        let jar = state.sessions.save(
            PrivateCookieJar::new(state.cookie_key().clone()),
            session,
            SessionLifetime::Browser,
        );
        let response = jar.into_response();
        let set_cookie = response.headers()["set-cookie"].to_str().unwrap();
        let pair = set_cookie.split(';').next().unwrap().to_string();

        let (parts, ()) = Request::builder()
            .uri("/")
            .header(COOKIE, pair)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    fn signed_in(email: &str) -> Session {
        Session {
            pending_state: None,
            user_id: Some(UserId::from(email.to_string())),
        }
    }

    struct FailingStore;

    impl UserStore for FailingStore {
        async fn find_by_email(&self, _: &Email) -> Result<Option<User>, StoreError> {
            Err("database unavailable".into())
        }

        async fn create(&self, _: NewUser) -> Result<User, StoreError> {
            Err("database unavailable".into())
        }
    }

    #[tokio::test]
    async fn no_cookie_is_anonymous() {
        let state = state_with(MemoryUserStore::new());
        let (mut parts, ()) = Request::builder().uri("/").body(()).unwrap().into_parts();
        let user = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert!(!user.is_authenticated());
    }

    #[tokio::test]
    async fn session_user_is_resolved() {
        let store = MemoryUserStore::new();
        store
            .create(NewUser::new("a@x.com", "sub-1"))
            .await
            .unwrap();
        let state = state_with(store);

        let mut parts = parts_with_session(&state, &signed_in("a@x.com"));
        let user = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.user().unwrap().email.as_str(), "a@x.com");
        assert!(!user.is_admin());
    }

    #[tokio::test]
    async fn unknown_user_is_anonymous() {
        let state = state_with(MemoryUserStore::new());
        let mut parts = parts_with_session(&state, &signed_in("gone@x.com"));
        let user = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user, CurrentUser::anonymous());
    }

    #[tokio::test]
    async fn store_failure_is_anonymous() {
        let state = state_with(FailingStore);
        let mut parts = parts_with_session(&state, &signed_in("a@x.com"));
        let user = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert!(!user.is_authenticated());
    }

    #[test]
    fn view_of_anonymous_user() {
        let view = CurrentUserView::from(&CurrentUser::anonymous());
        assert!(!view.authenticated);
        assert!(view.email.is_none());
    }

    #[test]
    fn view_of_signed_in_user() {
        let user = NewUser::new("a@x.com", "sub-1")
            .with_name("Ada")
            .into_user(OffsetDateTime::UNIX_EPOCH);
        let view = CurrentUserView::from(&CurrentUser(Some(user)));
        assert!(view.authenticated);
        assert_eq!(view.email.as_deref(), Some("a@x.com"));
        assert_eq!(view.name.as_deref(), Some("Ada"));
    }
}
