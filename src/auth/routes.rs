use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::PrivateCookieJar;
use serde::Deserialize;

use super::error::AuthError;
use super::extractor::{CurrentUser, CurrentUserView};
use super::resolver::resolve_user;
use super::session::SessionLifetime;
use super::state::AuthState;
use super::traits::UserStore;
use crate::csrf;
use crate::types::User;

/// Create the authentication router.
///
/// Mounts `login`, `authenticate`, `logout` and `me` under the configured
/// auth path (default `/auth`).
pub fn auth_routes<U: UserStore>(state: AuthState<U>) -> Router {
    let auth_path = state.settings.auth_path.clone();

    Router::new()
        .route(&format!("{auth_path}/login"), get(login::<U>))
        .route(&format!("{auth_path}/authenticate"), get(authenticate::<U>))
        .route(
            &format!("{auth_path}/logout"),
            get(logout::<U>).post(logout::<U>),
        )
        .route(&format!("{auth_path}/me"), get(me))
        .with_state(state)
}

// ── Login ──────────────────────────────────────────────────────────

async fn login<U: UserStore>(
    State(state): State<AuthState<U>>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Redirect) {
    let pending_state = csrf::generate_state();

    let mut session = state.sessions.load(&jar);
    session.pending_state = Some(pending_state.clone());
    let lifetime = state.lifetime_for(&session);
    let jar = state.sessions.save(jar, &session, lifetime);

    let url = state.client.authorization_url(&pending_state);
    (jar, Redirect::to(url.as_str()))
}

// ── Callback ───────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

async fn authenticate<U: UserStore>(
    State(state): State<AuthState<U>>,
    jar: PrivateCookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(PrivateCookieJar, Redirect), (PrivateCookieJar, AuthError)> {
    // The stored state is consumed by this callback whatever its outcome.
    let mut session = state.sessions.load(&jar);
    let stored_state = session.pending_state.take();

    match complete_login(&state, stored_state, params).await {
        Ok(user) => {
            let user_id = user.id();
            tracing::info!(user_id = %user_id, "Login successful");

            session.user_id = Some(user_id);
            let jar = state.sessions.save(
                jar,
                &session,
                SessionLifetime::Persistent(state.settings.session_ttl),
            );
            Ok((jar, Redirect::to(&state.settings.landing_page)))
        }
        Err(e) => {
            let lifetime = state.lifetime_for(&session);
            Err((state.sessions.save(jar, &session, lifetime), e))
        }
    }
}

/// Every step is a hard gate; the first failure rejects the login.
async fn complete_login<U: UserStore>(
    state: &AuthState<U>,
    stored_state: Option<String>,
    params: CallbackParams,
) -> Result<User, AuthError> {
    let stored_state = stored_state.ok_or(AuthError::StateMismatch("no login in progress"))?;
    let received_state = params
        .state
        .ok_or(AuthError::StateMismatch("callback carried no state"))?;
    if received_state != stored_state {
        return Err(AuthError::StateMismatch("callback state differs from stored state"));
    }

    if let Some(error) = params.error {
        return Err(AuthError::ProviderDenied(error));
    }
    let code = params
        .code
        .filter(|code| !code.is_empty())
        .ok_or(AuthError::MissingCode)?;

    let token = state
        .client
        .exchange_code(&code)
        .await
        .map_err(AuthError::Exchange)?;

    let profile = state
        .client
        .fetch_profile(&token.access_token)
        .await
        .map_err(AuthError::ProfileFetch)?;

    if state.settings.require_verified_email && !profile.email_verified {
        return Err(AuthError::UnverifiedEmail(profile.email));
    }

    resolve_user(state.users.as_ref(), &profile)
        .await
        .map_err(AuthError::UserResolution)
}

// ── Logout ─────────────────────────────────────────────────────────

async fn logout<U: UserStore>(
    State(state): State<AuthState<U>>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Redirect) {
    if let Some(user_id) = state.sessions.load(&jar).user_id {
        tracing::info!(user_id = %user_id, "Logout");
    }

    (
        state.sessions.expire(jar),
        Redirect::to(&state.settings.logout_redirect),
    )
}

// ── Current user ───────────────────────────────────────────────────

async fn me(user: CurrentUser) -> Json<CurrentUserView> {
    Json(CurrentUserView::from(&user))
}
