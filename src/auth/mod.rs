//! Google sign-in for the tracker web app, as an Axum router.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tracker_auth::auth::{AuthConfig, AuthState, CurrentUser, auth_routes};
//! use tracker_auth::store::MemoryUserStore;
//!
//! // 1. Configure from environment (fails fast on missing credentials)
//! let config = AuthConfig::from_env()?;
//!
//! // 2. Build the shared state around a user store
//! let state = AuthState::new(config, MemoryUserStore::new());
//!
//! // 3. Mount auth routes; use `CurrentUser` in your own handlers
//! let app = axum::Router::new()
//!     .route("/", axum::routing::get(home))
//!     .with_state(state.clone())
//!     .merge(auth_routes(state));
//! ```

mod config;
mod error;
mod extractor;
mod resolver;
mod routes;
mod session;
mod state;
mod traits;

pub use config::{AuthConfig, DEFAULT_COOKIE_NAME};
pub use error::{AuthError, StoreError};
pub use extractor::{CurrentUser, CurrentUserView, current_user};
pub use resolver::resolve_user;
pub use routes::auth_routes;
pub use session::{Session, SessionLifetime, SessionStore};
pub use state::AuthState;
pub use traits::UserStore;

/// Re-export cookie key type for builder API.
pub use axum_extra::extract::cookie::Key as CookieKey;
