#![doc = include_str!("../README.md")]

pub mod auth;
pub mod csrf;
pub mod error;
pub mod oauth;
pub mod store;
pub mod types;

// Re-exports for convenient access
pub use auth::{AuthConfig, AuthError, AuthState, CurrentUser, UserStore, auth_routes};
pub use csrf::generate_state;
pub use error::Error;
pub use oauth::{AuthClient, OAuthConfig, Profile, TokenResponse};
pub use store::MemoryUserStore;
pub use types::{Email, NewUser, User, UserId};
