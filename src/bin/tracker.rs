use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use tracing_subscriber::EnvFilter;
use tracker_auth::{AuthConfig, AuthState, CurrentUser, MemoryUserStore, auth_routes};

async fn home(user: CurrentUser) -> String {
    match user.user() {
        Some(u) => format!("Signed in as {}", u.display_name()),
        None => "Not signed in. Visit /auth/login".to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AuthConfig::from_env().context("Invalid authentication settings")?;
    let state = AuthState::new(config, MemoryUserStore::new());

    let app = Router::new()
        .route("/", get(home))
        .with_state(state.clone())
        .merge(auth_routes(state));

    let addr = std::env::var("TRACKER_LISTEN").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
