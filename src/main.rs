//! TaskDeck Backend
//! Mission: Project/task tracking behind a small, correct auth core

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskdeck_backend::{
    app::build_router,
    auth::{AuthState, GoogleVerifier, IdentityStore, SessionTokens},
    config::Config,
    resources::{ResourceStore, ResourcesState},
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;

    let identity_store = Arc::new(IdentityStore::new(&config.database_path)?);
    let resource_store = Arc::new(ResourceStore::new(&config.database_path)?);
    let session_tokens = Arc::new(SessionTokens::new(
        &config.jwt_secret,
        config.session_ttl_secs,
    ));
    let google_verifier = Arc::new(GoogleVerifier::new(
        config.google_client_id.clone(),
        reqwest::Client::new(),
    ));

    let auth_state = AuthState {
        identity_store,
        session_tokens,
        google_verifier,
    };
    let resources_state = ResourcesState {
        store: resource_store,
    };

    let app = build_router(auth_state, resources_state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🚀 TaskDeck backend listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck_backend=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
