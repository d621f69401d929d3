//! Recreo: AI-assisted therapy plan management for recreational
//! therapists. Patient profiles, structured plan generation, and a
//! searchable plan library, backed by a remote store with a local
//! fallback.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod export;
pub mod generator;
pub mod library;
pub mod models;
pub mod registry;
pub mod store;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::server::start_server;
use crate::api::types::ApiContext;
use crate::app::Action;
use crate::auth::{AuthClient, HttpAuthClient};
use crate::generator::HttpGenerationClient;
use crate::store::{Collection, HttpRemoteStore, LocalStore, RemoteStore};

/// Wire up the real clients, start the API server, and run until
/// interrupted.
pub async fn run() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let backend = config::backend_url();
    let remote: Arc<dyn RemoteStore> = Arc::new(HttpRemoteStore::new(&backend, 30));
    let local = Arc::new(
        LocalStore::open(&config::fallback_db_path())
            .map_err(|e| format!("Failed to open fallback store: {e}"))?,
    );
    let auth: Arc<dyn AuthClient> = Arc::new(HttpAuthClient::new(&backend, 30));
    let generation = Arc::new(HttpGenerationClient::new(
        &backend,
        config::GENERATION_TIMEOUT_SECS,
    ));

    let ctx = ApiContext::new(
        Collection::new(Arc::clone(&remote), Arc::clone(&local)),
        Collection::new(remote, local),
        Arc::clone(&auth),
        generation,
    );

    // Fold every observed auth change into the session gate.
    let mut auth_rx = auth.subscribe();
    let watch_ctx = ctx.clone();
    tokio::spawn(async move {
        while auth_rx.changed().await.is_ok() {
            let state = auth_rx.borrow_and_update().clone();
            watch_ctx.dispatch(Action::AuthChanged(state)).await;
        }
    });

    let mut server = start_server(ctx, &config::bind_addr()).await?;
    tracing::info!(addr = %server.addr, "Listening");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for shutdown signal: {e}"))?;
    server.shutdown();
    Ok(())
}
