// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::FromRef;
use axum::routing::{get, post, put};
use tagvault_auth::{AuthService, VaultService};
use tagvault_config::ServerConfig;
use tagvault_core::{CredentialStore, TagReader, TagvaultError};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::SessionCookies;
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub vault: Arc<VaultService>,
    /// Used by the health endpoint.
    pub store: Arc<dyn CredentialStore>,
    pub reader: Arc<dyn TagReader>,
    /// Upper bound for one scan request.
    pub scan_timeout: Duration,
    pub cookies: SessionCookies,
}

impl FromRef<AppState> for SessionCookies {
    fn from_ref(state: &AppState) -> Self {
        state.cookies.clone()
    }
}

/// All routes with tracing and CORS applied.
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/initialize-rfid", get(handlers::initialize_rfid))
        .route("/rfid-scan", get(handlers::rfid_scan))
        .route("/rfid-verify", post(handlers::rfid_verify))
        .route("/logout", post(handlers::logout))
        .route("/status", get(handlers::status))
        .route("/change-password", post(handlers::change_password));

    let vault_routes = Router::new()
        .route("/", get(handlers::list_entries).post(handlers::add_entry))
        .route(
            "/{id}",
            put(handlers::update_entry).delete(handlers::delete_entry),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/auth", auth_routes)
        .nest("/api/vault", vault_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new())
        .with_state(state)
}

/// Bind `host:port` and serve until `shutdown` resolves.
pub async fn serve<F>(config: &ServerConfig, state: AppState, shutdown: F) -> Result<(), TagvaultError>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TagvaultError::Internal(format!("failed to bind {addr}: {e}")))?;

    info!(%addr, "gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| TagvaultError::Internal(format!("gateway server error: {e}")))?;

    info!("gateway stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("received SIGINT (Ctrl+C), shutting down"),
                    _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                ctrl_c.await;
                info!("received SIGINT (Ctrl+C), shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
        info!("received Ctrl+C, shutting down");
    }
}
