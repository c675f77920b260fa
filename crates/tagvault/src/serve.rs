// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tagvault serve` command implementation.
//!
//! Wires the SQLite store, envelope key manager, session registry, serial
//! tag reader and HTTP gateway together, then serves until Ctrl+C/SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use tagvault_auth::{AuthService, SessionRegistry, VaultService};
use tagvault_config::TagvaultConfig;
use tagvault_core::{CredentialStore, HealthStatus, PluginAdapter, TagReader, TagvaultError};
use tagvault_gateway::{AppState, SessionCookies};
use tagvault_reader::TagReaderHandle;
use tagvault_storage::SqliteStore;
use tagvault_vault::KeyManager;
use tracing::{info, warn};

/// Runs the `tagvault serve` command.
pub async fn run_serve(config: TagvaultConfig) -> Result<(), TagvaultError> {
    init_tracing(&config.server.log_level);

    let secret = tagvault_config::load_session_secret()?;
    let cookies = SessionCookies::new(&secret, config.session.cookie_secure)?;
    drop(secret);

    let store = Arc::new(SqliteStore::open(&config.storage).await?);
    info!(path = %config.storage.database_path, "credential store opened");

    let keys = Arc::new(KeyManager::new(config.crypto.clone())?);
    let sessions = Arc::new(SessionRegistry::from_config(&config.session));

    let reader = Arc::new(TagReaderHandle::system(&config.reader));
    log_health(reader.as_ref()).await;

    let store_dyn: Arc<dyn CredentialStore> = store.clone();
    let reader_dyn: Arc<dyn TagReader> = reader.clone();
    let state = AppState {
        auth: Arc::new(AuthService::new(
            Arc::clone(&store_dyn),
            keys,
            sessions,
        )),
        vault: Arc::new(VaultService::new(Arc::clone(&store_dyn))),
        store: store_dyn,
        reader: reader_dyn,
        scan_timeout: Duration::from_secs(config.reader.scan_timeout_secs),
        cookies,
    };

    let served =
        tagvault_gateway::serve(&config.server, state, tagvault_gateway::shutdown_signal()).await;

    if let Err(e) = reader.shutdown().await {
        warn!(error = %e, "reader shutdown failed");
    }
    if let Err(e) = store.shutdown().await {
        warn!(error = %e, "store shutdown failed");
    }
    info!("tagvault stopped");
    served
}

async fn log_health(adapter: &dyn PluginAdapter) {
    match adapter.health_check().await {
        Ok(HealthStatus::Healthy) => info!(adapter = adapter.name(), "adapter healthy"),
        Ok(HealthStatus::Degraded(reason)) | Ok(HealthStatus::Unhealthy(reason)) => {
            warn!(adapter = adapter.name(), %reason, "adapter not ready")
        }
        Err(e) => warn!(adapter = adapter.name(), error = %e, "health check failed"),
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tagvault={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
