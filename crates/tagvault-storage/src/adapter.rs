// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of [`CredentialStore`].

use async_trait::async_trait;
use tracing::debug;

use tagvault_config::StorageConfig;
use tagvault_core::types::{
    EntryRecord, IdentityRecord, NewIdentity, TokenProvision, UserId, WrappedKeyMaterial,
};
use tagvault_core::{AdapterType, CredentialStore, HealthStatus, PluginAdapter, TagvaultError};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed credential store.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Open the configured database file, applying migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, TagvaultError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        debug!(path = %config.database_path, "SQLite credential store ready");
        Ok(Self { db })
    }

    /// A store backed by a private in-memory database.
    pub async fn in_memory() -> Result<Self, TagvaultError> {
        Ok(Self {
            db: Database::open_in_memory().await?,
        })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, TagvaultError> {
        let result = self
            .db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT 1", [], |row| row.get(0))
            })
            .await;
        Ok(match result {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(map_tr_err(e).to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), TagvaultError> {
        self.db.checkpoint().await?;
        debug!("shutdown: WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn insert_identity(&self, identity: &NewIdentity) -> Result<UserId, TagvaultError> {
        queries::identities::insert_identity(&self.db, identity).await
    }

    async fn find_identity(&self, username: &str) -> Result<Option<IdentityRecord>, TagvaultError> {
        queries::identities::find_by_username(&self.db, username).await
    }

    async fn get_identity(&self, user_id: UserId) -> Result<Option<IdentityRecord>, TagvaultError> {
        queries::identities::get_by_id(&self.db, user_id).await
    }

    async fn update_key_material(
        &self,
        user_id: UserId,
        key: &WrappedKeyMaterial,
    ) -> Result<(), TagvaultError> {
        queries::identities::update_key_material(&self.db, user_id, key).await
    }

    async fn insert_entry(&self, entry: &EntryRecord) -> Result<(), TagvaultError> {
        queries::entries::insert_entry(&self.db, entry).await
    }

    async fn list_entries(&self, user_id: UserId) -> Result<Vec<EntryRecord>, TagvaultError> {
        queries::entries::list_entries(&self.db, user_id).await
    }

    async fn update_entry(&self, entry: &EntryRecord) -> Result<bool, TagvaultError> {
        queries::entries::update_entry(&self.db, entry).await
    }

    async fn delete_entry(&self, user_id: UserId, entry_id: &str) -> Result<bool, TagvaultError> {
        queries::entries::delete_entry(&self.db, user_id, entry_id).await
    }

    async fn insert_token_provision(&self, provision: &TokenProvision) -> Result<(), TagvaultError> {
        queries::tokens::insert_provision(&self.db, provision).await
    }

    async fn get_token_provision(
        &self,
        user_id: UserId,
    ) -> Result<Option<TokenProvision>, TagvaultError> {
        queries::tokens::get_provision(&self.db, user_id).await
    }

    async fn advance_token_counter(&self, user_id: UserId) -> Result<i64, TagvaultError> {
        queries::tokens::advance_counter(&self.db, user_id).await
    }
}
