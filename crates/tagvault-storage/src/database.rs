// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection management: PRAGMAs, migrations and shutdown.
//!
//! All statements run on tokio-rusqlite's single background thread, which
//! also serializes writes. Do not open a second connection for writing.

use std::path::Path;

use tagvault_core::TagvaultError;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::migrations;

/// Convert a tokio-rusqlite failure into a storage error.
pub(crate) fn map_tr_err(err: tokio_rusqlite::Error<rusqlite::Error>) -> TagvaultError {
    TagvaultError::storage(err)
}

/// True when the statement failed on a UNIQUE or PRIMARY KEY constraint.
pub(crate) fn is_unique_violation(err: &tokio_rusqlite::Error<rusqlite::Error>) -> bool {
    match err {
        tokio_rusqlite::Error::Error(rusqlite::Error::SqliteFailure(e, _)) => {
            e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}

/// Handle to the credential database.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` and migrate it.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, TagvaultError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(TagvaultError::storage)?;
            }
        }
        let conn = Connection::open(path).await.map_err(TagvaultError::storage)?;
        let db = Self { conn };
        db.prepare(wal_mode).await?;
        debug!(path, wal_mode, "database opened");
        Ok(db)
    }

    /// Open a private in-memory database. Nothing survives the handle.
    pub async fn open_in_memory() -> Result<Self, TagvaultError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(TagvaultError::storage)?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    async fn prepare(&self, wal_mode: bool) -> Result<(), TagvaultError> {
        self.conn
            .call(move |conn| -> Result<(), TagvaultError> {
                if wal_mode {
                    let mode: String = conn
                        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
                        .map_err(TagvaultError::storage)?;
                    debug!(journal_mode = %mode, "journal mode set");
                    conn.pragma_update(None, "synchronous", "NORMAL")
                        .map_err(TagvaultError::storage)?;
                }
                conn.pragma_update(None, "foreign_keys", "ON")
                    .map_err(TagvaultError::storage)?;
                conn.busy_timeout(std::time::Duration::from_secs(5))
                    .map_err(TagvaultError::storage)?;
                migrations::run_migrations(conn)
            })
            .await
            .map_err(|e| match e {
                tokio_rusqlite::Error::Error(inner) => inner,
                other => TagvaultError::Storage {
                    source: other.to_string().into(),
                },
            })
    }

    /// The underlying async connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Fold the WAL back into the main file. Safe to call without WAL.
    pub async fn checkpoint(&self) -> Result<(), TagvaultError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            })
            .await
            .map_err(map_tr_err)
    }
}
