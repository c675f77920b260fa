// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault entry rows. Every statement is scoped by the owning user.

use rusqlite::{Row, params};
use tagvault_core::TagvaultError;
use tagvault_core::types::{EntryRecord, UserId};

use crate::database::{Database, map_tr_err};

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<EntryRecord> {
    Ok(EntryRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        account_username: row.get(3)?,
        encrypted_secret: row.get(4)?,
        entry_nonce: row.get(5)?,
        url: row.get(6)?,
        notes: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Insert a new entry.
pub async fn insert_entry(db: &Database, entry: &EntryRecord) -> Result<(), TagvaultError> {
    let entry = entry.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO vault_entries (entry_id, user_id, name, account_username, \
                 encrypted_secret, entry_nonce, url, notes, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    entry.id,
                    entry.user_id,
                    entry.name,
                    entry.account_username,
                    entry.encrypted_secret,
                    entry.entry_nonce,
                    entry.url,
                    entry.notes,
                    entry.created_at,
                    entry.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Entries owned by `user_id`, ordered by name.
pub async fn list_entries(db: &Database, user_id: UserId) -> Result<Vec<EntryRecord>, TagvaultError> {
    db.connection()
        .call(move |conn| -> Result<Vec<EntryRecord>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT entry_id, user_id, name, account_username, encrypted_secret, entry_nonce, \
                 url, notes, created_at, updated_at \
                 FROM vault_entries WHERE user_id = ?1 \
                 ORDER BY name COLLATE NOCASE, created_at",
            )?;
            stmt.query_map(params![user_id], entry_from_row)?
                .collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Overwrite an entry's secret, nonce and metadata.
///
/// Returns `false` when the entry does not exist or belongs to someone else.
pub async fn update_entry(db: &Database, entry: &EntryRecord) -> Result<bool, TagvaultError> {
    let entry = entry.clone();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE vault_entries SET name = ?1, account_username = ?2, encrypted_secret = ?3, \
                 entry_nonce = ?4, url = ?5, notes = ?6, updated_at = ?7 \
                 WHERE entry_id = ?8 AND user_id = ?9",
                params![
                    entry.name,
                    entry.account_username,
                    entry.encrypted_secret,
                    entry.entry_nonce,
                    entry.url,
                    entry.notes,
                    entry.updated_at,
                    entry.id,
                    entry.user_id,
                ],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete an entry owned by `user_id`.
pub async fn delete_entry(db: &Database, user_id: UserId, entry_id: &str) -> Result<bool, TagvaultError> {
    let entry_id = entry_id.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "DELETE FROM vault_entries WHERE entry_id = ?1 AND user_id = ?2",
                params![entry_id, user_id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}
