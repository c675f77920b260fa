// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token provisioning rows.

use rusqlite::{OptionalExtension, params};
use tagvault_core::TagvaultError;
use tagvault_core::types::{TokenProvision, UserId};

use crate::database::{Database, is_unique_violation, map_tr_err};

/// Insert the provisioning row. A second insert for the same identity is a
/// [`TagvaultError::Conflict`].
pub async fn insert_provision(db: &Database, provision: &TokenProvision) -> Result<(), TagvaultError> {
    let provision = provision.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO rfid_tokens (user_id, secret, counter, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    provision.user_id,
                    provision.secret,
                    provision.counter,
                    provision.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                TagvaultError::Conflict("token already initialized".to_string())
            } else {
                map_tr_err(e)
            }
        })
}

pub async fn get_provision(db: &Database, user_id: UserId) -> Result<Option<TokenProvision>, TagvaultError> {
    db.connection()
        .call(move |conn| -> Result<Option<TokenProvision>, rusqlite::Error> {
            conn.query_row(
                "SELECT user_id, secret, counter, created_at FROM rfid_tokens WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(TokenProvision {
                        user_id: row.get(0)?,
                        secret: row.get(1)?,
                        counter: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Increment the counter and return its new value.
pub async fn advance_counter(db: &Database, user_id: UserId) -> Result<i64, TagvaultError> {
    let counter = db
        .connection()
        .call(move |conn| -> Result<Option<i64>, rusqlite::Error> {
            conn.query_row(
                "UPDATE rfid_tokens SET counter = counter + 1 WHERE user_id = ?1 RETURNING counter",
                params![user_id],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?;

    counter.ok_or_else(|| TagvaultError::NotFound(format!("token provision for identity {user_id}")))
}
