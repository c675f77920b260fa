// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity rows and their wrapped key material.

use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};
use tagvault_core::TagvaultError;
use tagvault_core::types::{
    IdentityRecord, KdfParams, NewIdentity, UserId, WrappedKeyMaterial,
};

use crate::database::{Database, is_unique_violation, map_tr_err};

const SELECT_IDENTITY: &str = "SELECT user_id, username, token_identifier, password_hash, \
     password_salt, kdf_salt, kdf_log_n, kdf_r, kdf_p, wrapped_vault_key, wrap_nonce, created_at \
     FROM identities";

fn identity_from_row(row: &Row<'_>) -> rusqlite::Result<IdentityRecord> {
    Ok(IdentityRecord {
        user_id: row.get(0)?,
        username: row.get(1)?,
        token_identifier: row.get(2)?,
        key: WrappedKeyMaterial {
            password_hash: row.get(3)?,
            password_salt: row.get(4)?,
            kdf_salt: row.get(5)?,
            kdf_params: KdfParams {
                log_n: row.get(6)?,
                r: row.get(7)?,
                p: row.get(8)?,
            },
            wrapped_vault_key: row.get(9)?,
            wrap_nonce: row.get(10)?,
        },
        created_at: row.get(11)?,
    })
}

/// Insert an identity. A taken username or token identifier yields
/// [`TagvaultError::DuplicateIdentity`].
pub async fn insert_identity(db: &Database, identity: &NewIdentity) -> Result<UserId, TagvaultError> {
    let identity = identity.clone();
    let created_at = Utc::now().to_rfc3339();
    db.connection()
        .call(move |conn| -> Result<UserId, rusqlite::Error> {
            let key = &identity.key;
            conn.execute(
                "INSERT INTO identities (username, token_identifier, password_hash, password_salt, \
                 kdf_salt, kdf_log_n, kdf_r, kdf_p, wrapped_vault_key, wrap_nonce, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    identity.username,
                    identity.token_identifier,
                    key.password_hash,
                    key.password_salt,
                    key.kdf_salt,
                    key.kdf_params.log_n,
                    key.kdf_params.r,
                    key.kdf_params.p,
                    key.wrapped_vault_key,
                    key.wrap_nonce,
                    created_at,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                TagvaultError::DuplicateIdentity
            } else {
                map_tr_err(e)
            }
        })
}

/// Find an identity by exact username.
pub async fn find_by_username(
    db: &Database,
    username: &str,
) -> Result<Option<IdentityRecord>, TagvaultError> {
    let username = username.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<IdentityRecord>, rusqlite::Error> {
            conn.query_row(
                &format!("{SELECT_IDENTITY} WHERE username = ?1"),
                params![username],
                identity_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Find an identity by id.
pub async fn get_by_id(db: &Database, user_id: UserId) -> Result<Option<IdentityRecord>, TagvaultError> {
    db.connection()
        .call(move |conn| -> Result<Option<IdentityRecord>, rusqlite::Error> {
            conn.query_row(
                &format!("{SELECT_IDENTITY} WHERE user_id = ?1"),
                params![user_id],
                identity_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Replace all password and wrapping columns in one statement.
pub async fn update_key_material(
    db: &Database,
    user_id: UserId,
    key: &WrappedKeyMaterial,
) -> Result<(), TagvaultError> {
    let key = key.clone();
    let changed = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE identities SET password_hash = ?1, password_salt = ?2, kdf_salt = ?3, \
                 kdf_log_n = ?4, kdf_r = ?5, kdf_p = ?6, wrapped_vault_key = ?7, wrap_nonce = ?8 \
                 WHERE user_id = ?9",
                params![
                    key.password_hash,
                    key.password_salt,
                    key.kdf_salt,
                    key.kdf_params.log_n,
                    key.kdf_params.r,
                    key.kdf_params.p,
                    key.wrapped_vault_key,
                    key.wrap_nonce,
                    user_id,
                ],
            )
        })
        .await
        .map_err(map_tr_err)?;

    if changed == 0 {
        return Err(TagvaultError::NotFound(format!("identity {user_id}")));
    }
    Ok(())
}
