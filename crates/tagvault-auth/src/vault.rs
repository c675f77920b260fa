// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault entry operations. Each one needs a [`SessionContext`].

use std::sync::Arc;

use chrono::Utc;
use tagvault_core::types::EntryRecord;
use tagvault_core::{CredentialStore, TagvaultError};
use tagvault_vault::{EntryCipher, UNDECRYPTABLE};
use tracing::{debug, warn};

use crate::context::SessionContext;

/// Fields a client submits when adding or replacing an entry.
#[derive(Clone, Default)]
pub struct EntryInput {
    pub name: String,
    pub username: String,
    pub password: String,
    pub url: String,
    pub notes: String,
}

impl EntryInput {
    fn validate(&self) -> Result<(), TagvaultError> {
        if self.name.trim().is_empty() {
            return Err(TagvaultError::Validation("name is required".to_string()));
        }
        if self.password.is_empty() {
            return Err(TagvaultError::Validation("password is required".to_string()));
        }
        Ok(())
    }
}

/// A decrypted entry as returned by [`VaultService::list`].
#[derive(Clone, PartialEq, Eq)]
pub struct VaultEntry {
    pub id: String,
    pub name: String,
    pub username: String,
    /// The secret, or [`UNDECRYPTABLE`] when `decryptable` is false.
    pub password: String,
    pub url: String,
    pub notes: String,
    pub decryptable: bool,
}

impl std::fmt::Debug for VaultEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultEntry")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("password", &"[REDACTED]")
            .field("decryptable", &self.decryptable)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for EntryInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryInput")
            .field("name", &self.name)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Encrypted CRUD over one identity's entries.
pub struct VaultService {
    store: Arc<dyn CredentialStore>,
}

impl VaultService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Decrypt every entry the identity owns.
    ///
    /// An entry that fails to open is reported with [`UNDECRYPTABLE`] in
    /// place of its password; the others are unaffected.
    pub async fn list(&self, ctx: &SessionContext) -> Result<Vec<VaultEntry>, TagvaultError> {
        let records = self.store.list_entries(ctx.user_id()).await?;
        let cipher = EntryCipher::new(ctx.vault_key());

        let entries = records
            .into_iter()
            .map(|record| {
                let opened =
                    cipher.open(&record.id, &record.entry_nonce, &record.encrypted_secret);
                let (password, decryptable) = match opened {
                    Ok(secret) => (secret, true),
                    Err(_) => {
                        warn!(entry_id = %record.id, "entry could not be decrypted");
                        (UNDECRYPTABLE.to_string(), false)
                    }
                };
                VaultEntry {
                    id: record.id,
                    name: record.name,
                    username: record.account_username,
                    password,
                    url: record.url,
                    notes: record.notes,
                    decryptable,
                }
            })
            .collect();
        Ok(entries)
    }

    /// Encrypt and store a new entry; returns its id.
    pub async fn add(&self, ctx: &SessionContext, input: EntryInput) -> Result<String, TagvaultError> {
        input.validate()?;
        let id = uuid::Uuid::new_v4().to_string();
        let (encrypted_secret, nonce) = EntryCipher::new(ctx.vault_key()).seal(&id, &input.password)?;
        let now = Utc::now().to_rfc3339();

        self.store
            .insert_entry(&EntryRecord {
                id: id.clone(),
                user_id: ctx.user_id(),
                name: input.name.trim().to_string(),
                account_username: input.username,
                encrypted_secret,
                entry_nonce: nonce.to_vec(),
                url: input.url,
                notes: input.notes,
                created_at: now.clone(),
                updated_at: now,
            })
            .await?;
        debug!(user_id = ctx.user_id(), entry_id = %id, "entry added");
        Ok(id)
    }

    /// Replace an entry's secret and metadata under a fresh nonce.
    pub async fn update(
        &self,
        ctx: &SessionContext,
        entry_id: &str,
        input: EntryInput,
    ) -> Result<(), TagvaultError> {
        input.validate()?;
        let (encrypted_secret, nonce) =
            EntryCipher::new(ctx.vault_key()).seal(entry_id, &input.password)?;

        let updated = self
            .store
            .update_entry(&EntryRecord {
                id: entry_id.to_string(),
                user_id: ctx.user_id(),
                name: input.name.trim().to_string(),
                account_username: input.username,
                encrypted_secret,
                entry_nonce: nonce.to_vec(),
                url: input.url,
                notes: input.notes,
                created_at: String::new(),
                updated_at: Utc::now().to_rfc3339(),
            })
            .await?;
        if !updated {
            return Err(TagvaultError::NotFound("entry".to_string()));
        }
        debug!(user_id = ctx.user_id(), entry_id, "entry updated");
        Ok(())
    }

    /// Delete one of the identity's entries.
    pub async fn delete(&self, ctx: &SessionContext, entry_id: &str) -> Result<(), TagvaultError> {
        if !self.store.delete_entry(ctx.user_id(), entry_id).await? {
            return Err(TagvaultError::NotFound("entry".to_string()));
        }
        debug!(user_id = ctx.user_id(), entry_id, "entry deleted");
        Ok(())
    }
}
