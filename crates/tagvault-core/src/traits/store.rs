// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential store trait: row-level access by primary key plus the
//! uniqueness constraints on identity fields.

use async_trait::async_trait;

use crate::error::TagvaultError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    EntryRecord, IdentityRecord, NewIdentity, TokenProvision, UserId, WrappedKeyMaterial,
};

/// Persistence for identities, vault entries, and token provisioning.
///
/// Every entry operation is scoped by the owning `user_id`.
#[async_trait]
pub trait CredentialStore: PluginAdapter {
    /// Insert a new identity and return its id.
    ///
    /// Fails with [`TagvaultError::DuplicateIdentity`] when the username or
    /// token identifier is already taken.
    async fn insert_identity(&self, identity: &NewIdentity) -> Result<UserId, TagvaultError>;

    /// Look up an identity by username.
    async fn find_identity(&self, username: &str)
    -> Result<Option<IdentityRecord>, TagvaultError>;

    /// Look up an identity by id.
    async fn get_identity(&self, user_id: UserId) -> Result<Option<IdentityRecord>, TagvaultError>;

    /// Replace the password hash and wrapped vault key of an identity.
    async fn update_key_material(
        &self,
        user_id: UserId,
        key: &WrappedKeyMaterial,
    ) -> Result<(), TagvaultError>;

    /// Insert a vault entry.
    async fn insert_entry(&self, entry: &EntryRecord) -> Result<(), TagvaultError>;

    /// All entries owned by `user_id`, ordered by name.
    async fn list_entries(&self, user_id: UserId) -> Result<Vec<EntryRecord>, TagvaultError>;

    /// Replace an entry's fields in one statement. Returns `false` when no
    /// entry with that id is owned by `entry.user_id`.
    async fn update_entry(&self, entry: &EntryRecord) -> Result<bool, TagvaultError>;

    /// Delete an entry owned by `user_id`. Returns `false` when nothing matched.
    async fn delete_entry(&self, user_id: UserId, entry_id: &str) -> Result<bool, TagvaultError>;

    /// Insert the provisioning row for an identity.
    ///
    /// Fails with [`TagvaultError::Conflict`] when one already exists.
    async fn insert_token_provision(&self, provision: &TokenProvision)
    -> Result<(), TagvaultError>;

    /// The provisioning row for an identity, if any.
    async fn get_token_provision(
        &self,
        user_id: UserId,
    ) -> Result<Option<TokenProvision>, TagvaultError>;

    /// Increment the usage counter and return the new value.
    async fn advance_token_counter(&self, user_id: UserId) -> Result<i64, TagvaultError>;
}
