// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record types exchanged between the services and the credential store.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Primary key of an identity row.
pub type UserId = i64;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    TagReader,
}

/// scrypt cost parameters persisted alongside each wrapped vault key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// log2 of the CPU/memory cost `N`.
    pub log_n: u8,
    /// Block size.
    pub r: u32,
    /// Parallelism.
    pub p: u32,
}

/// Everything needed to verify a password and unseal the vault key.
///
/// Produced by the envelope key manager at registration and on every
/// password change; written back as one unit.
#[derive(Clone, PartialEq, Eq)]
pub struct WrappedKeyMaterial {
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Raw salt used for `password_hash`.
    pub password_salt: Vec<u8>,
    /// Salt for the scrypt wrapping-key derivation.
    pub kdf_salt: Vec<u8>,
    pub kdf_params: KdfParams,
    /// AES-256-GCM ciphertext (with tag) of the 32-byte vault key.
    pub wrapped_vault_key: Vec<u8>,
    pub wrap_nonce: Vec<u8>,
}

impl std::fmt::Debug for WrappedKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrappedKeyMaterial")
            .field("password_hash", &"[REDACTED]")
            .field("kdf_params", &self.kdf_params)
            .field("wrapped_vault_key_len", &self.wrapped_vault_key.len())
            .finish()
    }
}

/// An identity about to be inserted.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub username: String,
    pub token_identifier: String,
    pub key: WrappedKeyMaterial,
}

/// A stored identity row.
#[derive(Debug, Clone)]
pub struct IdentityRecord {
    pub user_id: UserId,
    pub username: String,
    pub token_identifier: String,
    pub key: WrappedKeyMaterial,
    pub created_at: String,
}

/// A stored vault entry. Only `encrypted_secret` is confidential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    /// UUID v4, also bound as AEAD associated data.
    pub id: String,
    pub user_id: UserId,
    pub name: String,
    pub account_username: String,
    pub encrypted_secret: Vec<u8>,
    pub entry_nonce: Vec<u8>,
    pub url: String,
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Token provisioning row: a per-identity secret and its usage counter.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenProvision {
    pub user_id: UserId,
    pub secret: Vec<u8>,
    pub counter: i64,
    pub created_at: String,
}

impl std::fmt::Debug for TokenProvision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvision")
            .field("user_id", &self.user_id)
            .field("secret", &"[REDACTED]")
            .field("counter", &self.counter)
            .finish()
    }
}

/// Result of one bounded scan of the tag reader.
///
/// Timeouts and unreadable devices are ordinary outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// A tag-report line arrived; carries the trimmed identifier.
    Scanned(String),
    /// No tag-report line arrived before the deadline.
    TimedOut,
    /// The device could not be opened or stopped delivering data.
    Unreadable,
}

impl ScanOutcome {
    /// The scanned identifier, if any.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            ScanOutcome::Scanned(id) => Some(id),
            ScanOutcome::TimedOut | ScanOutcome::Unreadable => None,
        }
    }
}
