// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every Tagvault crate.
//!
//! Messages never carry key material, passwords, or decrypted secrets.

use thiserror::Error;

/// The primary error type used across Tagvault adapter traits and services.
#[derive(Debug, Error)]
pub enum TagvaultError {
    /// Configuration errors (invalid TOML, missing session secret, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Missing or malformed request fields.
    #[error("validation error: {0}")]
    Validation(String),

    /// Authentication failures. All of these surface as 401.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Username or token identifier is already registered.
    #[error("username or token identifier already exists")]
    DuplicateIdentity,

    /// A one-shot operation was attempted a second time.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The requested row does not exist for this identity.
    #[error("not found: {0}")]
    NotFound(String),

    /// Serial reader failures.
    #[error(transparent)]
    Hardware(#[from] HardwareError),

    /// A single vault entry failed its authenticity check.
    #[error("entry could not be decrypted")]
    Decryption,

    /// Key derivation, random generation, or cipher setup failed.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Storage backend errors (database connection, query failure, migrations).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Failures of the two-factor authentication flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Unknown username, wrong password, or a wrapped key that would not open.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The presented tag identifier differs from the registered one.
    #[error("token identifier does not match")]
    TokenMismatch,

    /// The session has not reached the state the operation requires.
    #[error("not authorized")]
    NotAuthorized,
}

/// Failures of the serial tag reader.
#[derive(Debug, Error)]
pub enum HardwareError {
    /// No serial ports at all, or none matching the reader allow-list.
    #[error("{0}")]
    UnauthorizedOrAbsent(String),

    /// Enumeration or port I/O failed.
    #[error("serial I/O failure: {0}")]
    Io(String),
}

impl TagvaultError {
    /// Wrap any error as a storage error.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        TagvaultError::Storage {
            source: Box::new(err),
        }
    }
}
