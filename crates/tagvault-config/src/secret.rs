// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session-cookie signing secret, read from the environment only.

use secrecy::{ExposeSecret, SecretString};
use tagvault_core::TagvaultError;

/// Environment variable holding the cookie signing secret.
pub const SESSION_SECRET_ENV_VAR: &str = "TAGVAULT_SESSION_SECRET";

/// Shortest accepted secret, in bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

/// Read the session secret from [`SESSION_SECRET_ENV_VAR`].
///
/// A missing or short secret is a fatal startup error, there is no fallback.
pub fn load_session_secret() -> Result<SecretString, TagvaultError> {
    match std::env::var(SESSION_SECRET_ENV_VAR) {
        Ok(value) => check_session_secret(SecretString::from(value)),
        Err(std::env::VarError::NotPresent) => Err(TagvaultError::Config(format!(
            "{SESSION_SECRET_ENV_VAR} is not set; provide at least {MIN_SESSION_SECRET_LEN} bytes"
        ))),
        Err(std::env::VarError::NotUnicode(_)) => Err(TagvaultError::Config(format!(
            "{SESSION_SECRET_ENV_VAR} is not valid UTF-8"
        ))),
    }
}

/// Enforce the minimum length on an already obtained secret.
pub fn check_session_secret(secret: SecretString) -> Result<SecretString, TagvaultError> {
    let len = secret.expose_secret().len();
    if len < MIN_SESSION_SECRET_LEN {
        return Err(TagvaultError::Config(format!(
            "{SESSION_SECRET_ENV_VAR} must be at least {MIN_SESSION_SECRET_LEN} bytes, got {len}"
        )));
    }
    Ok(secret)
}
