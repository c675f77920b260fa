// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::Serialize;

/// How far a session has progressed through the two factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    /// No factor verified.
    Unauthenticated,
    /// Password verified and vault key unsealed; tag not yet presented.
    PasswordVerified,
    /// Both factors verified. Vault operations are allowed.
    FullyAuthenticated,
}

impl std::fmt::Display for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthState::Unauthenticated => write!(f, "unauthenticated"),
            AuthState::PasswordVerified => write!(f, "password_verified"),
            AuthState::FullyAuthenticated => write!(f, "fully_authenticated"),
        }
    }
}
