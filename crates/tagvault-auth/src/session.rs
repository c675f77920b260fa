// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session two-factor state machine.
//!
//! `Unauthenticated -> PasswordVerified -> FullyAuthenticated`. The user id,
//! the expected tag and the vault key exist only inside the verified
//! variants, so a session without a verified password cannot hold a key.

use chrono::{DateTime, Utc};
use subtle::ConstantTimeEq;
use tagvault_core::{AuthError, UserId};
use tagvault_vault::SecretKey;
use zeroize::Zeroizing;

use crate::context::SessionContext;
use crate::state::AuthState;

/// What a verified password unlocks.
struct Factors {
    user_id: UserId,
    vault_key: SecretKey,
    expected_token: String,
}

enum Phase {
    Unauthenticated,
    PasswordVerified(Factors),
    FullyAuthenticated(Factors),
}

/// One logical login session.
pub struct Session {
    id: String,
    phase: Phase,
    created_at: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A fresh session with a random id, in `Unauthenticated`.
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            phase: Phase::Unauthenticated,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn state(&self) -> AuthState {
        match self.phase {
            Phase::Unauthenticated => AuthState::Unauthenticated,
            Phase::PasswordVerified(_) => AuthState::PasswordVerified,
            Phase::FullyAuthenticated(_) => AuthState::FullyAuthenticated,
        }
    }

    /// The identity behind a verified password, in either verified state.
    pub fn verified_user(&self) -> Option<UserId> {
        match &self.phase {
            Phase::Unauthenticated => None,
            Phase::PasswordVerified(f) | Phase::FullyAuthenticated(f) => Some(f.user_id),
        }
    }

    /// Record a successful password check and the vault key it unsealed.
    ///
    /// Only valid from `Unauthenticated`; a session that already carries a
    /// verified identity must be replaced, not re-used.
    pub fn password_verified(
        &mut self,
        user_id: UserId,
        vault_key: SecretKey,
        expected_token: String,
    ) -> Result<(), AuthError> {
        if !matches!(self.phase, Phase::Unauthenticated) {
            return Err(AuthError::NotAuthorized);
        }
        self.phase = Phase::PasswordVerified(Factors {
            user_id,
            vault_key,
            expected_token,
        });
        Ok(())
    }

    /// Check a presented tag identifier against the registered one.
    ///
    /// A match moves `PasswordVerified` to `FullyAuthenticated` (and keeps
    /// `FullyAuthenticated`). A mismatch leaves the state untouched.
    pub fn verify_token(&mut self, presented: &str) -> Result<(), AuthError> {
        let factors = match &self.phase {
            Phase::Unauthenticated => return Err(AuthError::NotAuthorized),
            Phase::PasswordVerified(f) | Phase::FullyAuthenticated(f) => f,
        };

        let matches: bool = presented
            .trim()
            .as_bytes()
            .ct_eq(factors.expected_token.trim().as_bytes())
            .into();
        if !matches {
            return Err(AuthError::TokenMismatch);
        }

        if let Phase::PasswordVerified(_) = self.phase {
            let previous = std::mem::replace(&mut self.phase, Phase::Unauthenticated);
            if let Phase::PasswordVerified(f) = previous {
                self.phase = Phase::FullyAuthenticated(f);
            }
        }
        Ok(())
    }

    /// Produce the context vault operations require.
    pub fn context(&self) -> Result<SessionContext, AuthError> {
        match &self.phase {
            Phase::FullyAuthenticated(f) => Ok(SessionContext::new(
                f.user_id,
                f.vault_key.clone(),
            )),
            _ => Err(AuthError::NotAuthorized),
        }
    }

    /// Return to `Unauthenticated`, dropping (and wiping) the vault key.
    pub fn logout(&mut self) {
        self.phase = Phase::Unauthenticated;
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("user_id", &self.verified_user())
            .finish_non_exhaustive()
    }
}
