// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Proof of full authentication, passed to every vault operation.

use tagvault_core::UserId;
use tagvault_vault::SecretKey;

/// The identity and unsealed vault key of a fully authenticated session.
///
/// Only [`Session::context`](crate::Session::context) constructs one, so
/// holding a value means both factors were verified.
pub struct SessionContext {
    user_id: UserId,
    vault_key: SecretKey,
}

impl SessionContext {
    pub(crate) fn new(user_id: UserId, vault_key: SecretKey) -> Self {
        Self { user_id, vault_key }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub(crate) fn vault_key(&self) -> &[u8; 32] {
        &self.vault_key
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("user_id", &self.user_id)
            .field("vault_key", &"[REDACTED]")
            .finish()
    }
}
