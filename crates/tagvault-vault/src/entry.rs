// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-entry encryption under an unsealed vault key.

use ring::aead::NONCE_LEN;
use tagvault_core::TagvaultError;

use crate::crypto;

/// Placeholder shown in listings for a secret that failed to open.
pub const UNDECRYPTABLE: &str = "[undecryptable]";

/// Seals and opens entry secrets, binding each to its entry id.
pub struct EntryCipher<'k> {
    key: &'k [u8; 32],
}

impl<'k> EntryCipher<'k> {
    pub fn new(vault_key: &'k [u8; 32]) -> Self {
        Self { key: vault_key }
    }

    /// Encrypt a secret under a fresh nonce.
    pub fn seal(
        &self,
        entry_id: &str,
        secret: &str,
    ) -> Result<(Vec<u8>, [u8; NONCE_LEN]), TagvaultError> {
        crypto::seal(self.key, entry_id.as_bytes(), secret.as_bytes())
    }

    /// Decrypt a secret. Fails with [`TagvaultError::Decryption`] on any
    /// authentication failure or non-UTF-8 plaintext.
    pub fn open(
        &self,
        entry_id: &str,
        nonce: &[u8],
        ciphertext: &[u8],
    ) -> Result<String, TagvaultError> {
        let plaintext = crypto::open(self.key, nonce, entry_id.as_bytes(), ciphertext)?;
        std::str::from_utf8(&plaintext)
            .map(str::to_owned)
            .map_err(|_| TagvaultError::Decryption)
    }
}
