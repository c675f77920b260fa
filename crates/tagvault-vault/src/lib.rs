// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Envelope encryption for Tagvault.
//!
//! A random vault key per identity encrypts that identity's entries. The
//! vault key is stored only in wrapped form, sealed with AES-256-GCM under a
//! scrypt-derived key. The password is verified separately against an
//! Argon2id hash.

pub mod crypto;
pub mod entry;
pub mod envelope;
pub mod kdf;

pub use crypto::SecretKey;
pub use entry::{EntryCipher, UNDECRYPTABLE};
pub use envelope::KeyManager;

#[cfg(test)]
pub(crate) fn cheap_cost() -> tagvault_config::CryptoConfig {
    tagvault_config::CryptoConfig {
        scrypt_log_n: 10,
        scrypt_r: 8,
        scrypt_p: 1,
        password_memory_cost: 1024,
        password_iterations: 1,
        password_parallelism: 1,
    }
}
