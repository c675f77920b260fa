// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Envelope key management.
//!
//! Each identity owns a random 256-bit vault key. The vault key is sealed
//! under a wrapping key derived from the password with scrypt, and the
//! password itself is checked against an independent Argon2id hash before
//! any unwrapping is attempted.

use tagvault_config::CryptoConfig;
use tagvault_core::types::WrappedKeyMaterial;
use tagvault_core::{AuthError, TagvaultError};
use zeroize::Zeroizing;

use crate::crypto::{self, SecretKey};
use crate::kdf;

/// Associated data bound to every wrapped vault key.
const WRAP_AAD: &[u8] = b"tagvault:vault-key";

/// Creates, unseals and rewraps per-identity vault keys.
pub struct KeyManager {
    cost: CryptoConfig,
    /// Hash verified against when the username is unknown.
    dummy_hash: String,
}

impl std::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyManager")
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}

impl KeyManager {
    /// Build a manager for the given costs.
    ///
    /// Hashes one throwaway password so unknown-user logins can spend the
    /// same time as real ones.
    pub fn new(cost: CryptoConfig) -> Result<Self, TagvaultError> {
        let salt = kdf::generate_salt()?;
        let filler: [u8; 32] = crypto::random_bytes()?;
        let dummy_hash = kdf::hash_password(&filler, &salt, &cost)?;
        Ok(Self { cost, dummy_hash })
    }

    /// Generate a new vault key and wrap it under `password`.
    pub fn create(&self, password: &[u8]) -> Result<(WrappedKeyMaterial, SecretKey), TagvaultError> {
        let vault_key = crypto::generate_random_key()?;
        let material = self.wrap(password, &vault_key)?;
        Ok((material, vault_key))
    }

    /// Wrap an existing vault key under `password` with fresh salts and nonce.
    pub fn wrap(
        &self,
        password: &[u8],
        vault_key: &[u8; 32],
    ) -> Result<WrappedKeyMaterial, TagvaultError> {
        let password_salt = kdf::generate_salt()?;
        let password_hash = kdf::hash_password(password, &password_salt, &self.cost)?;

        let kdf_salt = kdf::generate_salt()?;
        let kdf_params = kdf::kdf_params_from(&self.cost);
        let wrapping_key = kdf::derive_wrapping_key(password, &kdf_salt, kdf_params)?;

        let (wrapped_vault_key, wrap_nonce) = crypto::seal(&wrapping_key, WRAP_AAD, vault_key)?;

        Ok(WrappedKeyMaterial {
            password_hash,
            password_salt: password_salt.to_vec(),
            kdf_salt: kdf_salt.to_vec(),
            kdf_params,
            wrapped_vault_key,
            wrap_nonce: wrap_nonce.to_vec(),
        })
    }

    /// Verify `password` and recover the vault key.
    ///
    /// The hash is checked first; scrypt and AES-GCM only run on a match.
    /// Every failure, including a record whose wrapped key no longer opens,
    /// surfaces as [`AuthError::InvalidCredentials`].
    pub fn unseal(
        &self,
        password: &[u8],
        material: &WrappedKeyMaterial,
    ) -> Result<SecretKey, TagvaultError> {
        if !kdf::verify_password(password, &material.password_hash)? {
            return Err(AuthError::InvalidCredentials.into());
        }

        let wrapping_key =
            kdf::derive_wrapping_key(password, &material.kdf_salt, material.kdf_params)?;
        let opened = crypto::open(
            &wrapping_key,
            &material.wrap_nonce,
            WRAP_AAD,
            &material.wrapped_vault_key,
        )
        .map_err(|_| {
            tracing::warn!("password hash matched but wrapped vault key did not open");
            TagvaultError::Auth(AuthError::InvalidCredentials)
        })?;

        let bytes: [u8; 32] = opened
            .as_slice()
            .try_into()
            .map_err(|_| TagvaultError::Auth(AuthError::InvalidCredentials))?;
        Ok(Zeroizing::new(bytes))
    }

    /// Burn one password verification and return the credential error.
    ///
    /// Used when no identity matches the submitted username.
    pub fn reject_unknown(&self, password: &[u8]) -> TagvaultError {
        let _ = kdf::verify_password(password, &self.dummy_hash);
        AuthError::InvalidCredentials.into()
    }

    /// Re-protect the same vault key under a new password.
    ///
    /// Entries stay valid because the vault key itself does not change.
    pub fn rewrap(
        &self,
        current_password: &[u8],
        new_password: &[u8],
        material: &WrappedKeyMaterial,
    ) -> Result<WrappedKeyMaterial, TagvaultError> {
        let vault_key = self.unseal(current_password, material)?;
        self.wrap(new_password, &vault_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cheap_cost;

    fn manager() -> KeyManager {
        KeyManager::new(cheap_cost()).unwrap()
    }

    #[test]
    fn unseal_with_correct_password_returns_registered_key() {
        let km = manager();
        let (material, key) = km.create(b"pw1").unwrap();
        let unsealed = km.unseal(b"pw1", &material).unwrap();
        assert_eq!(*unsealed, *key);
    }

    #[test]
    fn unseal_with_wrong_password_is_invalid_credentials() {
        let km = manager();
        let (material, _) = km.create(b"pw1").unwrap();
        for wrong in ["pw2", "", "PW1", "pw1 "] {
            assert!(matches!(
                km.unseal(wrong.as_bytes(), &material),
                Err(TagvaultError::Auth(AuthError::InvalidCredentials))
            ));
        }
    }

    #[test]
    fn salts_are_independent_and_material_is_fresh() {
        let km = manager();
        let (a, _) = km.create(b"pw").unwrap();
        let (b, _) = km.create(b"pw").unwrap();
        assert_ne!(a.password_salt, a.kdf_salt);
        assert_ne!(a.kdf_salt, b.kdf_salt);
        assert_ne!(a.wrap_nonce, b.wrap_nonce);
        assert_eq!(a.wrap_nonce.len(), 12);
        assert_eq!(a.wrapped_vault_key.len(), 32 + crypto::TAG_LEN);
    }

    #[test]
    fn corrupted_wrap_fails_closed() {
        let km = manager();
        let (mut material, _) = km.create(b"pw").unwrap();
        material.wrapped_vault_key[3] ^= 0xff;
        assert!(matches!(
            km.unseal(b"pw", &material),
            Err(TagvaultError::Auth(AuthError::InvalidCredentials))
        ));
    }

    #[test]
    fn unseal_uses_stored_params_not_current_config() {
        let (material, key) = manager().create(b"pw").unwrap();
        let mut changed = cheap_cost();
        changed.scrypt_log_n = 11;
        let later = KeyManager::new(changed).unwrap();
        assert_eq!(*later.unseal(b"pw", &material).unwrap(), *key);
    }

    #[test]
    fn rewrap_keeps_vault_key_and_changes_everything_else() {
        let km = manager();
        let (old, key) = km.create(b"old").unwrap();
        let new = km.rewrap(b"old", b"new", &old).unwrap();

        assert_ne!(old.password_hash, new.password_hash);
        assert_ne!(old.kdf_salt, new.kdf_salt);
        assert_ne!(old.wrap_nonce, new.wrap_nonce);
        assert_eq!(*km.unseal(b"new", &new).unwrap(), *key);
        assert!(km.unseal(b"old", &new).is_err());
    }

    #[test]
    fn rewrap_requires_current_password() {
        let km = manager();
        let (old, _) = km.create(b"old").unwrap();
        assert!(km.rewrap(b"guess", b"new", &old).is_err());
    }

    #[test]
    fn unknown_identity_rejection_is_invalid_credentials() {
        let km = manager();
        assert!(matches!(
            km.reject_unknown(b"anything"),
            TagvaultError::Auth(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn debug_hides_dummy_hash() {
        let km = manager();
        assert!(!format!("{km:?}").contains("argon2id"));
    }
}
