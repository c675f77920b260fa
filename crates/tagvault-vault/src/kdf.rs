// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password hashing (Argon2id) and wrapping-key derivation (scrypt).
//!
//! The two use independent salts. The Argon2id hash only ever verifies the
//! password; the scrypt output only ever wraps the vault key.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use tagvault_config::CryptoConfig;
use tagvault_core::TagvaultError;
use tagvault_core::types::KdfParams;
use zeroize::Zeroizing;

use crate::crypto::{self, SecretKey};

/// Length of both the password salt and the KDF salt.
pub const SALT_LEN: usize = 16;

/// Generate a random 16-byte salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN], TagvaultError> {
    crypto::random_bytes()
}

/// The scrypt parameters configured for new wraps.
pub fn kdf_params_from(config: &CryptoConfig) -> KdfParams {
    KdfParams {
        log_n: config.scrypt_log_n,
        r: config.scrypt_r,
        p: config.scrypt_p,
    }
}

/// Hash `password` into an Argon2id PHC string using the configured cost.
pub fn hash_password(
    password: &[u8],
    salt: &[u8],
    config: &CryptoConfig,
) -> Result<String, TagvaultError> {
    let params = Params::new(
        config.password_memory_cost,
        config.password_iterations,
        config.password_parallelism,
        None,
    )
    .map_err(|e| TagvaultError::Crypto(format!("invalid Argon2id parameters: {e}")))?;

    let salt = SaltString::encode_b64(salt)
        .map_err(|e| TagvaultError::Crypto(format!("invalid password salt: {e}")))?;

    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password, &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| TagvaultError::Crypto(format!("password hashing failed: {e}")))
}

/// Check `password` against a PHC string.
///
/// The cost parameters come from the PHC string itself, so hashes made under
/// older settings keep verifying. `Ok(false)` means the password is wrong.
pub fn verify_password(password: &[u8], phc: &str) -> Result<bool, TagvaultError> {
    let parsed = PasswordHash::new(phc)
        .map_err(|e| TagvaultError::Crypto(format!("malformed password hash: {e}")))?;

    match Argon2::default().verify_password(password, &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(TagvaultError::Crypto(format!(
            "password verification failed: {e}"
        ))),
    }
}

/// Derive the 32-byte key that wraps the vault key.
pub fn derive_wrapping_key(
    password: &[u8],
    salt: &[u8],
    params: KdfParams,
) -> Result<SecretKey, TagvaultError> {
    let scrypt_params = scrypt::Params::new(params.log_n, params.r, params.p, 32)
        .map_err(|e| TagvaultError::Crypto(format!("invalid scrypt parameters: {e}")))?;

    let mut output = Zeroizing::new([0u8; 32]);
    scrypt::scrypt(password, salt, &scrypt_params, output.as_mut())
        .map_err(|e| TagvaultError::Crypto(format!("scrypt derivation failed: {e}")))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cheap_cost;

    #[test]
    fn hash_verifies_only_the_right_password() {
        let salt = generate_salt().unwrap();
        let phc = hash_password(b"pw1", &salt, &cheap_cost()).unwrap();
        assert!(phc.starts_with("$argon2id$"));
        assert!(verify_password(b"pw1", &phc).unwrap());
        assert!(!verify_password(b"pw2", &phc).unwrap());
    }

    #[test]
    fn hash_embeds_its_cost() {
        let salt = generate_salt().unwrap();
        let phc = hash_password(b"pw", &salt, &cheap_cost()).unwrap();
        assert!(phc.contains("m=1024,t=1,p=1"));
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password(b"pw", "not-a-phc-string"),
            Err(TagvaultError::Crypto(_))
        ));
    }

    #[test]
    fn wrapping_key_is_deterministic_per_salt() {
        let params = kdf_params_from(&cheap_cost());
        let a = derive_wrapping_key(b"pw", &[1u8; 16], params).unwrap();
        let b = derive_wrapping_key(b"pw", &[1u8; 16], params).unwrap();
        let c = derive_wrapping_key(b"pw", &[2u8; 16], params).unwrap();
        let d = derive_wrapping_key(b"other", &[1u8; 16], params).unwrap();
        assert_eq!(*a, *b);
        assert_ne!(*a, *c);
        assert_ne!(*a, *d);
    }

    #[test]
    fn invalid_scrypt_params_are_rejected() {
        let params = KdfParams {
            log_n: 0,
            r: 0,
            p: 0,
        };
        assert!(derive_wrapping_key(b"pw", &[0u8; 16], params).is_err());
    }

    #[test]
    fn salts_are_random() {
        assert_ne!(generate_salt().unwrap(), generate_salt().unwrap());
    }
}
