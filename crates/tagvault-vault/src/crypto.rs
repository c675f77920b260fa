// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM seal/open with associated data.
//!
//! Every [`seal`] draws a fresh 96-bit nonce from the system CSPRNG.

use ring::aead::{AES_256_GCM, Aad, LessSafeKey, NONCE_LEN, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use tagvault_core::TagvaultError;
use zeroize::Zeroizing;

/// Length of the GCM authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// A 256-bit key that is wiped when dropped.
pub type SecretKey = Zeroizing<[u8; 32]>;

fn aead_key(key: &[u8; 32]) -> Result<LessSafeKey, TagvaultError> {
    UnboundKey::new(&AES_256_GCM, key)
        .map(LessSafeKey::new)
        .map_err(|_| TagvaultError::Crypto("failed to create AES-256-GCM key".to_string()))
}

/// Encrypt `plaintext`, authenticating `aad` alongside it.
///
/// Returns `(ciphertext_with_tag, nonce)`; both must be stored to decrypt.
pub fn seal(
    key: &[u8; 32],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; NONCE_LEN]), TagvaultError> {
    let key = aead_key(key)?;
    let nonce_bytes: [u8; NONCE_LEN] = random_bytes()?;

    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(
        Nonce::assume_unique_for_key(nonce_bytes),
        Aad::from(aad),
        &mut in_out,
    )
    .map_err(|_| TagvaultError::Crypto("AES-256-GCM encryption failed".to_string()))?;

    Ok((in_out, nonce_bytes))
}

/// Decrypt and authenticate a ciphertext produced by [`seal`].
///
/// A wrong key, altered ciphertext, different `aad`, or a nonce of the wrong
/// length all yield [`TagvaultError::Decryption`].
pub fn open(
    key: &[u8; 32],
    nonce: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, TagvaultError> {
    let key = aead_key(key)?;
    let nonce = Nonce::try_assume_unique_for_key(nonce).map_err(|_| TagvaultError::Decryption)?;

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    let plaintext_len = key
        .open_in_place(nonce, Aad::from(aad), in_out.as_mut_slice())
        .map_err(|_| TagvaultError::Decryption)?
        .len();
    in_out.truncate(plaintext_len);
    Ok(in_out)
}

/// Fill an array with CSPRNG output.
pub fn random_bytes<const N: usize>() -> Result<[u8; N], TagvaultError> {
    let mut out = [0u8; N];
    SystemRandom::new()
        .fill(&mut out)
        .map_err(|_| TagvaultError::Crypto("system random source failed".to_string()))?;
    Ok(out)
}

/// Generate a random 256-bit key.
pub fn generate_random_key() -> Result<SecretKey, TagvaultError> {
    let mut key = Zeroizing::new([0u8; 32]);
    SystemRandom::new()
        .fill(key.as_mut())
        .map_err(|_| TagvaultError::Crypto("failed to generate random key".to_string()))?;
    Ok(key)
}
