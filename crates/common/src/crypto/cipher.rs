//! AES-256-GCM authenticated encryption
//!
//! This is the one symmetric primitive in the crate. It knows nothing about
//! what it encrypts: resource content and wrapped DEKs go through the same
//! two functions.
//!
//! Output format: `nonce (12 bytes) || ciphertext || tag (16 bytes)`.
//! A fresh random nonce is drawn for every call, so the same (key, nonce)
//! pair is never reused.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};

use super::error::{fill_random, CryptoError};

/// Size of the AES-GCM nonce (IV) in bytes
pub const NONCE_SIZE: usize = 12;
/// Size of the AES-GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;
/// Size of an AES-256 key in bytes
pub const KEY_SIZE: usize = 32;
/// Bytes added to a plaintext by [`encrypt`]
pub const OVERHEAD: usize = NONCE_SIZE + TAG_SIZE;

/// Encrypt `plaintext` under `key`
///
/// # Errors
///
/// Returns [`CryptoError::RandomnessUnavailable`] if a nonce cannot be drawn.
pub fn encrypt(plaintext: &[u8], key: &[u8; KEY_SIZE]) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    fill_random(&mut nonce_bytes)?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    // aes-gcm only fails here for plaintexts beyond the GCM length limit
    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CryptoError::MalformedInput("plaintext too long for AES-GCM".into()))?;

    let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    out.extend_from_slice(nonce.as_ref());
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt a blob produced by [`encrypt`]
///
/// Nothing is returned unless the tag verifies.
///
/// # Errors
///
/// - [`CryptoError::MalformedInput`] if the blob is shorter than nonce + tag
/// - [`CryptoError::AuthenticationFailure`] on tag mismatch (wrong key or tampering)
pub fn decrypt(blob: &[u8], key: &[u8; KEY_SIZE]) -> Result<Vec<u8>, CryptoError> {
    if blob.len() < OVERHEAD {
        return Err(CryptoError::MalformedInput(format!(
            "ciphertext too short, expected at least {}, got {}",
            OVERHEAD,
            blob.len()
        )));
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let (nonce, ciphertext) = blob.split_at(NONCE_SIZE);
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::AuthenticationFailure)
}
