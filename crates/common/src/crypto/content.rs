//! Encryption of JSON-shaped resource content under a resource's DEK
//!
//! Content is serialized with `serde_json`, sealed with the AEAD cipher and
//! handed out as a base64 blob (`nonce || ciphertext || tag`).

use serde::de::DeserializeOwned;
use serde::Serialize;
use zeroize::Zeroizing;

use super::cipher;
use super::codec;
use super::dek::Dek;
use super::error::CryptoError;

/// Serialize `value` and encrypt it under `dek`
///
/// # Errors
///
/// - [`CryptoError::Serialization`] if `value` cannot be represented as JSON
/// - [`CryptoError::RandomnessUnavailable`] if a nonce cannot be drawn
pub fn encrypt_resource<T>(value: &T, dek: &Dek) -> Result<String, CryptoError>
where
    T: Serialize + ?Sized,
{
    let plaintext = Zeroizing::new(serde_json::to_vec(value)?);
    let blob = cipher::encrypt(&plaintext, dek.bytes())?;
    Ok(codec::encode(&blob))
}

/// Decrypt a blob produced by [`encrypt_resource`] and deserialize it
///
/// A failed tag check is reported as [`CryptoError::AuthenticationFailure`].
/// A parse failure after the tag verified is reported separately as
/// [`CryptoError::Serialization`]: that means the payload was corrupt before
/// it was encrypted, not that the key was wrong.
pub fn decrypt_resource<T>(blob: &str, dek: &Dek) -> Result<T, CryptoError>
where
    T: DeserializeOwned,
{
    let raw = codec::decode(blob)?;
    let plaintext = Zeroizing::new(cipher::decrypt(&raw, dek.bytes())?);
    serde_json::from_slice(&plaintext).map_err(|e| {
        tracing::warn!("resource content failed to parse after authentication");
        CryptoError::Serialization(e)
    })
}
