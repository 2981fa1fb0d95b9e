//! Wrapping a DEK for its owner under a passphrase
//!
//! This is the recovery path: with nothing but a memorized passphrase the
//! owner can get the DEK back on a new device, independent of any key pair.
//!
//! The wrapped blob is `salt (16) || nonce (12) || aes-gcm(dek) (32) || tag (16)`.
//! The PBKDF2 iteration count is not part of that layout; it travels next to
//! the blob in [`PasswordShare`]'s serialized form so the work factor can be
//! raised without breaking shares written earlier.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::cipher::{self, NONCE_SIZE, TAG_SIZE};
use super::codec;
use super::dek::{Dek, DEK_SIZE};
use super::error::{fill_random, CryptoError};
use super::kdf::{derive_key, KdfParams, SALT_SIZE};

/// Size of the wrapped blob in bytes
pub const PASSWORD_SHARE_SIZE: usize = SALT_SIZE + NONCE_SIZE + DEK_SIZE + TAG_SIZE;

/// A DEK wrapped under a passphrase-derived key
///
/// # Wire Format
///
/// The blob itself:
///
/// ```text
/// [ salt: 16 bytes ][ nonce: 12 bytes ][ aes-gcm(dek): 32 bytes ][ tag: 16 bytes ]
/// ```
///
/// Serialized (e.g. JSON):
///
/// ```text
/// { "iterations": 600000, "wrapped": "<base64 blob>" }
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PasswordShareRepr", into = "PasswordShareRepr")]
pub struct PasswordShare {
    kdf: KdfParams,
    blob: [u8; PASSWORD_SHARE_SIZE],
}

#[derive(Serialize, Deserialize)]
struct PasswordShareRepr {
    iterations: u32,
    wrapped: String,
}

impl From<PasswordShare> for PasswordShareRepr {
    fn from(share: PasswordShare) -> Self {
        Self {
            iterations: share.kdf.iterations,
            wrapped: share.to_base64(),
        }
    }
}

impl TryFrom<PasswordShareRepr> for PasswordShare {
    type Error = CryptoError;
    fn try_from(repr: PasswordShareRepr) -> Result<Self, Self::Error> {
        PasswordShare::from_base64(&repr.wrapped, KdfParams::new(repr.iterations))
    }
}

impl PasswordShare {
    /// Wrap `dek` under `passphrase` with a fresh random salt and nonce
    ///
    /// # Errors
    ///
    /// - [`CryptoError::RandomnessUnavailable`] if salt or nonce cannot be drawn
    /// - [`CryptoError::MalformedInput`] if `kdf` is invalid
    pub fn new(dek: &Dek, passphrase: &[u8], kdf: KdfParams) -> Result<Self, CryptoError> {
        let mut salt = [0u8; SALT_SIZE];
        fill_random(&mut salt)?;

        let key = derive_key(passphrase, &salt, kdf)?;
        let wrapped = cipher::encrypt(dek.bytes(), &key)?;

        let mut blob = [0u8; PASSWORD_SHARE_SIZE];
        blob[..SALT_SIZE].copy_from_slice(&salt);
        blob[SALT_SIZE..].copy_from_slice(&wrapped);

        tracing::debug!(iterations = kdf.iterations, "wrapped dek for owner");
        Ok(Self { kdf, blob })
    }

    /// Recover the DEK with `passphrase`
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::AuthenticationFailure`] on a wrong passphrase,
    /// wrong iteration count, or any modified byte.
    pub fn recover(&self, passphrase: &[u8]) -> Result<Dek, CryptoError> {
        let (salt, wrapped) = self.blob.split_at(SALT_SIZE);
        let key = derive_key(passphrase, salt, self.kdf)?;
        let unwrapped = Zeroizing::new(cipher::decrypt(wrapped, &key).inspect_err(|e| {
            if matches!(e, CryptoError::AuthenticationFailure) {
                tracing::warn!("password share failed authentication");
            }
        })?);

        Dek::from_slice(&unwrapped)
    }

    /// Re-wrap under the current default work factor if this share is older
    ///
    /// Returns `None` when the share is already up to date. Needs the
    /// passphrase because the DEK has to be recovered first.
    pub fn upgrade(&self, passphrase: &[u8]) -> Result<Option<Self>, CryptoError> {
        if !self.kdf.is_outdated() {
            return Ok(None);
        }
        let dek = self.recover(passphrase)?;
        Ok(Some(Self::new(&dek, passphrase, KdfParams::default())?))
    }

    /// Build a share from a raw blob and the parameters it was written with
    ///
    /// `kdf` is validated here, so an untrusted iteration count is rejected
    /// before any key derivation runs.
    pub fn from_bytes(bytes: &[u8], kdf: KdfParams) -> Result<Self, CryptoError> {
        kdf.validate()?;
        if bytes.len() != PASSWORD_SHARE_SIZE {
            return Err(CryptoError::invalid_length(
                "password share",
                PASSWORD_SHARE_SIZE,
                bytes.len(),
            ));
        }
        let mut blob = [0u8; PASSWORD_SHARE_SIZE];
        blob.copy_from_slice(bytes);
        Ok(Self { kdf, blob })
    }

    /// Parse a base64 blob written with `kdf`
    pub fn from_base64(text: &str, kdf: KdfParams) -> Result<Self, CryptoError> {
        Self::from_bytes(&codec::decode(text)?, kdf)
    }

    /// Encode the blob (without the iteration count) as base64
    pub fn to_base64(&self) -> String {
        codec::encode(&self.blob)
    }

    pub fn kdf(&self) -> KdfParams {
        self.kdf
    }

    pub fn salt(&self) -> &[u8] {
        &self.blob[..SALT_SIZE]
    }

    pub fn bytes(&self) -> &[u8] {
        &self.blob
    }
}
