//! Data encryption keys
//!
//! Each resource version gets its own random 256-bit [`Dek`]. The DEK only
//! ever lives in memory: what gets stored or sent is one wrapped copy per
//! authorized party (see [`RecipientShare`](super::RecipientShare) and
//! [`PasswordShare`](super::PasswordShare)).

use std::fmt;
use std::ops::Deref;

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::cipher::KEY_SIZE;
use super::codec;
use super::error::{fill_random, CryptoError};

/// Size of a DEK in bytes
pub const DEK_SIZE: usize = KEY_SIZE;

/// A 256-bit symmetric key protecting one resource's content
///
/// The bytes are zeroed when the value is dropped. This is best effort:
/// copies made by the caller (for example through [`Dek::to_base64`]) are
/// not tracked.
///
/// # Examples
///
/// ```ignore
/// let dek = Dek::generate()?;
/// let blob = encrypt_resource(&json!({"tasks": ["buy milk"]}), &dek)?;
/// ```
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Dek([u8; DEK_SIZE]);

impl Deref for Dek {
    type Target = [u8; DEK_SIZE];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<[u8; DEK_SIZE]> for Dek {
    fn from(bytes: [u8; DEK_SIZE]) -> Self {
        Dek(bytes)
    }
}

impl fmt::Debug for Dek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Dek(<redacted>)")
    }
}

impl Dek {
    /// Generate a new random DEK from the OS randomness source
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::RandomnessUnavailable`] if the OS source fails.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut dek = Dek([0; DEK_SIZE]);
        fill_random(&mut dek.0)?;
        Ok(dek)
    }

    /// Create a DEK from a byte slice
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MalformedInput`] if the slice is not exactly
    /// [`DEK_SIZE`] bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, CryptoError> {
        if data.len() != DEK_SIZE {
            return Err(CryptoError::invalid_length("dek", DEK_SIZE, data.len()));
        }
        let mut dek = Dek([0; DEK_SIZE]);
        dek.0.copy_from_slice(data);
        Ok(dek)
    }

    /// Parse a DEK from base64
    pub fn from_base64(text: &str) -> Result<Self, CryptoError> {
        let mut bytes = codec::decode(text)?;
        let dek = Self::from_slice(&bytes);
        bytes.zeroize();
        dek
    }

    /// Encode the DEK as base64
    ///
    /// The result is the key in the clear. It must not be persisted or sent
    /// anywhere; wrap it instead.
    pub fn to_base64(&self) -> String {
        codec::encode(&self.0)
    }

    pub fn bytes(&self) -> &[u8; DEK_SIZE] {
        &self.0
    }
}
