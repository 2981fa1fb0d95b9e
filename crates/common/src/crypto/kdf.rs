//! Password-based key derivation (PBKDF2-HMAC-SHA256)
//!
//! The iteration count is a versioned parameter. It is not part of the
//! wrapped blob's byte layout, so callers keep it next to the blob (see
//! [`PasswordShare`](super::PasswordShare)). New wraps use
//! [`KdfParams::default`]; blobs written with the older, weaker count stay
//! readable through [`KdfParams::LEGACY`].

use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use super::cipher::KEY_SIZE;
use super::error::CryptoError;

/// Size of the random salt in bytes
pub const SALT_SIZE: usize = 16;
/// Iteration count used for new wraps
pub const DEFAULT_ITERATIONS: u32 = 600_000;
/// Iteration count of blobs written before the work factor was raised
pub const LEGACY_ITERATIONS: u32 = 100_000;
/// Largest iteration count accepted, so a stored share can't stall a reader
pub const MAX_ITERATIONS: u32 = 10_000_000;

/// Work factor for [`derive_key`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfParams {
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl KdfParams {
    pub const LEGACY: KdfParams = KdfParams {
        iterations: LEGACY_ITERATIONS,
    };

    pub fn new(iterations: u32) -> Self {
        Self { iterations }
    }

    /// Whether these parameters are weaker than the current default
    pub fn is_outdated(&self) -> bool {
        self.iterations < DEFAULT_ITERATIONS
    }

    /// Reject an iteration count of zero or above [`MAX_ITERATIONS`]
    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.iterations == 0 {
            return Err(CryptoError::MalformedInput(
                "kdf iteration count must be non-zero".into(),
            ));
        }
        if self.iterations > MAX_ITERATIONS {
            return Err(CryptoError::MalformedInput(format!(
                "kdf iteration count {} exceeds {}",
                self.iterations, MAX_ITERATIONS
            )));
        }
        Ok(())
    }
}

/// Derive an AES-256 key from a passphrase and salt
///
/// Deterministic for identical inputs. The returned buffer is zeroed on drop.
///
/// # Errors
///
/// Returns [`CryptoError::MalformedInput`] if the salt is not [`SALT_SIZE`]
/// bytes or the iteration count is zero or above [`MAX_ITERATIONS`].
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8],
    params: KdfParams,
) -> Result<Zeroizing<[u8; KEY_SIZE]>, CryptoError> {
    if salt.len() != SALT_SIZE {
        return Err(CryptoError::invalid_length("salt", SALT_SIZE, salt.len()));
    }
    params.validate()?;

    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    pbkdf2_hmac::<Sha256>(passphrase, salt, params.iterations, &mut key[..]);
    Ok(key)
}
