use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};

use super::codec;
use super::error::{fill_random, CryptoError};

/// Size of an X25519 private key in bytes
pub const PRIVATE_KEY_SIZE: usize = 32;
/// Size of an X25519 public key in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;
/// Size of the Diffie-Hellman output in bytes
pub const SHARED_SECRET_SIZE: usize = 32;

/// Public half of an identity key pair
///
/// A raw X25519 public key. Safe to list, publish and hand to the untrusted
/// server; it is what an owner looks up to grant a recipient access.
///
/// Crosses the crate boundary as base64, which is also its serde form.
///
/// # Examples
///
/// ```ignore
/// let pair = KeyPair::generate()?;
/// let text = pair.public.to_base64();
/// let recovered = PublicKey::from_base64(&text)?;
/// assert_eq!(pair.public, recovered);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; PUBLIC_KEY_SIZE]);

impl Deref for PublicKey {
    type Target = [u8; PUBLIC_KEY_SIZE];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<[u8; PUBLIC_KEY_SIZE]> for PublicKey {
    fn from(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        PublicKey(bytes)
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = CryptoError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != PUBLIC_KEY_SIZE {
            return Err(CryptoError::invalid_length(
                "public key",
                PUBLIC_KEY_SIZE,
                bytes.len(),
            ));
        }
        let mut buff = [0; PUBLIC_KEY_SIZE];
        buff.copy_from_slice(bytes);
        Ok(buff.into())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_base64())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        PublicKey::from_base64(&text).map_err(serde::de::Error::custom)
    }
}

impl PublicKey {
    /// Parse a public key from base64
    pub fn from_base64(text: &str) -> Result<Self, CryptoError> {
        Ok(codec::decode_array::<PUBLIC_KEY_SIZE>(text, "public key")?.into())
    }

    /// Encode the public key as base64
    pub fn to_base64(&self) -> String {
        codec::encode(&self.0)
    }

    /// Convert public key to raw bytes
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.0
    }

    fn to_x25519(self) -> X25519PublicKey {
        X25519PublicKey::from(self.0)
    }
}

/// Private half of an identity key pair
///
/// Must never leave its owner's device in plaintext. The scalar is zeroed
/// when the key is dropped, and `Debug` never prints it.
#[derive(Clone)]
pub struct SecretKey(StaticSecret);

impl From<[u8; PRIVATE_KEY_SIZE]> for SecretKey {
    fn from(secret: [u8; PRIVATE_KEY_SIZE]) -> Self {
        Self(StaticSecret::from(secret))
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

impl SecretKey {
    /// Generate a new random secret key from the OS randomness source
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::RandomnessUnavailable`] if the OS source fails.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut bytes = zeroize::Zeroizing::new([0u8; PRIVATE_KEY_SIZE]);
        fill_random(&mut bytes[..])?;
        Ok(Self::from(*bytes))
    }

    /// Parse a secret key from base64
    pub fn from_base64(text: &str) -> Result<Self, CryptoError> {
        let bytes = zeroize::Zeroizing::new(codec::decode_array::<PRIVATE_KEY_SIZE>(
            text,
            "private key",
        )?);
        Ok(Self::from(*bytes))
    }

    /// Encode the secret key as base64
    ///
    /// The returned string holds the private key in the clear.
    pub fn to_base64(&self) -> String {
        codec::encode(self.0.as_bytes())
    }

    /// Derive the public key from this secret key
    pub fn public(&self) -> PublicKey {
        PublicKey(X25519PublicKey::from(&self.0).to_bytes())
    }

    /// Diffie-Hellman agreement with a counterpart's public key
    ///
    /// `a.diffie_hellman(&b.public())` equals `b.diffie_hellman(&a.public())`,
    /// which is what lets an owner wrap for a recipient and the recipient
    /// unwrap without the secret ever being sent.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MalformedInput`] if `other` is a low-order point,
    /// i.e. the agreement would produce a value that doesn't depend on our key.
    pub fn diffie_hellman(&self, other: &PublicKey) -> Result<SharedSecret, CryptoError> {
        let shared = self.0.diffie_hellman(&other.to_x25519());
        if !shared.was_contributory() {
            return Err(CryptoError::MalformedInput(
                "public key is not a valid curve point".into(),
            ));
        }
        Ok(SharedSecret(shared))
    }
}

/// Output of an X25519 agreement, usable directly as an AES-256 key
///
/// Zeroed on drop.
pub struct SharedSecret(x25519_dalek::SharedSecret);

impl SharedSecret {
    pub fn as_bytes(&self) -> &[u8; SHARED_SECRET_SIZE] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

/// An identity key pair
///
/// Created once per user identity. The public half is shareable, the secret
/// half stays on the owner's device.
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub public: PublicKey,
    pub secret: SecretKey,
}

impl KeyPair {
    /// Generate a fresh key pair
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::RandomnessUnavailable`] if the OS source fails.
    /// Never falls back to a weaker source.
    pub fn generate() -> Result<Self, CryptoError> {
        let secret = SecretKey::generate()?;
        Ok(Self::from(secret))
    }
}

impl From<SecretKey> for KeyPair {
    fn from(secret: SecretKey) -> Self {
        Self {
            public: secret.public(),
            secret,
        }
    }
}

/// Derive the shared secret between `private_key` and `other_public_key`
///
/// Free-function form of [`SecretKey::diffie_hellman`].
pub fn derive_shared_secret(
    private_key: &SecretKey,
    other_public_key: &PublicKey,
) -> Result<SharedSecret, CryptoError> {
    private_key.diffie_hellman(other_public_key)
}
