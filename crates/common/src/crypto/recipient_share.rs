//! Wrapping a DEK for a named recipient with X25519 + AES-256-GCM
//!
//! # Protocol Overview
//!
//! To grant a recipient access, the owner:
//! 1. **Agrees on a secret**: X25519 between the owner's private key and the
//!    recipient's public key
//! 2. **Wraps the DEK**: AES-256-GCM encrypts the DEK with the shared secret
//!    as the key and a fresh random nonce
//!
//! The recipient reverses this with their private key and the owner's public
//! key. By Diffie-Hellman symmetry both sides arrive at the same secret, so
//! the DEK itself never travels unwrapped.
//!
//! # Security Properties
//!
//! - **Per-pair secrets**: every (owner, recipient) pair has its own
//!   key-encryption key, so one leaked share says nothing about another
//! - **Integrity**: the GCM tag rejects a wrong key or any modified byte
//! - **No forward secrecy**: the owner's long-term key is used directly;
//!   rotating access means generating a new DEK and re-wrapping

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::cipher::{self, NONCE_SIZE, TAG_SIZE};
use super::codec;
use super::dek::{Dek, DEK_SIZE};
use super::error::CryptoError;
use super::keys::{PublicKey, SecretKey};

/// Total size of a recipient share in bytes
///
/// Layout: nonce (12) || wrapped dek (32) || tag (16) = 60 bytes
pub const RECIPIENT_SHARE_SIZE: usize = NONCE_SIZE + DEK_SIZE + TAG_SIZE;

/// A DEK wrapped for exactly one (owner, recipient) pair
///
/// Only the recipient holding the matching private key (or the owner, who can
/// compute the same shared secret) can recover the DEK.
///
/// # Wire Format
///
/// ```text
/// [ nonce: 12 bytes ][ aes-gcm(dek): 32 bytes ][ tag: 16 bytes ]
/// ```
///
/// Serializes as a base64 string.
///
/// # Examples
///
/// ```ignore
/// // Alice shares a table key with Bob
/// let dek = Dek::generate()?;
/// let share = RecipientShare::new(&dek, &bob.public, &alice.secret)?;
///
/// // Bob recovers it with his private key and Alice's public key
/// let recovered = share.recover(&alice.public, &bob.secret)?;
/// assert_eq!(dek, recovered);
/// ```
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct RecipientShare([u8; RECIPIENT_SHARE_SIZE]);

impl fmt::Debug for RecipientShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecipientShare({})", self.to_base64())
    }
}

impl Serialize for RecipientShare {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for RecipientShare {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        RecipientShare::from_base64(&text).map_err(serde::de::Error::custom)
    }
}

impl From<[u8; RECIPIENT_SHARE_SIZE]> for RecipientShare {
    fn from(bytes: [u8; RECIPIENT_SHARE_SIZE]) -> Self {
        RecipientShare(bytes)
    }
}

impl TryFrom<&[u8]> for RecipientShare {
    type Error = CryptoError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != RECIPIENT_SHARE_SIZE {
            return Err(CryptoError::invalid_length(
                "recipient share",
                RECIPIENT_SHARE_SIZE,
                bytes.len(),
            ));
        }
        let mut share = [0u8; RECIPIENT_SHARE_SIZE];
        share.copy_from_slice(bytes);
        Ok(share.into())
    }
}

impl RecipientShare {
    /// Parse a share from base64
    pub fn from_base64(text: &str) -> Result<Self, CryptoError> {
        Ok(codec::decode_array::<RECIPIENT_SHARE_SIZE>(text, "recipient share")?.into())
    }

    /// Encode the share as base64
    pub fn to_base64(&self) -> String {
        codec::encode(&self.0)
    }

    /// Wrap `dek` so that only `recipient` can recover it
    ///
    /// # Arguments
    ///
    /// * `dek` - The key to share
    /// * `recipient` - Public key of the intended recipient
    /// * `owner` - The owner's private key; the recipient will need the
    ///   matching public key to unwrap
    ///
    /// # Errors
    ///
    /// - [`CryptoError::MalformedInput`] if `recipient` is not a usable curve point
    /// - [`CryptoError::RandomnessUnavailable`] if a nonce cannot be drawn
    pub fn new(dek: &Dek, recipient: &PublicKey, owner: &SecretKey) -> Result<Self, CryptoError> {
        let shared_secret = owner.diffie_hellman(recipient)?;
        let wrapped = cipher::encrypt(dek.bytes(), shared_secret.as_bytes())?;

        tracing::debug!(%recipient, "wrapped dek for recipient");
        RecipientShare::try_from(wrapped.as_slice())
    }

    /// Recover the DEK using the recipient's private key
    ///
    /// # Arguments
    ///
    /// * `owner` - Public key of the owner who created the share
    /// * `recipient` - The recipient's private key (must match the public key
    ///   used in [`RecipientShare::new`])
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::AuthenticationFailure`] if the share was made for
    /// someone else, by someone else, or was modified. No DEK is returned in
    /// that case.
    pub fn recover(&self, owner: &PublicKey, recipient: &SecretKey) -> Result<Dek, CryptoError> {
        let shared_secret = recipient.diffie_hellman(owner)?;
        let unwrapped = Zeroizing::new(
            cipher::decrypt(&self.0, shared_secret.as_bytes()).inspect_err(|e| {
                if matches!(e, CryptoError::AuthenticationFailure) {
                    tracing::warn!(%owner, "recipient share failed authentication");
                }
            })?,
        );

        Dek::from_slice(&unwrapped)
    }

    /// Get a reference to the raw share bytes
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::{ErrorKind, KeyPair};

    #[test]
    fn test_share_dek() {
        let dek = Dek::from([42u8; DEK_SIZE]);
        let owner = KeyPair::generate().unwrap();
        let recipient = KeyPair::generate().unwrap();

        let share = RecipientShare::new(&dek, &recipient.public, &owner.secret).unwrap();
        let recovered = share.recover(&owner.public, &recipient.secret).unwrap();
        assert_eq!(dek, recovered);
    }

    #[test]
    fn test_owner_can_also_recover() {
        // The owner computes the same shared secret from the other side
        let dek = Dek::generate().unwrap();
        let owner = KeyPair::generate().unwrap();
        let recipient = KeyPair::generate().unwrap();

        let share = RecipientShare::new(&dek, &recipient.public, &owner.secret).unwrap();
        let recovered = share.recover(&recipient.public, &owner.secret).unwrap();
        assert_eq!(dek, recovered);
    }

    #[test]
    fn test_share_different_keys() {
        let dek = Dek::generate().unwrap();
        let owner = KeyPair::generate().unwrap();
        let bob = KeyPair::generate().unwrap();
        let eve = KeyPair::generate().unwrap();

        let share = RecipientShare::new(&dek, &bob.public, &owner.secret).unwrap();

        // Eve cannot recover the DEK
        let err = share.recover(&owner.public, &eve.secret).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);

        // Nor can Bob if he is told the wrong owner
        let err = share.recover(&eve.public, &bob.secret).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);
    }

    #[test]
    fn test_share_layout() {
        let dek = Dek::generate().unwrap();
        let owner = KeyPair::generate().unwrap();
        let recipient = KeyPair::generate().unwrap();
        let share = RecipientShare::new(&dek, &recipient.public, &owner.secret).unwrap();

        assert_eq!(share.bytes().len(), RECIPIENT_SHARE_SIZE);
        assert_eq!(codec::decode(&share.to_base64()).unwrap().len(), 60);
        // The DEK must not appear in the clear
        assert!(!share.bytes().windows(DEK_SIZE).any(|w| w == dek.bytes()));
    }

    #[test]
    fn test_share_base64_roundtrip() {
        let dek = Dek::generate().unwrap();
        let owner = KeyPair::generate().unwrap();
        let recipient = KeyPair::generate().unwrap();
        let share = RecipientShare::new(&dek, &recipient.public, &owner.secret).unwrap();

        let recovered_share = RecipientShare::from_base64(&share.to_base64()).unwrap();
        assert_eq!(share, recovered_share);
        let recovered = recovered_share
            .recover(&owner.public, &recipient.secret)
            .unwrap();
        assert_eq!(dek, recovered);
    }

    #[test]
    fn test_share_serde_json_roundtrip() {
        let dek = Dek::generate().unwrap();
        let owner = KeyPair::generate().unwrap();
        let recipient = KeyPair::generate().unwrap();
        let share = RecipientShare::new(&dek, &recipient.public, &owner.secret).unwrap();

        let json = serde_json::to_string(&share).unwrap();
        let recovered_share: RecipientShare = serde_json::from_str(&json).unwrap();
        assert_eq!(share, recovered_share);
    }

    #[test]
    fn test_share_deserialize_invalid_length() {
        let short = serde_json::json!(codec::encode(&[0u8; RECIPIENT_SHARE_SIZE - 1]));
        assert!(serde_json::from_value::<RecipientShare>(short).is_err());

        let long = serde_json::json!(codec::encode(&[0u8; RECIPIENT_SHARE_SIZE + 1]));
        assert!(serde_json::from_value::<RecipientShare>(long).is_err());
    }

    #[test]
    fn test_invalid_recipient_point_rejected() {
        let dek = Dek::generate().unwrap();
        let owner = KeyPair::generate().unwrap();
        let err = RecipientShare::new(&dek, &PublicKey::from([0u8; 32]), &owner.secret)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }
}
