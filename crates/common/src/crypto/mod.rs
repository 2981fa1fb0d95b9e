//! Cryptographic primitives for table sharing
//!
//! This module provides everything needed to share a table with other users
//! through a server that only ever sees ciphertext:
//!
//! - **Identity**: X25519 key pairs (`SecretKey`/`PublicKey`), one per user
//! - **Encryption**: AES-256-GCM over JSON content, one random `Dek` per table
//! - **Key Sharing**: X25519 agreement between owner and recipient keys the
//!   wrap of a `Dek` (`RecipientShare`)
//! - **Recovery**: PBKDF2-HMAC-SHA256 from a passphrase keys the owner's own
//!   wrap of a `Dek` (`PasswordShare`)
//!
//! # Security Model
//!
//! ## Envelope encryption
//! Table content is encrypted once under its `Dek`. The `Dek` is never stored
//! or sent as is; instead one wrapped copy exists per authorized party. Adding
//! a reader only adds a wrap, it never re-encrypts the content.
//!
//! ## Sharing
//! To share a table with a recipient:
//! 1. Look up the recipient's public key
//! 2. Perform X25519 between the owner's private key and that public key
//! 3. Encrypt the `Dek` with AES-256-GCM keyed by the shared secret
//!
//! The recipient performs X25519 between their private key and the owner's
//! public key, arrives at the same secret, and decrypts.
//!
//! ## Key material in memory
//! `Dek`, `SecretKey`, `SharedSecret` and derived password keys are zeroed on
//! drop. This is best effort; it cannot account for copies the caller makes.
//!
//! All operations are pure functions of their inputs plus fresh randomness.
//! Nothing here caches keys or keeps state between calls.

pub mod cipher;
pub mod codec;
mod content;
mod dek;
mod error;
pub mod kdf;
mod keys;
mod password_share;
mod recipient_share;

pub use content::{decrypt_resource, encrypt_resource};
pub use dek::{Dek, DEK_SIZE};
pub use error::{CryptoError, ErrorKind, ACCESS_DENIED_MESSAGE};
pub use kdf::{derive_key, KdfParams, MAX_ITERATIONS, SALT_SIZE};
pub use keys::{
    derive_shared_secret, KeyPair, PublicKey, SecretKey, SharedSecret, PRIVATE_KEY_SIZE,
    PUBLIC_KEY_SIZE, SHARED_SECRET_SIZE,
};
pub use password_share::{PasswordShare, PASSWORD_SHARE_SIZE};
pub use recipient_share::{RecipientShare, RECIPIENT_SHARE_SIZE};
