/**
 * Cryptographic types and operations.
 *  - X25519 identity keys and key agreement
 *  - AES-256-GCM content and key wrapping
 *  - Passphrase based owner recovery
 */
pub mod crypto;
/**
 * DEK lifecycle at the base64 boundary.
 *  Wrap and unwrap data keys for recipients
 *  and for the owner's passphrase.
 */
pub mod envelope;
/**
 * A sealed table together with every
 *  wrapped copy of its key, ready to hand
 *  to untrusted storage.
 */
pub mod resource;

pub mod prelude {
    pub use crate::crypto::{
        decrypt_resource, encrypt_resource, CryptoError, Dek, ErrorKind, KdfParams, KeyPair,
        PasswordShare, PublicKey, RecipientShare, SecretKey,
    };
    pub use crate::envelope::{
        generate_dek, unwrap_for_owner, unwrap_for_owner_with, unwrap_from_owner, wrap_for_owner,
        wrap_for_owner_with, wrap_for_recipient,
    };
    pub use crate::resource::SharedResource;
}
