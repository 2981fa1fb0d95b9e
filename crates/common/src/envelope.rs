//! DEK lifecycle at the base64 boundary
//!
//! These functions are what the rest of an application calls. Everything
//! going in or out is either a typed key or a base64 string ready to hand to
//! storage or the network; none of them ever returns an unwrapped DEK in a
//! form meant for persistence.
//!
//! | Function | Output layout (base64) |
//! |---|---|
//! | [`wrap_for_recipient`] | `nonce[12] ‖ ciphertext ‖ tag[16]` |
//! | [`wrap_for_owner`] | `salt[16] ‖ nonce[12] ‖ ciphertext ‖ tag[16]` |
//!
//! Every call is independent, draws its own salt/nonce, and can run in
//! parallel with any other call.

use crate::crypto::{
    CryptoError, Dek, KdfParams, PasswordShare, PublicKey, RecipientShare, SecretKey,
};

/// Generate a fresh random DEK for one resource version
///
/// # Errors
///
/// Returns [`CryptoError::RandomnessUnavailable`] if the OS source fails.
pub fn generate_dek() -> Result<Dek, CryptoError> {
    Dek::generate()
}

/// Wrap `dek` for the holder of `recipient_public_key`
///
/// The result can only be unwrapped with the recipient's private key and the
/// public key matching `owner_private_key`.
pub fn wrap_for_recipient(
    dek: &Dek,
    recipient_public_key: &PublicKey,
    owner_private_key: &SecretKey,
) -> Result<String, CryptoError> {
    let share = RecipientShare::new(dek, recipient_public_key, owner_private_key)?;
    Ok(share.to_base64())
}

/// Unwrap a blob produced by [`wrap_for_recipient`]
///
/// # Errors
///
/// - [`CryptoError::MalformedInput`] if the blob has the wrong size or encoding
/// - [`CryptoError::AuthenticationFailure`] on any key mismatch or tampering
pub fn unwrap_from_owner(
    wrapped: &str,
    owner_public_key: &PublicKey,
    recipient_private_key: &SecretKey,
) -> Result<Dek, CryptoError> {
    RecipientShare::from_base64(wrapped)?.recover(owner_public_key, recipient_private_key)
}

/// Wrap `dek` under `passphrase` with the current default work factor
///
/// The iteration count is not embedded in the blob. Blobs produced here open
/// with [`unwrap_for_owner`] as long as the default is unchanged; store
/// [`KdfParams::default`] next to the blob (or keep a whole
/// [`PasswordShare`]) to stay readable across upgrades.
pub fn wrap_for_owner(dek: &Dek, passphrase: &str) -> Result<String, CryptoError> {
    wrap_for_owner_with(dek, passphrase, KdfParams::default())
}

/// Wrap `dek` under `passphrase` with an explicit work factor
pub fn wrap_for_owner_with(
    dek: &Dek,
    passphrase: &str,
    params: KdfParams,
) -> Result<String, CryptoError> {
    let share = PasswordShare::new(dek, passphrase.as_bytes(), params)?;
    Ok(share.to_base64())
}

/// Unwrap a blob produced by [`wrap_for_owner`]
///
/// # Errors
///
/// Returns [`CryptoError::AuthenticationFailure`] on a wrong passphrase or
/// tampering.
pub fn unwrap_for_owner(wrapped: &str, passphrase: &str) -> Result<Dek, CryptoError> {
    unwrap_for_owner_with(wrapped, passphrase, KdfParams::default())
}

/// Unwrap a password-wrapped blob written with `params`
///
/// Use [`KdfParams::LEGACY`] for blobs written before the work factor was
/// raised.
pub fn unwrap_for_owner_with(
    wrapped: &str,
    passphrase: &str,
    params: KdfParams,
) -> Result<Dek, CryptoError> {
    PasswordShare::from_base64(wrapped, params)?.recover(passphrase.as_bytes())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::{codec, ErrorKind, KeyPair, PASSWORD_SHARE_SIZE, RECIPIENT_SHARE_SIZE};

    const FAST: KdfParams = KdfParams { iterations: 1_000 };

    #[test]
    fn test_recipient_wrap_roundtrip() {
        let owner = KeyPair::generate().unwrap();
        let recipient = KeyPair::generate().unwrap();
        let dek = generate_dek().unwrap();

        let wrapped = wrap_for_recipient(&dek, &recipient.public, &owner.secret).unwrap();
        assert_eq!(codec::decode(&wrapped).unwrap().len(), RECIPIENT_SHARE_SIZE);

        let unwrapped = unwrap_from_owner(&wrapped, &owner.public, &recipient.secret).unwrap();
        assert_eq!(dek, unwrapped);
    }

    #[test]
    fn test_owner_wrap_roundtrip_with_params() {
        let dek = generate_dek().unwrap();
        let wrapped = wrap_for_owner_with(&dek, "hunter2", FAST).unwrap();
        assert_eq!(codec::decode(&wrapped).unwrap().len(), PASSWORD_SHARE_SIZE);

        assert_eq!(unwrap_for_owner_with(&wrapped, "hunter2", FAST).unwrap(), dek);
        let err = unwrap_for_owner_with(&wrapped, "hunter3", FAST).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);
    }

    #[test]
    fn test_legacy_blob_needs_legacy_params() {
        let dek = generate_dek().unwrap();
        let wrapped = wrap_for_owner_with(&dek, "pw", KdfParams::LEGACY).unwrap();
        assert_eq!(
            unwrap_for_owner_with(&wrapped, "pw", KdfParams::LEGACY).unwrap(),
            dek
        );
        let err = unwrap_for_owner(&wrapped, "pw").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);
    }

    #[test]
    fn test_malformed_blobs_rejected_before_crypto() {
        let owner = KeyPair::generate().unwrap();
        let recipient = KeyPair::generate().unwrap();

        let short = codec::encode(&[0u8; 10]);
        let err = unwrap_from_owner(&short, &owner.public, &recipient.secret).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);

        let err = unwrap_for_owner_with(&short, "pw", FAST).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);

        let err = unwrap_for_owner_with("***", "pw", FAST).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }
}
