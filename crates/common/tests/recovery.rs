//! Integration tests for owner recovery through a passphrase

mod common;

use crate::common::{single_byte_tampers, FAST_KDF};

use ::common::crypto::{
    codec, ErrorKind, KdfParams, KeyPair, PasswordShare, MAX_ITERATIONS, PASSWORD_SHARE_SIZE,
};
use ::common::envelope::{
    generate_dek, unwrap_for_owner, unwrap_for_owner_with, wrap_for_owner, wrap_for_owner_with,
};
use ::common::resource::SharedResource;

#[test]
fn test_owner_recovers_dek() {
    let dek = generate_dek().unwrap();
    let wrapped = wrap_for_owner(&dek, "correct-horse-battery-staple").unwrap();
    assert_eq!(codec::decode(&wrapped).unwrap().len(), PASSWORD_SHARE_SIZE);

    let recovered = unwrap_for_owner(&wrapped, "correct-horse-battery-staple").unwrap();
    assert_eq!(recovered, dek);

    let err = unwrap_for_owner(&wrapped, "wrong-password").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);
}

#[test]
fn test_legacy_work_factor_still_opens() {
    let dek = generate_dek().unwrap();
    let wrapped = wrap_for_owner_with(&dek, "old-device", KdfParams::LEGACY).unwrap();

    let recovered = unwrap_for_owner_with(&wrapped, "old-device", KdfParams::LEGACY).unwrap();
    assert_eq!(recovered, dek);

    // Re-wrapping a legacy share moves it to the current default
    let share = PasswordShare::from_base64(&wrapped, KdfParams::LEGACY).unwrap();
    let upgraded = share.upgrade(b"old-device").unwrap().unwrap();
    assert_eq!(upgraded.kdf(), KdfParams::default());
    assert_eq!(
        unwrap_for_owner(&upgraded.to_base64(), "old-device").unwrap(),
        dek
    );
}

#[test]
fn test_same_passphrase_wraps_differ() {
    let dek = generate_dek().unwrap();
    let a = wrap_for_owner_with(&dek, "pw", FAST_KDF).unwrap();
    let b = wrap_for_owner_with(&dek, "pw", FAST_KDF).unwrap();
    assert_ne!(a, b);
    assert_eq!(unwrap_for_owner_with(&a, "pw", FAST_KDF).unwrap(), dek);
    assert_eq!(unwrap_for_owner_with(&b, "pw", FAST_KDF).unwrap(), dek);
}

#[test]
fn test_tampered_password_share_rejected() {
    let dek = generate_dek().unwrap();
    let wrapped = wrap_for_owner_with(&dek, "pw", FAST_KDF).unwrap();

    let tampers = single_byte_tampers(&wrapped);
    assert_eq!(tampers.len(), PASSWORD_SHARE_SIZE);
    for tampered in tampers {
        // A flipped salt byte changes the derived key, which the tag catches too
        let err = unwrap_for_owner_with(&tampered, "pw", FAST_KDF).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);
    }
}

#[test]
fn test_zero_iterations_rejected() {
    let dek = generate_dek().unwrap();
    let err = wrap_for_owner_with(&dek, "pw", KdfParams::new(0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
}

#[test]
fn test_stored_bundle_cannot_demand_huge_work_factor() {
    let owner = KeyPair::generate().unwrap();
    let resource =
        SharedResource::seal(&"table", &owner.secret, &[], Some(b"pw".as_slice()), FAST_KDF)
            .unwrap();

    let mut json = serde_json::to_value(&resource).unwrap();
    json["ownerRecovery"]["iterations"] = serde_json::json!(u32::MAX);
    assert!(serde_json::from_value::<SharedResource>(json.clone()).is_err());

    json["ownerRecovery"]["iterations"] = serde_json::json!(MAX_ITERATIONS + 1);
    assert!(serde_json::from_value::<SharedResource>(json).is_err());

    let dek = generate_dek().unwrap();
    let err = wrap_for_owner_with(&dek, "pw", KdfParams::new(MAX_ITERATIONS + 1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
}
