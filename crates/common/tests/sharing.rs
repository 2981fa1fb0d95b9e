//! Integration tests for sharing a table with named recipients

mod common;

use crate::common::{init_tracing, key_pairs, single_byte_tampers};

use ::common::crypto::{
    decrypt_resource, derive_shared_secret, encrypt_resource, ErrorKind, PublicKey, SecretKey,
    ACCESS_DENIED_MESSAGE,
};
use ::common::envelope::{generate_dek, unwrap_from_owner, wrap_for_recipient};
use serde_json::{json, Value};

#[test]
fn test_share_table_with_recipient() {
    init_tracing();
    let [owner, recipient]: [_; 2] = key_pairs(2).try_into().unwrap();

    let dek = generate_dek().unwrap();
    let blob = encrypt_resource(&json!({"tasks": ["buy milk"]}), &dek).unwrap();
    let wrapped = wrap_for_recipient(&dek, &recipient.public, &owner.secret).unwrap();

    let unwrapped = unwrap_from_owner(&wrapped, &owner.public, &recipient.secret).unwrap();
    let table: Value = decrypt_resource(&blob, &unwrapped).unwrap();
    assert_eq!(table, json!({"tasks": ["buy milk"]}));
}

#[test]
fn test_share_over_base64_boundary() {
    // Everything a client would ship to the server and back is a string
    let [owner, recipient]: [_; 2] = key_pairs(2).try_into().unwrap();
    let owner_public = owner.public.to_base64();
    let recipient_public = recipient.public.to_base64();
    let recipient_secret = recipient.secret.to_base64();

    let dek = generate_dek().unwrap();
    let blob = encrypt_resource(&json!({"tasks": []}), &dek).unwrap();
    let wrapped = wrap_for_recipient(
        &dek,
        &PublicKey::from_base64(&recipient_public).unwrap(),
        &owner.secret,
    )
    .unwrap();

    let unwrapped = unwrap_from_owner(
        &wrapped,
        &PublicKey::from_base64(&owner_public).unwrap(),
        &SecretKey::from_base64(&recipient_secret).unwrap(),
    )
    .unwrap();
    assert_eq!(unwrapped.to_base64(), dek.to_base64());
    let table: Value = decrypt_resource(&blob, &unwrapped).unwrap();
    assert_eq!(table, json!({"tasks": []}));
}

#[test]
fn test_fan_out_copies_are_independent() {
    let pairs = key_pairs(6);
    let (owner, recipients) = pairs.split_first().unwrap();
    let dek = generate_dek().unwrap();

    let wrapped: Vec<String> = recipients
        .iter()
        .map(|r| wrap_for_recipient(&dek, &r.public, &owner.secret).unwrap())
        .collect();

    for (i, recipient) in recipients.iter().enumerate() {
        for (j, blob) in wrapped.iter().enumerate() {
            let result = unwrap_from_owner(blob, &owner.public, &recipient.secret);
            if i == j {
                assert_eq!(result.unwrap(), dek);
            } else {
                assert_eq!(result.unwrap_err().kind(), ErrorKind::AuthenticationFailure);
            }
        }
    }
}

#[test]
fn test_wrong_keys_fail_closed() {
    let [owner, recipient, eve]: [_; 3] = key_pairs(3).try_into().unwrap();
    let dek = generate_dek().unwrap();
    let wrapped = wrap_for_recipient(&dek, &recipient.public, &owner.secret).unwrap();

    let err = unwrap_from_owner(&wrapped, &owner.public, &eve.secret).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);
    assert_eq!(err.user_message(), ACCESS_DENIED_MESSAGE);

    let err = unwrap_from_owner(&wrapped, &eve.public, &recipient.secret).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);

    let other_dek = generate_dek().unwrap();
    let blob = encrypt_resource(&json!({"tasks": ["secret"]}), &dek).unwrap();
    let err = decrypt_resource::<Value>(&blob, &other_dek).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);
}

#[test]
fn test_tampered_recipient_share_rejected() {
    let [owner, recipient]: [_; 2] = key_pairs(2).try_into().unwrap();
    let dek = generate_dek().unwrap();
    let wrapped = wrap_for_recipient(&dek, &recipient.public, &owner.secret).unwrap();

    let tampers = single_byte_tampers(&wrapped);
    assert_eq!(tampers.len(), 60);
    for tampered in tampers {
        let err = unwrap_from_owner(&tampered, &owner.public, &recipient.secret).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);
    }
}

#[test]
fn test_tampered_content_rejected() {
    let dek = generate_dek().unwrap();
    let blob = encrypt_resource(&json!({"tasks": ["buy milk", "walk dog"]}), &dek).unwrap();

    for tampered in single_byte_tampers(&blob) {
        let err = decrypt_resource::<Value>(&tampered, &dek).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);
    }
}

#[test]
fn test_shared_secret_symmetry() {
    let pairs = key_pairs(8);
    for a in &pairs {
        for b in &pairs {
            let ab = derive_shared_secret(&a.secret, &b.public).unwrap();
            let ba = derive_shared_secret(&b.secret, &a.public).unwrap();
            assert_eq!(ab.as_bytes(), ba.as_bytes());
        }
    }
}

#[test]
fn test_parallel_wraps() {
    let pairs = key_pairs(9);
    let (owner, recipients) = pairs.split_first().unwrap();
    let dek = generate_dek().unwrap();

    let wrapped: Vec<(PublicKey, String)> = std::thread::scope(|s| {
        let handles: Vec<_> = recipients
            .iter()
            .map(|r| {
                let dek = &dek;
                s.spawn(move || {
                    (
                        r.public,
                        wrap_for_recipient(dek, &r.public, &owner.secret).unwrap(),
                    )
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (recipient, (public, blob)) in recipients.iter().zip(wrapped) {
        assert_eq!(recipient.public, public);
        let unwrapped = unwrap_from_owner(&blob, &owner.public, &recipient.secret).unwrap();
        assert_eq!(unwrapped, dek);
    }
}
