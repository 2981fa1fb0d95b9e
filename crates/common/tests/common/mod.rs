//! Shared test utilities for sharing and recovery integration tests
#![allow(dead_code)]

use common::crypto::{codec, KdfParams, KeyPair};
use tracing_subscriber::EnvFilter;

/// Cheap work factor for tests that run the KDF many times
pub const FAST_KDF: KdfParams = KdfParams { iterations: 1_000 };

/// Install a test subscriber so `RUST_LOG=debug` shows core events
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Generate `n` independent key pairs
pub fn key_pairs(n: usize) -> Vec<KeyPair> {
    (0..n).map(|_| KeyPair::generate().unwrap()).collect()
}

/// Every variant of `blob` (base64) with exactly one bit flipped, one per byte
pub fn single_byte_tampers(blob: &str) -> Vec<String> {
    let bytes = codec::decode(blob).unwrap();
    (0..bytes.len())
        .map(|i| {
            let mut tampered = bytes.clone();
            tampered[i] ^= 0x01;
            codec::encode(&tampered)
        })
        .collect()
}
