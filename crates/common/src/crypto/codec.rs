//! Base64 encoding for every value crossing the crate boundary
//!
//! Keys, DEKs and blobs leave this crate as standard (padded) base64 strings
//! and come back in the same form. Internally everything is raw bytes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use super::error::CryptoError;

/// Encode raw bytes as standard base64
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a standard base64 string into raw bytes
pub fn decode(text: &str) -> Result<Vec<u8>, CryptoError> {
    Ok(STANDARD.decode(text.trim())?)
}

/// Decode a base64 string that must hold exactly `N` bytes
///
/// `what` names the value in the error message.
pub fn decode_array<const N: usize>(text: &str, what: &str) -> Result<[u8; N], CryptoError> {
    let bytes = decode(text)?;
    if bytes.len() != N {
        return Err(CryptoError::invalid_length(what, N, bytes.len()));
    }
    let mut buff = [0u8; N];
    buff.copy_from_slice(&bytes);
    Ok(buff)
}
