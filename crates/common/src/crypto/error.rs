//! Error type shared by every cryptographic operation in this crate

/// Message shown to end users for any failure on an access path.
///
/// Authentication and structural failures share this message, so a caller
/// cannot tell a wrong key apart from a damaged blob.
pub const ACCESS_DENIED_MESSAGE: &str = "cannot access this data";

/// Broad classification of a [`CryptoError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The OS randomness source failed. Fatal for the calling flow.
    RandomnessUnavailable,
    /// AEAD tag verification failed: wrong key, wrong passphrase,
    /// tampering, or revoked access.
    AuthenticationFailure,
    /// A key, blob, salt or parameter had the wrong length or shape.
    MalformedInput,
    /// Content could not be (de)serialized after a successful tag check.
    SerializationFailure,
}

impl ErrorKind {
    /// Whether retrying could ever help. Nothing in this crate retries on its
    /// own; this only tells the caller whether the flow must be aborted.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ErrorKind::RandomnessUnavailable)
    }

    /// A message safe to surface to end users
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::RandomnessUnavailable => "secure randomness is unavailable",
            ErrorKind::AuthenticationFailure | ErrorKind::MalformedInput => ACCESS_DENIED_MESSAGE,
            ErrorKind::SerializationFailure => "stored data is corrupted",
        }
    }
}

/// Errors that can occur during key generation, agreement, encryption or wrapping
///
/// The `Display` output carries detail meant for logs. Use
/// [`CryptoError::user_message`] for anything shown to a person.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("randomness unavailable: {0}")]
    RandomnessUnavailable(String),
    #[error("authentication failed")]
    AuthenticationFailure,
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CryptoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CryptoError::RandomnessUnavailable(_) => ErrorKind::RandomnessUnavailable,
            CryptoError::AuthenticationFailure => ErrorKind::AuthenticationFailure,
            CryptoError::MalformedInput(_) | CryptoError::Base64(_) => ErrorKind::MalformedInput,
            CryptoError::Serialization(_) => ErrorKind::SerializationFailure,
        }
    }

    pub fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }

    pub(crate) fn invalid_length(what: &str, expected: usize, got: usize) -> Self {
        CryptoError::MalformedInput(format!(
            "invalid {} size, expected {}, got {}",
            what, expected, got
        ))
    }
}

/// Fill `buf` from the OS randomness source
///
/// There is no fallback: if the source is unavailable the operation fails
/// with [`CryptoError::RandomnessUnavailable`].
pub(crate) fn fill_random(buf: &mut [u8]) -> Result<(), CryptoError> {
    getrandom::getrandom(buf).map_err(|e| {
        tracing::error!("secure randomness source unavailable: {}", e);
        CryptoError::RandomnessUnavailable(e.to_string())
    })
}
