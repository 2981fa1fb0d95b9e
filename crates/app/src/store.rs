//! Local files the CLI reads and writes: key files, bundles and payloads
//!
//! A key file is the JSON printed by `tableshare keygen`:
//!
//! ```text
//! { "publicKey": "<base64>", "privateKey": "<base64>" }
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use common::prelude::{CryptoError, KeyPair, PublicKey, SecretKey};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

pub const PASSPHRASE_ENV: &str = "TABLESHARE_PASSPHRASE";

#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct KeyFile {
    pub public_key: String,
    pub private_key: String,
}

impl From<&KeyPair> for KeyFile {
    fn from(pair: &KeyPair) -> Self {
        Self {
            public_key: pair.public.to_base64(),
            private_key: pair.secret.to_base64(),
        }
    }
}

impl KeyFile {
    pub fn key_pair(&self) -> Result<KeyPair, StoreError> {
        let secret = SecretKey::from_base64(&self.private_key).map_err(StoreError::InvalidKey)?;
        let public = PublicKey::from_base64(&self.public_key).map_err(StoreError::InvalidKey)?;
        if secret.public() != public {
            return Err(StoreError::KeyMismatch);
        }
        Ok(KeyPair::from(secret))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid key: {0}")]
    InvalidKey(CryptoError),

    #[error("key file public key does not match its private key")]
    KeyMismatch,

    #[error("passphrase variable {0} is not set")]
    MissingPassphrase(String),
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let text = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let mut text = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    text.push('\n');
    fs::write(path, text).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_key_pair(path: &Path) -> Result<KeyPair, StoreError> {
    let file: KeyFile = read_json(path)?;
    file.key_pair()
}

/// Write a new key file, refusing to overwrite an existing one
pub fn write_key_pair(path: &Path, pair: &KeyPair) -> Result<(), StoreError> {
    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    let text = Zeroizing::new(
        serde_json::to_string_pretty(&KeyFile::from(pair)).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?,
    );

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path).map_err(write_err)?;
    file.write_all(text.as_bytes()).map_err(write_err)?;
    file.write_all(b"\n").map_err(write_err)
}

/// Parse a recipient given either as a base64 public key or a key file path
pub fn parse_public_key(value: &str) -> Result<PublicKey, StoreError> {
    match PublicKey::from_base64(value) {
        Ok(key) => Ok(key),
        Err(e) => {
            let path = Path::new(value);
            if !path.is_file() {
                return Err(StoreError::InvalidKey(e));
            }
            #[derive(Deserialize)]
            #[serde(rename_all = "camelCase")]
            struct PublicOnly {
                public_key: PublicKey,
            }
            let file: PublicOnly = read_json(path)?;
            Ok(file.public_key)
        }
    }
}

/// Read a passphrase from the environment variable `var`
pub fn read_passphrase(var: &str) -> Result<Zeroizing<String>, StoreError> {
    std::env::var(var)
        .map(Zeroizing::new)
        .map_err(|_| StoreError::MissingPassphrase(var.to_string()))
}
