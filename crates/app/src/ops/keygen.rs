use std::path::PathBuf;

use clap::Args;
use common::prelude::{CryptoError, KeyPair};

use crate::store::{write_key_pair, KeyFile, StoreError};

#[derive(Args, Debug, Clone)]
#[command(about = "Generate an identity key pair")]
pub struct Keygen {
    /// Write the key pair to this file (created with owner-only permissions)
    /// instead of printing it
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum KeygenError {
    #[error("key generation failed: {0}")]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to encode key pair: {0}")]
    Encode(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl crate::op::Op for Keygen {
    type Error = KeygenError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let pair = KeyPair::generate()?;
        tracing::info!(public_key = %pair.public, "generated key pair");

        match &self.out {
            Some(path) => {
                write_key_pair(path, &pair)?;
                Ok(format!(
                    "Wrote key pair to {}\npublic key: {}",
                    path.display(),
                    pair.public
                ))
            }
            None => Ok(serde_json::to_string_pretty(&KeyFile::from(&pair))?),
        }
    }
}
