use std::path::PathBuf;

use clap::Args;
use common::prelude::SharedResource;

use super::BundleError;
use crate::store::{
    parse_public_key, read_json, read_key_pair, read_passphrase, write_json, PASSPHRASE_ENV,
};

#[derive(Args, Debug, Clone)]
#[command(about = "Encrypt a JSON table and wrap its key for each recipient")]
pub struct Seal {
    /// JSON file holding the table
    pub input: PathBuf,

    /// Owner key file
    #[arg(long)]
    pub secret_key: PathBuf,

    /// Recipient public key (base64) or key file; repeat for each recipient
    #[arg(long = "recipient")]
    pub recipients: Vec<String>,

    /// Don't add a passphrase recovery copy for the owner
    #[arg(long)]
    pub no_recovery: bool,

    /// Environment variable holding the recovery passphrase
    #[arg(long, default_value = PASSPHRASE_ENV)]
    pub passphrase_env: String,

    /// Write the bundle here instead of printing it
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

#[async_trait::async_trait]
impl crate::op::Op for Seal {
    type Error = BundleError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let owner = read_key_pair(&self.secret_key)?;
        let table: serde_json::Value = read_json(&self.input)?;
        let recipients = self
            .recipients
            .iter()
            .map(|r| parse_public_key(r))
            .collect::<Result<Vec<_>, _>>()?;
        if self.no_recovery && recipients.is_empty() {
            return Err(BundleError::NoReaders);
        }
        let passphrase = if self.no_recovery {
            None
        } else {
            Some(read_passphrase(&self.passphrase_env)?)
        };
        let kdf = ctx.config.kdf;

        let resource = tokio::task::spawn_blocking(move || {
            SharedResource::seal(
                &table,
                &owner.secret,
                &recipients,
                passphrase.as_ref().map(|p| p.as_bytes()),
                kdf,
            )
        })
        .await??;

        match &self.out {
            Some(path) => {
                write_json(path, &resource)?;
                Ok(format!(
                    "Sealed {} for {} recipient(s) into {}",
                    self.input.display(),
                    resource.recipients().count(),
                    path.display()
                ))
            }
            None => Ok(serde_json::to_string_pretty(&resource)?),
        }
    }
}
