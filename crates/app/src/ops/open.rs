use std::path::PathBuf;

use clap::Args;
use common::prelude::{decrypt_resource, SharedResource};
use serde_json::Value;

use super::{recover_owner_dek, BundleError};
use crate::store::{read_json, read_key_pair, read_passphrase, PASSPHRASE_ENV};

#[derive(Args, Debug, Clone)]
#[command(about = "Decrypt a bundle and print its table")]
pub struct Open {
    /// Bundle written by `tableshare seal`
    pub bundle: PathBuf,

    /// Key file of a recipient (or the owner); without it the owner's
    /// recovery passphrase is used. An owner key on a bundle with no
    /// recipients falls back to the passphrase too
    #[arg(long)]
    pub secret_key: Option<PathBuf>,

    /// Environment variable holding the recovery passphrase
    #[arg(long, default_value = PASSPHRASE_ENV)]
    pub passphrase_env: String,
}

#[async_trait::async_trait]
impl crate::op::Op for Open {
    type Error = BundleError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let resource: SharedResource = read_json(&self.bundle)?;

        let table: Value = match &self.secret_key {
            Some(path) => {
                let pair = read_key_pair(path)?;
                if pair.public == *resource.owner() {
                    let dek = recover_owner_dek(&resource, &pair, &self.passphrase_env).await?;
                    decrypt_resource(resource.content(), &dek)?
                } else {
                    resource.open_as_recipient(&pair.secret)?
                }
            }
            None => {
                let passphrase = read_passphrase(&self.passphrase_env)?;
                tokio::task::spawn_blocking(move || {
                    resource.open_as_owner::<Value>(passphrase.as_bytes())
                })
                .await??
            }
        };

        tracing::debug!(bundle = %self.bundle.display(), "opened bundle");
        Ok(serde_json::to_string_pretty(&table)?)
    }
}
