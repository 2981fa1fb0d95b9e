use std::path::PathBuf;

use clap::Args;
use common::prelude::SharedResource;

use super::{recover_owner_dek, BundleError};
use crate::store::{parse_public_key, read_json, read_key_pair, write_json, PASSPHRASE_ENV};

#[derive(Args, Debug, Clone)]
#[command(about = "Give another public key read access to a bundle")]
pub struct Grant {
    /// Bundle to update in place
    pub bundle: PathBuf,

    /// Owner key file
    #[arg(long)]
    pub secret_key: PathBuf,

    /// Recipient public key (base64) or key file
    #[arg(long)]
    pub recipient: String,

    /// Environment variable holding the recovery passphrase, used when the
    /// bundle has no recipients yet
    #[arg(long, default_value = PASSPHRASE_ENV)]
    pub passphrase_env: String,
}

#[async_trait::async_trait]
impl crate::op::Op for Grant {
    type Error = BundleError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let owner = read_key_pair(&self.secret_key)?;
        let recipient = parse_public_key(&self.recipient)?;
        let mut resource: SharedResource = read_json(&self.bundle)?;

        let dek = recover_owner_dek(&resource, &owner, &self.passphrase_env).await?;
        resource.grant(&dek, &owner.secret, recipient)?;
        write_json(&self.bundle, &resource)?;

        Ok(format!(
            "Granted {} access to {}",
            recipient,
            self.bundle.display()
        ))
    }
}
