use std::path::PathBuf;

use clap::Args;
use common::prelude::SharedResource;

use super::{recover_owner_dek, BundleError};
use crate::store::{
    parse_public_key, read_json, read_key_pair, read_passphrase, write_json, PASSPHRASE_ENV,
};

#[derive(Args, Debug, Clone)]
#[command(about = "Remove a recipient and re-key the bundle")]
pub struct Revoke {
    /// Bundle to update in place
    pub bundle: PathBuf,

    /// Owner key file
    #[arg(long)]
    pub secret_key: PathBuf,

    /// Recipient public key (base64) or key file
    #[arg(long)]
    pub recipient: String,

    /// Environment variable holding the recovery passphrase, needed to
    /// rebuild the owner's recovery copy under the new key
    #[arg(long, default_value = PASSPHRASE_ENV)]
    pub passphrase_env: String,
}

#[async_trait::async_trait]
impl crate::op::Op for Revoke {
    type Error = BundleError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let owner = read_key_pair(&self.secret_key)?;
        let recipient = parse_public_key(&self.recipient)?;
        let mut resource: SharedResource = read_json(&self.bundle)?;

        if resource.share_for(&recipient).is_none() {
            return Err(BundleError::UnknownRecipient(recipient.to_base64()));
        }
        if resource.owner_recovery().is_none() && resource.recipients().count() == 1 {
            return Err(BundleError::NoReaders);
        }
        let dek = recover_owner_dek(&resource, &owner, &self.passphrase_env).await?;
        let passphrase = match resource.owner_recovery() {
            Some(_) => Some(read_passphrase(&self.passphrase_env)?),
            None => None,
        };
        let kdf = ctx.config.kdf;

        let resource = tokio::task::spawn_blocking(move || {
            resource
                .revoke(
                    &recipient,
                    &dek,
                    &owner.secret,
                    passphrase.as_ref().map(|p| p.as_bytes()),
                    kdf,
                )
                .map(|_| resource)
        })
        .await??;
        write_json(&self.bundle, &resource)?;

        Ok(format!(
            "Revoked {} from {}; {} recipient(s) re-keyed",
            recipient,
            self.bundle.display(),
            resource.recipients().count()
        ))
    }
}
