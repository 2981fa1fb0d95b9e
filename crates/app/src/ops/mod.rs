pub mod grant;
pub mod keygen;
pub mod open;
pub mod revoke;
pub mod seal;
pub mod version;

pub use grant::Grant;
pub use keygen::Keygen;
pub use open::Open;
pub use revoke::Revoke;
pub use seal::Seal;
pub use version::Version;

use common::prelude::{CryptoError, Dek, KeyPair, SharedResource};
use tokio::task::JoinError;

use crate::store::{read_passphrase, StoreError};

/// Errors shared by the commands that work on a resource bundle
///
/// Cryptographic failures only ever display the generic user message; the
/// detail is in the logs.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{}", .0.user_message())]
    Crypto(#[from] CryptoError),

    #[error("failed to encode bundle: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("key task failed: {0}")]
    Task(#[from] JoinError),

    #[error("key does not belong to the owner of this bundle")]
    NotOwner,

    #[error("bundle would have no recipients and no recovery copy")]
    NoReaders,

    #[error("{0} has no access to this bundle")]
    UnknownRecipient(String),
}

/// Recover a bundle's DEK as its owner
///
/// Uses the owner's key against any recipient share when there is one, and
/// falls back to the passphrase recovery copy otherwise.
pub async fn recover_owner_dek(
    resource: &SharedResource,
    owner: &KeyPair,
    passphrase_env: &str,
) -> Result<Dek, BundleError> {
    if owner.public != *resource.owner() {
        return Err(BundleError::NotOwner);
    }
    if resource.recipients().next().is_some() {
        return Ok(resource.recover_dek_as_owner(&owner.secret)?);
    }

    let passphrase = read_passphrase(passphrase_env)?;
    let resource = resource.clone();
    let dek = tokio::task::spawn_blocking(move || {
        resource.recover_dek_with_passphrase(passphrase.as_bytes())
    })
    .await??;
    Ok(dek)
}
