//! Everything the untrusted store keeps for one shared table
//!
//! A [`SharedResource`] bundles the encrypted content with every wrapped copy
//! of its DEK: one [`RecipientShare`] per reader and, optionally, one
//! [`PasswordShare`] so the owner can recover access from any device. It is
//! safe to hand the whole value to the server; it never holds a DEK or a
//! private key in the clear.
//!
//! Serialized as camelCase JSON:
//!
//! ```text
//! {
//!   "owner": "<base64 public key>",
//!   "content": "<base64 nonce || ciphertext || tag>",
//!   "recipients": { "<base64 public key>": "<base64 share>", ... },
//!   "ownerRecovery": { "iterations": 600000, "wrapped": "<base64>" }
//! }
//! ```

use std::collections::BTreeMap;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

use crate::crypto::{
    decrypt_resource, encrypt_resource, CryptoError, Dek, KdfParams, PasswordShare, PublicKey,
    RecipientShare, SecretKey,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedResource {
    owner: PublicKey,
    content: String,
    #[serde(default)]
    recipients: BTreeMap<PublicKey, RecipientShare>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    owner_recovery: Option<PasswordShare>,
}

impl SharedResource {
    /// Encrypt `value` under a fresh DEK and wrap that DEK for every party
    ///
    /// # Arguments
    ///
    /// * `value` - The table payload
    /// * `owner` - The owner's private key, used to wrap for each recipient
    /// * `recipients` - Public keys to grant read access to
    /// * `passphrase` - If set, adds an owner recovery copy derived with `kdf`
    pub fn seal<T>(
        value: &T,
        owner: &SecretKey,
        recipients: &[PublicKey],
        passphrase: Option<&[u8]>,
        kdf: KdfParams,
    ) -> Result<Self, CryptoError>
    where
        T: Serialize + ?Sized,
    {
        let dek = Dek::generate()?;
        let mut resource = Self {
            owner: owner.public(),
            content: encrypt_resource(value, &dek)?,
            recipients: BTreeMap::new(),
            owner_recovery: None,
        };
        resource.wrap_all(&dek, owner, recipients, passphrase, kdf)?;

        tracing::debug!(
            owner = %resource.owner,
            recipients = resource.recipients.len(),
            recovery = resource.owner_recovery.is_some(),
            "sealed resource"
        );
        Ok(resource)
    }

    pub fn owner(&self) -> &PublicKey {
        &self.owner
    }

    /// The encrypted content blob (base64)
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn recipients(&self) -> impl Iterator<Item = &PublicKey> {
        self.recipients.keys()
    }

    pub fn share_for(&self, recipient: &PublicKey) -> Option<&RecipientShare> {
        self.recipients.get(recipient)
    }

    pub fn owner_recovery(&self) -> Option<&PasswordShare> {
        self.owner_recovery.as_ref()
    }

    /// Recover the DEK as a recipient
    ///
    /// A recipient without a share gets the same
    /// [`CryptoError::AuthenticationFailure`] as one whose share fails to
    /// verify, so revoked access looks like any other denial.
    pub fn recover_dek(&self, recipient: &SecretKey) -> Result<Dek, CryptoError> {
        let public = recipient.public();
        let share = self.recipients.get(&public).ok_or_else(|| {
            tracing::debug!(recipient = %public, "no share for recipient");
            CryptoError::AuthenticationFailure
        })?;
        share.recover(&self.owner, recipient)
    }

    /// Recover the DEK from the owner recovery copy
    pub fn recover_dek_with_passphrase(&self, passphrase: &[u8]) -> Result<Dek, CryptoError> {
        let share = self.owner_recovery.as_ref().ok_or_else(|| {
            CryptoError::MalformedInput("resource has no owner recovery copy".into())
        })?;
        share.recover(passphrase)
    }

    /// Recover the DEK as the owner from any recipient share
    ///
    /// The owner computes the same shared secret as each recipient, so any
    /// share will do. Fails with [`CryptoError::AuthenticationFailure`] when
    /// there are no recipients or `owner` isn't the resource owner.
    pub fn recover_dek_as_owner(&self, owner: &SecretKey) -> Result<Dek, CryptoError> {
        let (recipient, share) = self
            .recipients
            .iter()
            .next()
            .ok_or(CryptoError::AuthenticationFailure)?;
        share.recover(recipient, owner)
    }

    /// Decrypt the content as a recipient
    pub fn open_as_recipient<T>(&self, recipient: &SecretKey) -> Result<T, CryptoError>
    where
        T: DeserializeOwned,
    {
        let dek = self.recover_dek(recipient)?;
        decrypt_resource(&self.content, &dek)
    }

    /// Decrypt the content as the owner, using the recovery passphrase
    pub fn open_as_owner<T>(&self, passphrase: &[u8]) -> Result<T, CryptoError>
    where
        T: DeserializeOwned,
    {
        let dek = self.recover_dek_with_passphrase(passphrase)?;
        decrypt_resource(&self.content, &dek)
    }

    /// Add (or replace) a wrapped copy of `dek` for `recipient`
    ///
    /// `dek` is checked against the content first, so a stale or wrong key
    /// can't be handed out.
    pub fn grant(
        &mut self,
        dek: &Dek,
        owner: &SecretKey,
        recipient: PublicKey,
    ) -> Result<(), CryptoError> {
        self.check_owner(owner)?;
        decrypt_resource::<IgnoredAny>(&self.content, dek)?;

        let share = RecipientShare::new(dek, &recipient, owner)?;
        self.recipients.insert(recipient, share);
        tracing::debug!(%recipient, "granted access");
        Ok(())
    }

    /// Remove `recipient` and rotate the DEK
    ///
    /// Dropping the share alone would not be enough: a former recipient may
    /// have kept the unwrapped DEK. Rotation re-encrypts the content so that
    /// key opens nothing. Returns `false`, without rotating, if `recipient`
    /// had no share.
    pub fn revoke(
        &mut self,
        recipient: &PublicKey,
        current: &Dek,
        owner: &SecretKey,
        passphrase: Option<&[u8]>,
        kdf: KdfParams,
    ) -> Result<bool, CryptoError> {
        self.check_owner(owner)?;
        if !self.recipients.contains_key(recipient) {
            return Ok(false);
        }

        let mut rotated = self.clone();
        rotated.recipients.remove(recipient);
        rotated.rotate(current, owner, passphrase, kdf)?;
        *self = rotated;

        tracing::debug!(%recipient, "revoked access");
        Ok(true)
    }

    /// Re-encrypt under a fresh DEK and re-wrap for every remaining party
    ///
    /// `current` must be the DEK the content is sealed with. If the bundle
    /// carries an owner recovery copy, `passphrase` must open it and is used
    /// to rebuild it under the new key. Without a recovery copy, a given
    /// `passphrase` adds one. Fails if nobody could open the result.
    pub fn rotate(
        &mut self,
        current: &Dek,
        owner: &SecretKey,
        passphrase: Option<&[u8]>,
        kdf: KdfParams,
    ) -> Result<(), CryptoError> {
        self.check_owner(owner)?;
        let value: serde_json::Value = decrypt_resource(&self.content, current)?;

        if self.owner_recovery.is_some() {
            let passphrase = passphrase.ok_or(CryptoError::AuthenticationFailure)?;
            if self.recover_dek_with_passphrase(passphrase)? != *current {
                return Err(CryptoError::AuthenticationFailure);
            }
        }
        if self.recipients.is_empty() && passphrase.is_none() {
            return Err(CryptoError::MalformedInput(
                "rotation would leave no one able to open the resource".into(),
            ));
        }

        let dek = Dek::generate()?;
        let recipients: Vec<PublicKey> = self.recipients.keys().copied().collect();
        let content = encrypt_resource(&value, &dek)?;

        let mut rotated = Self {
            owner: self.owner,
            content,
            recipients: BTreeMap::new(),
            owner_recovery: None,
        };
        rotated.wrap_all(&dek, owner, &recipients, passphrase, kdf)?;
        *self = rotated;

        tracing::debug!(recipients = recipients.len(), "rotated resource key");
        Ok(())
    }

    fn wrap_all(
        &mut self,
        dek: &Dek,
        owner: &SecretKey,
        recipients: &[PublicKey],
        passphrase: Option<&[u8]>,
        kdf: KdfParams,
    ) -> Result<(), CryptoError> {
        for recipient in recipients {
            let share = RecipientShare::new(dek, recipient, owner)?;
            self.recipients.insert(*recipient, share);
        }
        if let Some(passphrase) = passphrase {
            self.owner_recovery = Some(PasswordShare::new(dek, passphrase, kdf)?);
        }
        Ok(())
    }

    fn check_owner(&self, owner: &SecretKey) -> Result<(), CryptoError> {
        if owner.public() != self.owner {
            return Err(CryptoError::MalformedInput(
                "private key does not belong to the resource owner".into(),
            ));
        }
        Ok(())
    }
}
