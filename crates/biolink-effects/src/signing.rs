//! Ed25519 challenge signer backed by secure storage
//!
//! The device key lives in any [`SecureStorageEffects`] under
//! [`SIGNING_KEY_ALIAS`]. It is generated on first use and cached for the
//! lifetime of the signer.

use async_trait::async_trait;
use biolink_core::effects::{SecureStorageEffects, SigningEffects};
use biolink_core::BiolinkError;
use ed25519_dalek::{Signer, SigningKey, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;
use std::sync::Arc;
use tokio::sync::Mutex;
use zeroize::Zeroizing;

/// Storage alias of the device signing key
pub const SIGNING_KEY_ALIAS: &str = "biolink_signing_key";

/// Signs challenges with an Ed25519 key kept in secure storage
pub struct Ed25519ChallengeSigner<S: SecureStorageEffects + ?Sized> {
    storage: Arc<S>,
    alias: String,
    cached: Mutex<Option<SigningKey>>,
}

impl<S: SecureStorageEffects + ?Sized> Ed25519ChallengeSigner<S> {
    /// Signer using the default key alias
    pub fn new(storage: Arc<S>) -> Self {
        Self::with_alias(storage, SIGNING_KEY_ALIAS)
    }

    /// Signer using a custom key alias
    pub fn with_alias(storage: Arc<S>, alias: impl Into<String>) -> Self {
        Self {
            storage,
            alias: alias.into(),
            cached: Mutex::new(None),
        }
    }

    /// Load the device key, generating and persisting it on first use
    async fn signing_key(&self) -> Result<SigningKey, BiolinkError> {
        let mut cached = self.cached.lock().await;
        if let Some(key) = cached.as_ref() {
            return Ok(key.clone());
        }

        let key = match self.storage.load_secret(&self.alias).await? {
            Some(stored) => {
                let stored = Zeroizing::new(stored);
                let bytes: [u8; SECRET_KEY_LENGTH] =
                    stored.as_slice().try_into().map_err(|_| {
                        BiolinkError::crypto(format!(
                            "Stored signing key must be {SECRET_KEY_LENGTH} bytes, got {}",
                            stored.len()
                        ))
                    })?;
                SigningKey::from_bytes(&bytes)
            }
            None => {
                let key = SigningKey::generate(&mut OsRng);
                self.storage
                    .store_secret(&self.alias, &key.to_bytes())
                    .await?;
                tracing::info!(alias = %self.alias, "generated new device signing key");
                key
            }
        };

        *cached = Some(key.clone());
        Ok(key)
    }
}

#[async_trait]
impl<S: SecureStorageEffects + ?Sized> SigningEffects for Ed25519ChallengeSigner<S> {
    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, BiolinkError> {
        let key = self.signing_key().await?;
        Ok(key.sign(message).to_bytes().to_vec())
    }

    async fn public_key(&self) -> Result<Vec<u8>, BiolinkError> {
        let key = self.signing_key().await?;
        Ok(key.verifying_key().to_bytes().to_vec())
    }

    fn algorithm(&self) -> &'static str {
        "Ed25519"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EncryptedSecretStorage;
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};

    #[tokio::test]
    async fn test_signature_verifies_with_public_key() {
        let storage = Arc::new(EncryptedSecretStorage::in_memory([5u8; 32]));
        let signer = Ed25519ChallengeSigner::new(storage);

        let signature = signer.sign(b"challenge-123").await.unwrap();
        let public_key = signer.public_key().await.unwrap();

        let verifying_key =
            VerifyingKey::from_bytes(&public_key.as_slice().try_into().unwrap()).unwrap();
        let signature = Signature::from_slice(&signature).unwrap();
        assert!(verifying_key.verify(b"challenge-123", &signature).is_ok());
        assert!(verifying_key.verify(b"challenge-124", &signature).is_err());
    }

    #[tokio::test]
    async fn test_key_persists_across_signers() {
        let storage = Arc::new(EncryptedSecretStorage::in_memory([5u8; 32]));
        let first = Ed25519ChallengeSigner::new(storage.clone());
        let second = Ed25519ChallengeSigner::new(storage.clone());

        let first_key = first.public_key().await.unwrap();
        assert_eq!(second.public_key().await.unwrap(), first_key);
        assert!(storage.load_secret(SIGNING_KEY_ALIAS).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_corrupt_stored_key_rejected() {
        let storage = Arc::new(EncryptedSecretStorage::in_memory([5u8; 32]));
        storage
            .store_secret(SIGNING_KEY_ALIAS, b"short")
            .await
            .unwrap();
        let signer = Ed25519ChallengeSigner::new(storage);
        assert!(matches!(
            signer.sign(b"x").await,
            Err(BiolinkError::Crypto { .. })
        ));
    }
}
