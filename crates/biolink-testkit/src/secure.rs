//! Mock secure storage effect handler for testing

use async_trait::async_trait;
use biolink_core::effects::SecureStorageEffects;
use biolink_core::BiolinkError;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory plaintext secure storage with injectable failures
#[derive(Debug, Default)]
pub struct MockSecureStorageHandler {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    failure: Mutex<Option<String>>,
}

impl MockSecureStorageHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place raw bytes under `key`, bypassing the trait
    pub fn insert_raw(&self, key: &str, value: Vec<u8>) {
        self.entries.lock().unwrap().insert(key.to_string(), value);
    }

    /// Make every subsequent operation fail with a storage error
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock().unwrap() = Some(message.into());
    }

    pub fn clear_failure(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self) -> Result<(), BiolinkError> {
        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(BiolinkError::storage(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SecureStorageEffects for MockSecureStorageHandler {
    async fn store_secret(&self, key: &str, value: &[u8]) -> Result<(), BiolinkError> {
        self.check()?;
        self.insert_raw(key, value.to_vec());
        Ok(())
    }

    async fn load_secret(&self, key: &str) -> Result<Option<Vec<u8>>, BiolinkError> {
        self.check()?;
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn delete_secret(&self, key: &str) -> Result<(), BiolinkError> {
        self.check()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_injected_failure() {
        let storage = MockSecureStorageHandler::new();
        storage.store_secret("k", b"v").await.unwrap();
        storage.fail_with("keychain locked");
        assert!(matches!(
            storage.load_secret("k").await,
            Err(BiolinkError::Storage { .. })
        ));
        storage.clear_failure();
        assert_eq!(storage.load_secret("k").await.unwrap(), Some(b"v".to_vec()));
        assert_eq!(storage.len(), 1);
    }
}
