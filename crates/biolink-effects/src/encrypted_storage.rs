//! Encrypted secret storage handler
//!
//! Secrets are sealed with ChaCha20-Poly1305 under a per-entry key derived
//! with HKDF-SHA256 from a 32-byte master key and the entry name. Binding the
//! key to the entry name keeps a blob copied under another name from
//! decrypting.
//!
//! Blob format: `version (1 byte) || nonce (12 bytes) || ciphertext`
//!
//! Two backends are provided: an in-process map (tests, ephemeral sessions)
//! and a directory with one file per entry. On disk, file names are the hex
//! SHA-256 of the entry name so application key names do not leak.

use async_trait::async_trait;
use biolink_core::effects::SecureStorageEffects;
use biolink_core::BiolinkError;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use zeroize::Zeroizing;

/// Nonce size for ChaCha20-Poly1305 (96 bits = 12 bytes)
const NONCE_SIZE: usize = 12;

/// Version byte for encrypted blob format
const BLOB_VERSION: u8 = 0x01;

/// HKDF info string for per-entry keys
const KEY_DERIVATION_INFO: &[u8] = b"biolink-secret-encryption-v1";

/// Length of the master key in bytes
pub const MASTER_KEY_LEN: usize = 32;

enum Backend {
    Memory(RwLock<HashMap<String, Vec<u8>>>),
    Directory(PathBuf),
}

/// Secret store that encrypts every value at rest.
pub struct EncryptedSecretStorage {
    master_key: Zeroizing<[u8; MASTER_KEY_LEN]>,
    backend: Backend,
}

impl std::fmt::Debug for EncryptedSecretStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backend = match &self.backend {
            Backend::Memory(_) => "memory".to_string(),
            Backend::Directory(dir) => dir.display().to_string(),
        };
        f.debug_struct("EncryptedSecretStorage")
            .field("backend", &backend)
            .finish_non_exhaustive()
    }
}

impl EncryptedSecretStorage {
    /// Keep encrypted blobs in process memory
    pub fn in_memory(master_key: [u8; MASTER_KEY_LEN]) -> Self {
        Self {
            master_key: Zeroizing::new(master_key),
            backend: Backend::Memory(RwLock::new(HashMap::new())),
        }
    }

    /// Keep encrypted blobs as files under `dir` (created on first write)
    pub fn in_directory(dir: impl Into<PathBuf>, master_key: [u8; MASTER_KEY_LEN]) -> Self {
        Self {
            master_key: Zeroizing::new(master_key),
            backend: Backend::Directory(dir.into()),
        }
    }

    /// Fresh random master key from the OS generator
    pub fn generate_master_key() -> Zeroizing<[u8; MASTER_KEY_LEN]> {
        let mut key = Zeroizing::new([0u8; MASTER_KEY_LEN]);
        OsRng.fill_bytes(&mut key[..]);
        key
    }

    /// Parse a master key from 64 hex characters
    pub fn master_key_from_hex(
        encoded: &str,
    ) -> Result<Zeroizing<[u8; MASTER_KEY_LEN]>, BiolinkError> {
        let bytes = Zeroizing::new(
            hex::decode(encoded.trim())
                .map_err(|e| BiolinkError::crypto(format!("Master key is not hex: {e}")))?,
        );
        if bytes.len() != MASTER_KEY_LEN {
            return Err(BiolinkError::crypto(format!(
                "Master key must be {MASTER_KEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let mut key = Zeroizing::new([0u8; MASTER_KEY_LEN]);
        key.copy_from_slice(&bytes);
        Ok(key)
    }

    /// Derive the per-entry encryption key
    fn derive_encryption_key(&self, key: &str) -> Result<Zeroizing<[u8; 32]>, BiolinkError> {
        let hkdf = Hkdf::<Sha256>::new(Some(key.as_bytes()), &self.master_key[..]);
        let mut derived = Zeroizing::new([0u8; 32]);
        hkdf.expand(KEY_DERIVATION_INFO, &mut derived[..])
            .map_err(|e| BiolinkError::crypto(format!("Key derivation failed: {e}")))?;
        Ok(derived)
    }

    fn encrypt(&self, key: &str, data: &[u8]) -> Result<Vec<u8>, BiolinkError> {
        let encryption_key = self.derive_encryption_key(key)?;
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&encryption_key[..]));

        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), data)
            .map_err(|e| BiolinkError::crypto(format!("Encryption failed: {e}")))?;

        let mut blob = Vec::with_capacity(1 + NONCE_SIZE + ciphertext.len());
        blob.push(BLOB_VERSION);
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }

    fn decrypt(&self, key: &str, blob: &[u8]) -> Result<Vec<u8>, BiolinkError> {
        if blob.len() < 1 + NONCE_SIZE {
            return Err(BiolinkError::crypto("Blob too short"));
        }
        let version = blob[0];
        if version != BLOB_VERSION {
            return Err(BiolinkError::crypto(format!(
                "Unknown blob version: {version}"
            )));
        }

        let encryption_key = self.derive_encryption_key(key)?;
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&encryption_key[..]));
        let nonce = Nonce::from_slice(&blob[1..1 + NONCE_SIZE]);
        cipher
            .decrypt(nonce, &blob[1 + NONCE_SIZE..])
            .map_err(|e| BiolinkError::crypto(format!("Decryption failed: {e}")))
    }

    fn entry_path(dir: &Path, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        dir.join(format!("{}.secret", hex::encode(digest)))
    }

    async fn write_blob(&self, key: &str, blob: Vec<u8>) -> Result<(), BiolinkError> {
        match &self.backend {
            Backend::Memory(map) => {
                map.write().await.insert(key.to_string(), blob);
            }
            Backend::Directory(dir) => {
                tokio::fs::create_dir_all(dir).await?;
                let path = Self::entry_path(dir, key);
                // Unique per write so concurrent stores of one key never share a staging file
                let staging = path.with_extension(format!("{:016x}.tmp", OsRng.next_u64()));
                tokio::fs::write(&staging, &blob).await?;
                if let Err(e) = tokio::fs::rename(&staging, &path).await {
                    let _ = tokio::fs::remove_file(&staging).await;
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }

    async fn read_blob(&self, key: &str) -> Result<Option<Vec<u8>>, BiolinkError> {
        match &self.backend {
            Backend::Memory(map) => Ok(map.read().await.get(key).cloned()),
            Backend::Directory(dir) => {
                match tokio::fs::read(Self::entry_path(dir, key)).await {
                    Ok(blob) => Ok(Some(blob)),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    async fn remove_blob(&self, key: &str) -> Result<(), BiolinkError> {
        match &self.backend {
            Backend::Memory(map) => {
                map.write().await.remove(key);
                Ok(())
            }
            Backend::Directory(dir) => {
                match tokio::fs::remove_file(Self::entry_path(dir, key)).await {
                    Ok(()) => Ok(()),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                    Err(e) => Err(e.into()),
                }
            }
        }
    }
}

#[async_trait]
impl SecureStorageEffects for EncryptedSecretStorage {
    async fn store_secret(&self, key: &str, value: &[u8]) -> Result<(), BiolinkError> {
        let blob = self.encrypt(key, value)?;
        self.write_blob(key, blob).await?;
        tracing::debug!(key, "secret stored");
        Ok(())
    }

    async fn load_secret(&self, key: &str) -> Result<Option<Vec<u8>>, BiolinkError> {
        match self.read_blob(key).await? {
            Some(blob) => self.decrypt(key, &blob).map(Some),
            None => {
                tracing::debug!(key, "no secret found");
                Ok(None)
            }
        }
    }

    async fn delete_secret(&self, key: &str) -> Result<(), BiolinkError> {
        self.remove_blob(key).await
    }
}
