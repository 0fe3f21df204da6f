//! Secure storage and signing effect traits
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effect
//! - **Implementation**: `biolink-effects` (encrypted storage, Ed25519 signer)
//! - **Usage**: secret vault and request-signing operations of the broker
//!
//! Keys are opaque strings chosen by the application. Values never appear in
//! log events.

use crate::BiolinkError;
use async_trait::async_trait;

/// Platform secret storage (Keychain, Keystore-wrapped preferences, ...)
#[async_trait]
pub trait SecureStorageEffects: Send + Sync {
    /// Store `value` under `key`, replacing any previous value
    async fn store_secret(&self, key: &str, value: &[u8]) -> Result<(), BiolinkError>;

    /// Load the value stored under `key`; `None` when missing
    async fn load_secret(&self, key: &str) -> Result<Option<Vec<u8>>, BiolinkError>;

    /// Remove the value under `key`. Removing a missing key is not an error.
    async fn delete_secret(&self, key: &str) -> Result<(), BiolinkError>;
}

/// Device-bound challenge signing
#[async_trait]
pub trait SigningEffects: Send + Sync {
    /// Sign `message` with the device key, creating the key on first use
    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, BiolinkError>;

    /// Encoded public half of the device key
    async fn public_key(&self) -> Result<Vec<u8>, BiolinkError>;

    /// Name of the signature algorithm, for diagnostics
    fn algorithm(&self) -> &'static str;
}
