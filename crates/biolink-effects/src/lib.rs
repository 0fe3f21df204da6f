//! Biolink Effects - production effect handlers
//!
//! Stateless or self-contained implementations of the effect traits defined
//! in `biolink-core`:
//!
//! - [`FallbackBiometricHandler`]: platform without biometric hardware
//! - [`EncryptedSecretStorage`]: ChaCha20-Poly1305 secret store (memory or directory)
//! - [`Ed25519ChallengeSigner`]: device key kept in any secure storage
//!
//! Mock handlers belong in `biolink-testkit`.

#![forbid(unsafe_code)]

pub mod biometric;
pub mod encrypted_storage;
pub mod signing;

pub use biometric::FallbackBiometricHandler;
pub use encrypted_storage::{EncryptedSecretStorage, MASTER_KEY_LEN};
pub use signing::{Ed25519ChallengeSigner, SIGNING_KEY_ALIAS};
