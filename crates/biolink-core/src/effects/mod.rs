//! Core Effect Trait Definitions
//!
//! Pure trait definitions for every side-effecting capability the broker uses.
//! This module defines **what** effects can be performed; handlers define **how**.
//!
//! ## Infrastructure Effects (`biolink-effects`)
//! - **Biometric**: sensor probe and interactive prompt
//! - **Secure**: secret storage and device-key signing
//!
//! ## Testing Effects (`biolink-testkit`)
//! - Scriptable mock platform and in-memory storage
//!
//! All broker code is parameterized by these traits, so the same facade runs
//! against a real platform, the no-hardware fallback, or a test mock.

pub mod biometric;
pub mod secure;

pub use biometric::{
    BiometricPlatform, BiometricPromptEffects, PlatformOutcome, PromptReceiver, PromptRequest,
    PromptResponder, RawProbeResult, SensorProbeEffects,
};
pub use secure::{SecureStorageEffects, SigningEffects};
