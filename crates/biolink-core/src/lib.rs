//! Biolink Core - Biometric Capability Foundation
//!
//! This crate provides the value types, error taxonomy and effect interfaces
//! shared by every layer of the Biolink biometric broker. It contains no
//! platform integration of its own.
//!
//! # Layers
//!
//! ## Value Types
//! - `BiometryType`: closed classification of sensor hardware
//! - `SensorAvailability`: normalized "can biometrics be used right now" answer
//! - `AuthResult` / `SessionState`: outcome of a single authentication attempt
//!
//! ## Effect Interfaces (Pure Signatures)
//! - `SensorProbeEffects`: raw hardware / enrollment / permission query
//! - `BiometricPromptEffects`: interactive platform prompt with a one-shot responder
//! - `SecureStorageEffects`: platform secret storage
//! - `SigningEffects`: device-bound challenge signing
//!
//! Handlers live in `biolink-effects` (production) and `biolink-testkit` (mocks).

#![forbid(unsafe_code)]

/// Authentication outcomes and session states
pub mod auth;

/// Sensor classification and availability values
pub mod biometry;

/// Broker configuration loading and validation
pub mod config;

/// Pure effect interfaces (no implementations)
pub mod effects;

/// Unified error handling
pub mod errors;

pub use auth::{AuthResult, PromptOptions, SessionState};
pub use biometry::{BiometryType, SensorAvailability};
pub use config::BrokerConfig;
pub use errors::{BiolinkError, Result};
