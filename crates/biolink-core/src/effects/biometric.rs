//! Biometric Platform Effects Trait Definitions
//!
//! This module defines trait interfaces for the two things the broker needs from
//! a host platform: a read-only query of sensor hardware / enrollment /
//! permission state, and an interactive prompt that reports back through a
//! callback.
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effect
//! - **Implementation**: `biolink-effects` (fallback), platform crates (real)
//! - **Usage**: `biolink-broker` capability resolution and authentication sessions
//!
//! ## Platform Support
//!
//! - iOS / macOS: Touch ID, Face ID via LocalAuthentication (`LAError` codes)
//! - Android: fingerprint, face via BiometricPrompt (`BIOMETRIC_ERROR_*` codes)
//! - Everything else: the no-hardware fallback handler
//!
//! ## Callback Model
//!
//! Platform prompts complete asynchronously on a platform thread. The prompt
//! effect receives a [`PromptResponder`] that can be resolved exactly once;
//! the broker awaits the paired [`PromptReceiver`]. A responder resolved after
//! the session has ended is a no-op.

use crate::BiolinkError;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Raw hardware / enrollment / permission state as reported by the platform
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawProbeResult {
    /// Whether any biometric sensor exists
    pub hardware_present: bool,
    /// Whether the user has enrolled biometric data
    pub enrolled: bool,
    /// Whether the application may use biometrics
    pub permission_granted: bool,
    /// Platform's own name for the sensor modality (e.g. "face", "touchid")
    pub reported_type: Option<String>,
}

impl RawProbeResult {
    /// Device with no biometric hardware at all
    pub fn no_hardware() -> Self {
        Self::default()
    }

    /// Fully usable sensor of the given platform-reported type
    pub fn ready(reported_type: impl Into<String>) -> Self {
        Self {
            hardware_present: true,
            enrolled: true,
            permission_granted: true,
            reported_type: Some(reported_type.into()),
        }
    }

    /// Set enrollment state
    pub fn with_enrolled(mut self, enrolled: bool) -> Self {
        self.enrolled = enrolled;
        self
    }

    /// Set permission state
    pub fn with_permission(mut self, granted: bool) -> Self {
        self.permission_granted = granted;
        self
    }
}

/// Everything the platform prompt needs to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRequest {
    /// Why the application is asking (iOS `localizedReason`)
    pub reason: String,
    /// Prompt title
    pub title: String,
    /// Prompt subtitle
    pub subtitle: String,
    /// Label of the negative button (ignored when the device credential is allowed)
    pub cancel_button_text: String,
    /// Allow passcode / device credential in place of biometrics
    pub allow_device_credential: bool,
}

/// Raw result delivered by a platform prompt callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformOutcome {
    /// Biometric verified
    Succeeded,
    /// User dismissed the prompt or chose the fallback button
    UserCancelled,
    /// System or application dismissed the prompt
    SystemCancelled,
    /// Temporary or permanent lockout
    Lockout,
    /// Nothing enrolled for the requested authenticators
    NotEnrolled,
    /// Sensor missing or currently unusable
    HardwareUnavailable,
    /// The platform's own prompt timeout fired
    TimedOut,
    /// Any other error with the platform's code and message
    Failed {
        /// Platform error code
        code: i32,
        /// Platform error message
        message: String,
    },
}

impl PlatformOutcome {
    /// Classify an Android `BiometricPrompt.onAuthenticationError` code
    pub fn from_android_error(code: i32, message: impl Into<String>) -> Self {
        match code {
            // ERROR_HW_UNAVAILABLE, ERROR_HW_NOT_PRESENT
            1 | 12 => PlatformOutcome::HardwareUnavailable,
            // ERROR_TIMEOUT
            3 => PlatformOutcome::TimedOut,
            // ERROR_CANCELED
            5 => PlatformOutcome::SystemCancelled,
            // ERROR_LOCKOUT, ERROR_LOCKOUT_PERMANENT
            7 | 9 => PlatformOutcome::Lockout,
            // ERROR_USER_CANCELED, ERROR_NEGATIVE_BUTTON
            10 | 13 => PlatformOutcome::UserCancelled,
            // ERROR_NO_BIOMETRICS, ERROR_NO_DEVICE_CREDENTIAL
            11 | 14 => PlatformOutcome::NotEnrolled,
            _ => PlatformOutcome::Failed {
                code,
                message: message.into(),
            },
        }
    }

    /// Classify an iOS / macOS `LAError` code
    pub fn from_la_error(code: i32, message: impl Into<String>) -> Self {
        match code {
            // userCancel, userFallback
            -2 | -3 => PlatformOutcome::UserCancelled,
            // systemCancel, appCancel
            -4 | -9 => PlatformOutcome::SystemCancelled,
            // passcodeNotSet, biometryNotAvailable
            -5 | -6 => PlatformOutcome::HardwareUnavailable,
            -7 => PlatformOutcome::NotEnrolled,
            -8 => PlatformOutcome::Lockout,
            _ => PlatformOutcome::Failed {
                code,
                message: message.into(),
            },
        }
    }
}

/// Receiving half of a prompt result slot
pub type PromptReceiver = oneshot::Receiver<PlatformOutcome>;

/// One-shot completion handle handed to the platform prompt
#[derive(Debug)]
pub struct PromptResponder {
    slot: oneshot::Sender<PlatformOutcome>,
}

impl PromptResponder {
    /// Create a responder and the receiver the session awaits
    pub fn channel() -> (Self, PromptReceiver) {
        let (slot, receiver) = oneshot::channel();
        (Self { slot }, receiver)
    }

    /// Deliver the platform's result.
    ///
    /// Returns `false` when the session already ended (timeout, cancel) and
    /// the result was discarded.
    pub fn resolve(self, outcome: PlatformOutcome) -> bool {
        self.slot.send(outcome).is_ok()
    }

    /// Whether the awaiting session has gone away
    pub fn is_abandoned(&self) -> bool {
        self.slot.is_closed()
    }
}

/// Read-only platform sensor query
///
/// Implementations must be side-effect free. "No hardware" is a valid
/// [`RawProbeResult`], never an error; only an unreachable platform API
/// yields [`BiolinkError::PlatformQuery`].
pub trait SensorProbeEffects: Send + Sync {
    /// Query hardware, enrollment and permission state
    fn probe(&self) -> Result<RawProbeResult, BiolinkError>;
}

/// Interactive platform prompt
pub trait BiometricPromptEffects: Send + Sync {
    /// Put the prompt on screen.
    ///
    /// The platform must eventually call [`PromptResponder::resolve`] or drop
    /// the responder. An `Err` means the prompt could not be shown at all.
    fn present_prompt(
        &self,
        request: PromptRequest,
        responder: PromptResponder,
    ) -> Result<(), BiolinkError>;

    /// Best-effort dismissal of the prompt currently on screen
    fn dismiss_prompt(&self);
}

/// Everything the broker needs from a biometric platform
pub trait BiometricPlatform: SensorProbeEffects + BiometricPromptEffects {
    /// Short identifier used in log events
    fn platform_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_android_codes() {
        assert_eq!(
            PlatformOutcome::from_android_error(7, "Too many attempts"),
            PlatformOutcome::Lockout
        );
        assert_eq!(
            PlatformOutcome::from_android_error(13, "Cancel"),
            PlatformOutcome::UserCancelled
        );
        assert_eq!(
            PlatformOutcome::from_android_error(11, "No fingerprints"),
            PlatformOutcome::NotEnrolled
        );
        assert_eq!(
            PlatformOutcome::from_android_error(8, "Vendor failure"),
            PlatformOutcome::Failed {
                code: 8,
                message: "Vendor failure".to_string()
            }
        );
    }

    #[test]
    fn test_la_error_codes() {
        assert_eq!(
            PlatformOutcome::from_la_error(-2, "Canceled by user"),
            PlatformOutcome::UserCancelled
        );
        assert_eq!(
            PlatformOutcome::from_la_error(-9, "Canceled by app"),
            PlatformOutcome::SystemCancelled
        );
        assert_eq!(
            PlatformOutcome::from_la_error(-8, "Biometry is locked out"),
            PlatformOutcome::Lockout
        );
        assert!(matches!(
            PlatformOutcome::from_la_error(-1, "Authentication failed"),
            PlatformOutcome::Failed { code: -1, .. }
        ));
    }

    #[tokio::test]
    async fn test_responder_delivers_once() {
        let (responder, receiver) = PromptResponder::channel();
        assert!(!responder.is_abandoned());
        assert!(responder.resolve(PlatformOutcome::Succeeded));
        assert_eq!(receiver.await.unwrap(), PlatformOutcome::Succeeded);
    }

    #[test]
    fn test_responder_after_session_gone() {
        let (responder, receiver) = PromptResponder::channel();
        drop(receiver);
        assert!(responder.is_abandoned());
        assert!(!responder.resolve(PlatformOutcome::Succeeded));
    }

    #[test]
    fn test_probe_builders() {
        let probe = RawProbeResult::ready("face").with_permission(false);
        assert!(probe.hardware_present && probe.enrolled);
        assert!(!probe.permission_granted);
        assert_eq!(RawProbeResult::no_hardware().reported_type, None);
    }
}
