//! Biometric platform handler for hosts without biometric hardware.
//!
//! This handler implements the Null Object Pattern: the probe reports no
//! hardware and every prompt completes immediately as hardware-unavailable.
//! It lets the broker run on servers, CI and desktop builds without
//! compile-time feature flags.
//!
//! **For testing**: use `MockBiometricPlatform` from `biolink-testkit`.
//! **For devices**: implement `BiometricPlatform` over the native API.

use biolink_core::effects::{
    BiometricPlatform, BiometricPromptEffects, PlatformOutcome, PromptRequest, PromptResponder,
    RawProbeResult, SensorProbeEffects,
};
use biolink_core::BiolinkError;

/// Fallback handler for platforms without biometric hardware.
#[derive(Debug, Clone)]
pub struct FallbackBiometricHandler {
    platform_config: String,
}

impl FallbackBiometricHandler {
    /// Create a new fallback handler
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for FallbackBiometricHandler {
    fn default() -> Self {
        Self {
            platform_config: "fallback-no-hardware".to_string(),
        }
    }
}

impl SensorProbeEffects for FallbackBiometricHandler {
    fn probe(&self) -> Result<RawProbeResult, BiolinkError> {
        Ok(RawProbeResult::no_hardware())
    }
}

impl BiometricPromptEffects for FallbackBiometricHandler {
    fn present_prompt(
        &self,
        _request: PromptRequest,
        responder: PromptResponder,
    ) -> Result<(), BiolinkError> {
        responder.resolve(PlatformOutcome::HardwareUnavailable);
        Ok(())
    }

    fn dismiss_prompt(&self) {
        // Nothing is ever on screen
    }
}

impl BiometricPlatform for FallbackBiometricHandler {
    fn platform_name(&self) -> &str {
        &self.platform_config
    }
}
