//! `BiolinkCore`, the single entry point handed to the host bridge
//!
//! The host application builds one instance with [`BiolinkCore::builder`],
//! injecting the platform handler and, optionally, secure storage and a
//! signer. Nothing is registered globally.

use crate::resolver;
use crate::session::AuthenticationSession;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use biolink_core::effects::{
    BiometricPlatform, PromptRequest, SecureStorageEffects, SigningEffects,
};
use biolink_core::{
    AuthResult, BiolinkError, BrokerConfig, PromptOptions, SensorAvailability, SessionState,
};
use std::fmt;
use std::sync::Arc;

/// Biometric capability broker
pub struct BiolinkCore {
    platform: Arc<dyn BiometricPlatform>,
    secure_storage: Option<Arc<dyn SecureStorageEffects>>,
    signer: Option<Arc<dyn SigningEffects>>,
    config: BrokerConfig,
    session: AuthenticationSession,
}

impl fmt::Debug for BiolinkCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BiolinkCore")
            .field("platform", &self.platform.platform_name())
            .field("secure_storage", &self.secure_storage.is_some())
            .field("signer", &self.signer.is_some())
            .field("session_state", &self.session.state())
            .finish_non_exhaustive()
    }
}

/// Builder for [`BiolinkCore`]
pub struct BiolinkCoreBuilder {
    platform: Arc<dyn BiometricPlatform>,
    secure_storage: Option<Arc<dyn SecureStorageEffects>>,
    signer: Option<Arc<dyn SigningEffects>>,
    config: BrokerConfig,
}

impl BiolinkCoreBuilder {
    /// Use `config` instead of [`BrokerConfig::default`]
    pub fn with_config(mut self, config: BrokerConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable the secret operations
    pub fn with_secure_storage(mut self, storage: Arc<dyn SecureStorageEffects>) -> Self {
        self.secure_storage = Some(storage);
        self
    }

    /// Enable challenge signing
    pub fn with_signer(mut self, signer: Arc<dyn SigningEffects>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Validate the configuration and build the broker
    pub fn build(self) -> Result<BiolinkCore, BiolinkError> {
        self.config.validate()?;
        tracing::debug!(
            platform = self.platform.platform_name(),
            secure_storage = self.secure_storage.is_some(),
            signer = self.signer.is_some(),
            "biolink core initialized"
        );
        Ok(BiolinkCore {
            platform: self.platform,
            secure_storage: self.secure_storage,
            signer: self.signer,
            config: self.config,
            session: AuthenticationSession::new(),
        })
    }
}

impl BiolinkCore {
    /// Start building a broker around `platform`
    pub fn builder(platform: Arc<dyn BiometricPlatform>) -> BiolinkCoreBuilder {
        BiolinkCoreBuilder {
            platform,
            secure_storage: None,
            signer: None,
            config: BrokerConfig::default(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    /// Whether biometrics can be used right now, and which kind.
    ///
    /// Never fails: a platform query error is logged and reported as
    /// `{ available: false, biometryType: None }`.
    pub fn get_sensor_availability(&self) -> SensorAvailability {
        tracing::debug!(platform = self.platform.platform_name(), "checking sensor availability");
        match self.platform.probe() {
            Ok(probe) => {
                let availability = resolver::resolve(&probe);
                tracing::debug!(
                    available = availability.available,
                    biometry_type = %availability.biometry_type,
                    "sensor availability resolved"
                );
                availability
            }
            Err(e) => {
                tracing::warn!(error = %e, "sensor probe failed, reporting unavailable");
                SensorAvailability::unavailable()
            }
        }
    }

    /// Prompt the user for biometric authentication.
    ///
    /// Fails with [`BiolinkError::InvalidArgument`] for a blank `reason` and
    /// with [`BiolinkError::SessionBusy`] while another prompt is up. Every
    /// other outcome is an `Ok(AuthResult)`.
    ///
    /// Without device-credential fallback the sensor is probed first; missing
    /// hardware yields `NotAvailable` and missing enrollment `NotEnrolled`,
    /// both without showing a prompt.
    pub async fn authenticate(
        &self,
        reason: &str,
        options: PromptOptions,
    ) -> Result<AuthResult, BiolinkError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(BiolinkError::invalid_argument(
                "Authentication reason must not be empty",
            ));
        }

        let timeout = options.timeout.or_else(|| self.config.default_timeout());
        let request = PromptRequest {
            reason: reason.to_string(),
            title: options
                .prompt_message
                .unwrap_or_else(|| self.config.prompt_title.clone()),
            subtitle: self.config.prompt_subtitle.clone(),
            cancel_button_text: options
                .cancel_button_text
                .unwrap_or_else(|| self.config.cancel_button_text.clone()),
            allow_device_credential: options.fallback_to_device_credential
                || self.config.fallback_to_device_credential,
        };

        tracing::debug!(
            platform = self.platform.platform_name(),
            reason = %request.reason,
            allow_device_credential = request.allow_device_credential,
            "authenticate requested"
        );

        // A biometric-only prompt is never shown on a device that cannot serve it
        if !request.allow_device_credential {
            if let Some(refusal) = self.biometric_refusal() {
                return self.session.conclude_without_prompt(refusal);
            }
        }
        self.session.run(&*self.platform, request, timeout).await
    }

    /// Outcome to report instead of prompting when biometrics are unusable
    fn biometric_refusal(&self) -> Option<AuthResult> {
        let probe = match self.platform.probe() {
            Ok(probe) => probe,
            Err(e) => {
                tracing::warn!(error = %e, "sensor probe failed before prompting");
                return Some(AuthResult::NotAvailable);
            }
        };
        if resolver::resolve(&probe).available {
            None
        } else if probe.hardware_present && !probe.enrolled {
            Some(AuthResult::NotEnrolled)
        } else {
            Some(AuthResult::NotAvailable)
        }
    }

    /// Cancel the prompt currently on screen. Returns whether one was.
    pub fn cancel_authentication(&self) -> bool {
        let cancelled = self.session.cancel();
        if cancelled {
            tracing::debug!("authentication cancel requested");
        }
        cancelled
    }

    /// State of the current or most recent authentication session
    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    fn storage(&self) -> Result<&dyn SecureStorageEffects, BiolinkError> {
        self.secure_storage
            .as_deref()
            .ok_or_else(|| BiolinkError::unsupported("No secure storage configured"))
    }

    fn signing(&self) -> Result<&dyn SigningEffects, BiolinkError> {
        self.signer
            .as_deref()
            .ok_or_else(|| BiolinkError::unsupported("No signer configured"))
    }

    /// Store a UTF-8 secret under `key`, replacing any previous value
    pub async fn store_secret(&self, key: &str, value: &str) -> Result<(), BiolinkError> {
        require_key(key)?;
        tracing::debug!(key, "storing secret");
        self.storage()?
            .store_secret(key, value.as_bytes())
            .await
            .map_err(|e| {
                tracing::error!(key, error = %e, "failed to store secret");
                e
            })
    }

    /// Read back a secret; `None` when nothing is stored under `key`
    pub async fn get_secret(&self, key: &str) -> Result<Option<String>, BiolinkError> {
        require_key(key)?;
        tracing::debug!(key, "retrieving secret");
        let Some(bytes) = self.storage()?.load_secret(key).await? else {
            tracing::debug!(key, "no secret found");
            return Ok(None);
        };
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| BiolinkError::storage(format!("Secret '{key}' is not valid UTF-8")))
    }

    /// Remove a secret; removing a missing key is not an error
    pub async fn delete_secret(&self, key: &str) -> Result<(), BiolinkError> {
        require_key(key)?;
        tracing::debug!(key, "deleting secret");
        self.storage()?.delete_secret(key).await
    }

    /// Sign `challenge` with the device key, returning a base64 signature
    pub async fn sign_challenge(&self, challenge: &str) -> Result<String, BiolinkError> {
        if challenge.is_empty() {
            return Err(BiolinkError::invalid_argument("Challenge must not be empty"));
        }
        let signer = self.signing()?;
        let signature = signer
            .sign(challenge.as_bytes())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to sign challenge");
                e
            })?;
        tracing::debug!(algorithm = signer.algorithm(), "challenge signed");
        Ok(STANDARD.encode(signature))
    }

    /// Base64 public half of the device key
    pub async fn public_key(&self) -> Result<String, BiolinkError> {
        let public_key = self.signing()?.public_key().await?;
        Ok(STANDARD.encode(public_key))
    }
}

fn require_key(key: &str) -> Result<(), BiolinkError> {
    if key.is_empty() {
        return Err(BiolinkError::invalid_argument("Secret key must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use biolink_core::effects::{PlatformOutcome, RawProbeResult};
    use biolink_core::BiometryType;
    use biolink_testkit::{MockBiometricPlatform, MockSecureStorageHandler, PromptBehavior};
    use std::time::Duration;

    fn core_with(platform: Arc<MockBiometricPlatform>) -> BiolinkCore {
        BiolinkCore::builder(platform).build().unwrap()
    }

    #[test]
    fn test_availability_resolves_probe() {
        let platform = Arc::new(MockBiometricPlatform::with_probe(RawProbeResult::ready(
            "face",
        )));
        let core = core_with(platform.clone());
        assert_eq!(
            core.get_sensor_availability(),
            SensorAvailability::available(BiometryType::FaceID)
        );
        assert_eq!(platform.probe_count(), 1);
    }

    #[test]
    fn test_availability_swallows_probe_error() {
        let platform = Arc::new(MockBiometricPlatform::new());
        platform.fail_probe("LocalAuthentication unreachable");
        let core = core_with(platform);
        assert_eq!(
            core.get_sensor_availability(),
            SensorAvailability::unavailable()
        );
    }

    #[tokio::test]
    async fn test_blank_reason_rejected_before_prompt() {
        let platform = Arc::new(MockBiometricPlatform::new());
        let core = core_with(platform.clone());

        assert_matches!(
            core.authenticate("   ", PromptOptions::new()).await,
            Err(BiolinkError::InvalidArgument { .. })
        );
        assert_eq!(platform.prompt_count(), 0);
        assert_eq!(core.session_state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_request_merges_options_over_config() {
        let platform = Arc::new(MockBiometricPlatform::new());
        platform.set_behavior(PromptBehavior::Respond(PlatformOutcome::Succeeded));
        let config = BrokerConfig {
            prompt_title: "Confirm".to_string(),
            fallback_to_device_credential: true,
            ..BrokerConfig::default()
        };
        let core = BiolinkCore::builder(platform.clone())
            .with_config(config)
            .build()
            .unwrap();

        let options = PromptOptions::new().with_cancel_button_text("Not now");
        let outcome = core.authenticate(" Pay 10 EUR ", options).await.unwrap();
        assert_eq!(outcome, AuthResult::Success);

        let request = platform.last_request().unwrap();
        assert_eq!(request.reason, "Pay 10 EUR");
        assert_eq!(request.title, "Confirm");
        assert_eq!(request.subtitle, "Authenticate to continue");
        assert_eq!(request.cancel_button_text, "Not now");
        assert!(request.allow_device_credential);
    }

    #[tokio::test]
    async fn test_sensor_check_error_refuses_biometric_prompt() {
        let platform = Arc::new(MockBiometricPlatform::new());
        platform.fail_probe("BiometricManager unreachable");
        let core = core_with(platform.clone());

        let outcome = core.authenticate("Unlock", PromptOptions::new()).await.unwrap();
        assert_eq!(outcome, AuthResult::NotAvailable);
        assert_eq!(platform.prompt_count(), 0);
        assert_eq!(core.session_state(), SessionState::Failed);
    }

    #[tokio::test]
    async fn test_device_credential_skips_sensor_check() {
        let platform = Arc::new(MockBiometricPlatform::with_probe(
            RawProbeResult::no_hardware(),
        ));
        let core = core_with(platform.clone());

        let options = PromptOptions::new().with_device_credential_fallback(true);
        let outcome = core.authenticate("Unlock", options).await.unwrap();
        assert_eq!(outcome, AuthResult::Success);
        assert_eq!(platform.prompt_count(), 1);
        assert_eq!(platform.probe_count(), 0);
    }

    #[tokio::test]
    async fn test_refused_prompt_is_error_outcome() {
        let platform = Arc::new(MockBiometricPlatform::new());
        platform.set_behavior(PromptBehavior::RefuseToShow("activity destroyed".to_string()));
        let core = core_with(platform);

        let outcome = core.authenticate("Unlock", PromptOptions::new()).await.unwrap();
        assert_matches!(outcome, AuthResult::Error(message) if message.contains("activity destroyed"));
        assert_eq!(core.session_state(), SessionState::Failed);
    }

    #[tokio::test]
    async fn test_config_timeout_applies() {
        let platform = Arc::new(MockBiometricPlatform::new());
        platform.set_behavior(PromptBehavior::Hold);
        let config = BrokerConfig {
            default_timeout_ms: Some(1_000),
            ..BrokerConfig::default()
        };
        let core = BiolinkCore::builder(platform.clone())
            .with_config(config)
            .build()
            .unwrap();

        tokio::time::pause();
        let outcome = core.authenticate("Unlock", PromptOptions::new()).await.unwrap();
        assert_eq!(outcome, AuthResult::Timeout);
        assert_eq!(platform.dismiss_count(), 1);
    }

    #[tokio::test]
    async fn test_option_timeout_overrides_config() {
        let platform = Arc::new(MockBiometricPlatform::new());
        platform.set_behavior(PromptBehavior::Hold);
        let core = core_with(platform);

        tokio::time::pause();
        let started = tokio::time::Instant::now();
        let outcome = core
            .authenticate("Unlock", PromptOptions::new().with_timeout(Duration::from_secs(3)))
            .await
            .unwrap();
        assert_eq!(outcome, AuthResult::Timeout);
        assert!(started.elapsed() >= Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_config_rejected_at_build() {
        let config = BrokerConfig {
            default_timeout_ms: Some(5),
            ..BrokerConfig::default()
        };
        let result = BiolinkCore::builder(Arc::new(MockBiometricPlatform::new()))
            .with_config(config)
            .build();
        assert_matches!(result, Err(BiolinkError::Config { .. }));
    }

    #[tokio::test]
    async fn test_secrets_require_storage() {
        let core = core_with(Arc::new(MockBiometricPlatform::new()));
        assert_matches!(
            core.store_secret("token", "abc").await,
            Err(BiolinkError::Unsupported { .. })
        );
        assert_matches!(
            core.sign_challenge("nonce").await,
            Err(BiolinkError::Unsupported { .. })
        );
        assert_matches!(core.public_key().await, Err(BiolinkError::Unsupported { .. }));
    }

    #[tokio::test]
    async fn test_secret_round_trip_through_mock_storage() {
        let storage = Arc::new(MockSecureStorageHandler::new());
        let core = BiolinkCore::builder(Arc::new(MockBiometricPlatform::new()))
            .with_secure_storage(storage)
            .build()
            .unwrap();

        assert_matches!(
            core.store_secret("", "abc").await,
            Err(BiolinkError::InvalidArgument { .. })
        );
        core.store_secret("token", "abc").await.unwrap();
        assert_eq!(core.get_secret("token").await.unwrap(), Some("abc".to_string()));
        core.delete_secret("token").await.unwrap();
        assert_eq!(core.get_secret("token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_non_utf8_secret_is_storage_error() {
        let storage = Arc::new(MockSecureStorageHandler::new());
        storage.insert_raw("blob", vec![0xff, 0xfe]);
        let core = BiolinkCore::builder(Arc::new(MockBiometricPlatform::new()))
            .with_secure_storage(storage)
            .build()
            .unwrap();
        assert_matches!(
            core.get_secret("blob").await,
            Err(BiolinkError::Storage { .. })
        );
    }

    #[test]
    fn test_cancel_without_session() {
        let core = core_with(Arc::new(MockBiometricPlatform::new()));
        assert!(!core.cancel_authentication());
        assert_eq!(core.session_state(), SessionState::Idle);
    }
}
