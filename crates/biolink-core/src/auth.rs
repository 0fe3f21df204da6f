//! Authentication outcomes and session states

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of a single `authenticate` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "message")]
pub enum AuthResult {
    /// The platform verified the user
    Success,
    /// The user dismissed the prompt
    UserCancel,
    /// The system or the application dismissed the prompt
    SystemCancel,
    /// Too many failed attempts; biometrics are locked
    Lockout,
    /// Hardware is present but nothing is enrolled
    NotEnrolled,
    /// No usable hardware
    NotAvailable,
    /// The prompt outlived its timeout
    Timeout,
    /// Any other platform failure
    Error(String),
}

impl AuthResult {
    /// Terminal session state this outcome corresponds to
    pub fn terminal_state(&self) -> SessionState {
        match self {
            AuthResult::Success => SessionState::Succeeded,
            AuthResult::UserCancel | AuthResult::SystemCancel => SessionState::Cancelled,
            AuthResult::Lockout
            | AuthResult::NotEnrolled
            | AuthResult::NotAvailable
            | AuthResult::Timeout
            | AuthResult::Error(_) => SessionState::Failed,
        }
    }

    /// Whether the user was authenticated
    pub fn is_success(&self) -> bool {
        matches!(self, AuthResult::Success)
    }
}

/// Lifecycle of an authentication session
///
/// `Idle -> Prompting -> {Succeeded, Cancelled, Failed}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SessionState {
    /// No session has run yet
    Idle = 0,
    /// A platform prompt is on screen
    Prompting = 1,
    /// Last session authenticated the user
    Succeeded = 2,
    /// Last session was cancelled
    Cancelled = 3,
    /// Last session failed (lockout, error, timeout, ...)
    Failed = 4,
}

impl SessionState {
    /// Whether this is one of the three terminal states
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Succeeded | SessionState::Cancelled | SessionState::Failed
        )
    }

    /// Decode the `repr(u8)` discriminant
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(SessionState::Idle),
            1 => Some(SessionState::Prompting),
            2 => Some(SessionState::Succeeded),
            3 => Some(SessionState::Cancelled),
            4 => Some(SessionState::Failed),
            _ => None,
        }
    }
}

/// Caller options for a single authentication attempt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptOptions {
    /// Overrides the configured prompt title
    pub prompt_message: Option<String>,
    /// Overrides the configured cancel-button label
    pub cancel_button_text: Option<String>,
    /// Let the platform fall back to the device passcode / credential
    pub fallback_to_device_credential: bool,
    /// Upper bound on how long the prompt may stay up
    #[serde(skip)]
    pub timeout: Option<Duration>,
}

impl PromptOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the prompt by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the prompt title
    pub fn with_prompt_message(mut self, message: impl Into<String>) -> Self {
        self.prompt_message = Some(message.into());
        self
    }

    /// Override the cancel-button label
    pub fn with_cancel_button_text(mut self, text: impl Into<String>) -> Self {
        self.cancel_button_text = Some(text.into());
        self
    }

    /// Allow the device credential as a fallback
    pub fn with_device_credential_fallback(mut self, allowed: bool) -> Self {
        self.fallback_to_device_credential = allowed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcomes_map_to_terminal_states() {
        assert_eq!(AuthResult::Success.terminal_state(), SessionState::Succeeded);
        assert_eq!(
            AuthResult::UserCancel.terminal_state(),
            SessionState::Cancelled
        );
        assert_eq!(
            AuthResult::SystemCancel.terminal_state(),
            SessionState::Cancelled
        );
        assert_eq!(AuthResult::Timeout.terminal_state(), SessionState::Failed);
        assert_eq!(
            AuthResult::Error("vendor".to_string()).terminal_state(),
            SessionState::Failed
        );
        for outcome in [
            AuthResult::Lockout,
            AuthResult::NotEnrolled,
            AuthResult::NotAvailable,
        ] {
            assert!(outcome.terminal_state().is_terminal());
        }
    }

    #[test]
    fn test_session_state_discriminants() {
        for state in [
            SessionState::Idle,
            SessionState::Prompting,
            SessionState::Succeeded,
            SessionState::Cancelled,
            SessionState::Failed,
        ] {
            assert_eq!(SessionState::from_u8(state as u8), Some(state));
        }
        assert_eq!(SessionState::from_u8(9), None);
        assert!(!SessionState::Prompting.is_terminal());
    }

    #[test]
    fn test_auth_result_wire_shape() {
        let json = serde_json::to_value(AuthResult::Error("sensor dirty".to_string())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "outcome": "Error", "message": "sensor dirty" })
        );
        let json = serde_json::to_value(AuthResult::Lockout).unwrap();
        assert_eq!(json, serde_json::json!({ "outcome": "Lockout" }));
    }

    #[test]
    fn test_prompt_options_builder() {
        let options = PromptOptions::new()
            .with_prompt_message("Unlock vault")
            .with_timeout(Duration::from_secs(5))
            .with_device_credential_fallback(true);
        assert_eq!(options.prompt_message.as_deref(), Some("Unlock vault"));
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
        assert!(options.fallback_to_device_credential);
        assert!(options.cancel_button_text.is_none());
    }
}
