//! Scriptable mock biometric platform

use biolink_core::effects::{
    BiometricPlatform, BiometricPromptEffects, PlatformOutcome, PromptRequest, PromptResponder,
    RawProbeResult, SensorProbeEffects,
};
use biolink_core::BiolinkError;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Notify;

/// What the mock does when a prompt is presented
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptBehavior {
    /// Resolve the responder immediately with this outcome
    Respond(PlatformOutcome),
    /// Keep the prompt "on screen" until [`MockBiometricPlatform::deliver`]
    Hold,
    /// Fail `present_prompt` with a platform query error
    RefuseToShow(String),
    /// Accept the prompt, then drop the responder without a result
    DropResponder,
}

#[derive(Debug)]
struct MockState {
    probe: Result<RawProbeResult, BiolinkError>,
    behavior: PromptBehavior,
    pending: VecDeque<PromptResponder>,
    requests: Vec<PromptRequest>,
    probe_count: usize,
    dismiss_count: usize,
}

/// Mock biometric platform for testing
///
/// Defaults to ready biometric hardware whose prompts succeed immediately.
#[derive(Debug)]
pub struct MockBiometricPlatform {
    state: Mutex<MockState>,
    prompt_shown: Notify,
}

impl Default for MockBiometricPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBiometricPlatform {
    pub fn new() -> Self {
        Self::with_probe(RawProbeResult::ready("biometrics"))
    }

    /// Mock whose probe reports `probe`
    pub fn with_probe(probe: RawProbeResult) -> Self {
        Self {
            state: Mutex::new(MockState {
                probe: Ok(probe),
                behavior: PromptBehavior::Respond(PlatformOutcome::Succeeded),
                pending: VecDeque::new(),
                requests: Vec::new(),
                probe_count: 0,
                dismiss_count: 0,
            }),
            prompt_shown: Notify::new(),
        }
    }

    pub fn set_probe(&self, probe: RawProbeResult) {
        self.state.lock().unwrap().probe = Ok(probe);
    }

    /// Make every probe fail as if the platform API were unreachable
    pub fn fail_probe(&self, message: impl Into<String>) {
        self.state.lock().unwrap().probe = Err(BiolinkError::platform_query(message));
    }

    pub fn set_behavior(&self, behavior: PromptBehavior) {
        self.state.lock().unwrap().behavior = behavior;
    }

    /// Resolve the oldest held prompt.
    ///
    /// Returns `false` when no prompt is held or the session already ended.
    pub fn deliver(&self, outcome: PlatformOutcome) -> bool {
        let responder = self.state.lock().unwrap().pending.pop_front();
        match responder {
            Some(responder) => responder.resolve(outcome),
            None => false,
        }
    }

    /// Whether a held prompt is waiting for [`Self::deliver`]
    pub fn has_pending(&self) -> bool {
        !self.state.lock().unwrap().pending.is_empty()
    }

    /// Wait until a held prompt is on screen
    pub async fn wait_for_prompt(&self) {
        loop {
            let shown = self.prompt_shown.notified();
            tokio::pin!(shown);
            shown.as_mut().enable();
            if self.has_pending() {
                return;
            }
            shown.await;
        }
    }

    pub fn requests(&self) -> Vec<PromptRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> Option<PromptRequest> {
        self.state.lock().unwrap().requests.last().cloned()
    }

    pub fn probe_count(&self) -> usize {
        self.state.lock().unwrap().probe_count
    }

    /// Number of `present_prompt` calls, including refused ones
    pub fn prompt_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub fn dismiss_count(&self) -> usize {
        self.state.lock().unwrap().dismiss_count
    }
}

impl SensorProbeEffects for MockBiometricPlatform {
    fn probe(&self) -> Result<RawProbeResult, BiolinkError> {
        let mut state = self.state.lock().unwrap();
        state.probe_count += 1;
        state.probe.clone()
    }
}

impl BiometricPromptEffects for MockBiometricPlatform {
    fn present_prompt(
        &self,
        request: PromptRequest,
        responder: PromptResponder,
    ) -> Result<(), BiolinkError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request);
        match state.behavior.clone() {
            PromptBehavior::Respond(outcome) => {
                responder.resolve(outcome);
            }
            PromptBehavior::Hold => {
                state.pending.push_back(responder);
                drop(state);
                self.prompt_shown.notify_waiters();
            }
            PromptBehavior::RefuseToShow(message) => {
                return Err(BiolinkError::platform_query(message));
            }
            PromptBehavior::DropResponder => drop(responder),
        }
        Ok(())
    }

    fn dismiss_prompt(&self) {
        self.state.lock().unwrap().dismiss_count += 1;
    }
}

impl BiometricPlatform for MockBiometricPlatform {
    fn platform_name(&self) -> &str {
        "mock"
    }
}
