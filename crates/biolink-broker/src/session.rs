//! Authentication sessions
//!
//! `Idle -> Prompting -> {Succeeded, Cancelled, Failed}`
//!
//! One [`AuthenticationSession`] lives inside each broker and owns the session
//! guard: a single atomic that is `Prompting` while a prompt is on screen. A
//! second `run` while prompting fails with [`BiolinkError::SessionBusy`]
//! without touching the in-flight session. Platform prompts are single-instance
//! UI resources, so there is no queueing.
//!
//! The platform completes a prompt by resolving a one-shot [`PromptResponder`].
//! Once the session has reached a terminal state the receiving half is gone,
//! so a late platform callback cannot change the outcome.

use biolink_core::effects::{
    BiometricPromptEffects, PlatformOutcome, PromptRequest, PromptResponder,
};
use biolink_core::{AuthResult, BiolinkError, SessionState};
use std::future::pending;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Set alongside `Prompting` once a cancel has been requested
const CANCEL_REQUESTED: u8 = 0x80;

const PROMPTING: u8 = SessionState::Prompting as u8;

/// Driver and guard for interactive authentication attempts
#[derive(Debug)]
pub struct AuthenticationSession {
    state: AtomicU8,
    cancel: Notify,
}

impl Default for AuthenticationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthenticationSession {
    /// Guard with no session run yet
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(SessionState::Idle as u8),
            cancel: Notify::new(),
        }
    }

    /// State of the current or most recent session
    pub fn state(&self) -> SessionState {
        let raw = self.state.load(Ordering::Acquire) & !CANCEL_REQUESTED;
        SessionState::from_u8(raw).unwrap_or(SessionState::Failed)
    }

    /// Whether a prompt is currently on screen
    pub fn is_prompting(&self) -> bool {
        self.state() == SessionState::Prompting
    }

    /// Cancel the in-flight session. Returns whether one was in flight.
    pub fn cancel(&self) -> bool {
        let requested = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current & !CANCEL_REQUESTED == PROMPTING).then_some(current | CANCEL_REQUESTED)
            })
            .is_ok();
        if requested {
            self.cancel.notify_waiters();
        }
        requested
    }

    fn cancel_requested(&self) -> bool {
        self.state.load(Ordering::Acquire) & CANCEL_REQUESTED != 0
    }

    /// End an attempt that never reached the platform prompt.
    ///
    /// Honors the session guard exactly like [`Self::run`]: fails with
    /// [`BiolinkError::SessionBusy`] while another prompt is up.
    pub fn conclude_without_prompt(&self, outcome: AuthResult) -> Result<AuthResult, BiolinkError> {
        let terminal = outcome.terminal_state() as u8;
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current & !CANCEL_REQUESTED != PROMPTING).then_some(terminal)
            })
            .map_err(|_| BiolinkError::SessionBusy)?;
        tracing::warn!(?outcome, "authentication refused before prompting");
        Ok(outcome)
    }

    /// Atomically move any non-prompting state to `Prompting`
    fn try_begin<'a, P>(&'a self, platform: &'a P) -> Result<PromptingPermit<'a, P>, BiolinkError>
    where
        P: BiometricPromptEffects + ?Sized,
    {
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current & !CANCEL_REQUESTED != PROMPTING).then_some(PROMPTING)
            })
            .map_err(|_| BiolinkError::SessionBusy)?;
        Ok(PromptingPermit {
            session: self,
            platform,
            finished: false,
        })
    }

    /// Run one authentication attempt to a terminal state.
    ///
    /// Returns `Err` only for [`BiolinkError::SessionBusy`]; every terminal
    /// outcome, including timeout and cancellation, is an `Ok(AuthResult)`.
    /// `timeout` of `None` leaves the prompt lifetime to the platform.
    pub async fn run<P>(
        &self,
        platform: &P,
        request: PromptRequest,
        timeout: Option<Duration>,
    ) -> Result<AuthResult, BiolinkError>
    where
        P: BiometricPromptEffects + ?Sized,
    {
        let permit = self.try_begin(platform)?;

        let cancelled = self.cancel.notified();
        tokio::pin!(cancelled);
        cancelled.as_mut().enable();

        let started = Instant::now();
        let (responder, mut receiver) = PromptResponder::channel();
        tracing::debug!(?timeout, "starting authentication prompt");

        let outcome = if self.cancel_requested() {
            AuthResult::SystemCancel
        } else if let Err(e) = platform.present_prompt(request, responder) {
            tracing::error!(error = %e, "platform refused to show the prompt");
            AuthResult::Error(e.to_string())
        } else {
            tokio::select! {
                biased;
                delivered = &mut receiver => match delivered {
                    Ok(raw) => normalize_outcome(raw),
                    Err(_) => AuthResult::Error("prompt closed without a result".to_string()),
                },
                () = &mut cancelled => {
                    platform.dismiss_prompt();
                    AuthResult::SystemCancel
                },
                () = expiry(timeout) => {
                    platform.dismiss_prompt();
                    AuthResult::Timeout
                },
            }
        };
        // Late platform callbacks now resolve into a closed slot
        drop(receiver);

        let took_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match &outcome {
            AuthResult::Success => tracing::info!(took_ms, "authentication successful"),
            AuthResult::UserCancel | AuthResult::SystemCancel => {
                tracing::info!(took_ms, ?outcome, "authentication cancelled");
            }
            other => tracing::warn!(took_ms, outcome = ?other, "authentication failed"),
        }

        permit.finish(&outcome);
        Ok(outcome)
    }
}

async fn expiry(timeout: Option<Duration>) {
    match timeout {
        Some(duration) => tokio::time::sleep(duration).await,
        None => pending::<()>().await,
    }
}

/// Normalize a raw platform callback result
pub fn normalize_outcome(raw: PlatformOutcome) -> AuthResult {
    match raw {
        PlatformOutcome::Succeeded => AuthResult::Success,
        PlatformOutcome::UserCancelled => AuthResult::UserCancel,
        PlatformOutcome::SystemCancelled => AuthResult::SystemCancel,
        PlatformOutcome::Lockout => AuthResult::Lockout,
        PlatformOutcome::NotEnrolled => AuthResult::NotEnrolled,
        PlatformOutcome::HardwareUnavailable => AuthResult::NotAvailable,
        PlatformOutcome::TimedOut => AuthResult::Timeout,
        PlatformOutcome::Failed { code, message } => {
            AuthResult::Error(format!("{message} (platform code {code})"))
        }
    }
}

/// Held while a session is `Prompting`; releases the guard on every exit path.
///
/// Storing the terminal state also clears any pending cancel request.
struct PromptingPermit<'a, P: BiometricPromptEffects + ?Sized> {
    session: &'a AuthenticationSession,
    platform: &'a P,
    finished: bool,
}

impl<P: BiometricPromptEffects + ?Sized> PromptingPermit<'_, P> {
    fn finish(mut self, outcome: &AuthResult) {
        self.session
            .state
            .store(outcome.terminal_state() as u8, Ordering::Release);
        self.finished = true;
    }
}

impl<P: BiometricPromptEffects + ?Sized> Drop for PromptingPermit<'_, P> {
    fn drop(&mut self) {
        if !self.finished {
            // Caller dropped the future mid-prompt
            tracing::debug!("authentication abandoned by caller");
            self.platform.dismiss_prompt();
            self.session
                .state
                .store(SessionState::Cancelled as u8, Ordering::Release);
        }
    }
}
