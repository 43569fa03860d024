use pf_core::ids::AttemptId;
use pf_core::login::{CancelledBy, LoginError, LoginMode, LoginOutcome};
use tokio::sync::watch;

/// Observer for the terminal outcome of one attempt.
#[derive(Debug, Clone)]
pub struct LoginHandle {
    attempt_id: AttemptId,
    mode: LoginMode,
    outcome_rx: watch::Receiver<Option<LoginOutcome>>,
}

impl LoginHandle {
    pub(crate) fn new(
        attempt_id: AttemptId,
        mode: LoginMode,
        outcome_rx: watch::Receiver<Option<LoginOutcome>>,
    ) -> Self {
        Self {
            attempt_id,
            mode,
            outcome_rx,
        }
    }

    pub fn attempt_id(&self) -> &AttemptId {
        &self.attempt_id
    }

    pub fn mode(&self) -> LoginMode {
        self.mode
    }

    /// Outcome if the attempt already finished.
    pub fn try_outcome(&self) -> Option<LoginOutcome> {
        self.outcome_rx.borrow().clone()
    }

    /// Wait for the terminal outcome.
    ///
    /// Resolves to `Cancelled { by: Shutdown }` if the coordinator is dropped
    /// before the attempt finishes.
    pub async fn outcome(&mut self) -> LoginOutcome {
        let shutdown = LoginOutcome::Cancelled {
            by: CancelledBy::Shutdown,
        };
        if let Ok(outcome) = self.outcome_rx.wait_for(Option::is_some).await {
            return outcome.clone().unwrap_or(shutdown);
        }
        self.try_outcome().unwrap_or(shutdown)
    }

    /// Wait for the outcome, surfacing failures as [`LoginError`].
    ///
    /// `Failed` becomes `AuthRejected`, `TimedOut` becomes
    /// `DeadlineExceeded`. Cancellation is not an error.
    pub async fn result(&mut self) -> Result<LoginOutcome, LoginError> {
        let outcome = self.outcome().await;
        match outcome.error() {
            Some(err) => Err(err),
            None => Ok(outcome),
        }
    }
}
