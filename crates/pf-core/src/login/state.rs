use serde::{Deserialize, Serialize};

use super::error::LoginError;

/// How an attempt authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginMode {
    /// The user completes the flow in an external browser window.
    Interactive,
    /// A refresh token is exchanged in a single request.
    Token,
}

/// Lifecycle state of a single login attempt.
///
/// `Idle -> Awaiting -> {Confirmed | TimedOut | Failed | Cancelled}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginState {
    Idle,
    Awaiting,
    Confirmed,
    TimedOut,
    Failed,
    Cancelled,
}

impl LoginState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoginState::Confirmed | LoginState::TimedOut | LoginState::Failed | LoginState::Cancelled
        )
    }
}

/// Who ended an attempt early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelledBy {
    /// Explicit `cancel()` from the page, or the login window was dismissed.
    User,
    /// A newer attempt replaced this one.
    Superseded,
    /// The coordinator went away before the attempt finished.
    Shutdown,
}

/// Terminal result of an attempt, set exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoginOutcome {
    Confirmed,
    Failed { message: Option<String> },
    TimedOut,
    Cancelled { by: CancelledBy },
}

impl LoginOutcome {
    /// Terminal state that corresponds to this outcome.
    pub fn state(&self) -> LoginState {
        match self {
            LoginOutcome::Confirmed => LoginState::Confirmed,
            LoginOutcome::Failed { .. } => LoginState::Failed,
            LoginOutcome::TimedOut => LoginState::TimedOut,
            LoginOutcome::Cancelled { .. } => LoginState::Cancelled,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, LoginOutcome::Confirmed)
    }

    /// The error a failed or timed-out attempt reports to the page.
    ///
    /// Confirmed and cancelled attempts carry no error; cancellation is silent.
    pub fn error(&self) -> Option<LoginError> {
        match self {
            LoginOutcome::Failed { message } => Some(LoginError::AuthRejected(
                message
                    .clone()
                    .unwrap_or_else(|| "no reason given".to_string()),
            )),
            LoginOutcome::TimedOut => Some(LoginError::DeadlineExceeded),
            LoginOutcome::Confirmed | LoginOutcome::Cancelled { .. } => None,
        }
    }

    /// Failed and timed-out attempts should offer a recheck and a restart.
    pub fn offers_retry(&self) -> bool {
        matches!(self, LoginOutcome::Failed { .. } | LoginOutcome::TimedOut)
    }
}
