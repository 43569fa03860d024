use serde::{Deserialize, Serialize};

use crate::ids::AttemptId;

/// Result of a single status check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollStatus {
    /// The backend reports an authenticated session.
    Authenticated,
    /// Not authenticated yet; keep waiting.
    NotYet,
    /// The check itself failed (network error, request timeout).
    Error(String),
}

/// Where a status observation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollSource {
    /// Regular poller tick.
    Scheduled,
    /// `check_now()` from the page.
    Manual,
}

/// How the login request (or token exchange) itself resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginRequestResult {
    /// The browser flow was launched and is still running.
    Pending,
    /// The request only returned once the login finished.
    Completed,
    /// The user dismissed the login window before it started.
    Cancelled,
    /// Transport-level timeout of the request.
    TimedOut,
    /// The backend rejected the credentials or token.
    Rejected(String),
    /// The request never reached the backend.
    Unreachable(String),
}

/// Events that drive a login attempt.
///
/// Every event names the attempt it belongs to; the session ignores events
/// addressed to any other attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginEvent {
    /// Attempt started by the coordinator.
    Start { attempt_id: AttemptId },
    /// Status observed by the poller or by a manual check.
    PollResult {
        attempt_id: AttemptId,
        source: PollSource,
        status: PollStatus,
    },
    /// Host process pushed a login-success event.
    PushSuccess { attempt_id: AttemptId },
    /// Host process pushed a login-error event.
    PushError {
        attempt_id: AttemptId,
        message: Option<String>,
    },
    /// The login request or token exchange resolved.
    LoginRequestSettled {
        attempt_id: AttemptId,
        result: LoginRequestResult,
    },
    /// Explicit cancellation from the page.
    UserCancel { attempt_id: AttemptId },
    /// A newer attempt replaced this one.
    Superseded { attempt_id: AttemptId },
    /// Compare the clock against the deadline without a status result.
    DeadlineCheck { attempt_id: AttemptId },
}

impl LoginEvent {
    pub fn attempt_id(&self) -> &AttemptId {
        match self {
            LoginEvent::Start { attempt_id, .. }
            | LoginEvent::PollResult { attempt_id, .. }
            | LoginEvent::PushSuccess { attempt_id }
            | LoginEvent::PushError { attempt_id, .. }
            | LoginEvent::LoginRequestSettled { attempt_id, .. }
            | LoginEvent::UserCancel { attempt_id }
            | LoginEvent::Superseded { attempt_id }
            | LoginEvent::DeadlineCheck { attempt_id } => attempt_id,
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            LoginEvent::Start { .. } => "start",
            LoginEvent::PollResult { .. } => "poll_result",
            LoginEvent::PushSuccess { .. } => "push_success",
            LoginEvent::PushError { .. } => "push_error",
            LoginEvent::LoginRequestSettled { .. } => "login_request_settled",
            LoginEvent::UserCancel { .. } => "user_cancel",
            LoginEvent::Superseded { .. } => "superseded",
            LoginEvent::DeadlineCheck { .. } => "deadline_check",
        }
    }
}
