use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error taxonomy of the login flow.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum LoginError {
    /// A single status check failed. Never terminal on its own.
    #[error("status check failed: {0}")]
    TransientPoll(String),

    /// Either channel reported an explicit failure.
    #[error("login rejected: {0}")]
    AuthRejected(String),

    /// Token rejected before any request was made.
    #[error("invalid token: {0}")]
    Validation(String),

    /// The attempt did not finish before its deadline.
    #[error("login did not complete before the deadline")]
    DeadlineExceeded,

    /// A late signal from a replaced attempt.
    #[error("login attempt was superseded")]
    Superseded,
}

/// Errors surfaced by the auth backend collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthBackendError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("rejected by backend: {0}")]
    Rejected(String),
}
