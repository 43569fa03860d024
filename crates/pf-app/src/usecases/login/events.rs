use async_trait::async_trait;
use pf_core::ids::AttemptId;
use pf_core::login::{LoginError, LoginMode, LoginOutcome};
use tokio::sync::mpsc;

use super::confirmer::ConfirmationReport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginDomainEvent {
    AttemptStarted {
        attempt_id: AttemptId,
        mode: LoginMode,
    },
    /// A status check failed; the attempt keeps waiting.
    StatusCheckFailed {
        attempt_id: AttemptId,
        error: LoginError,
    },
    /// Confirmation side effects finished. Runs after the outcome is
    /// published, so it always trails `Finished`.
    Confirmed {
        attempt_id: AttemptId,
        report: ConfirmationReport,
    },
    Finished {
        attempt_id: AttemptId,
        outcome: LoginOutcome,
    },
}

#[async_trait]
pub trait LoginEventPort: Send + Sync {
    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<LoginDomainEvent>>;
}
