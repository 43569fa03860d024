use serde::{Deserialize, Serialize};

use super::error::LoginError;
use super::state::LoginOutcome;
use crate::ids::AttemptId;

/// Side effects produced by state transitions.
///
/// 状态迁移产生的副作用，由 coordinator 执行。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginAction {
    /// Attach host-pushed success/error listeners.
    SubscribeNotifications { attempt_id: AttemptId },
    /// Arm the periodic status poller.
    StartPolling { attempt_id: AttemptId },
    /// Issue the interactive login request.
    SendLoginRequest { attempt_id: AttemptId },
    /// Issue the single token exchange request.
    SendTokenExchange { attempt_id: AttemptId },
    /// Stop the poller and dispose the notification subscription.
    TeardownChannels { attempt_id: AttemptId },
    /// Run the one-time confirmation side effects.
    RunConfirmation { attempt_id: AttemptId },
    /// Publish the terminal outcome to observers.
    EmitOutcome {
        attempt_id: AttemptId,
        outcome: LoginOutcome,
    },
    /// A status check failed; polling continues.
    RecordTransientError {
        attempt_id: AttemptId,
        error: LoginError,
    },
}
