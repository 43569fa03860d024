//! Login session state machine.
//!
//! Pure transition function `(state, event, now) -> (state, actions)`. The
//! session performs no I/O; the coordinator executes the returned actions.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::action::LoginAction;
use super::error::LoginError;
use super::event::{LoginEvent, LoginRequestResult, PollStatus};
use super::state::{CancelledBy, LoginMode, LoginOutcome, LoginState};
use crate::ids::AttemptId;

/// Authoritative state of one login attempt.
#[derive(Debug, Clone)]
pub struct LoginSession {
    attempt_id: AttemptId,
    mode: LoginMode,
    state: LoginState,
    max_wait: chrono::Duration,
    started_at: Option<DateTime<Utc>>,
    deadline: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    outcome: Option<LoginOutcome>,
}

/// Read-only view of a session.
///
/// 会话的只读快照。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginSnapshot {
    pub attempt_id: AttemptId,
    pub mode: LoginMode,
    pub state: LoginState,
    pub started_at: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcome: Option<LoginOutcome>,
}

impl LoginSession {
    pub fn new(attempt_id: AttemptId, mode: LoginMode, max_wait: Duration) -> Self {
        // Out-of-range waits leave the attempt without a deadline.
        let max_wait = chrono::Duration::from_std(max_wait).unwrap_or(chrono::Duration::MAX);
        Self {
            attempt_id,
            mode,
            state: LoginState::Idle,
            max_wait,
            started_at: None,
            deadline: None,
            finished_at: None,
            outcome: None,
        }
    }

    pub fn attempt_id(&self) -> &AttemptId {
        &self.attempt_id
    }

    pub fn mode(&self) -> LoginMode {
        self.mode
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn outcome(&self) -> Option<&LoginOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_awaiting(&self) -> bool {
        self.state == LoginState::Awaiting
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// `now > deadline`. Reaching the deadline exactly is not yet expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| now > deadline)
    }

    pub fn snapshot(&self) -> LoginSnapshot {
        LoginSnapshot {
            attempt_id: self.attempt_id.clone(),
            mode: self.mode,
            state: self.state,
            started_at: self.started_at,
            deadline: self.deadline,
            finished_at: self.finished_at,
            outcome: self.outcome.clone(),
        }
    }

    /// Feed one event through the transition function.
    ///
    /// Events addressed to another attempt never change state.
    pub fn handle_event(
        &mut self,
        event: LoginEvent,
        now: DateTime<Utc>,
    ) -> (LoginState, Vec<LoginAction>) {
        if let Err(err) = self.ensure_current(&event) {
            debug!(
                attempt_id = %self.attempt_id,
                stale_attempt_id = %event.attempt_id(),
                event = event.name(),
                reason = %err,
                "Discarding signal"
            );
            return (self.state, Vec::new());
        }

        let old_state = self.state;
        let event_name = event.name();
        let actions = self.transition(event, now);

        if old_state != self.state {
            info!(
                attempt_id = %self.attempt_id,
                mode = ?self.mode,
                from = ?old_state,
                to = ?self.state,
                event = event_name,
                "Login state transition"
            );
        }

        (self.state, actions)
    }

    /// Signals of a replaced attempt are `Superseded` and never surfaced.
    fn ensure_current(&self, event: &LoginEvent) -> Result<(), LoginError> {
        if event.attempt_id() == &self.attempt_id {
            Ok(())
        } else {
            Err(LoginError::Superseded)
        }
    }

    fn transition(&mut self, event: LoginEvent, now: DateTime<Utc>) -> Vec<LoginAction> {
        match (self.state, event) {
            (LoginState::Idle, LoginEvent::Start { .. }) => self.begin(now),

            // The deadline is compared before the status itself: a success
            // observed after expiry still times out.
            (LoginState::Awaiting, LoginEvent::PollResult { .. })
            | (LoginState::Awaiting, LoginEvent::DeadlineCheck { .. })
                if self.is_expired(now) =>
            {
                self.finish(LoginOutcome::TimedOut, now)
            }

            (LoginState::Awaiting, LoginEvent::PollResult { status, source, .. }) => match status {
                PollStatus::Authenticated => {
                    debug!(attempt_id = %self.attempt_id, ?source, "Status check reports authenticated");
                    self.finish(LoginOutcome::Confirmed, now)
                }
                PollStatus::NotYet => Vec::new(),
                PollStatus::Error(message) => vec![LoginAction::RecordTransientError {
                    attempt_id: self.attempt_id.clone(),
                    error: LoginError::TransientPoll(message),
                }],
            },

            (LoginState::Awaiting, LoginEvent::DeadlineCheck { .. }) => Vec::new(),

            (LoginState::Awaiting, LoginEvent::PushSuccess { .. }) => {
                self.finish(LoginOutcome::Confirmed, now)
            }

            (LoginState::Awaiting, LoginEvent::PushError { message, .. }) => {
                self.finish(LoginOutcome::Failed { message }, now)
            }

            (LoginState::Awaiting, LoginEvent::LoginRequestSettled { result, .. }) => {
                self.settle_request(result, now)
            }

            (LoginState::Awaiting, LoginEvent::UserCancel { .. }) => self.finish(
                LoginOutcome::Cancelled {
                    by: CancelledBy::User,
                },
                now,
            ),

            (LoginState::Awaiting, LoginEvent::Superseded { .. }) => self.finish(
                LoginOutcome::Cancelled {
                    by: CancelledBy::Superseded,
                },
                now,
            ),

            (state, event) => {
                debug!(
                    attempt_id = %self.attempt_id,
                    state = ?state,
                    event = event.name(),
                    "Event has no effect in current state"
                );
                Vec::new()
            }
        }
    }

    fn begin(&mut self, now: DateTime<Utc>) -> Vec<LoginAction> {
        self.state = LoginState::Awaiting;
        self.started_at = Some(now);
        self.deadline = now.checked_add_signed(self.max_wait);

        let attempt_id = self.attempt_id.clone();
        match self.mode {
            LoginMode::Interactive => vec![
                LoginAction::SubscribeNotifications {
                    attempt_id: attempt_id.clone(),
                },
                LoginAction::StartPolling {
                    attempt_id: attempt_id.clone(),
                },
                LoginAction::SendLoginRequest { attempt_id },
            ],
            LoginMode::Token => vec![LoginAction::SendTokenExchange { attempt_id }],
        }
    }

    fn settle_request(&mut self, result: LoginRequestResult, now: DateTime<Utc>) -> Vec<LoginAction> {
        match (self.mode, result) {
            (_, LoginRequestResult::Completed) => self.finish(LoginOutcome::Confirmed, now),

            // The browser flow may still be running; the poller and the push
            // channel keep watching.
            (LoginMode::Interactive, LoginRequestResult::Pending) => Vec::new(),
            (LoginMode::Interactive, LoginRequestResult::TimedOut) => {
                info!(
                    attempt_id = %self.attempt_id,
                    "Login request timed out, still waiting for the browser flow"
                );
                Vec::new()
            }

            // Token exchange has no second channel to fall back on.
            (LoginMode::Token, LoginRequestResult::Pending) => self.finish(
                LoginOutcome::Failed {
                    message: Some("token exchange did not complete".to_string()),
                },
                now,
            ),
            (LoginMode::Token, LoginRequestResult::TimedOut) => self.finish(
                LoginOutcome::Failed {
                    message: Some("token exchange timed out".to_string()),
                },
                now,
            ),

            (_, LoginRequestResult::Cancelled) => self.finish(
                LoginOutcome::Cancelled {
                    by: CancelledBy::User,
                },
                now,
            ),
            (_, LoginRequestResult::Rejected(message))
            | (_, LoginRequestResult::Unreachable(message)) => self.finish(
                LoginOutcome::Failed {
                    message: Some(message),
                },
                now,
            ),
        }
    }

    /// Enter a terminal state. Teardown is always the first action.
    fn finish(&mut self, outcome: LoginOutcome, now: DateTime<Utc>) -> Vec<LoginAction> {
        if self.outcome.is_some() {
            return Vec::new();
        }

        self.state = outcome.state();
        self.finished_at = Some(now);
        self.outcome = Some(outcome.clone());

        let attempt_id = self.attempt_id.clone();
        let mut actions = vec![LoginAction::TeardownChannels {
            attempt_id: attempt_id.clone(),
        }];
        if outcome.is_confirmed() {
            actions.push(LoginAction::RunConfirmation {
                attempt_id: attempt_id.clone(),
            });
        }
        actions.push(LoginAction::EmitOutcome {
            attempt_id,
            outcome,
        });
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::login::event::PollSource;
    use chrono::TimeZone;

    const MAX_WAIT: Duration = Duration::from_secs(600);

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    fn at(secs: f64) -> DateTime<Utc> {
        t0() + chrono::Duration::milliseconds((secs * 1000.0) as i64)
    }

    fn started(mode: LoginMode) -> LoginSession {
        let mut session = LoginSession::new(AttemptId::new("attempt-1"), mode, MAX_WAIT);
        session.handle_event(
            LoginEvent::Start {
                attempt_id: session.attempt_id().clone(),
            },
            t0(),
        );
        session
    }

    fn poll(session: &LoginSession, status: PollStatus) -> LoginEvent {
        LoginEvent::PollResult {
            attempt_id: session.attempt_id().clone(),
            source: PollSource::Scheduled,
            status,
        }
    }

    fn count_confirmations(actions: &[LoginAction]) -> usize {
        actions
            .iter()
            .filter(|a| matches!(a, LoginAction::RunConfirmation { .. }))
            .count()
    }

    #[test]
    fn test_interactive_start_arms_both_channels() {
        let mut session = LoginSession::new(AttemptId::new("a"), LoginMode::Interactive, MAX_WAIT);
        let (state, actions) = session.handle_event(
            LoginEvent::Start {
                attempt_id: AttemptId::new("a"),
            },
            t0(),
        );

        assert_eq!(state, LoginState::Awaiting);
        assert_eq!(session.started_at(), Some(t0()));
        assert_eq!(session.deadline(), Some(at(600.0)));
        assert!(session.outcome().is_none());
        assert!(matches!(actions[0], LoginAction::SubscribeNotifications { .. }));
        assert!(matches!(actions[1], LoginAction::StartPolling { .. }));
        assert!(matches!(actions[2], LoginAction::SendLoginRequest { .. }));
    }

    #[test]
    fn test_token_start_sends_single_exchange() {
        let mut session = LoginSession::new(AttemptId::new("t"), LoginMode::Token, MAX_WAIT);
        let (_, actions) = session.handle_event(
            LoginEvent::Start {
                attempt_id: AttemptId::new("t"),
            },
            t0(),
        );
        assert_eq!(
            actions,
            vec![LoginAction::SendTokenExchange {
                attempt_id: AttemptId::new("t")
            }]
        );
    }

    #[test]
    fn test_push_success_confirms_once() {
        let mut session = started(LoginMode::Interactive);
        let id = session.attempt_id().clone();

        let (state, first) = session.handle_event(
            LoginEvent::PushSuccess {
                attempt_id: id.clone(),
            },
            at(5.0),
        );
        assert_eq!(state, LoginState::Confirmed);
        assert!(matches!(first[0], LoginAction::TeardownChannels { .. }));
        assert_eq!(count_confirmations(&first), 1);
        assert!(matches!(
            first.last(),
            Some(LoginAction::EmitOutcome {
                outcome: LoginOutcome::Confirmed,
                ..
            })
        ));

        let event = poll(&session, PollStatus::Authenticated);
        let (state, second) = session.handle_event(event, at(6.0));
        assert_eq!(state, LoginState::Confirmed);
        assert!(second.is_empty());
    }

    #[test]
    fn test_any_event_sequence_confirms_at_most_once() {
        let mut session = started(LoginMode::Interactive);
        let id = session.attempt_id().clone();
        let events = vec![
            poll(&session, PollStatus::NotYet),
            poll(&session, PollStatus::Error("boom".into())),
            poll(&session, PollStatus::Authenticated),
            LoginEvent::PushSuccess {
                attempt_id: id.clone(),
            },
            LoginEvent::LoginRequestSettled {
                attempt_id: id.clone(),
                result: LoginRequestResult::Completed,
            },
            LoginEvent::PushError {
                attempt_id: id.clone(),
                message: None,
            },
            LoginEvent::UserCancel {
                attempt_id: id.clone(),
            },
            poll(&session, PollStatus::Authenticated),
        ];

        let mut confirmations = 0;
        for (i, event) in events.into_iter().enumerate() {
            let (_, actions) = session.handle_event(event, at(i as f64));
            confirmations += count_confirmations(&actions);
        }

        assert_eq!(confirmations, 1);
        assert_eq!(session.outcome(), Some(&LoginOutcome::Confirmed));
    }

    #[test]
    fn test_stale_attempt_never_changes_state() {
        let mut session = started(LoginMode::Interactive);
        let stale = AttemptId::new("attempt-0");

        for event in [
            LoginEvent::PushSuccess {
                attempt_id: stale.clone(),
            },
            LoginEvent::PushError {
                attempt_id: stale.clone(),
                message: Some("late".into()),
            },
            LoginEvent::UserCancel {
                attempt_id: stale.clone(),
            },
            LoginEvent::PollResult {
                attempt_id: stale.clone(),
                source: PollSource::Manual,
                status: PollStatus::Authenticated,
            },
        ] {
            let (state, actions) = session.handle_event(event, at(3.0));
            assert_eq!(state, LoginState::Awaiting);
            assert!(actions.is_empty());
        }
        assert!(session.outcome().is_none());
    }

    #[test]
    fn test_not_yet_until_deadline_then_times_out() {
        let mut session = started(LoginMode::Interactive);

        let mut t = 2.0;
        while t <= 598.0 {
            let event = poll(&session, PollStatus::NotYet);
            let (state, actions) = session.handle_event(event, at(t));
            assert_eq!(state, LoginState::Awaiting);
            assert!(actions.is_empty());
            t += 2.0;
        }

        // Exactly at the deadline the attempt is still alive.
        let event = poll(&session, PollStatus::NotYet);
        assert_eq!(session.handle_event(event, at(600.0)).0, LoginState::Awaiting);

        let event = poll(&session, PollStatus::NotYet);
        let (state, actions) = session.handle_event(event, at(600.1));
        assert_eq!(state, LoginState::TimedOut);
        assert!(matches!(actions[0], LoginAction::TeardownChannels { .. }));
        assert_eq!(count_confirmations(&actions), 0);
        assert_eq!(session.outcome(), Some(&LoginOutcome::TimedOut));
    }

    #[test]
    fn test_deadline_wins_over_late_success() {
        let mut session = started(LoginMode::Interactive);
        let event = poll(&session, PollStatus::Authenticated);
        let (state, _) = session.handle_event(event, at(601.0));
        assert_eq!(state, LoginState::TimedOut);
    }

    #[test]
    fn test_deadline_check_without_status() {
        let mut session = started(LoginMode::Interactive);
        let id = session.attempt_id().clone();

        let (state, actions) = session.handle_event(
            LoginEvent::DeadlineCheck {
                attempt_id: id.clone(),
            },
            at(10.0),
        );
        assert_eq!(state, LoginState::Awaiting);
        assert!(actions.is_empty());

        let (state, _) =
            session.handle_event(LoginEvent::DeadlineCheck { attempt_id: id }, at(700.0));
        assert_eq!(state, LoginState::TimedOut);
    }

    #[test]
    fn test_foreign_attempt_is_reported_as_superseded() {
        let session = started(LoginMode::Interactive);
        let stale = LoginEvent::PushSuccess {
            attempt_id: AttemptId::new("attempt-0"),
        };
        let current = LoginEvent::PushSuccess {
            attempt_id: session.attempt_id().clone(),
        };

        assert_eq!(session.ensure_current(&stale), Err(LoginError::Superseded));
        assert_eq!(session.ensure_current(&current), Ok(()));
    }

    #[test]
    fn test_transient_poll_error_keeps_waiting() {
        let mut session = started(LoginMode::Interactive);
        let event = poll(&session, PollStatus::Error("connection reset".into()));
        let (state, actions) = session.handle_event(event, at(2.0));

        assert_eq!(state, LoginState::Awaiting);
        assert_eq!(
            actions,
            vec![LoginAction::RecordTransientError {
                attempt_id: session.attempt_id().clone(),
                error: LoginError::TransientPoll("connection reset".into()),
            }]
        );
    }

    #[test]
    fn test_push_error_fails_with_message() {
        let mut session = started(LoginMode::Interactive);
        let id = session.attempt_id().clone();
        let (state, _) = session.handle_event(
            LoginEvent::PushError {
                attempt_id: id,
                message: Some("browser closed".into()),
            },
            at(1.0),
        );
        assert_eq!(state, LoginState::Failed);
        assert_eq!(
            session.outcome(),
            Some(&LoginOutcome::Failed {
                message: Some("browser closed".into())
            })
        );
    }

    #[test]
    fn test_interactive_request_timeout_is_not_failure() {
        let mut session = started(LoginMode::Interactive);
        let id = session.attempt_id().clone();

        for result in [LoginRequestResult::Pending, LoginRequestResult::TimedOut] {
            let (state, actions) = session.handle_event(
                LoginEvent::LoginRequestSettled {
                    attempt_id: id.clone(),
                    result,
                },
                at(30.0),
            );
            assert_eq!(state, LoginState::Awaiting);
            assert!(actions.is_empty());
        }

        let event = poll(&session, PollStatus::Authenticated);
        assert_eq!(session.handle_event(event, at(32.0)).0, LoginState::Confirmed);
    }

    #[test]
    fn test_token_request_timeout_fails() {
        let mut session = started(LoginMode::Token);
        let id = session.attempt_id().clone();
        let (state, _) = session.handle_event(
            LoginEvent::LoginRequestSettled {
                attempt_id: id,
                result: LoginRequestResult::TimedOut,
            },
            at(30.0),
        );
        assert_eq!(state, LoginState::Failed);
    }

    #[test]
    fn test_request_settlement_outcomes() {
        let cases = [
            (LoginRequestResult::Completed, LoginState::Confirmed),
            (LoginRequestResult::Cancelled, LoginState::Cancelled),
            (LoginRequestResult::Rejected("bad token".into()), LoginState::Failed),
            (LoginRequestResult::Unreachable("refused".into()), LoginState::Failed),
        ];
        for mode in [LoginMode::Interactive, LoginMode::Token] {
            for (result, expected) in cases.clone() {
                let mut session = started(mode);
                let id = session.attempt_id().clone();
                let (state, _) = session.handle_event(
                    LoginEvent::LoginRequestSettled {
                        attempt_id: id,
                        result,
                    },
                    at(1.0),
                );
                assert_eq!(state, expected, "mode {mode:?}");
            }
        }
    }

    #[test]
    fn test_cancel_and_supersede() {
        let mut session = started(LoginMode::Interactive);
        let id = session.attempt_id().clone();
        let (state, actions) =
            session.handle_event(LoginEvent::UserCancel { attempt_id: id }, at(1.0));
        assert_eq!(state, LoginState::Cancelled);
        assert!(matches!(actions[0], LoginAction::TeardownChannels { .. }));

        let mut session = started(LoginMode::Interactive);
        let id = session.attempt_id().clone();
        session.handle_event(LoginEvent::Superseded { attempt_id: id }, at(1.0));
        assert_eq!(
            session.outcome(),
            Some(&LoginOutcome::Cancelled {
                by: CancelledBy::Superseded
            })
        );
    }

    #[test]
    fn test_terminal_states_never_reenter_awaiting() {
        let mut session = started(LoginMode::Interactive);
        let id = session.attempt_id().clone();
        session.handle_event(
            LoginEvent::UserCancel {
                attempt_id: id.clone(),
            },
            at(1.0),
        );

        let (state, actions) =
            session.handle_event(LoginEvent::Start { attempt_id: id }, at(2.0));
        assert_eq!(state, LoginState::Cancelled);
        assert!(actions.is_empty());
    }

    #[test]
    fn test_idle_ignores_everything_but_start() {
        let mut session = LoginSession::new(AttemptId::new("a"), LoginMode::Interactive, MAX_WAIT);
        let (state, actions) = session.handle_event(
            LoginEvent::PushSuccess {
                attempt_id: AttemptId::new("a"),
            },
            t0(),
        );
        assert_eq!(state, LoginState::Idle);
        assert!(actions.is_empty());
    }

    #[test]
    fn test_snapshot_reflects_outcome() {
        let mut session = started(LoginMode::Interactive);
        let id = session.attempt_id().clone();
        session.handle_event(LoginEvent::PushSuccess { attempt_id: id }, at(5.0));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, LoginState::Confirmed);
        assert_eq!(snapshot.started_at, Some(t0()));
        assert_eq!(snapshot.finished_at, Some(at(5.0)));
        assert_eq!(snapshot.outcome, Some(LoginOutcome::Confirmed));
    }
}
