use std::sync::{Arc, Weak};

use pf_core::ids::AttemptId;
use pf_core::login::{
    validate_token, AuthBackendError, InteractiveLoginOptions, LoginAction, LoginError,
    LoginEvent, LoginMode, LoginOutcome, LoginRequestResult, LoginSession, LoginSnapshot,
    PollSource, PollStatus,
};
use pf_core::ports::{
    AuthBackendPort, ClockPort, LoginAcceptance, LoginNotifierPort, SessionCachePort, Subscription,
};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::AbortHandle;
use tracing::{debug, info, info_span, warn, Instrument};

use super::bridge::NotificationBridge;
use super::config::LoginConfig;
use super::confirmer::SessionConfirmer;
use super::events::{LoginDomainEvent, LoginEventPort};
use super::handle::LoginHandle;
use super::poller::{poll_once, StatusPoller};

/// 登录协调器
///
/// Facade the login page talks to. Owns the single current-attempt slot and
/// executes the actions the session's transition function returns.
///
/// Channel callbacks (poll ticks, host pushes, login request results) are
/// queued and dispatched one at a time; user calls dispatch directly. Both
/// paths go through the same lock, so transitions are strictly serialized.
/// Channel teardown always runs before the lock is released.
///
/// Must be created inside a Tokio runtime.
#[derive(Clone)]
pub struct LoginCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: LoginConfig,
    backend: Arc<dyn AuthBackendPort>,
    clock: Arc<dyn ClockPort>,
    bridge: NotificationBridge,
    confirmer: SessionConfirmer,
    /// The dispatch lock.
    current: Mutex<Option<ActiveAttempt>>,
    signal_tx: mpsc::UnboundedSender<LoginEvent>,
    event_senders: Mutex<Vec<mpsc::Sender<LoginDomainEvent>>>,
}

enum AttemptInput {
    Interactive(InteractiveLoginOptions),
    Token(String),
}

/// A session plus the channel handles it owns.
struct ActiveAttempt {
    session: LoginSession,
    input: AttemptInput,
    poller: Option<StatusPoller>,
    subscription: Subscription,
    request: Option<AbortHandle>,
    outcome_tx: Arc<watch::Sender<Option<LoginOutcome>>>,
}

impl ActiveAttempt {
    fn new(
        session: LoginSession,
        input: AttemptInput,
        outcome_tx: watch::Sender<Option<LoginOutcome>>,
    ) -> Self {
        Self {
            session,
            input,
            poller: None,
            subscription: Subscription::noop(),
            request: None,
            outcome_tx: Arc::new(outcome_tx),
        }
    }

    /// Stop the poller, detach host listeners, drop any in-flight request.
    fn teardown(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
        }
        self.subscription.dispose();
        if let Some(request) = self.request.take() {
            request.abort();
        }
    }
}

impl Drop for ActiveAttempt {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Work that runs after the dispatch lock is released.
enum Deferred {
    Confirm {
        attempt_id: AttemptId,
    },
    Publish {
        attempt_id: AttemptId,
        outcome: LoginOutcome,
        outcome_tx: Arc<watch::Sender<Option<LoginOutcome>>>,
    },
    Emit(LoginDomainEvent),
}

impl LoginCoordinator {
    pub fn new(
        config: LoginConfig,
        backend: Arc<dyn AuthBackendPort>,
        notifier: Arc<dyn LoginNotifierPort>,
        cache: Arc<dyn SessionCachePort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let confirmer = SessionConfirmer::new(cache, Arc::clone(&backend), &config);

        let inner = Arc::new(CoordinatorInner {
            config,
            backend,
            clock,
            bridge: NotificationBridge::new(notifier),
            confirmer,
            current: Mutex::new(None),
            signal_tx,
            event_senders: Mutex::new(Vec::new()),
        });

        tokio::spawn(Self::run_signal_loop(Arc::downgrade(&inner), signal_rx));
        Self { inner }
    }

    async fn run_signal_loop(
        inner: Weak<CoordinatorInner>,
        mut signal_rx: mpsc::UnboundedReceiver<LoginEvent>,
    ) {
        while let Some(event) = signal_rx.recv().await {
            let Some(inner) = inner.upgrade() else {
                break;
            };
            inner.dispatch(event).await;
        }
        debug!("Login signal loop stopped");
    }

    /// Supersede any current attempt and start an interactive login.
    pub async fn start_interactive(&self, options: InteractiveLoginOptions) -> LoginHandle {
        self.inner
            .begin(LoginMode::Interactive, AttemptInput::Interactive(options))
            .await
    }

    /// Supersede any current attempt and exchange `token`.
    ///
    /// An invalid token fails here, before any request and without touching
    /// the current attempt.
    pub async fn start_with_token(&self, token: &str) -> Result<LoginHandle, LoginError> {
        let token = validate_token(token).inspect_err(|err| {
            warn!(error = %err, "Rejected token before login");
        })?;
        Ok(self
            .inner
            .begin(LoginMode::Token, AttemptInput::Token(token))
            .await)
    }

    /// One status check outside the poll cadence. No-op unless an attempt
    /// is awaiting.
    pub async fn check_now(&self) {
        let span = info_span!("login.check_now");
        async {
            let Some(attempt_id) = self.inner.awaiting_attempt().await else {
                debug!("No login attempt awaiting, manual check skipped");
                return;
            };

            // Expired attempts end here without another request.
            self.inner
                .dispatch(LoginEvent::DeadlineCheck {
                    attempt_id: attempt_id.clone(),
                })
                .await;
            if self.inner.awaiting_attempt().await.as_ref() != Some(&attempt_id) {
                return;
            }

            let status = poll_once(
                self.inner.backend.as_ref(),
                self.inner.config.status_request_timeout,
            )
            .await;
            debug!(attempt_id = %attempt_id, ?status, "Manual status check finished");
            self.inner
                .dispatch(LoginEvent::PollResult {
                    attempt_id,
                    source: PollSource::Manual,
                    status,
                })
                .await;
        }
        .instrument(span)
        .await
    }

    /// Cancel the current attempt. No-op if none is awaiting.
    pub async fn cancel(&self) {
        let span = info_span!("login.cancel");
        async {
            let deferred = {
                let mut current = self.inner.current.lock().await;
                let Some(attempt) = current.as_mut() else {
                    debug!("No login attempt to cancel");
                    return;
                };
                let attempt_id = attempt.session.attempt_id().clone();
                let (_, actions) = attempt
                    .session
                    .handle_event(LoginEvent::UserCancel { attempt_id }, self.inner.clock.now());
                self.inner.apply_actions(attempt, actions)
            };
            self.inner.run_deferred(deferred).await;
        }
        .instrument(span)
        .await
    }

    /// Current (or most recent) attempt.
    pub async fn snapshot(&self) -> Option<LoginSnapshot> {
        self.inner
            .current
            .lock()
            .await
            .as_ref()
            .map(|attempt| attempt.session.snapshot())
    }

    /// Whether a valid session already exists, so the login page can be
    /// skipped. Check failures count as "no".
    pub async fn already_authenticated(&self) -> bool {
        match poll_once(
            self.inner.backend.as_ref(),
            self.inner.config.status_request_timeout,
        )
        .await
        {
            PollStatus::Authenticated => true,
            PollStatus::NotYet => false,
            PollStatus::Error(message) => {
                warn!(error = %message, "Auth status check failed");
                false
            }
        }
    }

    pub fn config(&self) -> &LoginConfig {
        &self.inner.config
    }
}

impl CoordinatorInner {
    async fn begin(self: &Arc<Self>, mode: LoginMode, input: AttemptInput) -> LoginHandle {
        let attempt_id = AttemptId::generate();
        let span = info_span!("login.start", attempt_id = %attempt_id, mode = ?mode);
        async {
            let (outcome_tx, outcome_rx) = watch::channel(None);
            let mut deferred = Vec::new();
            {
                let mut current = self.current.lock().await;
                let now = self.clock.now();

                // The old attempt is fully torn down before anything new is armed.
                if let Some(previous) = current.as_mut() {
                    let previous_id = previous.session.attempt_id().clone();
                    let (_, actions) = previous.session.handle_event(
                        LoginEvent::Superseded {
                            attempt_id: previous_id,
                        },
                        now,
                    );
                    deferred.extend(self.apply_actions(previous, actions));
                    previous.teardown();
                }

                let session = LoginSession::new(attempt_id.clone(), mode, self.config.max_wait);
                let mut attempt = ActiveAttempt::new(session, input, outcome_tx);
                deferred.push(Deferred::Emit(LoginDomainEvent::AttemptStarted {
                    attempt_id: attempt_id.clone(),
                    mode,
                }));

                let (_, actions) = attempt.session.handle_event(
                    LoginEvent::Start {
                        attempt_id: attempt_id.clone(),
                    },
                    now,
                );
                deferred.extend(self.apply_actions(&mut attempt, actions));
                *current = Some(attempt);
            }

            info!("Login attempt started");
            self.run_deferred(deferred).await;
            LoginHandle::new(attempt_id.clone(), mode, outcome_rx)
        }
        .instrument(span)
        .await
    }

    async fn awaiting_attempt(&self) -> Option<AttemptId> {
        self.current
            .lock()
            .await
            .as_ref()
            .filter(|attempt| attempt.session.is_awaiting())
            .map(|attempt| attempt.session.attempt_id().clone())
    }

    async fn dispatch(self: &Arc<Self>, event: LoginEvent) {
        let deferred = {
            let mut current = self.current.lock().await;
            let Some(attempt) = current.as_mut() else {
                debug!(event = event.name(), "No login attempt, dropping signal");
                return;
            };
            let (_, actions) = attempt.session.handle_event(event, self.clock.now());
            self.apply_actions(attempt, actions)
        };
        self.run_deferred(deferred).await;
    }

    /// Execute the synchronous part of `actions` under the dispatch lock.
    fn apply_actions(&self, attempt: &mut ActiveAttempt, actions: Vec<LoginAction>) -> Vec<Deferred> {
        let mut deferred = Vec::new();

        for action in actions {
            match action {
                LoginAction::SubscribeNotifications { attempt_id } => {
                    attempt.subscription = self.bridge.attach(attempt_id, self.signal_tx.clone());
                }
                LoginAction::StartPolling { attempt_id } => {
                    let signals = self.signal_tx.clone();
                    attempt.poller = Some(StatusPoller::start(
                        Arc::clone(&self.backend),
                        self.config.poll_interval,
                        self.config.status_request_timeout,
                        move |status| {
                            let _ = signals.send(LoginEvent::PollResult {
                                attempt_id: attempt_id.clone(),
                                source: PollSource::Scheduled,
                                status,
                            });
                        },
                    ));
                }
                LoginAction::SendLoginRequest { attempt_id } => {
                    if let AttemptInput::Interactive(options) = &attempt.input {
                        attempt.request = Some(self.spawn_login_request(attempt_id, options.clone()));
                    }
                }
                LoginAction::SendTokenExchange { attempt_id } => {
                    if let AttemptInput::Token(token) = &mut attempt.input {
                        let token = std::mem::take(token);
                        attempt.request = Some(self.spawn_token_exchange(attempt_id, token));
                    }
                }
                LoginAction::TeardownChannels { attempt_id } => {
                    attempt.teardown();
                    debug!(attempt_id = %attempt_id, "Login channels torn down");
                }
                LoginAction::RunConfirmation { attempt_id } => {
                    deferred.push(Deferred::Confirm { attempt_id });
                }
                LoginAction::EmitOutcome {
                    attempt_id,
                    outcome,
                } => {
                    deferred.push(Deferred::Publish {
                        attempt_id,
                        outcome,
                        outcome_tx: Arc::clone(&attempt.outcome_tx),
                    });
                }
                LoginAction::RecordTransientError { attempt_id, error } => {
                    warn!(attempt_id = %attempt_id, error = %error, "Still waiting");
                    deferred.push(Deferred::Emit(LoginDomainEvent::StatusCheckFailed {
                        attempt_id,
                        error,
                    }));
                }
            }
        }

        deferred
    }

    fn spawn_login_request(
        &self,
        attempt_id: AttemptId,
        options: InteractiveLoginOptions,
    ) -> AbortHandle {
        let backend = Arc::clone(&self.backend);
        let signals = self.signal_tx.clone();
        let timeout = self.config.login_request_timeout;
        let span = info_span!("login.request", attempt_id = %attempt_id);

        let handle = tokio::spawn(
            async move {
                let result = match tokio::time::timeout(timeout, backend.login(&options)).await {
                    Ok(Ok(LoginAcceptance::Launched)) => LoginRequestResult::Pending,
                    Ok(Ok(LoginAcceptance::Completed)) => LoginRequestResult::Completed,
                    Ok(Ok(LoginAcceptance::Cancelled)) => LoginRequestResult::Cancelled,
                    Ok(Err(err)) => request_failure(err),
                    Err(_) => LoginRequestResult::TimedOut,
                };
                debug!(?result, "Login request settled");
                let _ = signals.send(LoginEvent::LoginRequestSettled { attempt_id, result });
            }
            .instrument(span),
        );
        handle.abort_handle()
    }

    fn spawn_token_exchange(&self, attempt_id: AttemptId, token: String) -> AbortHandle {
        let backend = Arc::clone(&self.backend);
        let signals = self.signal_tx.clone();
        let timeout = self.config.login_request_timeout;
        let span = info_span!("login.token_exchange", attempt_id = %attempt_id);

        let handle = tokio::spawn(
            async move {
                let result = match tokio::time::timeout(timeout, backend.login_with_token(&token)).await {
                    Ok(Ok(())) => LoginRequestResult::Completed,
                    Ok(Err(err)) => request_failure(err),
                    Err(_) => LoginRequestResult::TimedOut,
                };
                debug!(?result, "Token exchange settled");
                let _ = signals.send(LoginEvent::LoginRequestSettled { attempt_id, result });
            }
            .instrument(span),
        );
        handle.abort_handle()
    }

    /// Publish outcomes and events, then start confirmation side effects.
    ///
    /// Confirmation runs on its own task: a slow cache never delays the
    /// outcome or the signals of the next attempt.
    async fn run_deferred(self: &Arc<Self>, deferred: Vec<Deferred>) {
        let mut confirmations = Vec::new();
        for item in deferred {
            match item {
                Deferred::Confirm { attempt_id } => confirmations.push(attempt_id),
                Deferred::Publish {
                    attempt_id,
                    outcome,
                    outcome_tx,
                } => {
                    match &outcome {
                        LoginOutcome::Confirmed => {
                            info!(attempt_id = %attempt_id, "Login confirmed")
                        }
                        LoginOutcome::Failed { message } => {
                            warn!(attempt_id = %attempt_id, error = ?message, "Login failed")
                        }
                        LoginOutcome::TimedOut => {
                            warn!(attempt_id = %attempt_id, "Login timed out")
                        }
                        LoginOutcome::Cancelled { by } => {
                            info!(attempt_id = %attempt_id, by = ?by, "Login cancelled")
                        }
                    }
                    outcome_tx.send_replace(Some(outcome.clone()));
                    self.emit(LoginDomainEvent::Finished {
                        attempt_id,
                        outcome,
                    })
                    .await;
                }
                Deferred::Emit(event) => self.emit(event).await,
            }
        }

        for attempt_id in confirmations {
            self.spawn_confirmation(attempt_id);
        }
    }

    fn spawn_confirmation(self: &Arc<Self>, attempt_id: AttemptId) {
        let inner = Arc::clone(self);
        let span = info_span!("login.confirm", attempt_id = %attempt_id);
        tokio::spawn(
            async move {
                let report = inner.confirmer.confirm(&attempt_id).await;
                if !report.is_clean() {
                    warn!(failed = report.failed.len(), "Login confirmed with stale caches");
                }
                inner
                    .emit(LoginDomainEvent::Confirmed { attempt_id, report })
                    .await;
            }
            .instrument(span),
        );
    }

    async fn emit(&self, event: LoginDomainEvent) {
        let mut senders = self.event_senders.lock().await;
        senders.retain(|sender| match sender.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Login event receiver is lagging, event dropped");
                true
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Login event receiver dropped");
                false
            }
        });
    }
}

fn request_failure(err: AuthBackendError) -> LoginRequestResult {
    match err {
        AuthBackendError::Timeout => LoginRequestResult::TimedOut,
        AuthBackendError::Rejected(message) => LoginRequestResult::Rejected(message),
        AuthBackendError::Transport(message) => LoginRequestResult::Unreachable(message),
    }
}

#[async_trait::async_trait]
impl LoginEventPort for LoginCoordinator {
    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<LoginDomainEvent>> {
        let (event_tx, event_rx) = mpsc::channel(100);
        let mut senders = self.inner.event_senders.lock().await;
        senders.push(event_tx);
        Ok(event_rx)
    }
}
