use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use pf_core::login::{AuthBackendError, PollStatus};
use pf_core::ports::AuthBackendPort;
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

/// One status check with a transport timeout.
pub async fn poll_once(backend: &dyn AuthBackendPort, request_timeout: Duration) -> PollStatus {
    match tokio::time::timeout(request_timeout, backend.get_status()).await {
        Ok(Ok(status)) if status.is_authenticated() => PollStatus::Authenticated,
        Ok(Ok(_)) => PollStatus::NotYet,
        Ok(Err(err)) => PollStatus::Error(err.to_string()),
        Err(_) => PollStatus::Error(AuthBackendError::Timeout.to_string()),
    }
}

/// Periodic status checker.
///
/// The first check runs one `interval` after `start`. Checks never overlap: a
/// slow check pushes the next tick back instead of stacking requests. After
/// `stop` returns, `on_status` is never invoked again, even for a check that
/// was already in flight.
///
/// 定时状态轮询器，stop 之后不会再回调。
pub struct StatusPoller {
    /// `true` while results may still be delivered.
    open: Arc<Mutex<bool>>,
    task: Option<AbortHandle>,
}

impl StatusPoller {
    pub fn start<F>(
        backend: Arc<dyn AuthBackendPort>,
        interval: Duration,
        request_timeout: Duration,
        on_status: F,
    ) -> Self
    where
        F: Fn(PollStatus) + Send + Sync + 'static,
    {
        let open = Arc::new(Mutex::new(true));
        let task_open = Arc::clone(&open);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let status = poll_once(backend.as_ref(), request_timeout).await;

                let delivered = {
                    let open = task_open.lock().unwrap_or_else(PoisonError::into_inner);
                    if *open {
                        on_status(status);
                    }
                    *open
                };
                if !delivered {
                    break;
                }
            }
        });

        debug!(interval_ms = interval.as_millis() as u64, "Status poller started");
        Self {
            open,
            task: Some(handle.abort_handle()),
        }
    }

    /// Cancel pending and future ticks. Idempotent.
    pub fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        *self.open.lock().unwrap_or_else(PoisonError::into_inner) = false;
        task.abort();
        debug!("Status poller stopped");
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
