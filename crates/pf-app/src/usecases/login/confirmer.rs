use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use pf_core::ids::AttemptId;
use pf_core::login::PollStatus;
use pf_core::ports::{AuthBackendPort, CacheTopic, SessionCachePort};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::config::LoginConfig;
use super::poller::poll_once;

/// What the confirmation side effects achieved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfirmationReport {
    pub invalidated: Vec<CacheTopic>,
    /// Topics whose invalidation failed, with the reason.
    pub failed: Vec<(CacheTopic, String)>,
    /// Result of the post-confirmation status check. `None` when it was
    /// skipped or could not be completed.
    pub verified: Option<bool>,
}

impl ConfirmationReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// One-time side effects of a confirmed login.
#[derive(Clone)]
pub struct SessionConfirmer {
    cache: Arc<dyn SessionCachePort>,
    backend: Arc<dyn AuthBackendPort>,
    invalidate_timeout: Duration,
    settle: Duration,
    verify_enabled: bool,
    status_request_timeout: Duration,
}

impl SessionConfirmer {
    pub fn new(
        cache: Arc<dyn SessionCachePort>,
        backend: Arc<dyn AuthBackendPort>,
        config: &LoginConfig,
    ) -> Self {
        Self {
            cache,
            backend,
            invalidate_timeout: config.cache_invalidate_timeout,
            settle: config.confirm_settle,
            verify_enabled: config.verify_after_confirm,
            status_request_timeout: config.status_request_timeout,
        }
    }

    /// Invalidate every session-dependent cache topic.
    ///
    /// Topics are invalidated independently, each bounded by the
    /// invalidation timeout. A failure is logged and never retried.
    pub async fn invalidate(&self, attempt_id: &AttemptId) -> ConfirmationReport {
        let timeout = self.invalidate_timeout;
        let results = join_all(CacheTopic::ALL.into_iter().map(|topic| {
            let cache = Arc::clone(&self.cache);
            async move {
                let result = match tokio::time::timeout(timeout, cache.invalidate(topic)).await {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(err)) => Err(err.to_string()),
                    Err(_) => Err(format!("timed out after {}ms", timeout.as_millis())),
                };
                (topic, result)
            }
        }))
        .await;

        let mut report = ConfirmationReport::default();
        for (topic, result) in results {
            match result {
                Ok(()) => report.invalidated.push(topic),
                Err(reason) => {
                    warn!(attempt_id = %attempt_id, topic = %topic, error = %reason, "Cache invalidation failed");
                    report.failed.push((topic, reason));
                }
            }
        }

        info!(
            attempt_id = %attempt_id,
            invalidated = report.invalidated.len(),
            failed = report.failed.len(),
            "Session caches invalidated"
        );
        report
    }

    /// Wait for the backend to settle, then check the session once.
    pub async fn verify(
        &self,
        attempt_id: &AttemptId,
        mut report: ConfirmationReport,
    ) -> ConfirmationReport {
        if !self.verify_enabled {
            return report;
        }

        tokio::time::sleep(self.settle).await;
        report.verified = match poll_once(self.backend.as_ref(), self.status_request_timeout).await {
            PollStatus::Authenticated => {
                debug!(attempt_id = %attempt_id, "Post-login status verified");
                Some(true)
            }
            PollStatus::NotYet => {
                warn!(attempt_id = %attempt_id, "Login confirmed but status still reports unauthenticated");
                Some(false)
            }
            PollStatus::Error(message) => {
                warn!(attempt_id = %attempt_id, error = %message, "Post-login status check failed");
                None
            }
        };
        report
    }

    /// Invalidate then verify.
    pub async fn confirm(&self, attempt_id: &AttemptId) -> ConfirmationReport {
        let report = self.invalidate(attempt_id).await;
        self.verify(attempt_id, report).await
    }
}
