use serde::{Deserialize, Serialize};

/// Tunables of the login flow, as stored in the `[login]` table.
///
/// Missing keys fall back to [`LoginSettings::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginSettings {
    /// Interval between scheduled status checks.
    pub poll_interval_ms: u64,
    /// Overall wait bound for one attempt.
    pub max_wait_secs: u64,
    /// Transport timeout of the login request itself.
    pub login_request_timeout_ms: u64,
    /// Transport timeout of a single status check.
    pub status_request_timeout_ms: u64,
    /// Per-topic bound on cache invalidation after confirming.
    pub cache_invalidate_timeout_ms: u64,
    /// Delay before the post-confirmation status verification.
    pub confirm_settle_ms: u64,
    /// Run one verification status check after confirming.
    pub verify_after_confirm: bool,
}
