use std::time::Duration;

use pf_core::settings::LoginSettings;

/// Poll faster than this and the status endpoint becomes the bottleneck.
const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Upper bound on the overall wait, so every attempt has a deadline.
const MAX_WAIT_SECS: u64 = 24 * 60 * 60;

/// 登录流程运行时配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginConfig {
    pub poll_interval: Duration,
    /// Overall wait bound per attempt.
    pub max_wait: Duration,
    pub login_request_timeout: Duration,
    pub status_request_timeout: Duration,
    pub cache_invalidate_timeout: Duration,
    pub confirm_settle: Duration,
    pub verify_after_confirm: bool,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self::from_settings(&LoginSettings::default())
    }
}

impl LoginConfig {
    pub fn from_settings(settings: &LoginSettings) -> Self {
        Self {
            poll_interval: Duration::from_millis(
                settings.poll_interval_ms.max(MIN_POLL_INTERVAL_MS),
            ),
            max_wait: Duration::from_secs(settings.max_wait_secs.clamp(1, MAX_WAIT_SECS)),
            login_request_timeout: Duration::from_millis(settings.login_request_timeout_ms.max(1)),
            status_request_timeout: Duration::from_millis(
                settings.status_request_timeout_ms.max(1),
            ),
            cache_invalidate_timeout: Duration::from_millis(
                settings.cache_invalidate_timeout_ms.max(1),
            ),
            confirm_settle: Duration::from_millis(settings.confirm_settle_ms),
            verify_after_confirm: settings.verify_after_confirm,
        }
    }
}
