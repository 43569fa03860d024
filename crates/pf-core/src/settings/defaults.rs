use super::model::LoginSettings;

impl Default for LoginSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2_000,
            max_wait_secs: 600, // 10 minutes
            login_request_timeout_ms: 30_000,
            status_request_timeout_ms: 10_000,
            cache_invalidate_timeout_ms: 5_000,
            confirm_settle_ms: 1_000,
            verify_after_confirm: true,
        }
    }
}
