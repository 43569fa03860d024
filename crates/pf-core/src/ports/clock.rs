use chrono::{DateTime, Utc};

/// Wall clock used for deadline checks.
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
