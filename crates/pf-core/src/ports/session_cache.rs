use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cached query groups that depend on the authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheTopic {
    /// Auth status query.
    Auth,
    /// Loaded configuration.
    Config,
    /// Summary statistics.
    Stats,
}

impl CacheTopic {
    pub const ALL: [CacheTopic; 3] = [CacheTopic::Auth, CacheTopic::Config, CacheTopic::Stats];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheTopic::Auth => "auth",
            CacheTopic::Config => "config",
            CacheTopic::Stats => "stats",
        }
    }
}

impl fmt::Display for CacheTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheInvalidationError {
    #[error("cache is unavailable: {0}")]
    Unavailable(String),

    #[error("failed to invalidate {topic}: {reason}")]
    Failed { topic: CacheTopic, reason: String },
}

/// Downstream cache invalidation sink.
#[async_trait]
pub trait SessionCachePort: Send + Sync {
    async fn invalidate(&self, topic: CacheTopic) -> Result<(), CacheInvalidationError>;
}
