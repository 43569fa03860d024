use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use pf_core::ports::{CacheInvalidationError, CacheTopic, SessionCachePort};
use tokio::sync::broadcast;
use tracing::debug;

/// Generation-counting cache invalidation sink.
///
/// Each invalidation bumps the topic's generation and is broadcast, so query
/// layers can subscribe and refetch.
pub struct InMemorySessionCache {
    generations: Mutex<HashMap<CacheTopic, u64>>,
    invalidations: broadcast::Sender<CacheTopic>,
}

impl InMemorySessionCache {
    pub fn new() -> Self {
        let (invalidations, _) = broadcast::channel(32);
        Self {
            generations: Mutex::new(HashMap::new()),
            invalidations,
        }
    }

    /// Number of invalidations seen for `topic`.
    pub fn generation(&self, topic: CacheTopic) -> u64 {
        self.generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&topic)
            .copied()
            .unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheTopic> {
        self.invalidations.subscribe()
    }
}

impl Default for InMemorySessionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionCachePort for InMemorySessionCache {
    async fn invalidate(&self, topic: CacheTopic) -> Result<(), CacheInvalidationError> {
        let generation = {
            let mut generations = self
                .generations
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let generation = generations.entry(topic).or_insert(0);
            *generation += 1;
            *generation
        };

        // No subscribers is fine; the generation still moved.
        let _ = self.invalidations.send(topic);
        debug!(topic = %topic, generation, "Cache topic invalidated");
        Ok(())
    }
}
