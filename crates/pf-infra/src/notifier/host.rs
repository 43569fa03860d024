use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use pf_core::ports::{ErrorListener, LoginNotifierPort, SuccessListener, Subscription};
use tracing::debug;

type Registry = Mutex<HashMap<u64, (SuccessListener, ErrorListener)>>;

/// In-process host notification channel.
///
/// Listeners are invoked outside the registry lock, so a listener may dispose
/// its own subscription.
pub struct HostLoginNotifier {
    listeners: Arc<Registry>,
    next_id: AtomicU64,
}

impl HostLoginNotifier {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Notify every listener that the browser login succeeded. Returns the
    /// number of listeners notified.
    pub fn publish_success(&self) -> usize {
        let listeners = self.snapshot();
        for (on_success, _) in &listeners {
            on_success();
        }
        debug!(listeners = listeners.len(), "Published login success");
        listeners.len()
    }

    /// Notify every listener that the browser login failed.
    pub fn publish_error(&self, message: Option<String>) -> usize {
        let listeners = self.snapshot();
        for (_, on_error) in &listeners {
            on_error(message.clone());
        }
        debug!(listeners = listeners.len(), error = ?message, "Published login error");
        listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    fn snapshot(&self) -> Vec<(SuccessListener, ErrorListener)> {
        lock(&self.listeners).values().cloned().collect()
    }
}

impl Default for HostLoginNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginNotifierPort for HostLoginNotifier {
    fn is_available(&self) -> bool {
        true
    }

    fn subscribe(&self, on_success: SuccessListener, on_error: ErrorListener) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.listeners).insert(id, (on_success, on_error));
        debug!(listener_id = id, "Login listeners attached");

        let registry: Weak<Registry> = Arc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                lock(&registry).remove(&id);
                debug!(listener_id = id, "Login listeners detached");
            }
        })
    }
}

fn lock(registry: &Registry) -> MutexGuard<'_, HashMap<u64, (SuccessListener, ErrorListener)>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}
