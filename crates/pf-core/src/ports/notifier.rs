use std::fmt;
use std::sync::Arc;

pub type SuccessListener = Arc<dyn Fn() + Send + Sync>;
pub type ErrorListener = Arc<dyn Fn(Option<String>) + Send + Sync>;

/// Host-pushed login completion channel.
pub trait LoginNotifierPort: Send + Sync {
    /// `false` when no companion process is present.
    fn is_available(&self) -> bool;

    /// Register both listeners. The returned subscription detaches them.
    fn subscribe(&self, on_success: SuccessListener, on_error: ErrorListener) -> Subscription;
}

/// Disposer for a notifier subscription.
///
/// Disposing is idempotent; dropping an active subscription disposes it.
///
/// 订阅句柄，释放操作幂等，Drop 时自动释放。
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(dispose: impl FnOnce() + Send + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    /// A subscription that has nothing to detach.
    pub fn noop() -> Self {
        Self { dispose: None }
    }

    pub fn is_active(&self) -> bool {
        self.dispose.is_some()
    }

    pub fn dispose(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
