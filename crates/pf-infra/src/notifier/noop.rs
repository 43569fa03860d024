use pf_core::ports::{ErrorListener, LoginNotifierPort, SuccessListener, Subscription};

/// Notifier for a plain browser context with no companion process.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLoginNotifier;

impl LoginNotifierPort for NoopLoginNotifier {
    fn is_available(&self) -> bool {
        false
    }

    fn subscribe(&self, _on_success: SuccessListener, _on_error: ErrorListener) -> Subscription {
        Subscription::noop()
    }
}
