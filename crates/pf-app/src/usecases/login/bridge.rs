use std::sync::Arc;

use pf_core::ids::AttemptId;
use pf_core::login::LoginEvent;
use pf_core::ports::{ErrorListener, LoginNotifierPort, SuccessListener, Subscription};
use tokio::sync::mpsc;
use tracing::debug;

/// Host-pushed completion events for the duration of one attempt.
#[derive(Clone)]
pub struct NotificationBridge {
    notifier: Arc<dyn LoginNotifierPort>,
}

impl NotificationBridge {
    pub fn new(notifier: Arc<dyn LoginNotifierPort>) -> Self {
        Self { notifier }
    }

    pub fn is_available(&self) -> bool {
        self.notifier.is_available()
    }

    /// Register both listeners. Without a host channel this returns a
    /// subscription that does nothing.
    pub fn subscribe(&self, on_success: SuccessListener, on_error: ErrorListener) -> Subscription {
        if !self.notifier.is_available() {
            debug!("No host notification channel, relying on status polling");
            return Subscription::noop();
        }
        self.notifier.subscribe(on_success, on_error)
    }

    /// Forward pushes for `attempt_id` into the coordinator's signal queue.
    pub fn attach(
        &self,
        attempt_id: AttemptId,
        signals: mpsc::UnboundedSender<LoginEvent>,
    ) -> Subscription {
        let success_id = attempt_id.clone();
        let success_tx = signals.clone();
        let on_success: SuccessListener = Arc::new(move || {
            let _ = success_tx.send(LoginEvent::PushSuccess {
                attempt_id: success_id.clone(),
            });
        });

        let on_error: ErrorListener = Arc::new(move |message| {
            let _ = signals.send(LoginEvent::PushError {
                attempt_id: attempt_id.clone(),
                message,
            });
        });

        self.subscribe(on_success, on_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_infra::notifier::{HostLoginNotifier, NoopLoginNotifier};

    #[tokio::test]
    async fn attach_tags_pushes_with_attempt_id() {
        let notifier = Arc::new(HostLoginNotifier::new());
        let bridge = NotificationBridge::new(notifier.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _subscription = bridge.attach(AttemptId::new("a-1"), tx);
        notifier.publish_success();
        notifier.publish_error(Some("window closed".into()));

        assert_eq!(
            rx.recv().await,
            Some(LoginEvent::PushSuccess {
                attempt_id: AttemptId::new("a-1")
            })
        );
        assert_eq!(
            rx.recv().await,
            Some(LoginEvent::PushError {
                attempt_id: AttemptId::new("a-1"),
                message: Some("window closed".into()),
            })
        );
    }

    #[tokio::test]
    async fn disposing_detaches_both_listeners_once() {
        let notifier = Arc::new(HostLoginNotifier::new());
        let bridge = NotificationBridge::new(notifier.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut subscription = bridge.attach(AttemptId::new("a-1"), tx);
        assert_eq!(notifier.listener_count(), 1);

        subscription.dispose();
        subscription.dispose();
        assert_eq!(notifier.listener_count(), 0);

        notifier.publish_success();
        drop(subscription);
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn unavailable_host_yields_noop_subscription() {
        let bridge = NotificationBridge::new(Arc::new(NoopLoginNotifier));
        assert!(!bridge.is_available());

        let (tx, _rx) = mpsc::unbounded_channel();
        let subscription = bridge.attach(AttemptId::new("a-1"), tx);
        assert!(!subscription.is_active());
    }
}
