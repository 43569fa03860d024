use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pf_core::login::{AuthBackendError, AuthStatus, InteractiveLoginOptions};
use pf_core::ports::{
    AuthBackendPort, CacheInvalidationError, CacheTopic, LoginAcceptance, SessionCachePort,
};

mockall::mock! {
    pub AuthBackend {}

    #[async_trait]
    impl AuthBackendPort for AuthBackend {
        async fn login(
            &self,
            options: &InteractiveLoginOptions,
        ) -> Result<LoginAcceptance, AuthBackendError>;
        async fn get_status(&self) -> Result<AuthStatus, AuthBackendError>;
        async fn login_with_token(&self, token: &str) -> Result<(), AuthBackendError>;
    }
}

mockall::mock! {
    pub SessionCache {}

    #[async_trait]
    impl SessionCachePort for SessionCache {
        async fn invalidate(&self, topic: CacheTopic) -> Result<(), CacheInvalidationError>;
    }
}

/// Status endpoint that takes `delay` to answer.
pub(crate) struct SlowStatusBackend {
    pub delay: Duration,
    pub authenticated: bool,
    pub calls: AtomicUsize,
}

impl SlowStatusBackend {
    pub fn new(delay: Duration, authenticated: bool) -> Self {
        Self {
            delay,
            authenticated,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthBackendPort for SlowStatusBackend {
    async fn login(
        &self,
        _options: &InteractiveLoginOptions,
    ) -> Result<LoginAcceptance, AuthBackendError> {
        Ok(LoginAcceptance::Launched)
    }

    async fn get_status(&self) -> Result<AuthStatus, AuthBackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(AuthStatus {
            authenticated: self.authenticated,
            ..AuthStatus::default()
        })
    }

    async fn login_with_token(&self, _token: &str) -> Result<(), AuthBackendError> {
        Ok(())
    }
}

/// Cache whose `stuck` topic never finishes invalidating.
pub(crate) struct StuckTopicCache {
    pub stuck: CacheTopic,
    pub completed: AtomicUsize,
}

impl StuckTopicCache {
    pub fn new(stuck: CacheTopic) -> Self {
        Self {
            stuck,
            completed: AtomicUsize::new(0),
        }
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionCachePort for StuckTopicCache {
    async fn invalidate(&self, topic: CacheTopic) -> Result<(), CacheInvalidationError> {
        if topic == self.stuck {
            std::future::pending::<()>().await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
