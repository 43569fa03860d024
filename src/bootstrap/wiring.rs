//! # Dependency Injection / 依赖注入模块
//!
//! Builds a `LoginCoordinator` from `AppConfig` and the adapters the host
//! provides. No business logic lives here: timing policy is in
//! `LoginConfig::from_settings`, flow rules are in the coordinator.

use std::sync::Arc;

use pf_app::{LoginConfig, LoginCoordinator};
use pf_core::config::AppConfig;
use pf_core::ports::{AuthBackendPort, LoginNotifierPort, SessionCachePort};
use pf_infra::{InMemorySessionCache, NoopLoginNotifier, SystemClock};

/// Adapters injected into the login flow.
///
/// `notifier` and `cache` are optional: without a notifier the flow relies
/// on polling alone, without a cache an in-process cache is used.
pub struct LoginAdapters {
    pub backend: Arc<dyn AuthBackendPort>,
    pub notifier: Option<Arc<dyn LoginNotifierPort>>,
    pub cache: Option<Arc<dyn SessionCachePort>>,
}

impl LoginAdapters {
    pub fn new(backend: Arc<dyn AuthBackendPort>) -> Self {
        Self {
            backend,
            notifier: None,
            cache: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn LoginNotifierPort>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn SessionCachePort>) -> Self {
        self.cache = Some(cache);
        self
    }
}

/// Wire the login coordinator.
///
/// Must be called inside a Tokio runtime; the coordinator spawns its signal
/// loop on construction.
pub fn wire_login_coordinator(config: &AppConfig, adapters: LoginAdapters) -> LoginCoordinator {
    let login_config = LoginConfig::from_settings(&config.login);

    let notifier: Arc<dyn LoginNotifierPort> = match adapters.notifier {
        Some(notifier) => notifier,
        None => {
            tracing::info!("No login notifier provided, relying on status polling");
            Arc::new(NoopLoginNotifier)
        }
    };
    let cache: Arc<dyn SessionCachePort> = match adapters.cache {
        Some(cache) => cache,
        None => Arc::new(InMemorySessionCache::new()),
    };

    tracing::debug!(
        poll_interval_ms = login_config.poll_interval.as_millis() as u64,
        max_wait_secs = login_config.max_wait.as_secs(),
        notifier_available = notifier.is_available(),
        "Wiring login coordinator"
    );

    LoginCoordinator::new(
        login_config,
        adapters.backend,
        notifier,
        cache,
        Arc::new(SystemClock),
    )
}
