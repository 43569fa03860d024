//! Port interfaces for the login flow.
//!
//! Ports define the contract between the login use cases and the collaborators
//! that live outside this workspace: the auth REST client, the host process
//! that opens the browser, and the application-wide query cache.

mod auth_backend;
mod clock;
mod notifier;
mod session_cache;

pub use auth_backend::{AuthBackendPort, LoginAcceptance};
pub use clock::ClockPort;
pub use notifier::{ErrorListener, LoginNotifierPort, SuccessListener, Subscription};
pub use session_cache::{CacheInvalidationError, CacheTopic, SessionCachePort};
