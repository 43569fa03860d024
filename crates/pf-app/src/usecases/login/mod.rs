//! Interactive login use cases.

mod bridge;
mod config;
mod confirmer;
mod coordinator;
mod events;
mod handle;
mod poller;

pub use bridge::NotificationBridge;
pub use config::LoginConfig;
pub use confirmer::{ConfirmationReport, SessionConfirmer};
pub use coordinator::LoginCoordinator;
pub use events::{LoginDomainEvent, LoginEventPort};
pub use handle::LoginHandle;
pub use poller::{poll_once, StatusPoller};

#[cfg(test)]
pub(crate) mod test_support;
