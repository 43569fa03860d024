//! PixivFlow login
//!
//! Root crate: loads configuration, installs tracing and wires the login
//! coordinator from `pf-app` to concrete adapters.

pub mod bootstrap;

pub use bootstrap::{
    default_config_path, init_tracing_subscriber, load_config, load_config_or_default,
    wire_login_coordinator, LoginAdapters,
};

pub use pf_app::{ConfirmationReport, LoginCoordinator, LoginDomainEvent, LoginEventPort, LoginHandle};
pub use pf_core::{AppConfig, LoginOutcome, LoginSnapshot, LoginState};
