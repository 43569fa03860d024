//! PixivFlow login orchestration layer
//!
//! This crate contains the login use cases: the status poller, the host
//! notification bridge, the confirmation side effects and the coordinator
//! that wires them to one `LoginSession` per attempt.

pub mod usecases;

pub use usecases::login::{
    ConfirmationReport, LoginConfig, LoginCoordinator, LoginDomainEvent, LoginEventPort,
    LoginHandle,
};
