//! # pf-core
//!
//! Core domain models and business logic for the PixivFlow login flow.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

// Public module exports
pub mod config;
pub mod ids;
pub mod login;
pub mod ports;
pub mod settings;

// Re-export commonly used types at the crate root
pub use config::AppConfig;
pub use ids::AttemptId;
pub use settings::LoginSettings;
pub use login::{
    LoginAction, LoginError, LoginEvent, LoginMode, LoginOutcome, LoginSession, LoginSnapshot,
    LoginState,
};
