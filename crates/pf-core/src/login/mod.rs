//! Login completion detection.
//!
//! An interactive login is finished by the user in an external browser. Its
//! completion can surface through a host-pushed notification, through the
//! periodic status poll, or through the login request itself. This module
//! folds all of those signals into one explicit state machine per attempt.
//!
//! # Architecture / 架构
//!
//! ```text
//! LoginSession (pf-core)
//!   ├── State: where the attempt currently is
//!   ├── Event: a signal from a channel or the user
//!   └── Action: side effects the transition asks for
//!
//! LoginCoordinator (pf-app)
//!   ├── turns poll ticks / pushes / user calls into LoginEvent
//!   ├── feeds the current session under one dispatch lock
//!   └── executes actions (arm channels, teardown, confirm, publish outcome)
//! ```

pub mod action;
pub mod error;
pub mod event;
pub mod options;
pub mod state;
pub mod state_machine;
pub mod status;
pub mod token;

pub use action::LoginAction;
pub use error::{AuthBackendError, LoginError};
pub use event::{LoginEvent, LoginRequestResult, PollSource, PollStatus};
pub use options::{InteractiveLoginOptions, ProxySettings};
pub use state::{CancelledBy, LoginMode, LoginOutcome, LoginState};
pub use state_machine::{LoginSession, LoginSnapshot};
pub use status::{AuthStatus, AuthUser};
pub use token::validate_token;
