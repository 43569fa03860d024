//! Login completion notifiers.
//!
//! `HostLoginNotifier` is the in-process end of the host channel: the
//! component that opened the browser publishes into it. `NoopLoginNotifier`
//! stands in when no such component exists.

mod host;
mod noop;

pub use host::HostLoginNotifier;
pub use noop::NoopLoginNotifier;
