pub mod cache;
pub mod notifier;
pub mod time;

pub use cache::InMemorySessionCache;
pub use notifier::{HostLoginNotifier, NoopLoginNotifier};
pub use time::SystemClock;
