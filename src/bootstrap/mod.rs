pub mod config;
pub mod tracing;
pub mod wiring;

pub use config::{default_config_path, load_config, load_config_or_default};
pub use self::tracing::init_tracing_subscriber;
pub use wiring::{wire_login_coordinator, LoginAdapters};
