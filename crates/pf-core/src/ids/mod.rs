//! ID type wrappers for type safety.

pub mod attempt_id;

pub use attempt_id::AttemptId;
