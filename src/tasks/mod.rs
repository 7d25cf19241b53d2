//! # Retry sequences.
//!
//! - [`Task`] - state of one retry sequence (attempts, history, backoff, cancellation)
//! - [`TaskOptions`] - per-task overrides used when a task is picked

mod options;
mod task;

pub use options::TaskOptions;
pub use task::{RESET_REASON, Task};
