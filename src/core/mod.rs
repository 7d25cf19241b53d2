//! Engine core: configuration, the retry engine and the run loop.
//!
//! The public API from this module is [`Retry`] together with its option and
//! configuration types.
//!
//! Internal modules:
//! - [`config`]: user options and their validated, immutable snapshot;
//! - [`retry`]: engine owning the bus and minting tasks;
//! - [`runner`]: drives one task through attempts, backoffs and cancellation.

mod config;
mod retry;
mod runner;

pub use config::{RetryConfig, RetryOptions};
pub use retry::{Observers, Retry};
pub use runner::{RunOptions, ShouldRetryFn};
