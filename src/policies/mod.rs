//! Delay policies applied between attempts.

mod backoff;

pub use backoff::BackoffPolicy;
