//! # retryvisor
//!
//! **Retryvisor** is a small retry-with-backoff library for async Rust.
//!
//! It retries a fallible operation with exponentially growing delays, a
//! bounded retry budget and cooperative cancellation. The same primitives
//! used by [`Retry::run`] are exposed on [`Task`] for callers that prefer to
//! drive the loop themselves.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  RetryOptions ──► Retry (engine)
//!                   ├─ RetryConfig (validated, immutable)
//!                   ├─ Bus (broadcast events)
//!                   └─ task counter ("task-0", "task-1", ...)
//!                        │
//!            pick(TaskOptions) / run(operation, RunOptions)
//!                        ▼
//!                 ┌──────────────┐   subscribe   ┌──────────────────┐
//!                 │     Task     │◄──────────────│  Signal (abort)  │
//!                 │ retries      │   listener    │ AbortController  │
//!                 │ history      │               └──────────────────┘
//!                 │ timeout      │
//!                 └──────┬───────┘
//!                        │ publishes Retry / Timeout / Abort
//!                        ▼
//!      ┌───────────────────────────────────────────┐
//!      │          Bus (broadcast channel)          │
//!      └─────────────┬──────────────────┬──────────┘
//!                    ▼                  ▼
//!          Retry::subscribe()     Retry::attach(subs)
//!          (raw receiver)         └─► SubscriberSet ─► sub.on_event()
//! ```
//!
//! ### Lifecycle
//! ```text
//! loop {
//!   ├─► operation(task).await
//!   │       ├─ Ok  ──► return value
//!   │       └─ Err ──► predicate(&err)?          no ─► Operation error
//!   │                  task.should_retry(err)?   no ─► Operation error / Cancelled
//!   │                  ├─ publish Retry{ task, retries, error, history }
//!   │                  ├─ task.timeout().await   (current delay, cancellable)
//!   │                  ├─ current = min(max, min × factor^retries)
//!   │                  └─ publish Timeout{ task, retries, timeout }
//!   └─ signal fired ──► publish Abort{ task, reason }, pending wait resolves Cancelled
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                       |
//! |-------------------|----------------------------------------------------------|------------------------------------------|
//! | **Engine**        | Validated configuration, task minting, the run loop.    | [`Retry`], [`RetryOptions`], [`RunOptions`] |
//! | **Tasks**         | Per-sequence state and the manual retry primitives.     | [`Task`], [`TaskOptions`]                |
//! | **Cancellation**  | External abort tokens observed by tasks.                | [`Signal`], [`AbortController`]          |
//! | **Policies**      | Exponential delay computation.                          | [`BackoffPolicy`]                        |
//! | **Subscriber API**| Hook into retry/timeout/abort events.                   | [`Subscribe`], [`Event`]                 |
//! | **Errors**        | Typed errors for misuse, cancellation and final failure.| [`RetryError`], [`RunError`]             |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use retryvisor::{AbortController, Retry, RetryOptions, RunOptions};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let retry = Retry::new(RetryOptions {
//!         min_timeout: Some(Duration::from_millis(10)),
//!         ..Default::default()
//!     })?;
//!
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn retryvisor::Subscribe>> = vec![Arc::new(retryvisor::LogWriter::default())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn retryvisor::Subscribe>> = Vec::new();
//!     let observers = retry.attach(subs);
//!
//!     let controller = AbortController::new();
//!     let value = retry
//!         .run(
//!             |task| async move {
//!                 if task.retries() < 2 {
//!                     Err(format!("not yet ({})", task.retries()))
//!                 } else {
//!                     Ok(task.retries())
//!                 }
//!             },
//!             RunOptions::new().with_id("warmup").with_signal(controller.signal()),
//!         )
//!         .await?;
//!
//!     assert_eq!(value, 2);
//!     observers.shutdown().await;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod policies;
mod signal;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use core::{Observers, Retry, RetryConfig, RetryOptions, RunOptions, ShouldRetryFn};
pub use error::{RetryError, RunError};
pub use events::{Event, EventKind};
pub use policies::BackoffPolicy;
pub use signal::{AbortController, AbortListener, AbortSignal, DEFAULT_ABORT_REASON, Signal, Subscription};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{RESET_REASON, Task, TaskOptions};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
