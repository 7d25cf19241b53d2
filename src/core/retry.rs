//! # Retry: engine owning configuration, task minting and the event bus.
//!
//! ## Architecture
//! ```text
//! Retry::new(RetryOptions) ──► RetryConfig (validated, immutable)
//!                              Bus (broadcast)
//!
//! Retry::pick(TaskOptions)  ──► Task (id = override or "task-<N>")
//! Retry::run(op, RunOptions)──► pick ──► runner::drive(task, op, predicate)
//!
//! Observers:
//!   Retry::subscribe() ──► broadcast::Receiver<Event>
//!   Retry::attach(subs) ──► listener ──► SubscriberSet ──► sub.on_event()
//! ```
//!
//! The engine does not track tasks after `run` returns; a picked task belongs
//! to the caller.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::config::{RetryConfig, RetryOptions};
use super::runner::{self, RunOptions};
use crate::error::{RetryError, RunError};
use crate::events::{Bus, Event};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tasks::{Task, TaskOptions};

/// Retry engine.
///
/// ## Example
/// ```rust
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use retryvisor::{Retry, RunOptions};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let retry = Retry::default();
///     let calls = AtomicU32::new(0);
///
///     let value = retry
///         .run(
///             |_task| {
///                 let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
///                 async move { if n < 2 { Err("flaky".to_string()) } else { Ok(n) } }
///             },
///             RunOptions::new(),
///         )
///         .await
///         .unwrap();
///
///     assert_eq!(value, 2);
/// }
/// ```
pub struct Retry {
    config: RetryConfig,
    bus: Bus,
    next_id: AtomicU64,
}

impl Retry {
    /// Creates an engine from `opts`, failing with
    /// [`RetryError::InvalidArgument`] on out-of-range values.
    pub fn new(opts: RetryOptions) -> Result<Self, RetryError> {
        let config = RetryConfig::from_options(opts)?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: RetryConfig) -> Self {
        let bus = Bus::new(config.bus_capacity_clamped());
        Self {
            config,
            bus,
            next_id: AtomicU64::new(0),
        }
    }

    /// Returns a copy of the effective configuration.
    pub fn config(&self) -> RetryConfig {
        self.config.clone()
    }

    /// Creates a task seeded with the engine defaults and `opts` overrides.
    ///
    /// Tasks without an explicit id are named `task-<N>`, `N` counting from 0
    /// per engine.
    pub fn pick<E>(&self, opts: TaskOptions) -> Task<E>
    where
        E: fmt::Display + Send + 'static,
    {
        let id = match &opts.id {
            Some(id) => Arc::clone(id),
            None => {
                let n = self.next_id.fetch_add(1, Ordering::Relaxed);
                Arc::from(format!("task-{n}"))
            }
        };
        Task::new(id, self.config.clone(), self.bus.clone(), opts)
    }

    /// Runs `operation` until it succeeds, a predicate gives up, the budget
    /// is exhausted, or the bound signal fires during a backoff.
    ///
    /// The operation receives a handle on its task and may inspect
    /// `retries()`/`history()`. Synchronous operations can return
    /// `futures::future::ready(result)`.
    ///
    /// With the default budget of 3 an always-failing operation is invoked
    /// 4 times; the last error is returned in [`RunError::Operation`].
    pub async fn run<T, E, F, Fut>(&self, operation: F, opts: RunOptions<E>) -> Result<T, RunError<E>>
    where
        F: FnMut(Task<E>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Clone + fmt::Display + Send + 'static,
    {
        let RunOptions { task, should_retry } = opts;
        let task = self.pick(task);
        runner::drive(task, operation, should_retry).await
    }

    /// Returns a receiver observing every event published by this engine's tasks.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Forwards events to `subscribers` from a background listener.
    ///
    /// Must be called from within a Tokio runtime. Events are delivered
    /// asynchronously; call [`Observers::shutdown`] to flush and stop.
    pub fn attach(&self, subscribers: Vec<Arc<dyn Subscribe>>) -> Observers {
        let mut rx = self.bus.subscribe();
        let set = SubscriberSet::new(subscribers);
        let stop = CancellationToken::new();
        let token = stop.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(ev) => set.emit(ev),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "event listener lagged, events dropped");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
            while let Ok(ev) = rx.try_recv() {
                set.emit(ev);
            }
            set.shutdown().await;
        });

        Observers { stop, handle }
    }
}

impl Default for Retry {
    /// Engine with the default configuration (3 retries, factor 2, 500ms..30s).
    fn default() -> Self {
        Self::with_config(RetryConfig::default())
    }
}

impl fmt::Debug for Retry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retry")
            .field("config", &self.config)
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .finish()
    }
}

/// Handle on the listener started by [`Retry::attach`].
#[must_use = "dropping Observers leaves the listener running until the engine is dropped"]
pub struct Observers {
    stop: CancellationToken,
    handle: JoinHandle<()>,
}

impl Observers {
    /// Delivers already published events, then stops the listener and its subscriber workers.
    pub async fn shutdown(self) {
        self.stop.cancel();
        let _ = self.handle.await;
    }
}
