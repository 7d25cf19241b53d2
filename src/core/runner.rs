//! # Retry loop driver.
//!
//! Drives one [`Task`] through repeated invocations of an operation until it
//! succeeds, a predicate rejects the error, the budget runs out, or the
//! cancellation signal fires.
//!
//! ## Flow
//! ```text
//! loop {
//!   ├─► operation(task.clone()).await
//!   │       ├─ Ok(v)  ──► return Ok(v)                               (Succeeded)
//!   │       └─ Err(e)
//!   │            ├─ should_retry(&e) == false  ──► Operation error   (Failed-terminal)
//!   │            ├─ task.should_retry(Some(e)) == false
//!   │            │     ├─ task aborted  ──► Cancelled{reason}
//!   │            │     └─ otherwise     ──► Operation error (budget exhausted)
//!   │            └─ task.timeout().await                             (Backoff)
//!   │                  ├─ Ok            ──► next attempt
//!   │                  └─ Cancelled     ──► Cancelled{reason}
//! }
//! ```
//!
//! ## Rules
//! - Attempts run **sequentially**; the next one starts only after the backoff.
//! - Cancellation is observed only at `should_retry`/`timeout` boundaries,
//!   never in the middle of an attempt.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{RetryError, RunError};
use crate::signal::Signal;
use crate::tasks::{Task, TaskOptions};

/// Synchronous retry predicate.
pub type ShouldRetryFn<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Options for [`Retry::run`](crate::Retry::run).
///
/// Bundles the task overrides with an optional retry predicate. Without a
/// predicate every error is considered retryable.
///
/// ## Example
/// ```rust
/// use retryvisor::RunOptions;
///
/// let opts = RunOptions::<std::io::Error>::new()
///     .with_id("upload")
///     .with_should_retry(|e| e.kind() != std::io::ErrorKind::PermissionDenied);
/// ```
pub struct RunOptions<E> {
    pub(crate) task: TaskOptions,
    pub(crate) should_retry: Option<ShouldRetryFn<E>>,
}

impl<E> Default for RunOptions<E> {
    fn default() -> Self {
        Self {
            task: TaskOptions::default(),
            should_retry: None,
        }
    }
}

impl<E> Clone for RunOptions<E> {
    fn clone(&self) -> Self {
        Self {
            task: self.task.clone(),
            should_retry: self.should_retry.clone(),
        }
    }
}

impl<E> RunOptions<E> {
    /// Creates options with no overrides and no predicate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the retry predicate consulted before the task's own budget check.
    pub fn with_should_retry(mut self, f: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        self.should_retry = Some(Arc::new(f));
        self
    }

    /// Replaces all task overrides at once.
    pub fn with_task(mut self, task: TaskOptions) -> Self {
        self.task = task;
        self
    }

    /// See [`TaskOptions::with_id`].
    pub fn with_id(mut self, id: impl Into<Arc<str>>) -> Self {
        self.task = self.task.with_id(id);
        self
    }

    /// See [`TaskOptions::with_signal`].
    pub fn with_signal(mut self, signal: impl Signal) -> Self {
        self.task = self.task.with_signal(signal);
        self
    }

    /// See [`TaskOptions::with_retries`].
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.task = self.task.with_retries(retries);
        self
    }

    /// See [`TaskOptions::with_current_timeout`].
    pub fn with_current_timeout(mut self, timeout: Duration) -> Self {
        self.task = self.task.with_current_timeout(timeout);
        self
    }
}

impl<E> fmt::Debug for RunOptions<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOptions")
            .field("task", &self.task)
            .field("should_retry", &self.should_retry.is_some())
            .finish()
    }
}

/// Runs `operation` under `task` until a terminal state is reached.
pub(crate) async fn drive<T, E, F, Fut>(
    task: Task<E>,
    mut operation: F,
    should_retry: Option<ShouldRetryFn<E>>,
) -> Result<T, RunError<E>>
where
    F: FnMut(Task<E>) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Clone + fmt::Display + Send + 'static,
{
    let mut attempt: u32 = 0;

    loop {
        attempt = attempt.saturating_add(1);
        let err = match operation(task.clone()).await {
            Ok(value) => {
                tracing::trace!(task = task.id(), attempt, "operation succeeded");
                return Ok(value);
            }
            Err(err) => err,
        };
        tracing::debug!(task = task.id(), attempt, error = %err, "operation failed");

        if let Some(predicate) = &should_retry {
            if !predicate(&err) {
                tracing::debug!(task = task.id(), attempt, "error rejected by retry predicate");
                return Err(terminal(&task, err));
            }
        }

        if !task.should_retry(Some(err.clone())) {
            if let Some(reason) = task.abort_reason() {
                tracing::debug!(task = task.id(), attempt, %reason, "retry loop cancelled");
                return Err(RunError::Cancelled { reason });
            }
            tracing::debug!(task = task.id(), attempt, retries = task.retries(), "retry budget exhausted");
            return Err(terminal(&task, err));
        }

        tracing::trace!(
            task = task.id(),
            attempt,
            delay = ?task.current_timeout(),
            "backing off"
        );
        match task.timeout().await {
            Ok(()) => {}
            Err(RetryError::Cancelled { reason }) => {
                tracing::debug!(task = task.id(), attempt, %reason, "backoff cancelled");
                return Err(RunError::Cancelled { reason });
            }
            Err(other) => return Err(RunError::Task(other)),
        }
    }
}

fn terminal<E: Clone>(task: &Task<E>, error: E) -> RunError<E> {
    RunError::Operation {
        error,
        retries: task.retries(),
        history: task.history(),
    }
}
