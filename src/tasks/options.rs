//! # Per-task overrides.
//!
//! [`TaskOptions`] seeds a [`Task`](crate::Task) created by
//! [`Retry::pick`](crate::Retry::pick) or [`Retry::run`](crate::Retry::run).
//! Unset fields fall back to the engine configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::signal::Signal;

/// Overrides for a new task.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use retryvisor::{AbortController, Retry, TaskOptions};
///
/// let retry = Retry::default();
/// let controller = AbortController::new();
///
/// let task = retry.pick::<std::io::Error>(
///     TaskOptions::new()
///         .with_id("fetch-config")
///         .with_signal(controller.signal())
///         .with_current_timeout(Duration::from_secs(1)),
/// );
/// assert_eq!(task.id(), "fetch-config");
/// assert_eq!(task.current_timeout(), Duration::from_secs(1));
/// ```
#[derive(Clone, Default)]
pub struct TaskOptions {
    pub(crate) id: Option<Arc<str>>,
    pub(crate) signal: Option<Arc<dyn Signal>>,
    pub(crate) retries: Option<u32>,
    pub(crate) current_timeout: Option<Duration>,
}

impl TaskOptions {
    /// Creates empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `id` instead of the generated `task-<N>`.
    pub fn with_id(mut self, id: impl Into<Arc<str>>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Binds a cancellation signal.
    pub fn with_signal(mut self, signal: impl Signal) -> Self {
        self.signal = Some(Arc::new(signal));
        self
    }

    /// Binds an already shared cancellation signal.
    pub fn with_shared_signal(mut self, signal: Arc<dyn Signal>) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Starts the task with `retries` already consumed.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Uses `timeout` for the first backoff instead of `min_timeout`.
    pub fn with_current_timeout(mut self, timeout: Duration) -> Self {
        self.current_timeout = Some(timeout);
        self
    }
}

impl fmt::Debug for TaskOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskOptions")
            .field("id", &self.id)
            .field("signal", &self.signal.is_some())
            .field("retries", &self.retries)
            .field("current_timeout", &self.current_timeout)
            .finish()
    }
}
