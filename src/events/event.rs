//! # Lifecycle events emitted by tasks.
//!
//! The [`EventKind`] enum classifies the notifications a [`Retry`](crate::Retry)
//! engine publishes:
//! - **Retry**: a failure was recorded and the retry decision was taken
//! - **Timeout**: a backoff wait elapsed and the next delay was computed
//! - **Abort**: the bound cancellation signal fired
//!
//! The [`Event`] struct carries the metadata (task id, retries, errors,
//! current delay, abort reason) plus a timestamp and a sequence number.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Within one task, a `Timeout` event always follows the
//! `Retry` event of the same loop iteration.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use retryvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::Timeout)
//!     .with_task("task-0")
//!     .with_retries(2)
//!     .with_timeout(Duration::from_millis(2000));
//!
//! assert_eq!(ev.kind, EventKind::Timeout);
//! assert_eq!(ev.task.as_deref(), Some("task-0"));
//! assert_eq!(ev.timeout_ms, Some(2000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of task events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A task recorded a failure and took its retry decision.
    ///
    /// Sets:
    /// - `task`: task id
    /// - `retries`: retries consumed, after the increment
    /// - `error`: rendered error (absent for a clean stop)
    /// - `history`: rendered history, oldest first
    Retry,

    /// A backoff wait completed.
    ///
    /// Sets:
    /// - `task`: task id
    /// - `retries`: retries consumed
    /// - `timeout_ms`: the delay for the next backoff (ms)
    Timeout,

    /// The cancellation signal bound to a task fired.
    ///
    /// Sets:
    /// - `task`: task id
    /// - `reason`: reason carried by the signal
    Abort,
}

impl EventKind {
    /// Returns the event name as used by observers (`retry`, `timeout`, `abort`).
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Retry => "retry",
            EventKind::Timeout => "timeout",
            EventKind::Abort => "abort",
        }
    }
}

/// Task event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Id of the task that emitted the event.
    pub task: Option<Arc<str>>,
    /// Retries consumed by the task.
    pub retries: Option<u32>,
    /// The error that triggered a retry decision.
    pub error: Option<Arc<str>>,
    /// Errors recorded so far, oldest first.
    pub history: Option<Arc<[Arc<str>]>>,
    /// Current backoff delay in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Cancellation reason.
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            retries: None,
            error: None,
            history: None,
            timeout_ms: None,
            reason: None,
        }
    }

    /// Attaches a task id.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches the retry count.
    #[inline]
    pub fn with_retries(mut self, n: u32) -> Self {
        self.retries = Some(n);
        self
    }

    /// Attaches a rendered error.
    #[inline]
    pub fn with_error(mut self, error: impl Into<Arc<str>>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Attaches the rendered error history.
    #[inline]
    pub fn with_history(mut self, history: impl Into<Arc<[Arc<str>]>>) -> Self {
        self.history = Some(history.into());
        self
    }

    /// Attaches a backoff delay (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Attaches a cancellation reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Returns the backoff delay as a [`Duration`], if set.
    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(|ms| Duration::from_millis(u64::from(ms)))
    }
}
