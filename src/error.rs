//! Error types used by the retry engine and its tasks.
//!
//! This module defines two error enums:
//!
//! - [`RetryError`]: misuse of the API and cancelled backoff waits.
//! - [`RunError`]: the final outcome of a failed [`Retry::run`](crate::Retry::run).
//!
//! Both types provide `as_label` for logs/metrics.

use std::sync::Arc;

use thiserror::Error;

/// # Errors produced by the engine and by [`Task`](crate::Task) primitives.
///
/// `InvalidArgument` and `InvalidState` are raised synchronously at the call
/// that introduced them and are never retried.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetryError {
    /// A configuration or option value is out of range.
    #[error("invalid argument `{field}`: {reason}")]
    InvalidArgument {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A task primitive was called in a state that does not allow it.
    #[error("invalid state: {reason}")]
    InvalidState {
        /// Hint on how to recover (usually "call reset first").
        reason: &'static str,
    },

    /// The backoff wait was interrupted by the bound cancellation signal
    /// or by a concurrent [`Task::reset`](crate::Task::reset).
    #[error("cancelled: {reason}")]
    Cancelled {
        /// Reason carried by the signal.
        reason: Arc<str>,
    },
}

impl RetryError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use retryvisor::RetryError;
    ///
    /// let err = RetryError::InvalidState { reason: "call reset first" };
    /// assert_eq!(err.as_label(), "retry_invalid_state");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RetryError::InvalidArgument { .. } => "retry_invalid_argument",
            RetryError::InvalidState { .. } => "retry_invalid_state",
            RetryError::Cancelled { .. } => "retry_cancelled",
        }
    }

    pub(crate) fn invalid_argument(field: &'static str, reason: impl Into<String>) -> Self {
        RetryError::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    /// Indicates whether the error comes from a fired cancellation signal.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled { .. })
    }
}

/// # Final error of [`Retry::run`](crate::Retry::run).
///
/// Either the operation's own error (rejected by a predicate or the budget
/// was exhausted) or a cancellation observed at a retry boundary.
/// Cancellation never interrupts an attempt in flight.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunError<E> {
    /// The operation failed and will not be retried.
    #[error("operation failed after {retries} retries: {error}")]
    Operation {
        /// The last error returned by the operation.
        error: E,
        /// Retries consumed by the task when it gave up.
        retries: u32,
        /// Every error the task recorded, oldest first.
        history: Vec<E>,
    },

    /// The cancellation signal fired between attempts.
    #[error("cancelled: {reason}")]
    Cancelled {
        /// Reason carried by the signal.
        reason: Arc<str>,
    },

    /// The operation misused the task it was handed (e.g. armed its own backoff).
    #[error("task misuse: {0}")]
    Task(RetryError),
}

impl<E> RunError<E> {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RunError::Operation { .. } => "run_operation_failed",
            RunError::Cancelled { .. } => "run_cancelled",
            RunError::Task(_) => "run_task_misuse",
        }
    }

    /// Returns the operation error, if the run did not end by cancellation.
    ///
    /// # Example
    /// ```
    /// use retryvisor::RunError;
    ///
    /// let err: RunError<&str> = RunError::Operation { error: "boom", retries: 3, history: vec![] };
    /// assert_eq!(err.into_operation_error(), Some("boom"));
    /// ```
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            RunError::Operation { error, .. } => Some(error),
            RunError::Cancelled { .. } | RunError::Task(_) => None,
        }
    }

    /// Returns the signal reason, if the run was cancelled.
    pub fn cancel_reason(&self) -> Option<&str> {
        match self {
            RunError::Cancelled { reason } => Some(reason),
            RunError::Operation { .. } | RunError::Task(_) => None,
        }
    }
}
