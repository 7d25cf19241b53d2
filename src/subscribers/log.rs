//! # LogWriter: event logger
//!
//! A minimal subscriber that renders task events through `tracing`.
//! Install any `tracing` subscriber (e.g. `tracing_subscriber::fmt`) to see them.
//!
//! ## Example output
//! ```text
//! INFO retryvisor: retry scheduled task="task-0" retries=1 err="connection refused"
//! INFO retryvisor: backoff elapsed task="task-0" retries=1 next_delay_ms=1000
//! WARN retryvisor: task aborted task="task-0" reason="shutdown"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("unknown");
        match e.kind {
            EventKind::Retry => match e.error.as_deref() {
                Some(err) => {
                    tracing::info!(target: "retryvisor", task, retries = ?e.retries, err, "retry scheduled");
                }
                None => {
                    tracing::info!(target: "retryvisor", task, retries = ?e.retries, "retry loop stopped cleanly");
                }
            },
            EventKind::Timeout => {
                tracing::info!(
                    target: "retryvisor",
                    task,
                    retries = ?e.retries,
                    next_delay_ms = ?e.timeout_ms,
                    "backoff elapsed"
                );
            }
            EventKind::Abort => {
                tracing::warn!(
                    target: "retryvisor",
                    task,
                    reason = e.reason.as_deref().unwrap_or("unknown"),
                    "task aborted"
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
