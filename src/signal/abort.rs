//! # Built-in abort signal.
//!
//! [`AbortController`] owns the right to fire; [`AbortSignal`] is the cheap,
//! cloneable observer handed to tasks and operations.
//!
//! ```text
//! AbortController::abort(reason)
//!     ├─► store reason (first call wins)
//!     ├─► cancel inner CancellationToken   → AbortSignal::cancelled() resolves
//!     └─► drain listeners, call each(reason) outside the lock
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use super::{AbortListener, Signal, Subscription};

/// Reason used by [`AbortController::cancel`].
pub const DEFAULT_ABORT_REASON: &str = "operation aborted";

#[derive(Default)]
struct SignalState {
    reason: Option<Arc<str>>,
    next_id: u64,
    listeners: BTreeMap<u64, AbortListener>,
}

#[derive(Default)]
struct SignalInner {
    state: Mutex<SignalState>,
    token: CancellationToken,
}

impl SignalInner {
    fn lock(&self) -> MutexGuard<'_, SignalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Observer side of an abort signal.
#[derive(Clone, Default)]
pub struct AbortSignal {
    inner: Arc<SignalInner>,
}

impl AbortSignal {
    /// Returns a future that resolves once the signal fires.
    ///
    /// Lets an operation stop early by racing its work against the signal.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.inner.token.cancelled()
    }

    /// Returns a signal that is already aborted with `reason`.
    pub fn aborted(reason: impl Into<Arc<str>>) -> Self {
        let controller = AbortController::new();
        controller.abort(reason);
        controller.signal()
    }

    fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }
}

impl Signal for AbortSignal {
    fn is_aborted(&self) -> bool {
        self.inner.lock().reason.is_some()
    }

    fn reason(&self) -> Option<Arc<str>> {
        self.inner.lock().reason.clone()
    }

    fn subscribe(&self, listener: AbortListener) -> Subscription {
        let mut state = self.inner.lock();
        if state.reason.is_some() {
            return Subscription::noop();
        }

        let id = state.next_id;
        state.next_id += 1;
        state.listeners.insert(id, listener);

        let weak: Weak<SignalInner> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.lock().listeners.remove(&id);
            }
        })
    }
}

impl fmt::Debug for AbortSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("AbortSignal")
            .field("reason", &state.reason)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

/// Owner side of an abort signal.
///
/// # Example
/// ```
/// use retryvisor::{AbortController, Signal};
///
/// let controller = AbortController::new();
/// let signal = controller.signal();
/// assert!(!signal.is_aborted());
///
/// controller.abort("user hit ctrl-c");
/// controller.abort("ignored, first reason wins");
/// assert_eq!(signal.reason().as_deref(), Some("user hit ctrl-c"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct AbortController {
    signal: AbortSignal,
}

impl AbortController {
    /// Creates a controller with a fresh, non-aborted signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an observer handle for this controller's signal.
    pub fn signal(&self) -> AbortSignal {
        self.signal.clone()
    }

    /// Fires the signal with `reason`. Later calls are ignored.
    pub fn abort(&self, reason: impl Into<Arc<str>>) {
        let reason: Arc<str> = reason.into();
        let listeners = {
            let mut state = self.signal.inner.lock();
            if state.reason.is_some() {
                return;
            }
            state.reason = Some(Arc::clone(&reason));
            std::mem::take(&mut state.listeners)
        };
        self.signal.inner.token.cancel();

        for (_, listener) in listeners {
            listener(Arc::clone(&reason));
        }
    }

    /// Fires the signal with [`DEFAULT_ABORT_REASON`].
    pub fn cancel(&self) {
        self.abort(DEFAULT_ABORT_REASON);
    }
}
