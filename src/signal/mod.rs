//! # Cancellation signals.
//!
//! A [`Task`](crate::Task) observes an external cancellation token through the
//! [`Signal`] trait. The task never owns the token's lifecycle: it registers a
//! one-shot listener, keeps the returned [`Subscription`], and drops it on
//! reset or once the listener has fired.
//!
//! [`AbortController`] / [`AbortSignal`] is the built-in implementation.
//!
//! ## Contract
//! - `subscribe` never invokes the listener itself; a signal that is already
//!   aborted returns an inert subscription (callers read [`Signal::is_aborted`]).
//! - Each listener is invoked **at most once**, with the abort reason.
//! - Listeners run synchronously inside the call that fires the signal.

mod abort;

use std::fmt;
use std::sync::Arc;

pub use abort::{AbortController, AbortSignal, DEFAULT_ABORT_REASON};

/// One-shot abort callback.
pub type AbortListener = Box<dyn FnOnce(Arc<str>) + Send + 'static>;

/// External cancellation token observed by tasks.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use retryvisor::{AbortController, Signal};
///
/// let controller = AbortController::new();
/// let signal = controller.signal();
///
/// let fired = Arc::new(AtomicBool::new(false));
/// let flag = fired.clone();
/// let _sub = signal.subscribe(Box::new(move |_reason| flag.store(true, Ordering::SeqCst)));
///
/// controller.abort("shutdown");
/// assert!(fired.load(Ordering::SeqCst));
/// assert_eq!(signal.reason().as_deref(), Some("shutdown"));
/// ```
pub trait Signal: Send + Sync + 'static {
    /// Returns `true` once the signal has fired.
    fn is_aborted(&self) -> bool;

    /// Returns the abort reason, if the signal has fired.
    fn reason(&self) -> Option<Arc<str>>;

    /// Registers a one-shot listener. Dropping the returned handle detaches it.
    fn subscribe(&self, listener: AbortListener) -> Subscription;
}

/// Handle returned by [`Signal::subscribe`].
///
/// Detaches the listener when dropped or when [`Subscription::unsubscribe`] is called.
#[must_use = "dropping a Subscription detaches the listener"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Subscription {
    /// Creates a subscription that runs `detach` exactly once.
    pub fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Creates a subscription with nothing to detach.
    pub fn noop() -> Self {
        Self { detach: None }
    }

    /// Detaches the listener now.
    pub fn unsubscribe(mut self) {
        self.run_detach();
    }

    fn run_detach(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_detach();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}
