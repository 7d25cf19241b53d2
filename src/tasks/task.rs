//! # Task: state of one retry sequence.
//!
//! A [`Task`] counts attempts, records failures, computes the next backoff
//! delay and links itself to an optional cancellation [`Signal`]. It is a
//! cheap, cloneable handle: the engine passes a clone to every operation
//! invocation, and a task obtained from [`Retry::pick`](crate::Retry::pick)
//! can drive a manual retry loop.
//!
//! ## State machine
//! ```text
//!            should_retry(Some(e)) ──► retries += 1, emit Retry
//!  fresh ──►        │
//!    ▲              ▼
//!    │         timeout() ──► [sleep current_timeout] ──► current_timeout = next(retries)
//!    │              │                                    emit Timeout
//!    │              └─ signal fired ──► Err(Cancelled), reset
//!    │
//!    └──── reset() / should_retry(None) / cancelled timeout()
//! ```
//!
//! ## Rules
//! - `should_retry` records the error **before** checking `aborted`, so the error
//!   that ended an aborted sequence is still visible in [`Task::history`].
//! - `retries` is incremented **before** the `Retry` event is published.
//! - Absent errors (`None`) are a clean stop: never recorded, the task is reset.
//! - The state lock is never held across an `.await`.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::core::RetryConfig;
use crate::error::RetryError;
use crate::events::{Bus, Event, EventKind};
use crate::signal::{DEFAULT_ABORT_REASON, Signal, Subscription};
use crate::tasks::options::TaskOptions;

/// Reason reported when a pending backoff is cut short by [`Task::reset`].
pub const RESET_REASON: &str = "task reset";

struct TaskState<E> {
    retries: u32,
    history: Vec<E>,
    current_timeout: Duration,
    aborted: bool,
    abort_reason: Option<Arc<str>>,
    signal: Option<Arc<dyn Signal>>,
    subscription: Option<Subscription>,
    timer: Option<CancellationToken>,
    /// Bumped on every reset and signal bind; stale timers and listeners compare against it.
    epoch: u64,
}

impl<E> TaskState<E> {
    fn fresh(current_timeout: Duration, epoch: u64) -> Self {
        Self {
            retries: 0,
            history: Vec::new(),
            current_timeout,
            aborted: false,
            abort_reason: None,
            signal: None,
            subscription: None,
            timer: None,
            epoch,
        }
    }

    fn cancel_reason(&self) -> Arc<str> {
        self.abort_reason
            .clone()
            .or_else(|| self.signal.as_ref().and_then(|s| s.reason()))
            .unwrap_or_else(|| Arc::from(DEFAULT_ABORT_REASON))
    }
}

struct TaskInner<E> {
    id: Arc<str>,
    config: RetryConfig,
    bus: Bus,
    state: Mutex<TaskState<E>>,
}

/// Handle on a retry sequence.
///
/// Generic over the operation error type `E`; errors are stored as-is in
/// the history and rendered through `Display` for events.
pub struct Task<E> {
    inner: Arc<TaskInner<E>>,
}

impl<E> Clone for Task<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> TaskInner<E> {
    fn lock(&self) -> MutexGuard<'_, TaskState<E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Restores construction-time defaults. The returned subscription must be
    /// dropped after the state lock is released.
    #[must_use]
    fn reset_locked(&self, state: &mut TaskState<E>) -> Option<Subscription> {
        if let Some(timer) = state.timer.take() {
            timer.cancel();
        }
        let subscription = state.subscription.take();
        let epoch = state.epoch.wrapping_add(1);
        *state = TaskState::fresh(self.config.min_timeout, epoch);
        subscription
    }

    fn on_abort(&self, reason: Arc<str>, epoch: u64) {
        let mut state = self.lock();
        if state.epoch != epoch || state.aborted {
            return;
        }
        state.aborted = true;
        state.abort_reason = Some(Arc::clone(&reason));
        if let Some(timer) = state.timer.take() {
            timer.cancel();
        }
        let detached = state.subscription.take();
        self.bus.publish(
            Event::new(EventKind::Abort)
                .with_task(Arc::clone(&self.id))
                .with_reason(reason),
        );
        drop(state);
        drop(detached);
    }

    fn disarm(&self, epoch: u64) {
        let mut state = self.lock();
        if state.epoch == epoch {
            if let Some(timer) = state.timer.take() {
                timer.cancel();
            }
        }
    }

    fn finish_backoff(&self, epoch: u64) -> Result<(), RetryError> {
        let mut state = self.lock();
        if state.epoch != epoch {
            return Err(RetryError::Cancelled {
                reason: Arc::from(RESET_REASON),
            });
        }
        if state.aborted {
            let reason = state.cancel_reason();
            let detached = self.reset_locked(&mut state);
            drop(state);
            drop(detached);
            return Err(RetryError::Cancelled { reason });
        }

        state.timer = None;
        state.current_timeout = self.config.backoff().next(state.retries);
        self.bus.publish(
            Event::new(EventKind::Timeout)
                .with_task(Arc::clone(&self.id))
                .with_retries(state.retries)
                .with_timeout(state.current_timeout),
        );
        Ok(())
    }
}

impl<E> TaskInner<E>
where
    E: Send + 'static,
{
    /// Binds `signal` under the state lock. Returns the previous subscription.
    #[must_use]
    fn bind_locked(
        self: &Arc<Self>,
        state: &mut TaskState<E>,
        signal: Option<Arc<dyn Signal>>,
    ) -> Option<Subscription> {
        let previous = state.subscription.take();
        state.epoch = state.epoch.wrapping_add(1);
        state.signal = None;
        state.aborted = false;
        state.abort_reason = None;

        let Some(signal) = signal else {
            return previous;
        };

        let epoch = state.epoch;
        let weak = Arc::downgrade(self);
        let subscription = signal.subscribe(Box::new(move |reason| {
            if let Some(inner) = weak.upgrade() {
                inner.on_abort(reason, epoch);
            }
        }));

        if signal.is_aborted() {
            state.aborted = true;
            state.abort_reason = signal.reason();
        } else {
            state.subscription = Some(subscription);
        }
        state.signal = Some(signal);
        previous
    }
}

/// Drop guard that clears the pending timer if the backoff future is dropped early.
struct PendingBackoff<E> {
    inner: Arc<TaskInner<E>>,
    epoch: u64,
    settled: bool,
}

impl<E> Drop for PendingBackoff<E> {
    fn drop(&mut self) {
        if !self.settled {
            self.inner.disarm(self.epoch);
        }
    }
}

impl<E> Task<E>
where
    E: fmt::Display + Send + 'static,
{
    pub(crate) fn new(id: Arc<str>, config: RetryConfig, bus: Bus, opts: TaskOptions) -> Self {
        let mut state = TaskState::fresh(
            opts.current_timeout.unwrap_or(config.min_timeout),
            0,
        );
        state.retries = opts.retries.unwrap_or(0);

        let inner = Arc::new(TaskInner {
            id,
            config,
            bus,
            state: Mutex::new(state),
        });
        if opts.signal.is_some() {
            let mut state = inner.lock();
            let previous = inner.bind_locked(&mut state, opts.signal);
            drop(state);
            drop(previous);
        }
        Self { inner }
    }

    /// Starts a fresh sequence without a cancellation signal.
    ///
    /// See [`Task::start_with`] for the failure conditions.
    pub fn start(&self) -> Result<(), RetryError> {
        self.start_inner(None)
    }

    /// Starts a fresh sequence observing `signal`.
    ///
    /// Fails with [`RetryError::InvalidState`] if the task is aborted, or
    /// already has recorded attempts or a pending backoff; call
    /// [`Task::reset`] first. A previously bound signal is detached.
    /// `aborted` is re-evaluated from the signal's current state.
    pub fn start_with(&self, signal: impl Signal) -> Result<(), RetryError> {
        self.start_inner(Some(Arc::new(signal)))
    }

    fn start_inner(&self, signal: Option<Arc<dyn Signal>>) -> Result<(), RetryError> {
        let mut state = self.inner.lock();
        if state.aborted {
            return Err(RetryError::InvalidState {
                reason: "task aborted, call reset first",
            });
        }
        if state.timer.is_some() || state.retries != 0 {
            return Err(RetryError::InvalidState {
                reason: "task already started, call reset first",
            });
        }

        let previous = self.inner.bind_locked(&mut state, signal);
        drop(state);
        drop(previous);
        Ok(())
    }

    /// Records a failed attempt and decides whether another one is allowed.
    ///
    /// Order of effects:
    /// 1. `Some(error)` is appended to the history;
    /// 2. an aborted task returns `false` without counting the attempt;
    /// 3. `retries` is incremented and a `Retry` event is published;
    /// 4. `None` resets the task and returns `false` (clean stop);
    /// 5. returns `retries <= budget`.
    pub fn should_retry(&self, error: Option<E>) -> bool {
        let mut state = self.inner.lock();
        let rendered: Option<Arc<str>> = error.as_ref().map(|e| Arc::from(e.to_string()));
        let clean_stop = error.is_none();
        if let Some(error) = error {
            state.history.push(error);
        }

        if state.aborted {
            return false;
        }

        state.retries = state.retries.saturating_add(1);
        let history: Vec<Arc<str>> = state
            .history
            .iter()
            .map(|e| Arc::from(e.to_string()))
            .collect();
        let mut event = Event::new(EventKind::Retry)
            .with_task(Arc::clone(&self.inner.id))
            .with_retries(state.retries)
            .with_history(history);
        if let Some(rendered) = rendered {
            event = event.with_error(rendered);
        }
        self.inner.bus.publish(event);

        if clean_stop {
            let detached = self.inner.reset_locked(&mut state);
            drop(state);
            drop(detached);
            return false;
        }

        state.retries <= self.inner.config.retries
    }

    /// Waits for the current backoff delay.
    ///
    /// The delay is measured from this call, not from the first poll. On
    /// completion the next delay becomes `min(max_timeout, min_timeout × factor^retries)`
    /// and a `Timeout` event is published.
    ///
    /// Resolves to [`RetryError::Cancelled`] (and resets the task) when the task
    /// is aborted before or during the wait, or when it is reset meanwhile.
    /// Fails with [`RetryError::InvalidState`] if another backoff is pending.
    pub fn timeout(&self) -> impl Future<Output = Result<(), RetryError>> + Send + 'static {
        // The guard is built eagerly so dropping the future unpolled still disarms the timer.
        let armed = self.arm_timer().map(|(deadline, timer, epoch)| {
            let guard = PendingBackoff {
                inner: Arc::clone(&self.inner),
                epoch,
                settled: false,
            };
            (deadline, timer, guard)
        });

        async move {
            let (deadline, timer, mut guard) = armed?;

            tokio::select! {
                _ = time::sleep_until(deadline) => {}
                _ = timer.cancelled() => {}
            }

            guard.settled = true;
            guard.inner.finish_backoff(guard.epoch)
        }
    }

    fn arm_timer(&self) -> Result<(Instant, CancellationToken, u64), RetryError> {
        let mut state = self.inner.lock();
        if state.aborted {
            let reason = state.cancel_reason();
            let detached = self.inner.reset_locked(&mut state);
            drop(state);
            drop(detached);
            return Err(RetryError::Cancelled { reason });
        }
        if state.timer.is_some() {
            return Err(RetryError::InvalidState {
                reason: "backoff already pending",
            });
        }

        let timer = CancellationToken::new();
        state.timer = Some(timer.clone());
        Ok((deadline_after(state.current_timeout), timer, state.epoch))
    }
}

/// Deadline `delay` from now, saturating to roughly 30 years for oversized overrides.
fn deadline_after(delay: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(delay)
        .unwrap_or_else(|| now + Duration::from_secs(86_400 * 365 * 30))
}

impl<E> Task<E> {
    /// Cancels any pending backoff, detaches the signal listener and restores
    /// the defaults: no retries, empty history, `current_timeout = min_timeout`,
    /// not aborted, no signal. The id is kept.
    pub fn reset(&self) {
        let mut state = self.inner.lock();
        let detached = self.inner.reset_locked(&mut state);
        drop(state);
        drop(detached);
    }

    /// Returns the task id.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Returns the number of retries consumed so far.
    pub fn retries(&self) -> u32 {
        self.inner.lock().retries
    }

    /// Returns `true` once the bound signal has fired.
    pub fn aborted(&self) -> bool {
        self.inner.lock().aborted
    }

    /// Returns the reason of the signal that aborted this task.
    pub fn abort_reason(&self) -> Option<Arc<str>> {
        let state = self.inner.lock();
        if state.aborted {
            Some(state.cancel_reason())
        } else {
            None
        }
    }

    /// Returns the bound cancellation signal.
    pub fn signal(&self) -> Option<Arc<dyn Signal>> {
        self.inner.lock().signal.clone()
    }

    /// Returns the delay the next [`Task::timeout`] will wait.
    pub fn current_timeout(&self) -> Duration {
        self.inner.lock().current_timeout
    }

    /// Returns `true` while a backoff timer is armed.
    pub fn is_waiting(&self) -> bool {
        self.inner.lock().timer.is_some()
    }
}

impl<E: Clone> Task<E> {
    /// Returns a copy of the recorded errors, oldest first.
    pub fn history(&self) -> Vec<E> {
        self.inner.lock().history.clone()
    }

    /// Returns the first recorded error.
    pub fn root_error(&self) -> Option<E> {
        self.inner.lock().history.first().cloned()
    }
}

impl<E> fmt::Debug for Task<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("Task")
            .field("id", &self.inner.id)
            .field("retries", &state.retries)
            .field("recorded", &state.history.len())
            .field("current_timeout", &state.current_timeout)
            .field("aborted", &state.aborted)
            .field("waiting", &state.timer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RetryOptions;
    use crate::signal::AbortController;

    fn task_with(opts: RetryOptions, task: TaskOptions) -> (Task<String>, Bus) {
        let config = RetryConfig::from_options(opts).unwrap();
        let bus = Bus::new(64);
        (
            Task::new(Arc::from("t"), config, bus.clone(), task),
            bus,
        )
    }

    fn default_task() -> (Task<String>, Bus) {
        task_with(RetryOptions::default(), TaskOptions::new())
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    #[test]
    fn test_fresh_task_defaults() {
        let (task, _bus) = default_task();
        assert_eq!(task.id(), "t");
        assert_eq!(task.retries(), 0);
        assert!(task.history().is_empty());
        assert!(task.root_error().is_none());
        assert!(!task.aborted());
        assert!(task.signal().is_none());
        assert_eq!(task.current_timeout(), Duration::from_millis(500));
    }

    #[test]
    fn test_should_retry_counts_until_budget() {
        let (task, _bus) = default_task();

        assert!(task.should_retry(Some("e1".into())));
        assert!(task.should_retry(Some("e2".into())));
        assert!(task.should_retry(Some("e3".into())));
        assert!(!task.should_retry(Some("e4".into())));

        assert_eq!(task.retries(), 4);
        assert_eq!(task.history(), vec!["e1", "e2", "e3", "e4"]);
        assert_eq!(task.root_error().as_deref(), Some("e1"));
    }

    #[test]
    fn test_history_len_matches_retries() {
        let (task, _bus) = default_task();
        for n in 1..=5 {
            task.should_retry(Some(format!("e{n}")));
            assert_eq!(task.history().len() as u32, task.retries());
        }
    }

    #[test]
    fn test_retry_event_carries_history() {
        let (task, bus) = default_task();
        let mut rx = bus.subscribe();

        task.should_retry(Some("first".into()));
        task.should_retry(Some("second".into()));

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        let last = &events[1];
        assert_eq!(last.kind, EventKind::Retry);
        assert_eq!(last.task.as_deref(), Some("t"));
        assert_eq!(last.retries, Some(2));
        assert_eq!(last.error.as_deref(), Some("second"));
        let history: Vec<&str> = last.history.as_deref().unwrap().iter().map(|e| &**e).collect();
        assert_eq!(history, vec!["first", "second"]);
    }

    #[test]
    fn test_absent_error_is_clean_stop() {
        let (task, bus) = default_task();
        let mut rx = bus.subscribe();

        task.should_retry(Some("boom".into()));
        assert!(!task.should_retry(None));

        assert_eq!(task.retries(), 0);
        assert!(task.history().is_empty());
        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].retries, Some(2));
        assert!(events[1].error.is_none());
    }

    #[test]
    fn test_aborted_task_records_but_does_not_count() {
        let controller = AbortController::new();
        let (task, bus) = task_with(
            RetryOptions::default(),
            TaskOptions::new().with_signal(controller.signal()),
        );
        let mut rx = bus.subscribe();

        assert!(task.should_retry(Some("e1".into())));
        controller.abort("stop");
        assert!(!task.should_retry(Some("e2".into())));

        assert!(task.aborted());
        assert_eq!(task.retries(), 1);
        assert_eq!(task.history(), vec!["e1", "e2"]);
        assert_eq!(task.abort_reason().as_deref(), Some("stop"));

        let kinds: Vec<EventKind> = drain(&mut rx).iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Retry, EventKind::Abort]);
    }

    #[test]
    fn test_abort_listener_fires_once_and_detaches() {
        let controller = AbortController::new();
        let (task, bus) = task_with(
            RetryOptions::default(),
            TaskOptions::new().with_signal(controller.signal()),
        );
        let mut rx = bus.subscribe();

        controller.abort("first");
        controller.abort("second");

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Abort);
        assert_eq!(events[0].reason.as_deref(), Some("first"));
        assert!(task.aborted());
    }

    #[test]
    fn test_signal_already_aborted_at_pick() {
        let (task, bus) = task_with(
            RetryOptions::default(),
            TaskOptions::new().with_signal(crate::signal::AbortSignal::aborted("early")),
        );
        let mut rx = bus.subscribe();

        assert!(task.aborted());
        assert_eq!(task.abort_reason().as_deref(), Some("early"));
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_start_rejects_used_or_aborted_task() {
        let (task, _bus) = default_task();
        assert!(task.start().is_ok());

        task.should_retry(Some("boom".into()));
        assert!(matches!(
            task.start(),
            Err(RetryError::InvalidState { .. })
        ));

        task.reset();
        assert!(task.start_with(crate::signal::AbortSignal::aborted("x")).is_ok());
        assert!(task.aborted());
        assert!(matches!(
            task.start(),
            Err(RetryError::InvalidState { reason }) if reason.contains("aborted")
        ));

        task.reset();
        assert!(task.start().is_ok());
    }

    #[test]
    fn test_start_replaces_previous_signal() {
        let first = AbortController::new();
        let second = AbortController::new();
        let (task, bus) = task_with(
            RetryOptions::default(),
            TaskOptions::new().with_signal(first.signal()),
        );
        let mut rx = bus.subscribe();

        task.start_with(second.signal()).unwrap();
        first.abort("stale");
        assert!(!task.aborted());

        second.abort("fresh");
        assert!(task.aborted());
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].reason.as_deref(), Some("fresh"));
    }

    #[test]
    fn test_reset_matches_fresh_task() {
        let controller = AbortController::new();
        let (task, bus) = task_with(
            RetryOptions::default(),
            TaskOptions::new().with_signal(controller.signal()),
        );
        task.should_retry(Some("a".into()));
        task.should_retry(Some("b".into()));
        controller.abort("gone");

        task.reset();
        let (fresh, _) = default_task();
        assert_eq!(task.retries(), fresh.retries());
        assert_eq!(task.history(), fresh.history());
        assert_eq!(task.current_timeout(), fresh.current_timeout());
        assert_eq!(task.aborted(), fresh.aborted());
        assert!(task.signal().is_none());
        assert!(!task.is_waiting());

        let mut rx = bus.subscribe();
        drop(controller);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_grows_geometrically() {
        let (task, bus) = default_task();
        let mut rx = bus.subscribe();
        let cfg = RetryConfig::default();

        for n in 1..=8u32 {
            task.should_retry(Some(format!("e{n}")));
            let started = Instant::now();
            let waited_for = task.current_timeout();
            task.timeout().await.unwrap();

            assert_eq!(started.elapsed(), waited_for);
            let expected = cfg.max_timeout.min(cfg.min_timeout * 2u32.pow(n));
            assert_eq!(task.current_timeout(), expected);
            assert!(task.current_timeout() >= cfg.min_timeout);
            assert!(task.current_timeout() <= cfg.max_timeout);
        }

        let events = drain(&mut rx);
        let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
        for pair in kinds.chunks(2) {
            assert_eq!(pair, [EventKind::Retry, EventKind::Timeout]);
        }
        assert_eq!(events.last().unwrap().timeout_ms, Some(30_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sub_millisecond_min_timeout_is_a_floor() {
        let min = Duration::from_micros(1400);
        let (task, _bus) = task_with(
            RetryOptions {
                min_timeout: Some(min),
                factor: Some(1.0),
                ..Default::default()
            },
            TaskOptions::new(),
        );

        for n in 1..=3u32 {
            assert!(task.should_retry(Some(format!("e{n}"))));
            task.timeout().await.unwrap();
            assert_eq!(task.current_timeout(), min);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_measured_from_call() {
        let (task, _bus) = default_task();
        task.should_retry(Some("e".into()));

        let started = Instant::now();
        let backoff = task.timeout();
        time::sleep(Duration::from_millis(300)).await;
        backoff.await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_during_backoff_rejects_and_resets() {
        let controller = AbortController::new();
        let (task, bus) = task_with(
            RetryOptions::default(),
            TaskOptions::new().with_signal(controller.signal()),
        );
        let mut rx = bus.subscribe();
        task.should_retry(Some("e".into()));

        let backoff = tokio::spawn(task.timeout());
        time::sleep(Duration::from_millis(100)).await;
        assert!(task.is_waiting());
        controller.abort("shutting down");

        let err = backoff.await.unwrap().unwrap_err();
        assert_eq!(
            err,
            RetryError::Cancelled {
                reason: Arc::from("shutting down")
            }
        );
        assert!(!task.aborted());
        assert_eq!(task.retries(), 0);

        let kinds: Vec<EventKind> = drain(&mut rx).iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Retry, EventKind::Abort]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_on_aborted_task_fails_immediately() {
        let (task, _bus) = task_with(
            RetryOptions::default(),
            TaskOptions::new().with_signal(crate::signal::AbortSignal::aborted("done")),
        );
        let started = Instant::now();
        let err = task.timeout().await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(!task.aborted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_during_backoff_cancels_wait() {
        let (task, _bus) = default_task();
        task.should_retry(Some("e".into()));

        let backoff = tokio::spawn(task.timeout());
        time::sleep(Duration::from_millis(10)).await;
        task.reset();

        let err = backoff.await.unwrap().unwrap_err();
        assert_eq!(
            err,
            RetryError::Cancelled {
                reason: Arc::from(RESET_REASON)
            }
        );
        assert!(!task.is_waiting());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_pending_backoff_is_rejected() {
        let (task, _bus) = default_task();
        let first = task.timeout();
        let err = task.timeout().await.unwrap_err();
        assert!(matches!(err, RetryError::InvalidState { .. }));
        first.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_backoff_disarms_timer() {
        let (task, _bus) = default_task();
        let backoff = task.timeout();
        assert!(task.is_waiting());
        drop(backoff);
        assert!(!task.is_waiting());
        assert!(task.start().is_ok());
    }
}
