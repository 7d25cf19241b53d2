//! # Event bus for task notifications.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. Every task
//! picked from an engine holds a clone and publishes its `retry`, `timeout`
//! and `abort` events synchronously with the state transition that caused them.
//!
//! ```text
//! Task A ──┐
//! Task B ──┼──► Bus ──► Retry::subscribe() receivers
//! Task N ──┘      └───► Retry::attach() listener ──► SubscriberSet
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never waits for observers.
//! - **Bounded capacity**: receivers that fall behind get `RecvError::Lagged(n)`.
//! - **No persistence**: events are dropped when nobody is subscribed.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for task events.
///
/// Cloning is cheap (the sender is `Arc`-backed); all clones feed the same receivers.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers; dropped if there are none.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a receiver that observes events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[test]
    fn test_publish_without_receivers_is_noop() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::Abort));
    }

    #[test]
    fn test_receivers_see_events_in_order() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();

        bus.publish(Event::new(EventKind::Retry).with_retries(1));
        bus.publish(Event::new(EventKind::Timeout).with_retries(1));

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert_eq!(first.kind, EventKind::Retry);
        assert_eq!(second.kind, EventKind::Timeout);
        assert!(second.seq > first.seq);
    }
}
