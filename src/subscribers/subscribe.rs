//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for observing task events. Each
//! subscriber is driven by a dedicated worker fed by a bounded queue owned by
//! the [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow; they never block the task that published
//!   the event nor other subscribers.
//! - If a subscriber's queue overflows, events for that subscriber are
//!   **dropped** and a `tracing` warning is logged.

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
///
/// # Example
/// ```rust
/// use async_trait::async_trait;
/// use retryvisor::{Event, EventKind, Subscribe};
///
/// struct Alerts;
///
/// #[async_trait]
/// impl Subscribe for Alerts {
///     async fn on_event(&self, ev: &Event) {
///         if ev.kind == EventKind::Abort {
///             // page someone...
///         }
///     }
///     fn name(&self) -> &'static str { "alerts" }
/// }
/// ```
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
