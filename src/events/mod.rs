//! Task events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: [`Task`](crate::Task) primitives (`should_retry`,
//!   `timeout`, the abort listener).
//! - **Consumers**: receivers from [`Retry::subscribe`](crate::Retry::subscribe)
//!   and the listener spawned by [`Retry::attach`](crate::Retry::attach).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
