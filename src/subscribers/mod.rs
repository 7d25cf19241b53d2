//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! that fans events out to subscriber workers.
//!
//! ## Architecture
//! ```text
//!   Task ── publish(Event) ──► Bus ──► Retry::attach() listener ──► SubscriberSet
//!                                                                     │
//!                                                       ┌─────────────┼──────────┐
//!                                                       ▼             ▼          ▼
//!                                                   LogWriter      Metrics    Custom
//! ```
//!
//! `LogWriter` is exported with the `logging` feature.

mod set;
mod subscribe;

#[cfg(any(feature = "logging", test))]
mod log;

#[cfg(any(feature = "logging", test))]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
