//! Stockpile event bus and bulk operation notifications.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`InventoryEvent`]: the domain event envelope.
//! - [`BusProgressSink`]: the notifier the bulk engine reports to; turns
//!   progress and batch results into events for whatever UI is listening.

pub mod bus;
pub mod notifier;

pub use bus::{EventBus, InventoryEvent};
pub use notifier::{publish_batch_result, publish_rejected, BusProgressSink};
