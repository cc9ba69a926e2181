//! Broadcast hub for inventory events.
//!
//! Publishers never block: each subscriber gets its own cursor into a
//! bounded ring, and one that falls behind sees `RecvError::Lagged`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Ring size used by [`EventBus::default`].
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

// ---------------------------------------------------------------------------
// Event envelope
// ---------------------------------------------------------------------------

/// One published fact about the inventory or a bulk operation.
///
/// Built with [`InventoryEvent::new`], then tagged via
/// [`with_source`](InventoryEvent::with_source) and filled via
/// [`with_payload`](InventoryEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryEvent {
    /// Dotted name, such as `bulk_operation.progress`.
    pub event_type: String,

    /// Kind of entity the event concerns, e.g. `bulk_operation` or `item`.
    pub source_entity_type: Option<String>,

    /// Id of that entity: an operation id or a record id.
    pub source_entity_id: Option<String>,

    /// Event-specific JSON body. An empty object when nothing was attached.
    pub payload: serde_json::Value,

    /// Creation time (UTC).
    pub timestamp: DateTime<Utc>,
}

impl InventoryEvent {
    /// Create an untagged event with an empty payload, stamped now.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            payload: serde_json::json!({}),
            timestamp: Utc::now(),
        }
    }

    /// Tag the event with the entity it concerns.
    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id.into());
        self
    }

    /// Replace the payload.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Whether the event belongs to the `prefix` family, e.g. `bulk_operation`.
    pub fn is_in(&self, prefix: &str) -> bool {
        self.event_type
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.'))
    }
}

// ---------------------------------------------------------------------------
// Bus
// ---------------------------------------------------------------------------

/// Fan-out channel shared as `Arc<EventBus>`.
///
/// ```rust
/// use stockpile_events::bus::{EventBus, InventoryEvent};
///
/// let bus = EventBus::new(16);
/// let _rx = bus.subscribe();
/// assert_eq!(bus.publish(InventoryEvent::new("item.updated")), 1);
/// ```
pub struct EventBus {
    tx: broadcast::Sender<InventoryEvent>,
}

impl EventBus {
    /// Create a bus whose ring holds `capacity` events.
    ///
    /// Once the ring is full the oldest events are overwritten and any
    /// subscriber that had not read them lags.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Send `event` to every live subscriber and return how many got it.
    ///
    /// Zero subscribers is not an error; the event is simply discarded.
    pub fn publish(&self, event: InventoryEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Open a receiver that sees every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<InventoryEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tokio::sync::broadcast::error::RecvError;

    use super::*;

    #[tokio::test]
    async fn subscriber_sees_source_and_payload() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            InventoryEvent::new("item.updated")
                .with_source("item", "itm-42")
                .with_payload(serde_json::json!({ "field": "location_id" })),
        );

        let got = rx.recv().await.expect("event delivered");
        assert_eq!(got.event_type, "item.updated");
        assert_eq!(got.source_entity_type.as_deref(), Some("item"));
        assert_eq!(got.source_entity_id.as_deref(), Some("itm-42"));
        assert_eq!(got.payload["field"], "location_id");
    }

    #[tokio::test]
    async fn every_subscriber_gets_a_copy() {
        let bus = EventBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        assert_eq!(bus.publish(InventoryEvent::new("stock.low")), 2);
        assert_eq!(first.recv().await.unwrap().event_type, "stock.low");
        assert_eq!(second.recv().await.unwrap().event_type, "stock.low");
    }

    #[test]
    fn publishing_into_the_void_reports_zero() {
        let bus = EventBus::new(4);
        assert_eq!(bus.publish(InventoryEvent::new("nobody.listens")), 0);
    }

    #[tokio::test]
    async fn slow_subscriber_is_told_it_lagged() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for i in 0..4 {
            bus.publish(InventoryEvent::new(format!("tick.{i}")));
        }

        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(2))));
        assert_eq!(rx.recv().await.unwrap().event_type, "tick.2");
    }

    #[test]
    fn family_match_requires_dot_boundary() {
        let event = InventoryEvent::new("bulk_operation.completed");
        assert!(event.is_in("bulk_operation"));
        assert!(!event.is_in("bulk"));
        assert!(!InventoryEvent::new("bulk_operation").is_in("bulk_operation"));
    }
}
