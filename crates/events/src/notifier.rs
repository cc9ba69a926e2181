//! Bulk operation notifications over the [`EventBus`].
//!
//! [`BusProgressSink`] is handed to the engine as its progress collaborator.
//! [`publish_batch_result`] announces the outcome with an event type that
//! reflects failures, so a listener can never mistake a partially failed
//! batch for a clean one.

use std::sync::Arc;

use serde_json::json;
use stockpile_core::bulk_operation::{
    compute_batch_summary, BatchResult, BatchStatus, OperationRequest,
};
use stockpile_engine::{EngineError, ProgressSink};

use crate::bus::{EventBus, InventoryEvent};

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

pub const EVENT_BULK_PROGRESS: &str = "bulk_operation.progress";
pub const EVENT_BULK_COMPLETED: &str = "bulk_operation.completed";
pub const EVENT_BULK_PARTIALLY_FAILED: &str = "bulk_operation.partially_failed";
pub const EVENT_BULK_FAILED: &str = "bulk_operation.failed";
pub const EVENT_BULK_CANCELLED: &str = "bulk_operation.cancelled";
pub const EVENT_BULK_REJECTED: &str = "bulk_operation.rejected";

/// Source entity type attached to every bulk operation event.
pub const SOURCE_BULK_OPERATION: &str = "bulk_operation";

/// Event type announcing a finished batch with the given status.
pub fn result_event_type(status: BatchStatus) -> &'static str {
    match status {
        BatchStatus::Completed => EVENT_BULK_COMPLETED,
        BatchStatus::PartiallyFailed => EVENT_BULK_PARTIALLY_FAILED,
        BatchStatus::Failed => EVENT_BULK_FAILED,
        BatchStatus::Cancelled => EVENT_BULK_CANCELLED,
    }
}

// ---------------------------------------------------------------------------
// Progress sink
// ---------------------------------------------------------------------------

/// Publishes engine progress as `bulk_operation.progress` events.
pub struct BusProgressSink {
    bus: Arc<EventBus>,
    operation_id: String,
    kind: &'static str,
}

impl BusProgressSink {
    /// Create a sink for one run of `request`, under a fresh operation id.
    pub fn new(bus: Arc<EventBus>, request: &OperationRequest) -> Self {
        Self {
            bus,
            operation_id: uuid::Uuid::new_v4().to_string(),
            kind: request.descriptor.kind(),
        }
    }

    /// Id correlating every event of this run.
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }
}

impl ProgressSink for BusProgressSink {
    fn on_progress(&self, fraction: f64) {
        let percent = (fraction * 100.0).round().clamp(0.0, 100.0) as u8;
        self.bus.publish(
            InventoryEvent::new(EVENT_BULK_PROGRESS)
                .with_source(SOURCE_BULK_OPERATION, self.operation_id.as_str())
                .with_payload(json!({
                    "kind": self.kind,
                    "fraction": fraction,
                    "percent": percent,
                })),
        );
    }
}

// ---------------------------------------------------------------------------
// Result announcements
// ---------------------------------------------------------------------------

/// Publish the outcome of a finished batch.
pub fn publish_batch_result(sink: &BusProgressSink, request: &OperationRequest, result: &BatchResult) {
    let status = result.status();
    let failures: Vec<serde_json::Value> = result
        .failures()
        .map(|o| json!({ "record_id": o.record_id, "error": o.error }))
        .collect();

    if status != BatchStatus::Completed {
        tracing::warn!(
            operation_id = %sink.operation_id,
            status = status.as_str(),
            failed = result.failed,
            unprocessed = result.unprocessed,
            "Bulk operation did not fully succeed",
        );
    }

    sink.bus.publish(
        InventoryEvent::new(result_event_type(status))
            .with_source(SOURCE_BULK_OPERATION, sink.operation_id.as_str())
            .with_payload(json!({
                "kind": sink.kind,
                "reason": request.reason,
                "status": status.as_str(),
                "summary": compute_batch_summary(&request.descriptor, result),
                "total": result.total,
                "succeeded": result.succeeded,
                "failed": result.failed,
                "skipped": result.skipped,
                "unprocessed": result.unprocessed,
                "failures": failures,
            })),
    );
}

/// Publish that a batch never ran, with the reason it was refused.
pub fn publish_rejected(sink: &BusProgressSink, error: &EngineError) {
    let code = match error {
        EngineError::Validation(_) => "validation",
        EngineError::Store(_) => "store_unavailable",
    };
    sink.bus.publish(
        InventoryEvent::new(EVENT_BULK_REJECTED)
            .with_source(SOURCE_BULK_OPERATION, sink.operation_id.as_str())
            .with_payload(json!({
                "kind": sink.kind,
                "code": code,
                "error": error.to_string(),
            })),
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
