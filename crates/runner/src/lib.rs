//! Command-line driver for the bulk operation engine.
//!
//! Loads an inventory snapshot and an operation request from JSON files,
//! applies the request to an in-memory store and reports through the event
//! bus. The `stockpile-bulk` binary wires [`RunnerConfig::from_env`],
//! [`load_inputs`] and [`run`] together.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use stockpile_core::bulk_operation::{BatchResult, OperationRequest};
use stockpile_core::error::CoreError;
use stockpile_core::inventory::InventoryItem;
use stockpile_engine::{BulkOperationEngine, EngineConfig, MemoryRecordStore};
use stockpile_events::notifier::SOURCE_BULK_OPERATION;
use stockpile_events::{publish_batch_result, publish_rejected, BusProgressSink, EventBus};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// File locations for one runner invocation.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub inventory_file: PathBuf,
    pub request_file: PathBuf,
}

impl RunnerConfig {
    /// Read `INVENTORY_FILE` and `BULK_REQUEST_FILE`; both are required.
    pub fn from_env() -> anyhow::Result<Self> {
        let inventory_file = std::env::var("INVENTORY_FILE")
            .context("INVENTORY_FILE environment variable is required")?;
        let request_file = std::env::var("BULK_REQUEST_FILE")
            .context("BULK_REQUEST_FILE environment variable is required")?;

        Ok(Self {
            inventory_file: inventory_file.into(),
            request_file: request_file.into(),
        })
    }
}

// ---------------------------------------------------------------------------
// Input loading
// ---------------------------------------------------------------------------

/// Parse an inventory snapshot: a JSON array of items.
pub fn parse_inventory(json: &str) -> anyhow::Result<Vec<InventoryItem>> {
    serde_json::from_str(json).context("inventory is not a valid JSON array of items")
}

/// Parse a bulk operation request.
pub fn parse_request(json: &str) -> anyhow::Result<OperationRequest> {
    serde_json::from_str(json).context("bulk request is not a valid operation request")
}

fn read_input<T>(
    path: &Path,
    parse: fn(&str) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse(&raw).with_context(|| format!("in {}", path.display()))
}

/// Load both input files named by `config`.
pub fn load_inputs(config: &RunnerConfig) -> anyhow::Result<(Vec<InventoryItem>, OperationRequest)> {
    let items = read_input(&config.inventory_file, parse_inventory)?;
    let request = read_input(&config.request_file, parse_request)?;
    Ok((items, request))
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Apply `request` to a store seeded with `items`.
///
/// Progress and the final result are published on `bus`. A request the
/// engine refuses is published as a rejection and returned as `Err`.
pub async fn run(
    items: Vec<InventoryItem>,
    request: &OperationRequest,
    engine_config: EngineConfig,
    bus: Arc<EventBus>,
    cancel: &CancellationToken,
) -> anyhow::Result<BatchResult> {
    let store = Arc::new(MemoryRecordStore::with_items(items));
    let engine = BulkOperationEngine::new(store, engine_config);
    let sink = BusProgressSink::new(bus, request);

    tracing::info!(
        operation_id = sink.operation_id(),
        kind = request.descriptor.kind(),
        records = request.selected_records.len(),
        max_batch_size = engine.config().max_batch_size,
        "Running bulk operation",
    );

    match engine.execute_with_cancel(request, &sink, cancel).await {
        Ok(result) => {
            publish_batch_result(&sink, request, &result);
            tracing::info!(
                remaining_records = engine.store().len().await,
                "Store state after bulk operation",
            );
            Ok(result)
        }
        Err(err) => {
            publish_rejected(&sink, &err);
            Err(anyhow::Error::new(CoreError::from(err)).context("bulk operation was not run"))
        }
    }
}

/// Log every event published on `bus` until the bus is dropped.
pub fn spawn_event_logger(bus: &EventBus) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) if event.is_in(SOURCE_BULK_OPERATION) => tracing::info!(
                    event_type = %event.event_type,
                    operation_id = event.source_entity_id.as_deref().unwrap_or("-"),
                    payload = %event.payload,
                    "Event",
                ),
                Ok(event) => tracing::debug!(event_type = %event.event_type, "Event"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event logger lagged behind the bus");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Wait for the logger to drain. Returns `false` if it panicked or was aborted.
pub async fn join_event_logger(handle: JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "Event logger stopped abnormally");
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
