//! `stockpile-bulk` -- applies one bulk operation to an inventory snapshot.
//!
//! Reads the snapshot and the request from JSON files, runs the request
//! through the bulk operation engine, logs every published event and prints
//! the batch result as JSON on stdout. Ctrl-C cancels between records.
//!
//! Exits `0` when every record succeeded, `2` when the batch ran but some
//! records failed or were left unprocessed, and `1` when it never ran.
//!
//! # Environment variables
//!
//! | Variable              | Required | Default | Description                              |
//! |-----------------------|----------|---------|------------------------------------------|
//! | `INVENTORY_FILE`      | yes      | --      | JSON array of inventory items            |
//! | `BULK_REQUEST_FILE`   | yes      | --      | JSON operation request                   |
//! | `BULK_MAX_BATCH_SIZE` | no       | `1000`  | Largest selection a request may carry    |
//! | `RUST_LOG`            | no       | `stockpile_runner=info,stockpile_engine=info` | Log filter |

use std::sync::Arc;

use stockpile_engine::EngineConfig;
use stockpile_events::EventBus;
use stockpile_runner::{join_event_logger, load_inputs, run, spawn_event_logger, RunnerConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EXIT_REJECTED: i32 = 1;
const EXIT_INCOMPLETE: i32 = 2;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockpile_runner=info,stockpile_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = RunnerConfig::from_env().unwrap_or_else(|err| {
        tracing::error!(error = %err, "Invalid configuration");
        std::process::exit(EXIT_REJECTED);
    });
    let engine_config = EngineConfig::from_env();

    let (items, request) = load_inputs(&config).unwrap_or_else(|err| {
        tracing::error!(error = %format!("{err:#}"), "Failed to load inputs");
        std::process::exit(EXIT_REJECTED);
    });

    tracing::info!(
        items = items.len(),
        max_batch_size = engine_config.max_batch_size,
        "Starting stockpile-bulk",
    );

    let bus = Arc::new(EventBus::default());
    let logger = spawn_event_logger(&bus);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, cancelling after the current record");
                cancel.cancel();
            }
        });
    }

    let outcome = run(items, &request, engine_config, Arc::clone(&bus), &cancel).await;

    // Close the bus so the logger drains what is left and exits.
    drop(bus);
    join_event_logger(logger).await;

    let result = match outcome {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "Bulk operation rejected");
            std::process::exit(EXIT_REJECTED);
        }
    };

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{json}"),
        Err(err) => tracing::error!(error = %err, "Failed to serialize batch result"),
    }

    if !result.is_full_success() {
        std::process::exit(EXIT_INCOMPLETE);
    }
}
