//! Bulk inventory operation engine.
//!
//! Applies a validated [`OperationRequest`](stockpile_core::bulk_operation::OperationRequest)
//! record by record through an injected [`RecordStore`], reporting progress
//! to an injected [`ProgressSink`] and returning a
//! [`BatchResult`](stockpile_core::bulk_operation::BatchResult).
//!
//! - [`BulkOperationEngine`]: sequential best-effort batch executor.
//! - [`RecordStore`]: the data-access collaborator.
//! - [`MemoryRecordStore`]: in-process store for tests and the runner.
//! - [`EngineConfig`]: limits loaded from the environment.

pub mod config;
pub mod engine;
pub mod error;
pub mod memory;
pub mod progress;
pub mod store;

pub use config::EngineConfig;
pub use engine::BulkOperationEngine;
pub use error::EngineError;
pub use memory::MemoryRecordStore;
pub use progress::{NoopProgress, ProgressSink};
pub use store::{RecordStore, StoreError};
