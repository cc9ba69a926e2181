//! Data-access collaborator interface.
//!
//! Defines [`RecordStore`], the CRUD seam the engine calls into, and
//! [`StoreError`], the failures a store may report.

use std::future::Future;

use stockpile_core::inventory::{InventoryItem, NewInventoryItem, RecordPatch};
use stockpile_core::types::RecordId;

/// Errors reported by a [`RecordStore`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No record exists under the given id.
    #[error("Record not found: {0}")]
    NotFound(RecordId),
    /// The store refused the change (foreign key, check constraint, ...).
    #[error("Constraint violation: {0}")]
    Constraint(String),
    /// The store cannot be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    /// Any other store-side failure.
    #[error("Store error: {0}")]
    Internal(String),
}

/// CRUD access to inventory records, provided by the host application.
///
/// Each call is independent; the store owns any server-side concurrency
/// control.
pub trait RecordStore: Send + Sync {
    /// Check that the store is reachable.
    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Create a record from `fields`, returning it with its assigned id.
    fn create(
        &self,
        fields: NewInventoryItem,
    ) -> impl Future<Output = Result<InventoryItem, StoreError>> + Send;

    /// Apply `patch` to the record `id`, returning the updated record.
    fn update(
        &self,
        id: &str,
        patch: &RecordPatch,
    ) -> impl Future<Output = Result<InventoryItem, StoreError>> + Send;

    /// Remove the record `id`.
    fn delete(&self, id: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}
