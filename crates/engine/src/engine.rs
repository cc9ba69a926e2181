//! Sequential bulk operation executor.
//!
//! [`BulkOperationEngine`] turns one [`OperationRequest`] into a
//! [`BatchResult`]. Records are processed strictly in selection order, one
//! store call at a time, so progress is monotonic and the backend never sees
//! a burst of concurrent writes. A failing record is recorded and the batch
//! moves on; only validation failures and an unreachable store abort the run.

use std::sync::Arc;

use stockpile_core::bulk_operation::{
    compute_batch_summary, compute_mutation, progress_fraction, validate_request, BatchResult,
    OperationDescriptor, OperationOutcome, OperationRequest, RecordMutation, SelectedRecord,
    ValidationError,
};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::progress::ProgressSink;
use crate::store::RecordStore;

/// Applies bulk operations through a [`RecordStore`].
///
/// The engine holds no per-run state; every `execute` call owns its own
/// accumulator, so one engine can be shared across concurrent callers.
pub struct BulkOperationEngine<S> {
    store: Arc<S>,
    config: EngineConfig,
}

impl<S: RecordStore> BulkOperationEngine<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Check every precondition of `request` without side effects.
    pub fn validate(&self, request: &OperationRequest) -> Result<(), ValidationError> {
        validate_request(request, self.config.max_batch_size)
    }

    /// Execute `request`, reporting progress to `progress`.
    ///
    /// Re-validates first. Returns `Err` only when the batch did not run.
    pub async fn execute<P>(
        &self,
        request: &OperationRequest,
        progress: &P,
    ) -> Result<BatchResult, EngineError>
    where
        P: ProgressSink + ?Sized,
    {
        self.execute_with_cancel(request, progress, &CancellationToken::new())
            .await
    }

    /// Execute `request`, stopping between records once `cancel` fires.
    ///
    /// A store call already dispatched when cancellation arrives still
    /// completes and is recorded. Records never reached are counted as
    /// unprocessed and the result is marked cancelled.
    pub async fn execute_with_cancel<P>(
        &self,
        request: &OperationRequest,
        progress: &P,
        cancel: &CancellationToken,
    ) -> Result<BatchResult, EngineError>
    where
        P: ProgressSink + ?Sized,
    {
        if let Err(err) = self.validate(request) {
            tracing::debug!(error = %err, "Bulk operation rejected");
            return Err(err.into());
        }

        let span = tracing::info_span!(
            "bulk_operation",
            kind = request.descriptor.kind(),
            records = request.selected_records.len()
        );

        async {
            if let Err(err) = self.store.ping().await {
                tracing::error!(error = %err, "Record store unreachable, bulk operation not started");
                return Err(EngineError::Store(err));
            }

            tracing::info!(reason = %request.reason, "Bulk operation started");

            let total = request.selected_records.len();
            let mut result = BatchResult::new(total);

            for (index, record) in request.selected_records.iter().enumerate() {
                if cancel.is_cancelled() {
                    result.mark_cancelled();
                    tracing::info!(
                        processed = index,
                        remaining = total - index,
                        "Bulk operation cancelled",
                    );
                    break;
                }

                let outcome = self.apply(&request.descriptor, record).await;
                if let Some(error) = &outcome.error {
                    tracing::warn!(record_id = %record.id, error = %error, "Bulk operation failed for record");
                }
                result.record(outcome);
                progress.on_progress(progress_fraction(index, total));
            }

            tracing::info!(
                succeeded = result.succeeded,
                failed = result.failed,
                skipped = result.skipped,
                unprocessed = result.unprocessed,
                status = result.status().as_str(),
                "{}",
                compute_batch_summary(&request.descriptor, &result),
            );

            Ok(result)
        }
        .instrument(span)
        .await
    }

    /// Apply the descriptor to one record. Never fails; errors become outcomes.
    async fn apply(
        &self,
        descriptor: &OperationDescriptor,
        record: &SelectedRecord,
    ) -> OperationOutcome {
        let mutation = match compute_mutation(descriptor, record) {
            Ok(mutation) => mutation,
            Err(err) => return OperationOutcome::failed(record.id.as_str(), err.to_string()),
        };

        let stored = match mutation {
            RecordMutation::Skip => return OperationOutcome::skipped(record.id.as_str()),
            RecordMutation::Update(patch) => self
                .store
                .update(&record.id, &patch)
                .await
                .map(|_| ()),
            RecordMutation::Delete => self.store.delete(&record.id).await,
        };

        match stored {
            Ok(()) => OperationOutcome::succeeded(record.id.as_str()),
            Err(err) => OperationOutcome::failed(record.id.as_str(), err.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
