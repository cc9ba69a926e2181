use stockpile_core::bulk_operation::ValidationError;
use stockpile_core::error::CoreError;

use crate::store::StoreError;

/// Errors that abort a bulk operation before any record is processed.
///
/// Per-record store failures never surface here; they are captured in the
/// batch result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// The request failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The record store could not be reached; the batch did not run.
    #[error("Record store unavailable: {0}")]
    Store(#[source] StoreError),
}

impl From<EngineError> for CoreError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation(v) => v.into(),
            EngineError::Store(s) => CoreError::Internal(s.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_is_transparent() {
        let err = EngineError::from(ValidationError::EmptySelection);
        assert_eq!(err.to_string(), "At least one record must be selected");
    }

    #[test]
    fn store_error_maps_to_internal_core_error() {
        let err = EngineError::Store(StoreError::Unavailable("connection refused".into()));
        let core: CoreError = err.into();
        assert!(matches!(core, CoreError::Internal(msg) if msg.contains("connection refused")));
    }
}
