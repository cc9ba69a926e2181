//! Bulk inventory operation types, validation and pure computation.
//!
//! Describes what a bulk operation does ([`OperationDescriptor`]), what the
//! user asked for ([`OperationRequest`]), how each selected record is
//! mutated ([`compute_mutation`]) and how per-record outcomes aggregate into
//! a [`BatchResult`]. Nothing here touches a store; the async engine that
//! applies mutations lives in `stockpile-engine`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::inventory::{InventoryItem, ItemStatus, RecordPatch};
use crate::money::{decimal_from_f64, round_money};
use crate::types::RecordId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of records per bulk operation.
pub const MAX_BATCH_SIZE: usize = 1000;

/// Smallest percentage change accepted (a full discount).
pub const MIN_PERCENTAGE_CHANGE: f64 = -100.0;

pub const OP_PRICE_UPDATE: &str = "price_update";
pub const OP_CATEGORY_CHANGE: &str = "category_change";
pub const OP_LOCATION_TRANSFER: &str = "location_transfer";
pub const OP_STATUS_CHANGE: &str = "status_change";
pub const OP_DELETE: &str = "delete";
pub const OP_ARCHIVE: &str = "archive";


// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons a bulk operation request is rejected before any record is touched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("A reason is required for bulk operations")]
    MissingReason,

    #[error("Deleting records requires explicit confirmation")]
    MissingConfirmation,

    #[error("At least one record must be selected")]
    EmptySelection,

    #[error("Batch size {count} exceeds maximum of {max}")]
    BatchTooLarge { count: usize, max: usize },

    #[error("Invalid numeric input: {0}")]
    InvalidNumericInput(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// A record picked in the view, with the display fields the engine needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedRecord {
    pub id: RecordId,
    pub name: String,
    pub quantity: i64,
    pub unit_value: Decimal,
    #[serde(default)]
    pub category_id: Option<String>,
}

impl From<&InventoryItem> for SelectedRecord {
    fn from(item: &InventoryItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
            unit_value: item.unit_price,
            category_id: item.category_id.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// How a price update interprets its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceMode {
    /// Set every price to the given amount.
    Fixed,
    /// Scale every price by the given percentage (negative is a discount).
    Percentage,
}

/// Which of the selected records a price update applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceScope {
    #[default]
    All,
    Category { category_id: String },
}

impl PriceScope {
    /// Whether a record in `category_id` falls inside this scope.
    pub fn includes(&self, category_id: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Category { category_id: scoped } => category_id == Some(scoped.as_str()),
        }
    }
}

/// The mutation a bulk operation applies. Exactly one variant per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperationDescriptor {
    PriceUpdate {
        mode: PriceMode,
        value: f64,
        #[serde(default)]
        scope: PriceScope,
    },
    CategoryChange {
        new_category_id: String,
    },
    LocationTransfer {
        new_location_id: String,
    },
    StatusChange {
        new_status: ItemStatus,
    },
    Delete,
    Archive,
}

impl OperationDescriptor {
    /// Stable kind string, used in logs and event names.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PriceUpdate { .. } => OP_PRICE_UPDATE,
            Self::CategoryChange { .. } => OP_CATEGORY_CHANGE,
            Self::LocationTransfer { .. } => OP_LOCATION_TRANSFER,
            Self::StatusChange { .. } => OP_STATUS_CHANGE,
            Self::Delete => OP_DELETE,
            Self::Archive => OP_ARCHIVE,
        }
    }

    /// Only deletion is irreversible and needs the user's explicit confirmation.
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, Self::Delete)
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// One user-initiated bulk action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRequest {
    pub selected_records: Vec<SelectedRecord>,
    pub descriptor: OperationDescriptor,
    pub reason: String,
    #[serde(default)]
    pub confirmed: bool,
}

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Validate a request against every precondition of a bulk operation.
///
/// Checks run in a fixed order: confirmation, selection, batch size,
/// reason, then descriptor parameters. The first failure is returned.
pub fn validate_request(
    request: &OperationRequest,
    max_batch_size: usize,
) -> Result<(), ValidationError> {
    if request.descriptor.requires_confirmation() && !request.confirmed {
        return Err(ValidationError::MissingConfirmation);
    }
    validate_selection_size(request.selected_records.len(), max_batch_size)?;
    validate_reason(&request.reason)?;
    validate_descriptor(&request.descriptor)
}

/// Validate that the selection is non-empty and within `max_batch_size`.
pub fn validate_selection_size(count: usize, max_batch_size: usize) -> Result<(), ValidationError> {
    if count == 0 {
        return Err(ValidationError::EmptySelection);
    }
    if count > max_batch_size {
        return Err(ValidationError::BatchTooLarge {
            count,
            max: max_batch_size,
        });
    }
    Ok(())
}

/// Validate that a reason was given. Whitespace alone does not count.
pub fn validate_reason(reason: &str) -> Result<(), ValidationError> {
    if reason.trim().is_empty() {
        return Err(ValidationError::MissingReason);
    }
    Ok(())
}

/// Validate the parameters carried by a descriptor.
pub fn validate_descriptor(descriptor: &OperationDescriptor) -> Result<(), ValidationError> {
    match descriptor {
        OperationDescriptor::PriceUpdate { mode, value, scope } => {
            validate_price_value(*mode, *value)?;
            if let PriceScope::Category { category_id } = scope {
                require_target(category_id, "scope category id")?;
            }
            Ok(())
        }
        OperationDescriptor::CategoryChange { new_category_id } => {
            require_target(new_category_id, "new category id")
        }
        OperationDescriptor::LocationTransfer { new_location_id } => {
            require_target(new_location_id, "new location id")
        }
        OperationDescriptor::StatusChange { .. }
        | OperationDescriptor::Delete
        | OperationDescriptor::Archive => Ok(()),
    }
}

/// Validate a price-update value for the given mode.
pub fn validate_price_value(mode: PriceMode, value: f64) -> Result<(), ValidationError> {
    price_value_decimal(mode, value).map(|_| ())
}

/// Check `value` for `mode` and convert it to a [`Decimal`].
fn price_value_decimal(mode: PriceMode, value: f64) -> Result<Decimal, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidNumericInput(format!(
            "price value must be a finite number, got {value}"
        )));
    }
    match mode {
        PriceMode::Fixed if value < 0.0 => {
            return Err(ValidationError::InvalidNumericInput(format!(
                "fixed price must not be negative, got {value}"
            )))
        }
        PriceMode::Percentage if value < MIN_PERCENTAGE_CHANGE => {
            return Err(ValidationError::InvalidNumericInput(format!(
                "percentage change must be at least {MIN_PERCENTAGE_CHANGE}, got {value}"
            )))
        }
        _ => {}
    }
    decimal_from_f64(value, "price value").map_err(|_| {
        ValidationError::InvalidNumericInput(format!(
            "price value {value} is out of range for a monetary amount"
        ))
    })
}

fn require_target(id: &str, what: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        return Err(ValidationError::InvalidTarget(format!(
            "{what} must not be empty"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Computation functions
// ---------------------------------------------------------------------------

/// What the engine must do to one record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordMutation {
    /// Replace the fields set on the patch.
    Update(RecordPatch),
    /// Remove the record.
    Delete,
    /// Leave the record alone; it falls outside the operation's scope.
    Skip,
}

/// Compute the new unit price for a price update.
///
/// Fixed mode sets the price outright. Percentage mode scales the current
/// price by `1 + value / 100`. Both round half-up to cents and never go
/// below zero.
pub fn compute_new_price(
    mode: PriceMode,
    value: f64,
    current_price: Decimal,
) -> Result<Decimal, ValidationError> {
    let value = price_value_decimal(mode, value)?;

    let new_price = match mode {
        PriceMode::Fixed => value,
        PriceMode::Percentage => value
            .checked_div(Decimal::ONE_HUNDRED)
            .and_then(|fraction| Decimal::ONE.checked_add(fraction))
            .and_then(|factor| current_price.checked_mul(factor))
            .ok_or_else(|| {
                ValidationError::InvalidNumericInput(format!(
                    "a {value}% change on {current_price} is out of range"
                ))
            })?,
    };
    Ok(round_money(new_price).max(Decimal::ZERO))
}

/// Compute the mutation `descriptor` applies to `record`.
pub fn compute_mutation(
    descriptor: &OperationDescriptor,
    record: &SelectedRecord,
) -> Result<RecordMutation, ValidationError> {
    let patch = match descriptor {
        OperationDescriptor::PriceUpdate { mode, value, scope } => {
            if !scope.includes(record.category_id.as_deref()) {
                return Ok(RecordMutation::Skip);
            }
            RecordPatch {
                unit_price: Some(compute_new_price(*mode, *value, record.unit_value)?),
                ..Default::default()
            }
        }
        OperationDescriptor::CategoryChange { new_category_id } => RecordPatch {
            category_id: Some(new_category_id.clone()),
            ..Default::default()
        },
        OperationDescriptor::LocationTransfer { new_location_id } => RecordPatch {
            location_id: Some(new_location_id.clone()),
            ..Default::default()
        },
        OperationDescriptor::StatusChange { new_status } => RecordPatch {
            status: Some(*new_status),
            ..Default::default()
        },
        OperationDescriptor::Archive => RecordPatch {
            status: Some(ItemStatus::Archived),
            ..Default::default()
        },
        OperationDescriptor::Delete => return Ok(RecordMutation::Delete),
    };
    Ok(RecordMutation::Update(patch))
}

/// Fraction of the batch done after processing the record at `index`.
pub fn progress_fraction(index: usize, total: usize) -> f64 {
    if total == 0 {
        return 1.0;
    }
    (index + 1) as f64 / total as f64
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of applying the operation to one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationOutcome {
    pub record_id: RecordId,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Out of the operation's scope; no store call was made.
    #[serde(default)]
    pub skipped: bool,
}

impl OperationOutcome {
    pub fn succeeded(record_id: impl Into<RecordId>) -> Self {
        Self {
            record_id: record_id.into(),
            success: true,
            error: None,
            skipped: false,
        }
    }

    pub fn skipped(record_id: impl Into<RecordId>) -> Self {
        Self {
            record_id: record_id.into(),
            success: true,
            error: None,
            skipped: true,
        }
    }

    pub fn failed(record_id: impl Into<RecordId>, error: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            success: false,
            error: Some(error.into()),
            skipped: false,
        }
    }
}

/// Overall status of a finished batch, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Completed,
    PartiallyFailed,
    Failed,
    Cancelled,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::PartiallyFailed => "partially_failed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Aggregated outcomes of one `execute` call.
///
/// Invariant: `succeeded + failed + unprocessed == total`, and `outcomes`
/// holds one entry per processed record in selection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub unprocessed: usize,
    pub cancelled: bool,
    pub outcomes: Vec<OperationOutcome>,
}

impl BatchResult {
    /// Start an empty accumulator for a batch of `total` records.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            unprocessed: total,
            cancelled: false,
            outcomes: Vec::with_capacity(total),
        }
    }

    /// Record one processed record's outcome.
    pub fn record(&mut self, outcome: OperationOutcome) {
        if outcome.success {
            self.succeeded += 1;
            if outcome.skipped {
                self.skipped += 1;
            }
        } else {
            self.failed += 1;
        }
        self.unprocessed = self.unprocessed.saturating_sub(1);
        self.outcomes.push(outcome);
    }

    /// Mark the batch as stopped early; remaining records stay unprocessed.
    pub fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    pub fn status(&self) -> BatchStatus {
        if self.cancelled {
            BatchStatus::Cancelled
        } else if self.failed == 0 {
            BatchStatus::Completed
        } else if self.succeeded == 0 {
            BatchStatus::Failed
        } else {
            BatchStatus::PartiallyFailed
        }
    }

    /// True only when every record was processed and none failed.
    pub fn is_full_success(&self) -> bool {
        self.status() == BatchStatus::Completed
    }

    /// Outcomes of the records that failed.
    pub fn failures(&self) -> impl Iterator<Item = &OperationOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }
}

/// Compute a human-readable summary for a finished batch.
pub fn compute_batch_summary(descriptor: &OperationDescriptor, result: &BatchResult) -> String {
    let applied = result.succeeded - result.skipped;
    let action = match descriptor {
        OperationDescriptor::PriceUpdate { .. } => {
            format!("Updated prices for {applied} of {} items", result.total)
        }
        OperationDescriptor::CategoryChange { new_category_id } => format!(
            "Moved {applied} of {} items to category '{new_category_id}'",
            result.total
        ),
        OperationDescriptor::LocationTransfer { new_location_id } => format!(
            "Transferred {applied} of {} items to location '{new_location_id}'",
            result.total
        ),
        OperationDescriptor::StatusChange { new_status } => format!(
            "Set status '{}' on {applied} of {} items",
            new_status.as_str(),
            result.total
        ),
        OperationDescriptor::Delete => format!("Deleted {applied} of {} items", result.total),
        OperationDescriptor::Archive => format!("Archived {applied} of {} items", result.total),
    };

    let mut notes = Vec::new();
    if result.skipped > 0 {
        notes.push(format!("{} out of scope", result.skipped));
    }
    if result.failed > 0 {
        notes.push(format!("{} failed", result.failed));
    }
    if result.cancelled {
        notes.push(format!("cancelled with {} not processed", result.unprocessed));
    }

    if notes.is_empty() {
        action
    } else {
        format!("{action} ({})", notes.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    use super::*;

    fn record(id: &str, price: Decimal) -> SelectedRecord {
        SelectedRecord {
            id: id.to_string(),
            name: format!("Item {id}"),
            quantity: 5,
            unit_value: price,
            category_id: Some("cat-1".to_string()),
        }
    }

    fn request(count: usize, descriptor: OperationDescriptor) -> OperationRequest {
        OperationRequest {
            selected_records: (0..count)
                .map(|i| record(&format!("itm-{i}"), dec!(10)))
                .collect(),
            descriptor,
            reason: "reorg".to_string(),
            confirmed: false,
        }
    }

    fn all_descriptors() -> Vec<OperationDescriptor> {
        vec![
            OperationDescriptor::PriceUpdate {
                mode: PriceMode::Fixed,
                value: 5.0,
                scope: PriceScope::All,
            },
            OperationDescriptor::CategoryChange {
                new_category_id: "cat-2".to_string(),
            },
            OperationDescriptor::LocationTransfer {
                new_location_id: "loc-2".to_string(),
            },
            OperationDescriptor::StatusChange {
                new_status: ItemStatus::Inactive,
            },
            OperationDescriptor::Delete,
            OperationDescriptor::Archive,
        ]
    }

    // -- validate_request -----------------------------------------------------

    #[test]
    fn empty_selection_rejected_for_every_descriptor() {
        for descriptor in all_descriptors() {
            let mut req = request(0, descriptor);
            req.confirmed = true;
            assert_eq!(
                validate_request(&req, MAX_BATCH_SIZE),
                Err(ValidationError::EmptySelection)
            );
        }
    }

    #[test]
    fn delete_without_confirmation_rejected_regardless_of_other_fields() {
        let mut req = request(0, OperationDescriptor::Delete);
        req.reason = String::new();
        assert_eq!(
            validate_request(&req, MAX_BATCH_SIZE),
            Err(ValidationError::MissingConfirmation)
        );

        let req = request(2, OperationDescriptor::Delete);
        assert_eq!(
            validate_request(&req, MAX_BATCH_SIZE),
            Err(ValidationError::MissingConfirmation)
        );
    }

    #[test]
    fn confirmed_delete_accepted() {
        let mut req = request(2, OperationDescriptor::Delete);
        req.confirmed = true;
        assert!(validate_request(&req, MAX_BATCH_SIZE).is_ok());
    }

    #[test]
    fn archive_does_not_need_confirmation() {
        let req = request(2, OperationDescriptor::Archive);
        assert!(validate_request(&req, MAX_BATCH_SIZE).is_ok());
    }

    #[test]
    fn missing_reason_rejected() {
        let mut req = request(1, OperationDescriptor::Archive);
        req.reason = String::new();
        assert_eq!(
            validate_request(&req, MAX_BATCH_SIZE),
            Err(ValidationError::MissingReason)
        );
        req.reason = "   ".to_string();
        assert_eq!(
            validate_request(&req, MAX_BATCH_SIZE),
            Err(ValidationError::MissingReason)
        );
    }

    #[test]
    fn oversized_batch_rejected() {
        let req = request(3, OperationDescriptor::Archive);
        assert_eq!(
            validate_request(&req, 2),
            Err(ValidationError::BatchTooLarge { count: 3, max: 2 })
        );
    }

    #[test]
    fn negative_fixed_price_rejected() {
        let mut req = request(
            1,
            OperationDescriptor::PriceUpdate {
                mode: PriceMode::Fixed,
                value: -5.0,
                scope: PriceScope::All,
            },
        );
        req.selected_records[0].unit_value = dec!(100);
        assert_matches!(
            validate_request(&req, MAX_BATCH_SIZE),
            Err(ValidationError::InvalidNumericInput(_))
        );
    }

    #[test]
    fn non_finite_price_rejected() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            for mode in [PriceMode::Fixed, PriceMode::Percentage] {
                assert_matches!(
                    validate_price_value(mode, value),
                    Err(ValidationError::InvalidNumericInput(_))
                );
            }
        }
    }

    #[test]
    fn percentage_below_full_discount_rejected() {
        assert!(validate_price_value(PriceMode::Percentage, -100.0).is_ok());
        assert_matches!(
            validate_price_value(PriceMode::Percentage, -100.5),
            Err(ValidationError::InvalidNumericInput(_))
        );
    }

    #[test]
    fn empty_target_ids_rejected() {
        let descriptor = OperationDescriptor::CategoryChange {
            new_category_id: " ".to_string(),
        };
        assert_matches!(
            validate_descriptor(&descriptor),
            Err(ValidationError::InvalidTarget(_))
        );

        let descriptor = OperationDescriptor::PriceUpdate {
            mode: PriceMode::Percentage,
            value: 5.0,
            scope: PriceScope::Category {
                category_id: String::new(),
            },
        };
        assert_matches!(
            validate_descriptor(&descriptor),
            Err(ValidationError::InvalidTarget(_))
        );
    }

    // -- compute_new_price ----------------------------------------------------

    #[test]
    fn full_discount_floors_at_zero() {
        for current in [dec!(0.01), dec!(10.99), dec!(100), dec!(123456.78)] {
            let price = compute_new_price(PriceMode::Percentage, -100.0, current).unwrap();
            assert_eq!(price, Decimal::ZERO);
        }
    }

    #[test]
    fn percentage_rounds_half_up() {
        let price = compute_new_price(PriceMode::Percentage, 10.0, dec!(10.99)).unwrap();
        assert_eq!(price, dec!(12.09));
    }

    #[test]
    fn percentage_discount() {
        let price = compute_new_price(PriceMode::Percentage, -25.0, dec!(80)).unwrap();
        assert_eq!(price, dec!(60));
    }

    #[test]
    fn fixed_price_ignores_current() {
        let price = compute_new_price(PriceMode::Fixed, 19.999, dec!(3)).unwrap();
        assert_eq!(price, dec!(20.00));
    }

    #[test]
    fn fixed_negative_is_an_error() {
        assert!(compute_new_price(PriceMode::Fixed, -0.01, dec!(3)).is_err());
    }

    #[test]
    fn unrepresentable_price_value_rejected_up_front() {
        for mode in [PriceMode::Fixed, PriceMode::Percentage] {
            assert_matches!(
                validate_price_value(mode, 1e30),
                Err(ValidationError::InvalidNumericInput(_))
            );
        }
    }

    #[test]
    fn overflowing_percentage_is_an_error_not_a_panic() {
        assert!(validate_price_value(PriceMode::Percentage, 1e28).is_ok());
        assert_matches!(
            compute_new_price(PriceMode::Percentage, 1e28, dec!(1000)),
            Err(ValidationError::InvalidNumericInput(_))
        );
    }

    // -- compute_mutation -----------------------------------------------------

    #[test]
    fn category_change_replaces_category() {
        let descriptor = OperationDescriptor::CategoryChange {
            new_category_id: "cat-2".to_string(),
        };
        let mutation = compute_mutation(&descriptor, &record("a", dec!(1))).unwrap();
        assert_matches!(mutation, RecordMutation::Update(patch) => {
            assert_eq!(patch.category_id.as_deref(), Some("cat-2"));
            assert!(patch.unit_price.is_none());
        });
    }

    #[test]
    fn location_transfer_replaces_location() {
        let descriptor = OperationDescriptor::LocationTransfer {
            new_location_id: "loc-7".to_string(),
        };
        let mutation = compute_mutation(&descriptor, &record("a", dec!(1))).unwrap();
        assert_matches!(mutation, RecordMutation::Update(patch) => {
            assert_eq!(patch.location_id.as_deref(), Some("loc-7"));
        });
    }

    #[test]
    fn archive_is_status_change_to_archived() {
        let archive = compute_mutation(&OperationDescriptor::Archive, &record("a", dec!(1))).unwrap();
        let status = compute_mutation(
            &OperationDescriptor::StatusChange {
                new_status: ItemStatus::Archived,
            },
            &record("a", dec!(1)),
        )
        .unwrap();
        assert_eq!(archive, status);
    }

    #[test]
    fn delete_has_no_payload() {
        let mutation = compute_mutation(&OperationDescriptor::Delete, &record("a", dec!(1))).unwrap();
        assert_eq!(mutation, RecordMutation::Delete);
    }

    #[test]
    fn price_update_outside_scope_is_skipped() {
        let descriptor = OperationDescriptor::PriceUpdate {
            mode: PriceMode::Percentage,
            value: 10.0,
            scope: PriceScope::Category {
                category_id: "cat-9".to_string(),
            },
        };
        let mutation = compute_mutation(&descriptor, &record("a", dec!(10))).unwrap();
        assert_eq!(mutation, RecordMutation::Skip);

        let mut in_scope = record("b", dec!(10));
        in_scope.category_id = Some("cat-9".to_string());
        let mutation = compute_mutation(&descriptor, &in_scope).unwrap();
        assert_matches!(mutation, RecordMutation::Update(patch) => {
            assert_eq!(patch.unit_price, Some(dec!(11)));
        });
    }

    // -- progress_fraction ----------------------------------------------------

    #[test]
    fn progress_is_index_plus_one_over_total() {
        assert_eq!(progress_fraction(0, 4), 0.25);
        assert_eq!(progress_fraction(3, 4), 1.0);
    }

    // -- BatchResult ----------------------------------------------------------

    #[test]
    fn batch_result_counts_outcomes() {
        let mut result = BatchResult::new(4);
        result.record(OperationOutcome::succeeded("a"));
        result.record(OperationOutcome::failed("b", "not found"));
        result.record(OperationOutcome::skipped("c"));
        result.record(OperationOutcome::succeeded("d"));

        assert_eq!(result.total, 4);
        assert_eq!(result.succeeded, 3);
        assert_eq!(result.failed, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.unprocessed, 0);
        assert_eq!(result.status(), BatchStatus::PartiallyFailed);
        assert!(!result.is_full_success());
        assert_eq!(result.failures().count(), 1);
    }

    #[test]
    fn batch_with_only_failures_is_failed() {
        let mut result = BatchResult::new(2);
        result.record(OperationOutcome::failed("a", "x"));
        result.record(OperationOutcome::failed("b", "y"));
        assert_eq!(result.status(), BatchStatus::Failed);
    }

    #[test]
    fn cancelled_batch_keeps_unprocessed_count() {
        let mut result = BatchResult::new(3);
        result.record(OperationOutcome::succeeded("a"));
        result.mark_cancelled();
        assert_eq!(result.unprocessed, 2);
        assert_eq!(result.status(), BatchStatus::Cancelled);
        assert_eq!(result.succeeded + result.failed + result.unprocessed, result.total);
    }

    // -- compute_batch_summary ------------------------------------------------

    #[test]
    fn summary_full_success() {
        let mut result = BatchResult::new(3);
        for id in ["a", "b", "c"] {
            result.record(OperationOutcome::succeeded(id));
        }
        let summary = compute_batch_summary(&OperationDescriptor::Archive, &result);
        assert_eq!(summary, "Archived 3 of 3 items");
    }

    #[test]
    fn summary_mentions_failures() {
        let mut result = BatchResult::new(2);
        result.record(OperationOutcome::succeeded("a"));
        result.record(OperationOutcome::failed("b", "fk violation"));
        let summary = compute_batch_summary(
            &OperationDescriptor::CategoryChange {
                new_category_id: "cat-2".to_string(),
            },
            &result,
        );
        assert_eq!(summary, "Moved 1 of 2 items to category 'cat-2' (1 failed)");
    }

    // -- Serde ----------------------------------------------------------------

    #[test]
    fn descriptor_deserializes_from_tagged_json() {
        let json = serde_json::json!({
            "type": "price_update",
            "mode": "percentage",
            "value": -10.0,
        });
        let descriptor: OperationDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(
            descriptor,
            OperationDescriptor::PriceUpdate {
                mode: PriceMode::Percentage,
                value: -10.0,
                scope: PriceScope::All,
            }
        );

        let delete: OperationDescriptor =
            serde_json::from_value(serde_json::json!({ "type": "delete" })).unwrap();
        assert_eq!(delete, OperationDescriptor::Delete);
    }

    #[test]
    fn each_descriptor_has_its_own_kind() {
        let kinds: Vec<&str> = all_descriptors().iter().map(|d| d.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                OP_PRICE_UPDATE,
                OP_CATEGORY_CHANGE,
                OP_LOCATION_TRANSFER,
                OP_STATUS_CHANGE,
                OP_DELETE,
                OP_ARCHIVE,
            ]
        );
    }
}
