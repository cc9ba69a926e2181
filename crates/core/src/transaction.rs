//! Transaction builder arithmetic: line totals, discounts, tax and stock deltas.
//!
//! A transaction is a list of lines against inventory items. Totals are
//! computed line by line and rounded half-up to cents at each step, the same
//! way a printed receipt would show them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::{round_money, validate_non_negative};
use crate::types::RecordId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of lines on a single transaction.
pub const MAX_TRANSACTION_LINES: usize = 500;

pub const KIND_SALE: &str = "sale";
pub const KIND_PURCHASE: &str = "purchase";
pub const KIND_ADJUSTMENT: &str = "adjustment";
pub const KIND_TRANSFER: &str = "transfer";

/// All valid transaction kind strings.
pub const VALID_KINDS: &[&str] = &[KIND_SALE, KIND_PURCHASE, KIND_ADJUSTMENT, KIND_TRANSFER];

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Sale,
    Purchase,
    Adjustment,
    Transfer,
}

impl TransactionKind {
    /// Convert from a stored string value.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            KIND_SALE => Ok(Self::Sale),
            KIND_PURCHASE => Ok(Self::Purchase),
            KIND_ADJUSTMENT => Ok(Self::Adjustment),
            KIND_TRANSFER => Ok(Self::Transfer),
            _ => Err(CoreError::Validation(format!(
                "Invalid transaction kind '{s}'. Must be one of: {}",
                VALID_KINDS.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sale => KIND_SALE,
            Self::Purchase => KIND_PURCHASE,
            Self::Adjustment => KIND_ADJUSTMENT,
            Self::Transfer => KIND_TRANSFER,
        }
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One line of a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionLine {
    pub item_id: RecordId,
    pub quantity: i64,
    pub unit_price: Decimal,
    /// Per-line discount in percent, `0..=100`.
    #[serde(default)]
    pub discount_percent: Decimal,
}

/// Computed totals for a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionTotals {
    /// Sum of `quantity * unit_price` before discounts.
    pub subtotal: Decimal,
    /// Sum of per-line discounts.
    pub discount: Decimal,
    /// Tax on the discounted amount.
    pub tax: Decimal,
    /// `subtotal - discount + tax`.
    pub total: Decimal,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate that a percentage lies within `[0, 100]`.
pub fn validate_percent(value: Decimal, name: &str) -> Result<(), CoreError> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(CoreError::Validation(format!(
            "{name} must be between 0 and 100, got {value}"
        )));
    }
    Ok(())
}

/// Validate a transaction before totals are computed or stock is moved.
///
/// Sales, purchases and transfers need positive quantities. Adjustments may
/// go either way but a zero adjustment is meaningless.
pub fn validate_transaction(
    kind: TransactionKind,
    lines: &[TransactionLine],
    tax_rate_percent: Decimal,
) -> Result<(), CoreError> {
    if lines.is_empty() {
        return Err(CoreError::Validation(
            "Transaction must have at least one line".to_string(),
        ));
    }
    if lines.len() > MAX_TRANSACTION_LINES {
        return Err(CoreError::Validation(format!(
            "Transaction has {} lines, exceeding the maximum of {MAX_TRANSACTION_LINES}",
            lines.len()
        )));
    }
    validate_percent(tax_rate_percent, "Tax rate")?;

    for (index, line) in lines.iter().enumerate() {
        let line_no = index + 1;
        if line.item_id.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Line {line_no}: item id must not be empty"
            )));
        }
        match kind {
            TransactionKind::Adjustment if line.quantity == 0 => {
                return Err(CoreError::Validation(format!(
                    "Line {line_no}: adjustment quantity must not be zero"
                )));
            }
            TransactionKind::Adjustment => {}
            _ if line.quantity <= 0 => {
                return Err(CoreError::Validation(format!(
                    "Line {line_no}: quantity must be positive, got {}",
                    line.quantity
                )));
            }
            _ => {}
        }
        validate_non_negative(line.unit_price, &format!("Line {line_no}: unit price"))?;
        validate_percent(line.discount_percent, &format!("Line {line_no}: discount"))?;
    }
    validate_amount_range(lines)
}

/// Reject lines whose amounts do not fit in a [`Decimal`].
///
/// The subtotal magnitude must leave room for a percentage to be applied
/// to it, which keeps every figure in [`compute_totals`] in range.
fn validate_amount_range(lines: &[TransactionLine]) -> Result<(), CoreError> {
    let mut magnitude = Decimal::ZERO;
    for (index, line) in lines.iter().enumerate() {
        magnitude = line
            .unit_price
            .checked_mul(Decimal::from(line.quantity))
            .and_then(|gross| magnitude.checked_add(gross.abs()))
            .ok_or_else(|| {
                CoreError::Validation(format!("Line {}: amount is out of range", index + 1))
            })?;
    }
    if magnitude.checked_mul(Decimal::ONE_HUNDRED).is_none() {
        return Err(CoreError::Validation(
            "Transaction total is out of range".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Gross amount of a line before discount, rounded to cents.
pub fn compute_line_gross(line: &TransactionLine) -> Decimal {
    round_money(line.unit_price.saturating_mul(Decimal::from(line.quantity)))
}

/// Discount amount of a line, rounded to cents.
pub fn compute_line_discount(line: &TransactionLine) -> Decimal {
    round_money(compute_line_gross(line).saturating_mul(line.discount_percent) / Decimal::ONE_HUNDRED)
}

/// Net amount of a line after its discount.
pub fn compute_line_total(line: &TransactionLine) -> Decimal {
    compute_line_gross(line).saturating_sub(compute_line_discount(line))
}

/// Compute subtotal, discount, tax and grand total for a set of lines.
///
/// Exact for any input [`validate_transaction`] accepts; beyond that the
/// figures saturate at the bounds of [`Decimal`].
pub fn compute_totals(lines: &[TransactionLine], tax_rate_percent: Decimal) -> TransactionTotals {
    let subtotal = lines
        .iter()
        .map(compute_line_gross)
        .fold(Decimal::ZERO, Decimal::saturating_add);
    let discount = lines
        .iter()
        .map(compute_line_discount)
        .fold(Decimal::ZERO, Decimal::saturating_add);
    let taxable = subtotal.saturating_sub(discount);
    let tax = round_money(taxable.saturating_mul(tax_rate_percent) / Decimal::ONE_HUNDRED);

    TransactionTotals {
        subtotal,
        discount,
        tax,
        total: taxable.saturating_add(tax),
    }
}

/// Signed change in on-hand stock a transaction line causes at its item.
///
/// A transfer moves stock between locations and leaves the item's total
/// quantity unchanged.
pub fn stock_delta(kind: TransactionKind, quantity: i64) -> i64 {
    match kind {
        TransactionKind::Sale => -quantity,
        TransactionKind::Purchase | TransactionKind::Adjustment => quantity,
        TransactionKind::Transfer => 0,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
