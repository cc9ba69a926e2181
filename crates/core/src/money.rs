//! Monetary rounding and conversion helpers.
//!
//! Prices and totals are carried as [`Decimal`] so that round-half-up to
//! cents behaves the way a ledger expects (`12.089 -> 12.09`), which binary
//! floating point cannot guarantee.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::CoreError;

/// Number of decimal places kept for monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// Round an amount to cents, half away from zero.
///
/// For the non-negative amounts this crate deals in, that is round-half-up.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a user-supplied float into a [`Decimal`].
///
/// Rejects NaN and infinities with a `CoreError::Validation` naming the field.
pub fn decimal_from_f64(value: f64, name: &str) -> Result<Decimal, CoreError> {
    if !value.is_finite() {
        return Err(CoreError::Validation(format!(
            "{name} must be a finite number, got {value}"
        )));
    }
    Decimal::from_f64(value).ok_or_else(|| {
        CoreError::Validation(format!("{name} is out of range for a monetary amount"))
    })
}

/// Validate that a monetary amount is not negative.
pub fn validate_non_negative(amount: Decimal, name: &str) -> Result<(), CoreError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(CoreError::Validation(format!(
            "{name} must not be negative, got {amount}"
        )));
    }
    Ok(())
}
