//! Inventory item model, status enum and stock-threshold classification.
//!
//! The item shape mirrors what the backing store returns for a record.
//! Create and update DTOs follow the usual split: [`NewInventoryItem`]
//! carries every required field, [`RecordPatch`] carries only the fields a
//! bulk operation may replace.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::validate_non_negative;
use crate::types::{RecordId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum SKU length.
pub const MAX_SKU_LENGTH: usize = 64;

/// Maximum item name length.
pub const MAX_NAME_LENGTH: usize = 200;

/// Reorder level applied when an item is created without one.
pub const DEFAULT_REORDER_LEVEL: i64 = 10;

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_INACTIVE: &str = "inactive";
pub const STATUS_DISCONTINUED: &str = "discontinued";
pub const STATUS_ARCHIVED: &str = "archived";

/// All valid item status strings.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_ACTIVE,
    STATUS_INACTIVE,
    STATUS_DISCONTINUED,
    STATUS_ARCHIVED,
];

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Lifecycle status of an inventory item.
///
/// `Archived` is reserved: it is what the bulk `Archive` operation sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Active,
    Inactive,
    Discontinued,
    Archived,
}

impl ItemStatus {
    /// Convert from a stored string value.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            STATUS_ACTIVE => Ok(Self::Active),
            STATUS_INACTIVE => Ok(Self::Inactive),
            STATUS_DISCONTINUED => Ok(Self::Discontinued),
            STATUS_ARCHIVED => Ok(Self::Archived),
            _ => Err(CoreError::Validation(format!(
                "Invalid item status '{s}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }

    /// Convert to the stored string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => STATUS_ACTIVE,
            Self::Inactive => STATUS_INACTIVE,
            Self::Discontinued => STATUS_DISCONTINUED,
            Self::Archived => STATUS_ARCHIVED,
        }
    }
}

/// Stock classification relative to an item's reorder level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    OutOfStock,
    Low,
    InStock,
}

impl StockLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutOfStock => "out_of_stock",
            Self::Low => "low",
            Self::InStock => "in_stock",
        }
    }

    /// Human-readable label for badges.
    pub fn label(&self) -> &'static str {
        match self {
            Self::OutOfStock => "Out of stock",
            Self::Low => "Low stock",
            Self::InStock => "In stock",
        }
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// An inventory record as held by the backing store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: RecordId,
    pub sku: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub reorder_level: i64,
    pub category_id: Option<String>,
    pub location_id: Option<String>,
    #[serde(default)]
    pub status: ItemStatus,
    pub updated_at: Timestamp,
}

impl InventoryItem {
    /// Classify this item's stock against its own reorder level.
    pub fn stock_level(&self) -> StockLevel {
        classify_stock(self.quantity, self.reorder_level)
    }

    /// Value of the units on hand.
    pub fn stock_value(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity.max(0)))
    }

    /// Apply every field set on `patch`, stamping `updated_at`.
    pub fn apply_patch(&mut self, patch: &RecordPatch, now: Timestamp) {
        if let Some(price) = patch.unit_price {
            self.unit_price = price;
        }
        if let Some(category_id) = &patch.category_id {
            self.category_id = Some(category_id.clone());
        }
        if let Some(location_id) = &patch.location_id {
            self.location_id = Some(location_id.clone());
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = now;
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Fields required to create an inventory item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInventoryItem {
    pub sku: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub reorder_level: Option<i64>,
    pub category_id: Option<String>,
    pub location_id: Option<String>,
    pub status: Option<ItemStatus>,
}

impl NewInventoryItem {
    /// Validate every field of the create payload.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_sku(&self.sku)?;
        validate_item_name(&self.name)?;
        validate_quantity(self.quantity)?;
        validate_non_negative(self.unit_price, "Unit price")?;
        if let Some(level) = self.reorder_level {
            validate_quantity(level)?;
        }
        Ok(())
    }

    /// Materialise the item under `id`.
    pub fn into_item(self, id: RecordId, now: Timestamp) -> InventoryItem {
        InventoryItem {
            id,
            sku: self.sku,
            name: self.name,
            quantity: self.quantity,
            unit_price: self.unit_price,
            reorder_level: self.reorder_level.unwrap_or(DEFAULT_REORDER_LEVEL),
            category_id: self.category_id,
            location_id: self.location_id,
            status: self.status.unwrap_or_default(),
            updated_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Update DTO
// ---------------------------------------------------------------------------

/// Field replacements computed by a bulk operation (all fields optional).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
}

impl RecordPatch {
    /// True when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.unit_price.is_none()
            && self.category_id.is_none()
            && self.location_id.is_none()
            && self.status.is_none()
    }
}

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Validate a stock-keeping unit code.
pub fn validate_sku(sku: &str) -> Result<(), CoreError> {
    if sku.trim().is_empty() {
        return Err(CoreError::Validation("SKU must not be empty".to_string()));
    }
    if sku.len() > MAX_SKU_LENGTH {
        return Err(CoreError::Validation(format!(
            "SKU exceeds maximum length of {MAX_SKU_LENGTH}"
        )));
    }
    if !sku
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(CoreError::Validation(format!(
            "SKU '{sku}' contains invalid characters. Only letters, digits, '-' and '_' allowed."
        )));
    }
    Ok(())
}

/// Validate an item display name.
pub fn validate_item_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Item name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Item name exceeds maximum length of {MAX_NAME_LENGTH}"
        )));
    }
    Ok(())
}

/// Validate that a stored quantity is not negative.
pub fn validate_quantity(quantity: i64) -> Result<(), CoreError> {
    if quantity < 0 {
        return Err(CoreError::Validation(format!(
            "Quantity must not be negative, got {quantity}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classify a quantity against a reorder level.
///
/// - `quantity <= 0` is out of stock
/// - `quantity <= reorder_level` is low
/// - anything above is in stock
pub fn classify_stock(quantity: i64, reorder_level: i64) -> StockLevel {
    if quantity <= 0 {
        StockLevel::OutOfStock
    } else if quantity <= reorder_level {
        StockLevel::Low
    } else {
        StockLevel::InStock
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
