//! Inventory dashboard KPIs.
//!
//! Aggregates a snapshot of [`InventoryItem`]s into the headline figures and
//! per-category breakdown shown on the dashboard. Archived items are counted
//! but otherwise excluded: they hold no sellable stock.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::inventory::{InventoryItem, ItemStatus, StockLevel};

/// Category label used for items without a category.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Headline inventory figures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventoryKpis {
    pub total_items: usize,
    pub total_units: i64,
    pub total_value: Decimal,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
    pub archived_count: usize,
}

/// Per-category roll-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category_id: String,
    pub item_count: usize,
    pub total_units: i64,
    pub total_value: Decimal,
}

/// Compute headline KPIs over `items`.
pub fn compute_kpis(items: &[InventoryItem]) -> InventoryKpis {
    let mut kpis = InventoryKpis {
        total_items: items.len(),
        ..Default::default()
    };

    for item in items {
        if item.status == ItemStatus::Archived {
            kpis.archived_count += 1;
            continue;
        }
        kpis.total_units = kpis.total_units.saturating_add(item.quantity.max(0));
        kpis.total_value = kpis.total_value.saturating_add(item.stock_value());
        match item.stock_level() {
            StockLevel::OutOfStock => kpis.out_of_stock_count += 1,
            StockLevel::Low => kpis.low_stock_count += 1,
            StockLevel::InStock => {}
        }
    }
    kpis
}

/// Roll up non-archived items by category, highest value first.
///
/// Ties are broken by category id so the order is stable.
pub fn category_breakdown(items: &[InventoryItem]) -> Vec<CategorySummary> {
    let mut by_category: HashMap<&str, CategorySummary> = HashMap::new();

    for item in items.iter().filter(|i| i.status != ItemStatus::Archived) {
        let key = item.category_id.as_deref().unwrap_or(UNCATEGORIZED);
        let entry = by_category.entry(key).or_insert_with(|| CategorySummary {
            category_id: key.to_string(),
            item_count: 0,
            total_units: 0,
            total_value: Decimal::ZERO,
        });
        entry.item_count += 1;
        entry.total_units = entry.total_units.saturating_add(item.quantity.max(0));
        entry.total_value = entry.total_value.saturating_add(item.stock_value());
    }

    let mut summaries: Vec<CategorySummary> = by_category.into_values().collect();
    summaries.sort_by(|a, b| {
        b.total_value
            .cmp(&a.total_value)
            .then_with(|| a.category_id.cmp(&b.category_id))
    });
    summaries
}

/// Items needing reorder (low or out of stock), lowest quantity first.
pub fn low_stock_items(items: &[InventoryItem]) -> Vec<&InventoryItem> {
    let mut low: Vec<&InventoryItem> = items
        .iter()
        .filter(|i| i.status != ItemStatus::Archived)
        .filter(|i| i.stock_level() != StockLevel::InStock)
        .collect();
    low.sort_by(|a, b| a.quantity.cmp(&b.quantity).then_with(|| a.id.cmp(&b.id)));
    low
}
