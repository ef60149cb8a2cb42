//! Catalog models: products, substitutes, per-warehouse stock

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Warehouse;

/// A catalog product
///
/// Products referenced by orders are soft-deactivated, never hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    /// Unique manufacturer/catalog reference
    pub reference: String,
    pub designation: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub vehicle_compatibility: Option<String>,
    pub base_price: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A substitute entry for a product, resolved against the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Substitute {
    pub product_id: i64,
    pub reference: String,
    pub designation: String,
    pub priority: i32,
}

/// Stock level for one (product, warehouse) pair
///
/// One row per pair, created lazily on first stock write. Quantity never
/// goes below zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLevel {
    pub product_id: i64,
    pub warehouse: Warehouse,
    pub quantity: i32,
    pub updated_at: DateTime<Utc>,
}
