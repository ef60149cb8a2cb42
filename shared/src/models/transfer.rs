//! Inter-warehouse transfer models
//!
//! The stock-ledger arithmetic applied on reception lives here as pure
//! functions shared with the test suites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{TransferStatus, Warehouse};

/// A stock movement request between two warehouses, tied to an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub from_warehouse: Warehouse,
    pub to_warehouse: Warehouse,
    pub quantity_requested: i32,
    pub quantity_prepared: i32,
    pub status: TransferStatus,
    pub requested_by: i64,
    pub requested_at: DateTime<Utc>,
    pub prepared_by: Option<i64>,
    pub prepared_at: Option<DateTime<Utc>>,
    pub received_by: Option<i64>,
    pub received_at: Option<DateTime<Utc>>,
}

/// Destination-side ledger adjustment: increment existing stock, or the
/// initial quantity when the (product, warehouse) row is created lazily.
pub fn receive_into(current: Option<i32>, received: i32) -> i32 {
    current.unwrap_or(0) + received
}

/// Source-side ledger adjustment: decrement floored at zero. Receiving more
/// than the recorded source stock is not an error; the ledger floors.
pub fn draw_from(current: i32, received: i32) -> i32 {
    (current - received).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reception_creates_destination_stock_when_absent() {
        assert_eq!(receive_into(None, 10), 10);
    }

    #[test]
    fn reception_increments_existing_destination_stock() {
        assert_eq!(receive_into(Some(25), 10), 35);
    }

    #[test]
    fn source_stock_decrements_on_reception() {
        assert_eq!(draw_from(100, 10), 90);
    }

    #[test]
    fn source_stock_floors_at_zero() {
        assert_eq!(draw_from(5, 10), 0);
        assert_eq!(draw_from(0, 1), 0);
    }

    #[test]
    fn reception_only_legal_from_shipped() {
        assert!(TransferStatus::Shipped.can_confirm_reception());
        for status in [
            TransferStatus::Pending,
            TransferStatus::InPreparation,
            TransferStatus::ReadyToShip,
            TransferStatus::Received,
            TransferStatus::Cancelled,
        ] {
            assert!(!status.can_confirm_reception());
        }
    }

    #[test]
    fn preparation_transitions_attribute_the_preparer() {
        assert!(TransferStatus::InPreparation.records_preparation());
        assert!(TransferStatus::ReadyToShip.records_preparation());
        assert!(!TransferStatus::Shipped.records_preparation());
        assert!(!TransferStatus::Pending.records_preparation());
    }
}
