//! Tests for catalog boundary types
//!
//! Warehouse names appear as path segments on the per-warehouse stock
//! endpoint; they are parsed into the closed enum once at the boundary.

use chrono::Utc;

use shared::{StockLevel, Warehouse};

mod warehouse_boundary {
    use super::*;

    #[test]
    fn warehouse_path_segment_parses_into_the_enum() {
        for (name, expected) in [
            ("paris", Warehouse::Paris),
            ("lyon", Warehouse::Lyon),
            ("bordeaux", Warehouse::Bordeaux),
        ] {
            let parsed: Warehouse =
                serde_json::from_value(serde_json::Value::String(name.to_string())).unwrap();
            assert_eq!(parsed, expected);
        }
    }

    #[test]
    fn unknown_warehouse_is_rejected_at_the_boundary() {
        let result: Result<Warehouse, _> =
            serde_json::from_value(serde_json::Value::String("marseille".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn stock_level_serializes_warehouse_by_name() {
        let level = StockLevel {
            product_id: 7,
            warehouse: Warehouse::Bordeaux,
            quantity: 12,
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&level).unwrap();
        assert_eq!(json["warehouse"], "bordeaux");
        assert_eq!(json["quantity"], 12);
    }
}
