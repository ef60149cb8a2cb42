//! Validation utilities for the Auto Parts Distribution Platform
//!
//! Boundary checks shared by the backend input handlers.

use rust_decimal::Decimal;

use crate::types::Warehouse;

// ============================================================================
// Quantity and money validations
// ============================================================================

/// Validate an ordered/requested quantity (strictly positive)
pub fn validate_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a prepared quantity (zero is allowed before preparation)
pub fn validate_prepared_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity < 0 {
        return Err("Prepared quantity cannot be negative");
    }
    Ok(())
}

/// Validate a unit price or base price (strictly positive)
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price <= Decimal::ZERO {
        return Err("Price must be positive");
    }
    Ok(())
}

/// Validate a discount percentage (0 to 100 inclusive)
pub fn validate_discount_percentage(discount: Decimal) -> Result<(), &'static str> {
    if discount < Decimal::ZERO || discount > Decimal::ONE_HUNDRED {
        return Err("Discount percentage must be between 0 and 100");
    }
    Ok(())
}

/// Validate a monthly stock limit when configured
pub fn validate_stock_limit(limit: i32) -> Result<(), &'static str> {
    if limit <= 0 {
        return Err("Monthly stock limit must be positive");
    }
    Ok(())
}

// ============================================================================
// Catalog validations
// ============================================================================

/// Validate a product reference (non-empty, no surrounding whitespace)
pub fn validate_reference(reference: &str) -> Result<(), &'static str> {
    if reference.trim().is_empty() {
        return Err("Product reference is required");
    }
    if reference.trim() != reference {
        return Err("Product reference must not have surrounding whitespace");
    }
    Ok(())
}

/// Validate a substitute priority (strictly positive, lower means preferred)
pub fn validate_substitute_priority(priority: i32) -> Result<(), &'static str> {
    if priority <= 0 {
        return Err("Substitute priority must be positive");
    }
    Ok(())
}

// ============================================================================
// Transfer and quote validations
// ============================================================================

/// Validate that a transfer moves stock between two distinct warehouses
pub fn validate_transfer_route(from: Warehouse, to: Warehouse) -> Result<(), &'static str> {
    if from == to {
        return Err("Source and destination warehouses must differ");
    }
    Ok(())
}

/// Validate quote validity in days (at least one day)
pub fn validate_validity_days(days: i64) -> Result<(), &'static str> {
    if days < 1 {
        return Err("Quote validity must be at least one day");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(500).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_prepared_quantity() {
        assert!(validate_prepared_quantity(0).is_ok());
        assert!(validate_prepared_quantity(12).is_ok());
        assert!(validate_prepared_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(dec("0.01")).is_ok());
        assert!(validate_price(dec("199.99")).is_ok());
        assert!(validate_price(Decimal::ZERO).is_err());
        assert!(validate_price(dec("-5")).is_err());
    }

    #[test]
    fn test_validate_discount_percentage() {
        assert!(validate_discount_percentage(Decimal::ZERO).is_ok());
        assert!(validate_discount_percentage(dec("25")).is_ok());
        assert!(validate_discount_percentage(dec("100")).is_ok());
        assert!(validate_discount_percentage(dec("100.01")).is_err());
        assert!(validate_discount_percentage(dec("-1")).is_err());
    }

    #[test]
    fn test_validate_stock_limit() {
        assert!(validate_stock_limit(1).is_ok());
        assert!(validate_stock_limit(0).is_err());
        assert!(validate_stock_limit(-10).is_err());
    }

    #[test]
    fn test_validate_reference() {
        assert!(validate_reference("BRK-2041").is_ok());
        assert!(validate_reference("").is_err());
        assert!(validate_reference("   ").is_err());
        assert!(validate_reference(" BRK-2041").is_err());
    }

    #[test]
    fn test_validate_substitute_priority() {
        assert!(validate_substitute_priority(1).is_ok());
        assert!(validate_substitute_priority(0).is_err());
    }

    #[test]
    fn test_validate_transfer_route() {
        assert!(validate_transfer_route(Warehouse::Paris, Warehouse::Lyon).is_ok());
        assert!(validate_transfer_route(Warehouse::Lyon, Warehouse::Lyon).is_err());
    }

    #[test]
    fn test_validate_validity_days() {
        assert!(validate_validity_days(1).is_ok());
        assert!(validate_validity_days(30).is_ok());
        assert!(validate_validity_days(0).is_err());
        assert!(validate_validity_days(-7).is_err());
    }
}
