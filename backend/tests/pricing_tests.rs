//! Tests for personalized pricing resolution and order total calculation
//!
//! Covers the resolution precedence (custom price > discount > base price)
//! and the single end-of-sum rounding of totals.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{normalize_custom_price, resolve_final_price, round_currency};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn base_price_when_no_conditions() {
        let final_price = resolve_final_price(dec("89.90"), None, None);
        assert_eq!(final_price, dec("89.90"));
    }

    #[test]
    fn discount_applied_to_base_price() {
        // 200.00 at 25% off -> 150.00
        let final_price = resolve_final_price(dec("200.00"), None, Some(dec("25")));
        assert_eq!(final_price, dec("150.00"));
    }

    #[test]
    fn custom_price_wins_over_discount() {
        // A negotiated unit price overrides any discount on the same row
        let final_price = resolve_final_price(dec("200.00"), Some(dec("120.00")), Some(dec("25")));
        assert_eq!(final_price, dec("120.00"));
    }

    #[test]
    fn zero_custom_price_is_not_an_override() {
        let final_price = resolve_final_price(dec("200.00"), Some(Decimal::ZERO), Some(dec("25")));
        assert_eq!(final_price, dec("150.00"));
    }

    #[test]
    fn zero_custom_price_is_stored_as_absent() {
        // The pricing table only admits positive overrides; zero must be
        // normalized away before the row is written
        assert_eq!(normalize_custom_price(Some(Decimal::ZERO)), None);
        assert_eq!(normalize_custom_price(None), None);
        assert_eq!(
            normalize_custom_price(Some(dec("120.00"))),
            Some(dec("120.00"))
        );
    }

    #[test]
    fn zero_discount_keeps_base_price() {
        let final_price = resolve_final_price(dec("45.50"), None, Some(Decimal::ZERO));
        assert_eq!(final_price, dec("45.50"));
    }

    #[test]
    fn full_discount_gives_zero() {
        let final_price = resolve_final_price(dec("45.50"), None, Some(dec("100")));
        assert_eq!(final_price, Decimal::ZERO);
    }

    #[test]
    fn order_total_sums_line_totals() {
        // 2 x 150.00 + 1 x 100.00 = 400.00
        let line1 = resolve_final_price(dec("200.00"), None, Some(dec("25"))) * Decimal::from(2);
        let line2 = resolve_final_price(dec("130.00"), Some(dec("100.00")), None);
        let total = round_currency(line1 + line2);
        assert_eq!(total, dec("400.00"));
    }

    #[test]
    fn mixed_conditions_total() {
        // 3 x 80.00 (custom) + 1 x 70.00 (base) = 310.00
        let line1 = resolve_final_price(dec("95.00"), Some(dec("80.00")), None) * Decimal::from(3);
        let line2 = resolve_final_price(dec("70.00"), None, None);
        let total = round_currency(line1 + line2);
        assert_eq!(total, dec("310.00"));
    }

    #[test]
    fn total_rounded_once_at_the_end() {
        // 33.333... per unit; per-line rounding would give 99.99 or 100.02
        let unit = dec("100.00") * (Decimal::ONE_HUNDRED - dec("66.666")) / Decimal::ONE_HUNDRED;
        let total = round_currency(unit * Decimal::from(3));
        assert_eq!(total, dec("100.00"));
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_currency(dec("10.005")), dec("10.01"));
        assert_eq!(round_currency(dec("10.004")), dec("10.00"));
        assert_eq!(round_currency(dec("-10.005")), dec("-10.01"));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

fn price_strategy() -> impl Strategy<Value = Decimal> {
    // Prices between 0.01 and 10000.00 with cent precision
    (1i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn discount_strategy() -> impl Strategy<Value = Decimal> {
    // Whole-percent discounts in [0, 100]
    (0i64..=100).prop_map(Decimal::from)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A discounted price never exceeds the base price
    #[test]
    fn prop_discount_never_increases_price(
        base in price_strategy(),
        discount in discount_strategy()
    ) {
        let final_price = resolve_final_price(base, None, Some(discount));
        prop_assert!(final_price <= base);
        prop_assert!(final_price >= Decimal::ZERO);
    }

    /// A positive custom price always wins, whatever else is configured
    #[test]
    fn prop_custom_price_always_wins(
        base in price_strategy(),
        custom in price_strategy(),
        discount in proptest::option::of(discount_strategy())
    ) {
        let final_price = resolve_final_price(base, Some(custom), discount);
        prop_assert_eq!(final_price, custom);
    }

    /// Rounding to cents is idempotent
    #[test]
    fn prop_round_currency_idempotent(amount in price_strategy()) {
        let once = round_currency(amount);
        prop_assert_eq!(round_currency(once), once);
    }

    /// A total is the rounded sum of its unrounded line totals
    #[test]
    fn prop_total_is_order_of_lines(
        prices in prop::collection::vec(price_strategy(), 1..8),
        quantities in prop::collection::vec(1i32..50, 1..8)
    ) {
        let sum: Decimal = prices
            .iter()
            .zip(quantities.iter())
            .map(|(p, q)| *p * Decimal::from(*q))
            .sum();
        let total = round_currency(sum);
        prop_assert!(total >= Decimal::ZERO);
        prop_assert_eq!(total.scale() <= 2, true);
    }
}
