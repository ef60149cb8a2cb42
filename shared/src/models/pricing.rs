//! Per-client pricing and monthly stock-limit models
//!
//! The resolution and allowance arithmetic lives here as pure functions so
//! both the backend services and the test suites exercise the same code.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Pricing configuration for one (client, product) pair
///
/// One row per pair; setting pricing for an existing pair replaces it in
/// place. A `custom_price` of zero or absent means "no override".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientProductPricing {
    pub id: i64,
    pub client_id: i64,
    pub product_id: i64,
    pub custom_price: Option<Decimal>,
    pub discount_percentage: Option<Decimal>,
    /// Monthly cap on units ordered, when configured
    pub stock_limit: Option<i32>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Result of resolving the effective unit price for a client and product
///
/// Both applied data points are returned even when one is unused, for
/// observability: a row carrying a positive custom price and a discount
/// always yields the custom price, but the discount value is still present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedPrice {
    pub product_id: i64,
    pub base_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<Decimal>,
    pub final_price: Decimal,
}

/// A priced line item as produced by the total calculator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedLineItem {
    pub product_id: i64,
    pub quantity: i32,
    pub base_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<Decimal>,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Priced line items plus the order/quote total
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedItems {
    pub items: Vec<PricedLineItem>,
    /// Sum of all line totals, rounded to currency scale once at the end
    pub total_amount: Decimal,
}

/// One stock-limit violation for a requested line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitViolation {
    pub product_id: i64,
    pub requested_quantity: i32,
    /// Remaining allowance, clamped at zero for reporting
    pub remaining_limit: i64,
    pub monthly_limit: i32,
}

/// Outcome of validating requested quantities against monthly limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitValidation {
    pub is_valid: bool,
    pub violations: Vec<LimitViolation>,
}

/// Resolve the effective unit price from the pricing row data.
///
/// Policy, in order: a positive custom price wins outright; otherwise a
/// positive discount percentage is applied to the base price; otherwise the
/// base price stands.
pub fn resolve_final_price(
    base_price: Decimal,
    custom_price: Option<Decimal>,
    discount_percentage: Option<Decimal>,
) -> Decimal {
    if let Some(custom) = custom_price {
        if custom > Decimal::ZERO {
            return custom;
        }
    }
    if let Some(discount) = discount_percentage {
        if discount > Decimal::ZERO {
            return base_price * (Decimal::ONE_HUNDRED - discount) / Decimal::ONE_HUNDRED;
        }
    }
    base_price
}

/// Normalize a custom-price override before persistence: zero means
/// "no override" and is stored as absent, never as a zero row value.
pub fn normalize_custom_price(custom_price: Option<Decimal>) -> Option<Decimal> {
    custom_price.filter(|price| *price > Decimal::ZERO)
}

/// Round a monetary amount to 2 decimal places, midpoint away from zero.
///
/// Applied once to the final total, not per line, so rounding error does not
/// compound across many lines.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// First instant of the calendar month containing `today`.
///
/// The monthly consumption window starts at 00:00:00 on the first calendar
/// day, in local server time.
pub fn month_start(today: NaiveDate) -> NaiveDateTime {
    let first = today.with_day(1).expect("day 1 is valid for every month");
    first.and_hms_opt(0, 0, 0).expect("midnight is valid")
}

/// Remaining monthly allowance; may be negative when a client is already
/// over the limit. Callers compare against the unclamped value and report
/// `max(0, remaining)`.
pub fn remaining_allowance(monthly_limit: i32, used_quantity: i64) -> i64 {
    i64::from(monthly_limit) - used_quantity
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn base_price_is_the_fallback() {
        let price = resolve_final_price(dec("200"), None, None);
        assert_eq!(price, dec("200"));
    }

    #[test]
    fn custom_price_wins_over_discount() {
        let price = resolve_final_price(dec("200"), Some(dec("90")), Some(dec("50")));
        assert_eq!(price, dec("90"));
    }

    #[test]
    fn zero_custom_price_means_no_override() {
        let price = resolve_final_price(dec("200"), Some(Decimal::ZERO), Some(dec("25")));
        assert_eq!(price, dec("150"));
    }

    #[test]
    fn zero_custom_price_normalizes_to_absent() {
        assert_eq!(normalize_custom_price(Some(Decimal::ZERO)), None);
        assert_eq!(normalize_custom_price(Some(dec("85.00"))), Some(dec("85.00")));
        assert_eq!(normalize_custom_price(None), None);
    }

    #[test]
    fn discount_applies_off_base_price() {
        let price = resolve_final_price(dec("200"), None, Some(dec("25")));
        assert_eq!(price, dec("150"));
    }

    #[test]
    fn zero_discount_falls_back_to_base() {
        let price = resolve_final_price(dec("80"), None, Some(Decimal::ZERO));
        assert_eq!(price, dec("80"));
    }

    #[test]
    fn currency_rounding_is_two_decimals() {
        assert_eq!(round_currency(dec("310.005")), dec("310.01"));
        assert_eq!(round_currency(dec("310.004")), dec("310.00"));
        assert_eq!(round_currency(dec("400")), dec("400.00"));
    }

    #[test]
    fn month_start_is_first_day_midnight() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 17).unwrap();
        let start = month_start(day);
        assert_eq!(start.date(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(start.time(), chrono::NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn remaining_allowance_can_go_negative() {
        assert_eq!(remaining_allowance(100, 60), 40);
        assert_eq!(remaining_allowance(100, 130), -30);
    }
}
