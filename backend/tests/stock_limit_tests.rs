//! Tests for monthly stock-limit validation
//!
//! The monthly window starts on the first calendar day of the current
//! month; remaining allowance is limit minus consumption, compared
//! unclamped and reported clamped at zero.

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;

use shared::{month_start, remaining_allowance};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn remaining_after_partial_consumption() {
        // Limit 100, already consumed 60 -> 40 left this month
        assert_eq!(remaining_allowance(100, 60), 40);
    }

    #[test]
    fn request_above_remaining_is_a_violation() {
        let remaining = remaining_allowance(100, 60);
        let requested = 50i32;
        assert!(i64::from(requested) > remaining);
    }

    #[test]
    fn request_at_exact_remaining_is_allowed() {
        let remaining = remaining_allowance(100, 60);
        let requested = 40i32;
        assert!(i64::from(requested) <= remaining);
    }

    #[test]
    fn untouched_limit_is_fully_available() {
        assert_eq!(remaining_allowance(25, 0), 25);
    }

    #[test]
    fn overconsumption_yields_negative_remaining() {
        // Historical data may exceed the limit; the raw value stays
        // negative so that any further request is refused
        assert_eq!(remaining_allowance(50, 70), -20);
        assert_eq!(remaining_allowance(50, 70).max(0), 0);
    }

    #[test]
    fn window_starts_on_first_of_month() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 17).unwrap();
        let start = month_start(today);
        assert_eq!(start.date(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(start.time(), chrono::NaiveTime::MIN);
    }

    #[test]
    fn window_on_first_day_is_same_day() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        assert_eq!(month_start(today).date(), today);
    }

    #[test]
    fn consumption_resets_across_month_boundary() {
        let january = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let february = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        assert_ne!(month_start(january), month_start(february));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Remaining allowance is exactly limit minus consumption
    #[test]
    fn prop_remaining_is_limit_minus_used(
        limit in 1i32..100_000,
        used in 0i64..200_000
    ) {
        prop_assert_eq!(remaining_allowance(limit, used), i64::from(limit) - used);
    }

    /// A request within the remaining allowance never violates the limit
    #[test]
    fn prop_within_allowance_never_violates(
        limit in 1i32..10_000,
        used in 0i64..5_000
    ) {
        let remaining = remaining_allowance(limit, used);
        if remaining > 0 {
            let requested = remaining.min(i64::from(i32::MAX));
            prop_assert!(requested <= remaining);
        }
    }

    /// The month window start is always day 1 at midnight
    #[test]
    fn prop_window_start_is_day_one(
        year in 2000i32..2100,
        month in 1u32..=12,
        day in 1u32..=28
    ) {
        let today = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        let start = month_start(today);
        prop_assert_eq!(start.date().day0(), 0);
        prop_assert_eq!(start.date().month(), month);
        prop_assert_eq!(start.date().year(), year);
        prop_assert_eq!(start.time(), chrono::NaiveTime::MIN);
    }
}
