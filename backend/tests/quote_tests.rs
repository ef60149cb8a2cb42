//! Tests for quote expiry and validity rules
//!
//! An expired quote stays readable through its share link; expiry only
//! blocks conversion into an order.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{quote_number, quote_sequence_lock_key, validate_validity_days, Quote};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn quote_expiring_at(expires_at: DateTime<Utc>) -> Quote {
    Quote {
        id: 1,
        client_id: 42,
        quote_number: "DEV-202508-0001".to_string(),
        total_amount: dec("400.00"),
        share_token: "ZHVtbXktdG9rZW4tZm9yLXRlc3Rz".to_string(),
        qr_code_data: String::new(),
        expires_at,
        converted: false,
        converted_order_id: None,
        created_at: expires_at - Duration::days(30),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn quote_valid_before_expiry() {
        let expires = Utc.with_ymd_and_hms(2025, 9, 15, 12, 0, 0).unwrap();
        let quote = quote_expiring_at(expires);
        assert!(!quote.is_expired(expires - Duration::seconds(1)));
    }

    #[test]
    fn quote_expired_at_exact_instant() {
        let expires = Utc.with_ymd_and_hms(2025, 9, 15, 12, 0, 0).unwrap();
        let quote = quote_expiring_at(expires);
        assert!(quote.is_expired(expires));
    }

    #[test]
    fn quote_expired_after_expiry() {
        let expires = Utc.with_ymd_and_hms(2025, 9, 15, 12, 0, 0).unwrap();
        let quote = quote_expiring_at(expires);
        assert!(quote.is_expired(expires + Duration::days(3)));
    }

    #[test]
    fn validity_days_must_be_at_least_one() {
        assert!(validate_validity_days(0).is_err());
        assert!(validate_validity_days(-5).is_err());
        assert!(validate_validity_days(1).is_ok());
        assert!(validate_validity_days(30).is_ok());
    }

    #[test]
    fn quote_number_format() {
        assert_eq!(quote_number(2025, 8, 1), "DEV-202508-0001");
        assert_eq!(quote_number(2025, 12, 42), "DEV-202512-0042");
        assert_eq!(quote_number(2026, 1, 12345), "DEV-202601-12345");
    }

    #[test]
    fn sequence_lock_key_is_stable_within_a_month() {
        // Concurrent allocations in the same month must contend on one lock
        assert_eq!(
            quote_sequence_lock_key(2025, 8),
            quote_sequence_lock_key(2025, 8)
        );
    }

    #[test]
    fn sequence_lock_key_differs_across_months() {
        assert_ne!(
            quote_sequence_lock_key(2025, 8),
            quote_sequence_lock_key(2025, 9)
        );
        assert_ne!(
            quote_sequence_lock_key(2025, 12),
            quote_sequence_lock_key(2026, 1)
        );
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Distinct months never share a quote-sequence lock key
    #[test]
    fn prop_sequence_lock_keys_never_collide(
        year_a in 2000i32..2100,
        month_a in 1u32..=12,
        year_b in 2000i32..2100,
        month_b in 1u32..=12
    ) {
        prop_assume!((year_a, month_a) != (year_b, month_b));
        prop_assert_ne!(
            quote_sequence_lock_key(year_a, month_a),
            quote_sequence_lock_key(year_b, month_b)
        );
    }

    /// A quote is expired exactly when `now` has reached `expires_at`
    #[test]
    fn prop_expiry_matches_comparison(offset_seconds in -86_400i64..86_400) {
        let expires = Utc.with_ymd_and_hms(2025, 9, 15, 12, 0, 0).unwrap();
        let quote = quote_expiring_at(expires);
        let now = expires + Duration::seconds(offset_seconds);
        prop_assert_eq!(quote.is_expired(now), now >= expires);
    }
}
