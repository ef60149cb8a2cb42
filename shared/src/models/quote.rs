//! Quote models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A client quote
///
/// Parallel to an order but shareable: it carries a public share token, a
/// QR-code payload embedding the quote id and token, and an expiration.
/// A quote does not count against stock limits until converted to an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: i64,
    pub client_id: i64,
    pub quote_number: String,
    pub total_amount: Decimal,
    pub share_token: String,
    pub qr_code_data: String,
    pub expires_at: DateTime<Utc>,
    pub converted: bool,
    pub converted_order_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Quote {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

// Namespace for the advisory lock serializing monthly quote numbering,
// distinct from any other advisory-lock user of the database
const QUOTE_SEQUENCE_LOCK_NAMESPACE: i64 = 0x4445_5651; // "DEVQ"

/// Advisory-lock key for allocating quote numbers within one calendar month.
/// Two allocations in the same month always map to the same key; different
/// months never collide.
pub fn quote_sequence_lock_key(year: i32, month: u32) -> i64 {
    (QUOTE_SEQUENCE_LOCK_NAMESPACE << 32) | i64::from(year as u32 * 100 + month)
}

/// Format a quote number: DEV-YYYYMM-NNNN
pub fn quote_number(year: i32, month: u32, sequence: i64) -> String {
    format!("DEV-{:04}{:02}-{:04}", year, month, sequence)
}

/// A quote line, priced at quote-creation time with the same resolver as
/// order lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteItem {
    pub id: i64,
    pub quote_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// A quote together with its line items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteWithItems {
    #[serde(flatten)]
    pub quote: Quote,
    pub items: Vec<QuoteItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::str::FromStr;

    fn quote(expires_at: DateTime<Utc>) -> Quote {
        Quote {
            id: 1,
            client_id: 1,
            quote_number: "DEV-202501-0001".to_string(),
            total_amount: Decimal::from_str("310.00").unwrap(),
            share_token: "token".to_string(),
            qr_code_data: "payload".to_string(),
            expires_at,
            converted: false,
            converted_order_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn quote_expires_at_the_deadline() {
        let now = Utc::now();
        assert!(!quote(now + Duration::days(30)).is_expired(now));
        assert!(quote(now).is_expired(now));
        assert!(quote(now - Duration::seconds(1)).is_expired(now));
    }
}
