//! Quote service: shareable quotes priced like orders
//!
//! Quotes are priced at creation time with the same resolver as orders but
//! do not count against monthly stock limits until converted. Each quote
//! carries a public share token and a QR payload embedding the quote id and
//! token.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Datelike, Duration, Utc};
use rand::RngCore;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use crate::config::QuoteConfig;
use crate::error::{AppError, AppResult};
use crate::services::pricing::{LineItemInput, PriceLineItemsInput, PricingService};
use crate::services::stock_limit::{current_month_start, monthly_usage, LimitViolation};
use shared::models::{
    quote_number, quote_sequence_lock_key, remaining_allowance, Quote, QuoteItem, QuoteWithItems,
};
use shared::types::OrderStatus;
use shared::validation;

/// Quote service for creating, sharing and converting quotes
#[derive(Clone)]
pub struct QuoteService {
    db: PgPool,
    config: QuoteConfig,
}

/// Database row for a quote
#[derive(Debug, sqlx::FromRow)]
struct QuoteRow {
    id: i64,
    client_id: i64,
    quote_number: String,
    total_amount: Decimal,
    share_token: String,
    qr_code_data: String,
    expires_at: DateTime<Utc>,
    converted: bool,
    converted_order_id: Option<i64>,
    created_at: DateTime<Utc>,
}

impl From<QuoteRow> for Quote {
    fn from(row: QuoteRow) -> Self {
        Quote {
            id: row.id,
            client_id: row.client_id,
            quote_number: row.quote_number,
            total_amount: row.total_amount,
            share_token: row.share_token,
            qr_code_data: row.qr_code_data,
            expires_at: row.expires_at,
            converted: row.converted,
            converted_order_id: row.converted_order_id,
            created_at: row.created_at,
        }
    }
}

/// Database row for a quote item
#[derive(Debug, sqlx::FromRow)]
struct QuoteItemRow {
    id: i64,
    quote_id: i64,
    product_id: i64,
    quantity: i32,
    unit_price: Decimal,
    total_price: Decimal,
}

impl From<QuoteItemRow> for QuoteItem {
    fn from(row: QuoteItemRow) -> Self {
        QuoteItem {
            id: row.id,
            quote_id: row.quote_id,
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price: row.unit_price,
            total_price: row.total_price,
        }
    }
}

/// Input for creating a quote
#[derive(Debug, Deserialize)]
pub struct CreateQuoteInput {
    pub client_id: i64,
    pub items: Vec<LineItemInput>,
    /// Days from now until expiration; defaults from configuration
    pub validity_days: Option<i64>,
}

/// Input for converting a quote into an order
#[derive(Debug, Deserialize)]
pub struct ConvertQuoteInput {
    pub carrier: String,
    pub converted_by: Option<i64>,
}

impl QuoteService {
    /// Create a new QuoteService instance
    pub fn new(db: PgPool, config: QuoteConfig) -> Self {
        Self { db, config }
    }

    /// Create a quote: price the lines, generate number, share token, QR
    /// payload and expiration
    pub async fn create_quote(&self, input: CreateQuoteInput) -> AppResult<QuoteWithItems> {
        let validity_days = input
            .validity_days
            .unwrap_or(self.config.default_validity_days);
        validation::validate_validity_days(validity_days).map_err(|e| AppError::Validation {
            field: "validity_days".to_string(),
            message: e.to_string(),
            message_fr: "La validité doit être d'au moins un jour".to_string(),
        })?;

        // Same calculator as order creation; fails whole batch on any
        // missing or inactive product
        let priced = PricingService::new(self.db.clone())
            .price_line_items(
                input.client_id,
                PriceLineItemsInput {
                    items: input.items.clone(),
                },
            )
            .await?;

        let now = Utc::now();
        let expires_at = now + Duration::days(validity_days);
        let share_token = generate_share_token();

        let mut tx = self.db.begin().await?;

        let quote_number = next_quote_number(&mut tx, now).await?;

        let row = sqlx::query_as::<_, QuoteRow>(
            r#"
            INSERT INTO quotes (client_id, quote_number, total_amount, share_token, qr_code_data, expires_at)
            VALUES ($1, $2, $3, $4, '', $5)
            RETURNING id, client_id, quote_number, total_amount, share_token, qr_code_data,
                      expires_at, converted, converted_order_id, created_at
            "#,
        )
        .bind(input.client_id)
        .bind(&quote_number)
        .bind(priced.total_amount)
        .bind(&share_token)
        .bind(expires_at)
        .fetch_one(&mut *tx)
        .await?;

        // The payload embeds the quote id, so it is derived after insertion
        let qr_code_data = qr_payload(row.id, &share_token, &self.config.share_base_url)?;

        let row = sqlx::query_as::<_, QuoteRow>(
            r#"
            UPDATE quotes
            SET qr_code_data = $1
            WHERE id = $2
            RETURNING id, client_id, quote_number, total_amount, share_token, qr_code_data,
                      expires_at, converted, converted_order_id, created_at
            "#,
        )
        .bind(&qr_code_data)
        .bind(row.id)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(priced.items.len());
        for line in &priced.items {
            let item_row = sqlx::query_as::<_, QuoteItemRow>(
                r#"
                INSERT INTO quote_items (quote_id, product_id, quantity, unit_price, total_price)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, quote_id, product_id, quantity, unit_price, total_price
                "#,
            )
            .bind(row.id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.total_price)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item_row.into());
        }

        tx.commit().await?;

        Ok(QuoteWithItems {
            quote: row.into(),
            items,
        })
    }

    /// Get a quote with its items
    pub async fn get_quote(&self, quote_id: i64) -> AppResult<QuoteWithItems> {
        let row = sqlx::query_as::<_, QuoteRow>(
            r#"
            SELECT id, client_id, quote_number, total_amount, share_token, qr_code_data,
                   expires_at, converted, converted_order_id, created_at
            FROM quotes
            WHERE id = $1
            "#,
        )
        .bind(quote_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Quote".to_string()))?;

        let items = self.get_items(row.id).await?;

        Ok(QuoteWithItems {
            quote: row.into(),
            items,
        })
    }

    /// Public share-link lookup by token
    ///
    /// Expired quotes remain readable; expiration only blocks conversion.
    pub async fn get_quote_by_token(&self, token: &str) -> AppResult<QuoteWithItems> {
        let row = sqlx::query_as::<_, QuoteRow>(
            r#"
            SELECT id, client_id, quote_number, total_amount, share_token, qr_code_data,
                   expires_at, converted, converted_order_id, created_at
            FROM quotes
            WHERE share_token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Quote".to_string()))?;

        let items = self.get_items(row.id).await?;

        Ok(QuoteWithItems {
            quote: row.into(),
            items,
        })
    }

    /// List quotes, optionally filtered by client
    pub async fn list_quotes(&self, client_id: Option<i64>) -> AppResult<Vec<Quote>> {
        let rows = match client_id {
            Some(client_id) => {
                sqlx::query_as::<_, QuoteRow>(
                    r#"
                    SELECT id, client_id, quote_number, total_amount, share_token, qr_code_data,
                           expires_at, converted, converted_order_id, created_at
                    FROM quotes
                    WHERE client_id = $1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(client_id)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, QuoteRow>(
                    r#"
                    SELECT id, client_id, quote_number, total_amount, share_token, qr_code_data,
                           expires_at, converted, converted_order_id, created_at
                    FROM quotes
                    ORDER BY created_at DESC
                    "#,
                )
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Convert a quote into an order at the quoted prices
    ///
    /// Conversion is the moment a quote starts counting against monthly
    /// limits, so the same locked limit check as order creation runs here.
    pub async fn convert_to_order(
        &self,
        quote_id: i64,
        input: ConvertQuoteInput,
    ) -> AppResult<Quote> {
        if input.carrier.trim().is_empty() {
            return Err(AppError::Validation {
                field: "carrier".to_string(),
                message: "Carrier is required".to_string(),
                message_fr: "Le transporteur est requis".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        let quote_row = sqlx::query_as::<_, QuoteRow>(
            r#"
            SELECT id, client_id, quote_number, total_amount, share_token, qr_code_data,
                   expires_at, converted, converted_order_id, created_at
            FROM quotes
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(quote_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Quote".to_string()))?;

        if quote_row.converted {
            return Err(AppError::InvalidStateTransition(format!(
                "Quote {} has already been converted",
                quote_row.quote_number
            )));
        }

        if Utc::now() >= quote_row.expires_at {
            return Err(AppError::QuoteExpired(quote_row.quote_number));
        }

        if let Some(user_id) = input.converted_by {
            let user_exists =
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                    .bind(user_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if !user_exists {
                return Err(AppError::NotFound("User".to_string()));
            }
        }

        let items = sqlx::query_as::<_, QuoteItemRow>(
            r#"
            SELECT id, quote_id, product_id, quantity, unit_price, total_price
            FROM quote_items
            WHERE quote_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(quote_id)
        .fetch_all(&mut *tx)
        .await?;

        enforce_limits_locked(&mut tx, quote_row.client_id, &items).await?;

        let order_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO orders (client_id, carrier, status, total_amount, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(quote_row.client_id)
        .bind(input.carrier.trim())
        .bind(OrderStatus::Submitted.as_str())
        .bind(quote_row.total_amount)
        .bind(input.converted_by)
        .fetch_one(&mut *tx)
        .await?;

        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, quantity, unit_price, total_price)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.total_price)
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query_as::<_, QuoteRow>(
            r#"
            UPDATE quotes
            SET converted = true, converted_order_id = $1
            WHERE id = $2
            RETURNING id, client_id, quote_number, total_amount, share_token, qr_code_data,
                      expires_at, converted, converted_order_id, created_at
            "#,
        )
        .bind(order_id)
        .bind(quote_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn get_items(&self, quote_id: i64) -> AppResult<Vec<QuoteItem>> {
        let items = sqlx::query_as::<_, QuoteItemRow>(
            r#"
            SELECT id, quote_id, product_id, quantity, unit_price, total_price
            FROM quote_items
            WHERE quote_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(quote_id)
        .fetch_all(&self.db)
        .await?;

        Ok(items.into_iter().map(Into::into).collect())
    }
}

/// Generate a URL-safe cryptographically random share token (32 bytes)
fn generate_share_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Base64 JSON payload for the quote QR code, embedding id, token and the
/// public share URL
fn qr_payload(quote_id: i64, share_token: &str, base_url: &str) -> AppResult<String> {
    let url = format!(
        "{}/quotes/shared/{}",
        base_url.trim_end_matches('/'),
        share_token
    );
    let payload = serde_json::json!({
        "quote_id": quote_id,
        "token": share_token,
        "url": url,
    });
    let bytes = serde_json::to_vec(&payload).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Allocate the next quote number for the current month: DEV-YYYYMM-NNNN
///
/// The transaction-scoped advisory lock serializes concurrent allocations
/// within a month, so two racing quote creations cannot compute the same
/// sequence number. The lock releases on commit or rollback.
async fn next_quote_number(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    now: DateTime<Utc>,
) -> AppResult<String> {
    let (year, month) = (now.year(), now.month());

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(quote_sequence_lock_key(year, month))
        .execute(&mut **tx)
        .await?;

    let prefix = format!("DEV-{:04}{:02}", year, month);
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM quotes WHERE quote_number LIKE $1 || '-%'",
    )
    .bind(&prefix)
    .fetch_one(&mut **tx)
    .await?;

    Ok(quote_number(year, month, count + 1))
}

/// Enforce monthly limits for quote lines at conversion time, with the
/// pricing rows locked like order creation
async fn enforce_limits_locked(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    client_id: i64,
    items: &[QuoteItemRow],
) -> AppResult<()> {
    let window_start = current_month_start();
    let mut violations: Vec<LimitViolation> = Vec::new();

    for item in items {
        let stock_limit = sqlx::query_scalar::<_, Option<i32>>(
            r#"
            SELECT stock_limit
            FROM client_product_pricing
            WHERE client_id = $1 AND product_id = $2
            FOR UPDATE
            "#,
        )
        .bind(client_id)
        .bind(item.product_id)
        .fetch_optional(&mut **tx)
        .await?
        .flatten();

        let Some(monthly_limit) = stock_limit else {
            continue;
        };

        let used = monthly_usage(&mut **tx, client_id, item.product_id, window_start).await?;
        let remaining = remaining_allowance(monthly_limit, used);
        if i64::from(item.quantity) > remaining {
            violations.push(LimitViolation {
                product_id: item.product_id,
                requested_quantity: item.quantity,
                remaining_limit: remaining.max(0),
                monthly_limit,
            });
        }
    }

    if !violations.is_empty() {
        return Err(AppError::StockLimitExceeded { violations });
    }

    Ok(())
}
