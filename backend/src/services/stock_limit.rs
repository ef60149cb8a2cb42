//! Stock-limit validator: monthly per-client consumption caps
//!
//! Order items are the system of record for consumption. The window starts
//! on the first calendar day of the current month, 00:00:00 local server
//! time. This service is a read-only query; the blocking wiring lives in
//! order creation, which re-runs the check under row locks before commit.

use chrono::{Local, TimeZone, Utc};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::services::pricing::LineItemInput;
use shared::models::{month_start, remaining_allowance, LimitValidation};
use shared::validation;

pub use shared::models::LimitViolation;

/// Stock-limit service for validating requested quantities against monthly caps
#[derive(Clone)]
pub struct StockLimitService {
    db: PgPool,
}

/// Input for validating requested quantities
#[derive(Debug, serde::Deserialize)]
pub struct ValidateLimitsInput {
    pub items: Vec<LineItemInput>,
}

impl StockLimitService {
    /// Create a new StockLimitService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Validate requested quantities against configured monthly limits
    ///
    /// Lines without a pricing row, or without a configured limit, are
    /// unconstrained. Violations are reported as data; nothing is mutated.
    pub async fn validate_limits(
        &self,
        client_id: i64,
        items: &[LineItemInput],
    ) -> AppResult<LimitValidation> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
                .bind(client_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Client".to_string()));
        }

        let window_start = current_month_start();
        let mut violations = Vec::new();

        for line in items {
            validation::validate_quantity(line.quantity).map_err(|e| AppError::Validation {
                field: "quantity".to_string(),
                message: e.to_string(),
                message_fr: "La quantité doit être positive".to_string(),
            })?;

            let monthly_limit = sqlx::query_scalar::<_, Option<i32>>(
                r#"
                SELECT stock_limit
                FROM client_product_pricing
                WHERE client_id = $1 AND product_id = $2
                "#,
            )
            .bind(client_id)
            .bind(line.product_id)
            .fetch_optional(&self.db)
            .await?
            .flatten();

            let Some(monthly_limit) = monthly_limit else {
                continue;
            };

            let used = monthly_usage(&self.db, client_id, line.product_id, window_start).await?;
            let remaining = remaining_allowance(monthly_limit, used);

            // Compare unclamped, report clamped
            if i64::from(line.quantity) > remaining {
                violations.push(LimitViolation {
                    product_id: line.product_id,
                    requested_quantity: line.quantity,
                    remaining_limit: remaining.max(0),
                    monthly_limit,
                });
            }
        }

        Ok(LimitValidation {
            is_valid: violations.is_empty(),
            violations,
        })
    }
}

/// Units of a product consumed by a client's orders since `window_start`
pub(crate) async fn monthly_usage<'e, E>(
    executor: E,
    client_id: i64,
    product_id: i64,
    window_start: chrono::DateTime<Utc>,
) -> AppResult<i64>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    let used = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COALESCE(SUM(oi.quantity), 0)
        FROM order_items oi
        JOIN orders o ON o.id = oi.order_id
        WHERE o.client_id = $1 AND oi.product_id = $2 AND o.created_at >= $3
        "#,
    )
    .bind(client_id)
    .bind(product_id)
    .bind(window_start)
    .fetch_one(executor)
    .await?;

    Ok(used)
}

/// First instant of the current month, local server time, as a UTC timestamp
pub(crate) fn current_month_start() -> chrono::DateTime<Utc> {
    let start = month_start(Local::now().date_naive());
    match Local.from_local_datetime(&start) {
        chrono::LocalResult::Single(dt) => dt.with_timezone(&Utc),
        // DST gaps/folds at month start: fall back to the earliest mapping
        chrono::LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        chrono::LocalResult::None => Utc
            .from_utc_datetime(&start),
    }
}
