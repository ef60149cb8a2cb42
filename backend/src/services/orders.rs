//! Order service: transactional order creation and lifecycle updates
//!
//! Order creation prices every line with the pricing resolver policy and
//! re-runs the monthly stock-limit check inside its own transaction, with
//! the pricing rows locked, so two orders racing the same limit serialize
//! instead of both passing a stale check.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::services::pricing::LineItemInput;
use crate::services::stock_limit::{current_month_start, monthly_usage, LimitViolation};
use shared::models::{
    remaining_allowance, resolve_final_price, round_currency, Order, OrderItem, OrderWithItems,
};
use shared::types::OrderStatus;
use shared::validation;

/// Order service for creating and querying client orders
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

/// Database row for an order
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    client_id: i64,
    carrier: String,
    status: String,
    total_amount: Decimal,
    created_at: DateTime<Utc>,
    created_by: Option<i64>,
}

impl TryFrom<OrderRow> for Order {
    type Error = AppError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<OrderStatus>()
            .map_err(|e| AppError::Internal(format!("order {}: {}", row.id, e)))?;
        Ok(Order {
            id: row.id,
            client_id: row.client_id,
            carrier: row.carrier,
            status,
            total_amount: row.total_amount,
            created_at: row.created_at,
            created_by: row.created_by,
        })
    }
}

/// Database row for an order item
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i64,
    order_id: i64,
    product_id: i64,
    quantity: i32,
    unit_price: Decimal,
    total_price: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price: row.unit_price,
            total_price: row.total_price,
        }
    }
}

/// Input for creating an order
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub client_id: i64,
    pub carrier: String,
    pub items: Vec<LineItemInput>,
    pub created_by: Option<i64>,
}

/// Input for updating an order status
#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusInput {
    pub status: OrderStatus,
}

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create an order: limit check, pricing, and persistence in one
    /// transaction
    pub async fn create_order(&self, input: CreateOrderInput) -> AppResult<OrderWithItems> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "At least one line item is required".to_string(),
                message_fr: "Au moins une ligne est requise".to_string(),
            });
        }

        if input.carrier.trim().is_empty() {
            return Err(AppError::Validation {
                field: "carrier".to_string(),
                message: "Carrier is required".to_string(),
                message_fr: "Le transporteur est requis".to_string(),
            });
        }

        for line in &input.items {
            validation::validate_quantity(line.quantity).map_err(|e| AppError::Validation {
                field: "quantity".to_string(),
                message: e.to_string(),
                message_fr: "La quantité doit être positive".to_string(),
            })?;
        }

        let mut tx = self.db.begin().await?;

        let client_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
                .bind(input.client_id)
                .fetch_one(&mut *tx)
                .await?;

        if !client_exists {
            return Err(AppError::NotFound("Client".to_string()));
        }

        if let Some(user_id) = input.created_by {
            let user_exists =
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                    .bind(user_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if !user_exists {
                return Err(AppError::NotFound("User".to_string()));
            }
        }

        let priced = price_items_locked(&mut tx, input.client_id, &input.items).await?;

        let order_row = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO orders (client_id, carrier, status, total_amount, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, client_id, carrier, status, total_amount, created_at, created_by
            "#,
        )
        .bind(input.client_id)
        .bind(input.carrier.trim())
        .bind(OrderStatus::Submitted.as_str())
        .bind(priced.total_amount)
        .bind(input.created_by)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(priced.lines.len());
        for line in &priced.lines {
            let item_row = sqlx::query_as::<_, OrderItemRow>(
                r#"
                INSERT INTO order_items (order_id, product_id, quantity, unit_price, total_price)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, order_id, product_id, quantity, unit_price, total_price
                "#,
            )
            .bind(order_row.id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.total_price)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item_row.into());
        }

        tx.commit().await?;

        Ok(OrderWithItems {
            order: order_row.try_into()?,
            items,
        })
    }

    /// Get an order with its items
    pub async fn get_order(&self, order_id: i64) -> AppResult<OrderWithItems> {
        let order_row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, client_id, carrier, status, total_amount, created_at, created_by
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        let items = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT id, order_id, product_id, quantity, unit_price, total_price
            FROM order_items
            WHERE order_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(OrderWithItems {
            order: order_row.try_into()?,
            items: items.into_iter().map(Into::into).collect(),
        })
    }

    /// List orders, optionally filtered by client
    pub async fn list_orders(&self, client_id: Option<i64>) -> AppResult<Vec<Order>> {
        let rows = match client_id {
            Some(client_id) => {
                sqlx::query_as::<_, OrderRow>(
                    r#"
                    SELECT id, client_id, carrier, status, total_amount, created_at, created_by
                    FROM orders
                    WHERE client_id = $1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(client_id)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, OrderRow>(
                    r#"
                    SELECT id, client_id, carrier, status, total_amount, created_at, created_by
                    FROM orders
                    ORDER BY created_at DESC
                    "#,
                )
                .fetch_all(&self.db)
                .await?
            }
        };

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Update an order's lifecycle status
    pub async fn update_order_status(
        &self,
        order_id: i64,
        input: UpdateOrderStatusInput,
    ) -> AppResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            UPDATE orders
            SET status = $1
            WHERE id = $2
            RETURNING id, client_id, carrier, status, total_amount, created_at, created_by
            "#,
        )
        .bind(input.status.as_str())
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        row.try_into()
    }
}

/// A priced line ready for insertion
pub(crate) struct PricedLine {
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Priced lines plus the rounded total
pub(crate) struct PricedBatch {
    pub lines: Vec<PricedLine>,
    pub total_amount: Decimal,
}

/// Price lines inside an open transaction, locking each pricing row and
/// enforcing the monthly stock limit.
///
/// `FOR UPDATE` on the pricing row serializes concurrent orders racing the
/// same (client, product) limit; the monthly-usage sum then sees committed
/// state only.
pub(crate) async fn price_items_locked(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    client_id: i64,
    items: &[LineItemInput],
) -> AppResult<PricedBatch> {
    let window_start = current_month_start();
    let mut lines = Vec::with_capacity(items.len());
    let mut violations: Vec<LimitViolation> = Vec::new();
    let mut total = Decimal::ZERO;

    for line in items {
        let base_price = sqlx::query_scalar::<_, Decimal>(
            "SELECT base_price FROM products WHERE id = $1 AND is_active = true",
        )
        .bind(line.product_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let pricing = sqlx::query_as::<_, (Option<Decimal>, Option<Decimal>, Option<i32>)>(
            r#"
            SELECT custom_price, discount_percentage, stock_limit
            FROM client_product_pricing
            WHERE client_id = $1 AND product_id = $2
            FOR UPDATE
            "#,
        )
        .bind(client_id)
        .bind(line.product_id)
        .fetch_optional(&mut **tx)
        .await?;

        let (custom_price, discount_percentage, stock_limit) =
            pricing.unwrap_or((None, None, None));

        if let Some(monthly_limit) = stock_limit {
            let used = monthly_usage(&mut **tx, client_id, line.product_id, window_start).await?;
            let remaining = remaining_allowance(monthly_limit, used);
            if i64::from(line.quantity) > remaining {
                violations.push(LimitViolation {
                    product_id: line.product_id,
                    requested_quantity: line.quantity,
                    remaining_limit: remaining.max(0),
                    monthly_limit,
                });
                continue;
            }
        }

        let unit_price = resolve_final_price(base_price, custom_price, discount_percentage);
        let total_price = unit_price * Decimal::from(line.quantity);
        total += total_price;

        lines.push(PricedLine {
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price,
            total_price,
        });
    }

    if !violations.is_empty() {
        return Err(AppError::StockLimitExceeded { violations });
    }

    Ok(PricedBatch {
        lines,
        total_amount: round_currency(total),
    })
}
