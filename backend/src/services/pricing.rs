//! Pricing service: per-client price resolution and order/quote totals
//!
//! Resolution policy: a positive custom price overrides everything, then a
//! positive discount percentage off the base price, then the base price.
//! The same calculator prices order lines and quote lines.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use shared::models::{
    normalize_custom_price, resolve_final_price, round_currency, ClientProductPricing, PricedItems,
    PricedLineItem, ResolvedPrice,
};
use shared::validation;

/// Pricing service for personalized prices and line-item totals
#[derive(Clone)]
pub struct PricingService {
    db: PgPool,
}

/// Database row for a client/product pricing entry
#[derive(Debug, sqlx::FromRow)]
struct PricingRow {
    id: i64,
    client_id: i64,
    product_id: i64,
    custom_price: Option<Decimal>,
    discount_percentage: Option<Decimal>,
    stock_limit: Option<i32>,
    updated_at: DateTime<Utc>,
}

impl From<PricingRow> for ClientProductPricing {
    fn from(row: PricingRow) -> Self {
        ClientProductPricing {
            id: row.id,
            client_id: row.client_id,
            product_id: row.product_id,
            custom_price: row.custom_price,
            discount_percentage: row.discount_percentage,
            stock_limit: row.stock_limit,
            updated_at: row.updated_at,
        }
    }
}

/// Input for setting pricing on a (client, product) pair
///
/// Upsert semantics: one row per pair, replaced in place.
#[derive(Debug, Deserialize)]
pub struct SetPricingInput {
    pub product_id: i64,
    pub custom_price: Option<Decimal>,
    pub discount_percentage: Option<Decimal>,
    pub stock_limit: Option<i32>,
}

/// One requested line: a product and a quantity
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemInput {
    pub product_id: i64,
    pub quantity: i32,
}

/// Input for pricing a list of line items
#[derive(Debug, Deserialize)]
pub struct PriceLineItemsInput {
    pub items: Vec<LineItemInput>,
}

impl PricingService {
    /// Create a new PricingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Set or replace pricing for a (client, product) pair
    pub async fn set_client_pricing(
        &self,
        client_id: i64,
        input: SetPricingInput,
    ) -> AppResult<ClientProductPricing> {
        if let Some(discount) = input.discount_percentage {
            validation::validate_discount_percentage(discount).map_err(|e| {
                AppError::Validation {
                    field: "discount_percentage".to_string(),
                    message: e.to_string(),
                    message_fr: "La remise doit être comprise entre 0 et 100".to_string(),
                }
            })?;
        }

        if let Some(custom) = input.custom_price {
            if custom < Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "custom_price".to_string(),
                    message: "Custom price cannot be negative".to_string(),
                    message_fr: "Le prix personnalisé ne peut pas être négatif".to_string(),
                });
            }
        }

        if let Some(limit) = input.stock_limit {
            validation::validate_stock_limit(limit).map_err(|e| AppError::Validation {
                field: "stock_limit".to_string(),
                message: e.to_string(),
                message_fr: "La limite mensuelle doit être positive".to_string(),
            })?;
        }

        self.ensure_client_exists(client_id).await?;

        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(input.product_id)
                .fetch_one(&self.db)
                .await?;

        if !product_exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        // Zero means "no override"; stored as NULL so the row never
        // carries a zero price
        let custom_price = normalize_custom_price(input.custom_price);

        // Single atomic upsert, one row per (client, product) pair
        let row = sqlx::query_as::<_, PricingRow>(
            r#"
            INSERT INTO client_product_pricing (client_id, product_id, custom_price, discount_percentage, stock_limit)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (client_id, product_id)
            DO UPDATE SET custom_price = EXCLUDED.custom_price,
                          discount_percentage = EXCLUDED.discount_percentage,
                          stock_limit = EXCLUDED.stock_limit,
                          updated_at = NOW()
            RETURNING id, client_id, product_id, custom_price, discount_percentage, stock_limit, updated_at
            "#,
        )
        .bind(client_id)
        .bind(input.product_id)
        .bind(custom_price)
        .bind(input.discount_percentage)
        .bind(input.stock_limit)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// List pricing entries for a client
    pub async fn list_client_pricing(&self, client_id: i64) -> AppResult<Vec<ClientProductPricing>> {
        self.ensure_client_exists(client_id).await?;

        let rows = sqlx::query_as::<_, PricingRow>(
            r#"
            SELECT id, client_id, product_id, custom_price, discount_percentage, stock_limit, updated_at
            FROM client_product_pricing
            WHERE client_id = $1
            ORDER BY product_id ASC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Resolve the effective unit price for a client and an active product
    ///
    /// Pure read; both pricing data points are returned even when one is
    /// unused.
    pub async fn resolve_price(&self, client_id: i64, product_id: i64) -> AppResult<ResolvedPrice> {
        self.ensure_client_exists(client_id).await?;
        self.resolve_for_product(client_id, product_id).await
    }

    /// Price a list of line items and compute the total
    ///
    /// Any missing or inactive product fails the whole batch. The total is
    /// rounded to currency scale once at the end, not per line.
    pub async fn price_line_items(
        &self,
        client_id: i64,
        input: PriceLineItemsInput,
    ) -> AppResult<PricedItems> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "At least one line item is required".to_string(),
                message_fr: "Au moins une ligne est requise".to_string(),
            });
        }

        self.ensure_client_exists(client_id).await?;

        let mut items = Vec::with_capacity(input.items.len());
        let mut total = Decimal::ZERO;

        for line in &input.items {
            validation::validate_quantity(line.quantity).map_err(|e| AppError::Validation {
                field: "quantity".to_string(),
                message: e.to_string(),
                message_fr: "La quantité doit être positive".to_string(),
            })?;

            let resolved = self.resolve_for_product(client_id, line.product_id).await?;
            let total_price = resolved.final_price * Decimal::from(line.quantity);
            total += total_price;

            items.push(PricedLineItem {
                product_id: resolved.product_id,
                quantity: line.quantity,
                base_price: resolved.base_price,
                custom_price: resolved.custom_price,
                discount_percentage: resolved.discount_percentage,
                unit_price: resolved.final_price,
                total_price,
            });
        }

        Ok(PricedItems {
            items,
            total_amount: round_currency(total),
        })
    }

    /// Resolve pricing for one product, assuming the client was checked
    async fn resolve_for_product(&self, client_id: i64, product_id: i64) -> AppResult<ResolvedPrice> {
        let base_price = sqlx::query_scalar::<_, Decimal>(
            "SELECT base_price FROM products WHERE id = $1 AND is_active = true",
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let pricing = sqlx::query_as::<_, (Option<Decimal>, Option<Decimal>)>(
            r#"
            SELECT custom_price, discount_percentage
            FROM client_product_pricing
            WHERE client_id = $1 AND product_id = $2
            "#,
        )
        .bind(client_id)
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?;

        let (custom_price, discount_percentage) = pricing.unwrap_or((None, None));
        let final_price = resolve_final_price(base_price, custom_price, discount_percentage);

        Ok(ResolvedPrice {
            product_id,
            base_price,
            custom_price,
            discount_percentage,
            final_price,
        })
    }

    async fn ensure_client_exists(&self, client_id: i64) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
                .bind(client_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Client".to_string()));
        }
        Ok(())
    }
}
