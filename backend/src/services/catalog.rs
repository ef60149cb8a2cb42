//! Catalog service: products, substitute relationships, and per-warehouse stock

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use shared::models::{Product, StockLevel, Substitute};
use shared::types::Warehouse;
use shared::validation;

/// Substitute lookups never return more than this many entries.
pub const MAX_SUBSTITUTES: i64 = 5;

/// Catalog service for managing products, substitutes and stock levels
#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
}

/// Database row for a product
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    reference: String,
    designation: String,
    brand: Option<String>,
    category: Option<String>,
    vehicle_compatibility: Option<String>,
    base_price: Decimal,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            reference: row.reference,
            designation: row.designation,
            brand: row.brand,
            category: row.category,
            vehicle_compatibility: row.vehicle_compatibility,
            base_price: row.base_price,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Database row for a stock level
#[derive(Debug, sqlx::FromRow)]
struct StockRow {
    product_id: i64,
    warehouse: String,
    quantity: i32,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StockRow> for StockLevel {
    type Error = AppError;

    fn try_from(row: StockRow) -> Result<Self, Self::Error> {
        let warehouse = row
            .warehouse
            .parse::<Warehouse>()
            .map_err(|e| AppError::Internal(format!("stock row {}: {}", row.product_id, e)))?;
        Ok(StockLevel {
            product_id: row.product_id,
            warehouse,
            quantity: row.quantity,
            updated_at: row.updated_at,
        })
    }
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub reference: String,
    pub designation: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub vehicle_compatibility: Option<String>,
    pub base_price: Decimal,
}

/// Input for registering a substitute relationship
#[derive(Debug, Deserialize)]
pub struct AddSubstituteInput {
    pub substitute_id: i64,
    pub priority: i32,
}

/// Input for writing a stock level
#[derive(Debug, Deserialize)]
pub struct SetStockInput {
    pub warehouse: Warehouse,
    pub quantity: i32,
}

impl CatalogService {
    /// Create a new CatalogService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a catalog product
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        validation::validate_reference(&input.reference).map_err(|e| AppError::Validation {
            field: "reference".to_string(),
            message: e.to_string(),
            message_fr: "La référence produit est requise".to_string(),
        })?;

        validation::validate_price(input.base_price).map_err(|e| AppError::Validation {
            field: "base_price".to_string(),
            message: e.to_string(),
            message_fr: "Le prix de base doit être positif".to_string(),
        })?;

        if input.designation.trim().is_empty() {
            return Err(AppError::Validation {
                field: "designation".to_string(),
                message: "Designation is required".to_string(),
                message_fr: "La désignation est requise".to_string(),
            });
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE reference = $1)",
        )
        .bind(&input.reference)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::DuplicateEntry("reference".to_string()));
        }

        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO products (reference, designation, brand, category, vehicle_compatibility, base_price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, reference, designation, brand, category, vehicle_compatibility,
                      base_price, is_active, created_at, updated_at
            "#,
        )
        .bind(&input.reference)
        .bind(&input.designation)
        .bind(&input.brand)
        .bind(&input.category)
        .bind(&input.vehicle_compatibility)
        .bind(input.base_price)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Get a product by ID, active or not
    pub async fn get_product(&self, product_id: i64) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, reference, designation, brand, category, vehicle_compatibility,
                   base_price, is_active, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into())
    }

    /// List catalog products, active first
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, reference, designation, brand, category, vehicle_compatibility,
                   base_price, is_active, created_at, updated_at
            FROM products
            ORDER BY is_active DESC, reference ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Soft-deactivate a product
    ///
    /// Products referenced by orders are never hard-deleted.
    pub async fn deactivate_product(&self, product_id: i64) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products
            SET is_active = false, updated_at = NOW()
            WHERE id = $1
            RETURNING id, reference, designation, brand, category, vehicle_compatibility,
                      base_price, is_active, created_at, updated_at
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into())
    }

    /// Register a substitute for a product
    pub async fn add_substitute(
        &self,
        product_id: i64,
        input: AddSubstituteInput,
    ) -> AppResult<Substitute> {
        validation::validate_substitute_priority(input.priority).map_err(|e| {
            AppError::Validation {
                field: "priority".to_string(),
                message: e.to_string(),
                message_fr: "La priorité doit être positive".to_string(),
            }
        })?;

        if product_id == input.substitute_id {
            return Err(AppError::Validation {
                field: "substitute_id".to_string(),
                message: "A product cannot substitute itself".to_string(),
                message_fr: "Un produit ne peut pas se substituer à lui-même".to_string(),
            });
        }

        for id in [product_id, input.substitute_id] {
            let exists =
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                    .bind(id)
                    .fetch_one(&self.db)
                    .await?;
            if !exists {
                return Err(AppError::NotFound("Product".to_string()));
            }
        }

        let pair_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM product_substitutes WHERE product_id = $1 AND substitute_id = $2)",
        )
        .bind(product_id)
        .bind(input.substitute_id)
        .fetch_one(&self.db)
        .await?;

        if pair_exists {
            return Err(AppError::DuplicateEntry("substitute".to_string()));
        }

        sqlx::query(
            "INSERT INTO product_substitutes (product_id, substitute_id, priority) VALUES ($1, $2, $3)",
        )
        .bind(product_id)
        .bind(input.substitute_id)
        .bind(input.priority)
        .execute(&self.db)
        .await?;

        let substitute = sqlx::query_as::<_, (i64, String, String, i32)>(
            r#"
            SELECT p.id, p.reference, p.designation, ps.priority
            FROM product_substitutes ps
            JOIN products p ON p.id = ps.substitute_id
            WHERE ps.product_id = $1 AND ps.substitute_id = $2
            "#,
        )
        .bind(product_id)
        .bind(input.substitute_id)
        .fetch_one(&self.db)
        .await?;

        Ok(Substitute {
            product_id: substitute.0,
            reference: substitute.1,
            designation: substitute.2,
            priority: substitute.3,
        })
    }

    /// Get substitutes for a product, ascending priority, capped at 5
    pub async fn get_substitutes(&self, product_id: i64) -> AppResult<Vec<Substitute>> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let rows = sqlx::query_as::<_, (i64, String, String, i32)>(
            r#"
            SELECT p.id, p.reference, p.designation, ps.priority
            FROM product_substitutes ps
            JOIN products p ON p.id = ps.substitute_id
            WHERE ps.product_id = $1 AND p.is_active = true
            ORDER BY ps.priority ASC
            LIMIT $2
            "#,
        )
        .bind(product_id)
        .bind(MAX_SUBSTITUTES)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, reference, designation, priority)| Substitute {
                product_id: id,
                reference,
                designation,
                priority,
            })
            .collect())
    }

    /// Write the stock level for a (product, warehouse) pair
    ///
    /// The row is created lazily on first write; the write is a single
    /// atomic upsert.
    pub async fn set_stock(&self, product_id: i64, input: SetStockInput) -> AppResult<StockLevel> {
        if input.quantity < 0 {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Stock quantity cannot be negative".to_string(),
                message_fr: "La quantité en stock ne peut pas être négative".to_string(),
            });
        }

        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let row = sqlx::query_as::<_, StockRow>(
            r#"
            INSERT INTO stock (product_id, warehouse, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (product_id, warehouse)
            DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = NOW()
            RETURNING product_id, warehouse, quantity, updated_at
            "#,
        )
        .bind(product_id)
        .bind(input.warehouse.as_str())
        .bind(input.quantity)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// Get the stock level for one (product, warehouse) pair
    ///
    /// Stock rows are created lazily, so a pair that was never written
    /// reads as quantity zero rather than not-found.
    pub async fn get_stock_at(
        &self,
        product_id: i64,
        warehouse: Warehouse,
    ) -> AppResult<StockLevel> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let row = sqlx::query_as::<_, StockRow>(
            r#"
            SELECT product_id, warehouse, quantity, updated_at
            FROM stock
            WHERE product_id = $1 AND warehouse = $2
            "#,
        )
        .bind(product_id)
        .bind(warehouse.as_str())
        .fetch_optional(&self.db)
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => Ok(StockLevel {
                product_id,
                warehouse,
                quantity: 0,
                updated_at: Utc::now(),
            }),
        }
    }

    /// Get stock levels for a product across all warehouses
    pub async fn get_stock(&self, product_id: i64) -> AppResult<Vec<StockLevel>> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let rows = sqlx::query_as::<_, StockRow>(
            r#"
            SELECT product_id, warehouse, quantity, updated_at
            FROM stock
            WHERE product_id = $1
            ORDER BY warehouse ASC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
