//! Transfer workflow service: inter-warehouse stock movements
//!
//! State machine `pending -> in_preparation -> ready_to_ship -> shipped ->
//! received`, with `cancelled` as a side branch. Reception is the terminal
//! step with stock-ledger side effects at both warehouses, performed
//! atomically under a row lock on the transfer.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use shared::models::TransferRequest;
use shared::types::{TransferStatus, Warehouse};
use shared::validation;

/// Transfer service for the inter-warehouse movement workflow
#[derive(Clone)]
pub struct TransferService {
    db: PgPool,
}

/// Database row for a transfer request
#[derive(Debug, sqlx::FromRow)]
struct TransferRow {
    id: i64,
    order_id: i64,
    product_id: i64,
    from_warehouse: String,
    to_warehouse: String,
    quantity_requested: i32,
    quantity_prepared: i32,
    status: String,
    requested_by: i64,
    requested_at: DateTime<Utc>,
    prepared_by: Option<i64>,
    prepared_at: Option<DateTime<Utc>>,
    received_by: Option<i64>,
    received_at: Option<DateTime<Utc>>,
}

const TRANSFER_COLUMNS: &str = "id, order_id, product_id, from_warehouse, to_warehouse, \
     quantity_requested, quantity_prepared, status, requested_by, requested_at, \
     prepared_by, prepared_at, received_by, received_at";

impl TryFrom<TransferRow> for TransferRequest {
    type Error = AppError;

    fn try_from(row: TransferRow) -> Result<Self, Self::Error> {
        let from_warehouse = row
            .from_warehouse
            .parse::<Warehouse>()
            .map_err(|e| AppError::Internal(format!("transfer {}: {}", row.id, e)))?;
        let to_warehouse = row
            .to_warehouse
            .parse::<Warehouse>()
            .map_err(|e| AppError::Internal(format!("transfer {}: {}", row.id, e)))?;
        let status = row
            .status
            .parse::<TransferStatus>()
            .map_err(|e| AppError::Internal(format!("transfer {}: {}", row.id, e)))?;

        Ok(TransferRequest {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            from_warehouse,
            to_warehouse,
            quantity_requested: row.quantity_requested,
            quantity_prepared: row.quantity_prepared,
            status,
            requested_by: row.requested_by,
            requested_at: row.requested_at,
            prepared_by: row.prepared_by,
            prepared_at: row.prepared_at,
            received_by: row.received_by,
            received_at: row.received_at,
        })
    }
}

/// Input for creating a transfer request
#[derive(Debug, Deserialize)]
pub struct CreateTransferInput {
    pub order_id: i64,
    pub product_id: i64,
    pub from_warehouse: Warehouse,
    pub to_warehouse: Warehouse,
    pub quantity: i32,
    pub requested_by: i64,
}

/// Input for a status transition
#[derive(Debug, Deserialize)]
pub struct UpdateTransferStatusInput {
    pub status: TransferStatus,
    pub updated_by: i64,
    pub quantity_prepared: Option<i32>,
}

/// Input for confirming reception
#[derive(Debug, Deserialize)]
pub struct ConfirmReceptionInput {
    pub received_by: i64,
    pub quantity_received: i32,
}

impl TransferService {
    /// Create a new TransferService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a transfer request in `pending` status
    pub async fn create_transfer_request(
        &self,
        input: CreateTransferInput,
    ) -> AppResult<TransferRequest> {
        validation::validate_quantity(input.quantity).map_err(|e| AppError::Validation {
            field: "quantity".to_string(),
            message: e.to_string(),
            message_fr: "La quantité doit être positive".to_string(),
        })?;

        validation::validate_transfer_route(input.from_warehouse, input.to_warehouse).map_err(
            |e| AppError::Validation {
                field: "to_warehouse".to_string(),
                message: e.to_string(),
                message_fr: "Les entrepôts source et destination doivent différer".to_string(),
            },
        )?;

        let order_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM orders WHERE id = $1)")
                .bind(input.order_id)
                .fetch_one(&self.db)
                .await?;
        if !order_exists {
            return Err(AppError::NotFound("Order".to_string()));
        }

        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(input.product_id)
                .fetch_one(&self.db)
                .await?;
        if !product_exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        self.ensure_user_exists(input.requested_by).await?;

        let row = sqlx::query_as::<_, TransferRow>(&format!(
            r#"
            INSERT INTO transfer_requests
                (order_id, product_id, from_warehouse, to_warehouse, quantity_requested,
                 quantity_prepared, status, requested_by)
            VALUES ($1, $2, $3, $4, $5, 0, $6, $7)
            RETURNING {TRANSFER_COLUMNS}
            "#
        ))
        .bind(input.order_id)
        .bind(input.product_id)
        .bind(input.from_warehouse.as_str())
        .bind(input.to_warehouse.as_str())
        .bind(input.quantity)
        .bind(TransferStatus::Pending.as_str())
        .bind(input.requested_by)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// Apply a status transition
    ///
    /// Preparation transitions (`in_preparation`, `ready_to_ship`) attribute
    /// the preparer and may update the prepared quantity. `shipped` confirms
    /// a quantity without re-attributing the preparer. `received` must go
    /// through reception confirmation.
    pub async fn update_transfer_status(
        &self,
        transfer_id: i64,
        input: UpdateTransferStatusInput,
    ) -> AppResult<TransferRequest> {
        if input.status == TransferStatus::Received {
            return Err(AppError::InvalidStateTransition(
                "Reception must be confirmed through the reception endpoint".to_string(),
            ));
        }

        if let Some(prepared) = input.quantity_prepared {
            validation::validate_prepared_quantity(prepared).map_err(|e| {
                AppError::Validation {
                    field: "quantity_prepared".to_string(),
                    message: e.to_string(),
                    message_fr: "La quantité préparée ne peut pas être négative".to_string(),
                }
            })?;
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM transfer_requests WHERE id = $1)",
        )
        .bind(transfer_id)
        .fetch_one(&self.db)
        .await?;
        if !exists {
            return Err(AppError::NotFound("Transfer request".to_string()));
        }

        self.ensure_user_exists(input.updated_by).await?;

        let row = if input.status.records_preparation() {
            sqlx::query_as::<_, TransferRow>(&format!(
                r#"
                UPDATE transfer_requests
                SET status = $1,
                    prepared_by = $2,
                    prepared_at = NOW(),
                    quantity_prepared = COALESCE($3, quantity_prepared)
                WHERE id = $4
                RETURNING {TRANSFER_COLUMNS}
                "#
            ))
            .bind(input.status.as_str())
            .bind(input.updated_by)
            .bind(input.quantity_prepared)
            .bind(transfer_id)
            .fetch_one(&self.db)
            .await?
        } else if input.status == TransferStatus::Shipped {
            sqlx::query_as::<_, TransferRow>(&format!(
                r#"
                UPDATE transfer_requests
                SET status = $1,
                    quantity_prepared = COALESCE($2, quantity_prepared)
                WHERE id = $3
                RETURNING {TRANSFER_COLUMNS}
                "#
            ))
            .bind(input.status.as_str())
            .bind(input.quantity_prepared)
            .bind(transfer_id)
            .fetch_one(&self.db)
            .await?
        } else {
            // pending / cancelled: plain status update
            sqlx::query_as::<_, TransferRow>(&format!(
                r#"
                UPDATE transfer_requests
                SET status = $1
                WHERE id = $2
                RETURNING {TRANSFER_COLUMNS}
                "#
            ))
            .bind(input.status.as_str())
            .bind(transfer_id)
            .fetch_one(&self.db)
            .await?
        };

        row.try_into()
    }

    /// Confirm reception: legal only from `shipped`
    ///
    /// Sets `received` with actor/timestamp, then adjusts the stock ledger
    /// atomically: destination incremented (row created lazily), source
    /// decremented floored at zero.
    pub async fn confirm_reception(
        &self,
        transfer_id: i64,
        input: ConfirmReceptionInput,
    ) -> AppResult<TransferRequest> {
        validation::validate_quantity(input.quantity_received).map_err(|e| {
            AppError::Validation {
                field: "quantity_received".to_string(),
                message: e.to_string(),
                message_fr: "La quantité reçue doit être positive".to_string(),
            }
        })?;

        self.ensure_user_exists(input.received_by).await?;

        let mut tx = self.db.begin().await?;

        // Row lock serializes concurrent reception confirmations
        let row = sqlx::query_as::<_, TransferRow>(&format!(
            r#"
            SELECT {TRANSFER_COLUMNS}
            FROM transfer_requests
            WHERE id = $1
            FOR UPDATE
            "#
        ))
        .bind(transfer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Transfer request".to_string()))?;

        let status = row
            .status
            .parse::<TransferStatus>()
            .map_err(|e| AppError::Internal(format!("transfer {}: {}", row.id, e)))?;

        if !status.can_confirm_reception() {
            return Err(AppError::InvalidStateTransition(format!(
                "Transfer must be in 'shipped' status to confirm reception, current status: {}",
                status.as_str()
            )));
        }

        let row = sqlx::query_as::<_, TransferRow>(&format!(
            r#"
            UPDATE transfer_requests
            SET status = $1, received_by = $2, received_at = NOW()
            WHERE id = $3
            RETURNING {TRANSFER_COLUMNS}
            "#
        ))
        .bind(TransferStatus::Received.as_str())
        .bind(input.received_by)
        .bind(transfer_id)
        .fetch_one(&mut *tx)
        .await?;

        // Destination: increment, creating the (product, warehouse) row
        // lazily on first write
        sqlx::query(
            r#"
            INSERT INTO stock (product_id, warehouse, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (product_id, warehouse)
            DO UPDATE SET quantity = stock.quantity + EXCLUDED.quantity, updated_at = NOW()
            "#,
        )
        .bind(row.product_id)
        .bind(&row.to_warehouse)
        .bind(input.quantity_received)
        .execute(&mut *tx)
        .await?;

        // Source: decrement floored at zero; an absent row stays absent
        sqlx::query(
            r#"
            UPDATE stock
            SET quantity = GREATEST(quantity - $1, 0), updated_at = NOW()
            WHERE product_id = $2 AND warehouse = $3
            "#,
        )
        .bind(input.quantity_received)
        .bind(row.product_id)
        .bind(&row.from_warehouse)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        row.try_into()
    }

    /// Get a transfer request by ID
    pub async fn get_transfer(&self, transfer_id: i64) -> AppResult<TransferRequest> {
        let row = sqlx::query_as::<_, TransferRow>(&format!(
            r#"
            SELECT {TRANSFER_COLUMNS}
            FROM transfer_requests
            WHERE id = $1
            "#
        ))
        .bind(transfer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Transfer request".to_string()))?;

        row.try_into()
    }

    /// List transfers originating from a warehouse
    pub async fn list_by_origin(&self, warehouse: Warehouse) -> AppResult<Vec<TransferRequest>> {
        let rows = sqlx::query_as::<_, TransferRow>(&format!(
            r#"
            SELECT {TRANSFER_COLUMNS}
            FROM transfer_requests
            WHERE from_warehouse = $1
            ORDER BY requested_at DESC
            "#
        ))
        .bind(warehouse.as_str())
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// List transfers awaiting reception at a destination warehouse
    /// (statuses `shipped` and `ready_to_ship`)
    pub async fn list_pending_reception(
        &self,
        warehouse: Warehouse,
    ) -> AppResult<Vec<TransferRequest>> {
        let rows = sqlx::query_as::<_, TransferRow>(&format!(
            r#"
            SELECT {TRANSFER_COLUMNS}
            FROM transfer_requests
            WHERE to_warehouse = $1 AND status IN ($2, $3)
            ORDER BY requested_at ASC
            "#
        ))
        .bind(warehouse.as_str())
        .bind(TransferStatus::Shipped.as_str())
        .bind(TransferStatus::ReadyToShip.as_str())
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// List transfers tied to an order
    pub async fn list_by_order(&self, order_id: i64) -> AppResult<Vec<TransferRequest>> {
        let rows = sqlx::query_as::<_, TransferRow>(&format!(
            r#"
            SELECT {TRANSFER_COLUMNS}
            FROM transfer_requests
            WHERE order_id = $1
            ORDER BY requested_at DESC
            "#
        ))
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn ensure_user_exists(&self, user_id: i64) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("User".to_string()));
        }
        Ok(())
    }
}
