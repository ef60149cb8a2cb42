//! HTTP handlers for transfer workflow endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::services::transfers::{
    ConfirmReceptionInput, CreateTransferInput, TransferService, UpdateTransferStatusInput,
};
use crate::AppState;
use shared::models::TransferRequest;
use shared::types::Warehouse;

/// Query parameters for listing transfers
#[derive(Debug, Deserialize)]
pub struct ListTransfersQuery {
    pub origin: Option<Warehouse>,
    pub order_id: Option<i64>,
}

/// Create a transfer request (status `pending`)
pub async fn create_transfer(
    State(state): State<AppState>,
    Json(input): Json<CreateTransferInput>,
) -> AppResult<Json<TransferRequest>> {
    let service = TransferService::new(state.db);
    let transfer = service.create_transfer_request(input).await?;
    Ok(Json(transfer))
}

/// Get a transfer request by ID
pub async fn get_transfer(
    State(state): State<AppState>,
    Path(transfer_id): Path<i64>,
) -> AppResult<Json<TransferRequest>> {
    let service = TransferService::new(state.db);
    let transfer = service.get_transfer(transfer_id).await?;
    Ok(Json(transfer))
}

/// List transfers by origin warehouse or by parent order
pub async fn list_transfers(
    State(state): State<AppState>,
    Query(query): Query<ListTransfersQuery>,
) -> AppResult<Json<Vec<TransferRequest>>> {
    let service = TransferService::new(state.db);
    let transfers = match (query.origin, query.order_id) {
        (Some(origin), None) => service.list_by_origin(origin).await?,
        (None, Some(order_id)) => service.list_by_order(order_id).await?,
        _ => {
            return Err(AppError::ValidationError(
                "Provide exactly one of 'origin' or 'order_id'".to_string(),
            ))
        }
    };
    Ok(Json(transfers))
}

/// List transfers awaiting reception at a destination warehouse
pub async fn list_pending_reception(
    State(state): State<AppState>,
    Path(warehouse): Path<Warehouse>,
) -> AppResult<Json<Vec<TransferRequest>>> {
    let service = TransferService::new(state.db);
    let transfers = service.list_pending_reception(warehouse).await?;
    Ok(Json(transfers))
}

/// Apply a status transition to a transfer
pub async fn update_transfer_status(
    State(state): State<AppState>,
    Path(transfer_id): Path<i64>,
    Json(input): Json<UpdateTransferStatusInput>,
) -> AppResult<Json<TransferRequest>> {
    let service = TransferService::new(state.db);
    let transfer = service.update_transfer_status(transfer_id, input).await?;
    Ok(Json(transfer))
}

/// Confirm reception of a shipped transfer, adjusting stock at both
/// warehouses
pub async fn confirm_reception(
    State(state): State<AppState>,
    Path(transfer_id): Path<i64>,
    Json(input): Json<ConfirmReceptionInput>,
) -> AppResult<Json<TransferRequest>> {
    let service = TransferService::new(state.db);
    let transfer = service.confirm_reception(transfer_id, input).await?;
    Ok(Json(transfer))
}
