//! HTTP handler for monthly stock-limit validation

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppResult;
use crate::services::stock_limit::{StockLimitService, ValidateLimitsInput};
use crate::AppState;
use shared::models::LimitValidation;

/// Validate requested quantities against configured monthly limits
///
/// Violations are returned as data; callers decide whether to block.
pub async fn validate_limits(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
    Json(input): Json<ValidateLimitsInput>,
) -> AppResult<Json<LimitValidation>> {
    let service = StockLimitService::new(state.db);
    let validation = service.validate_limits(client_id, &input.items).await?;
    Ok(Json(validation))
}
