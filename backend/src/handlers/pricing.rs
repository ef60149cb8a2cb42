//! HTTP handlers for pricing endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppResult;
use crate::services::pricing::{PriceLineItemsInput, PricingService, SetPricingInput};
use crate::AppState;
use shared::models::{ClientProductPricing, PricedItems, ResolvedPrice};

/// Set or replace pricing for a (client, product) pair
pub async fn set_client_pricing(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
    Json(input): Json<SetPricingInput>,
) -> AppResult<Json<ClientProductPricing>> {
    let service = PricingService::new(state.db);
    let pricing = service.set_client_pricing(client_id, input).await?;
    Ok(Json(pricing))
}

/// List pricing entries for a client
pub async fn list_client_pricing(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
) -> AppResult<Json<Vec<ClientProductPricing>>> {
    let service = PricingService::new(state.db);
    let pricing = service.list_client_pricing(client_id).await?;
    Ok(Json(pricing))
}

/// Resolve the effective unit price for a client and product
pub async fn resolve_price(
    State(state): State<AppState>,
    Path((client_id, product_id)): Path<(i64, i64)>,
) -> AppResult<Json<ResolvedPrice>> {
    let service = PricingService::new(state.db);
    let resolved = service.resolve_price(client_id, product_id).await?;
    Ok(Json(resolved))
}

/// Price a list of line items and compute the total
pub async fn price_line_items(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
    Json(input): Json<PriceLineItemsInput>,
) -> AppResult<Json<PricedItems>> {
    let service = PricingService::new(state.db);
    let priced = service.price_line_items(client_id, input).await?;
    Ok(Json(priced))
}
