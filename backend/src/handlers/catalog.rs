//! HTTP handlers for catalog endpoints (products, substitutes, stock)

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppResult;
use crate::services::catalog::{
    AddSubstituteInput, CatalogService, CreateProductInput, SetStockInput,
};
use crate::AppState;
use shared::models::{Product, StockLevel, Substitute};
use shared::types::Warehouse;

/// Create a catalog product
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> AppResult<Json<Product>> {
    let service = CatalogService::new(state.db);
    let product = service.create_product(input).await?;
    Ok(Json(product))
}

/// Get a product by ID
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> AppResult<Json<Product>> {
    let service = CatalogService::new(state.db);
    let product = service.get_product(product_id).await?;
    Ok(Json(product))
}

/// List catalog products
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let service = CatalogService::new(state.db);
    let products = service.list_products().await?;
    Ok(Json(products))
}

/// Soft-deactivate a product
pub async fn deactivate_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> AppResult<Json<Product>> {
    let service = CatalogService::new(state.db);
    let product = service.deactivate_product(product_id).await?;
    Ok(Json(product))
}

/// Register a substitute for a product
pub async fn add_substitute(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    Json(input): Json<AddSubstituteInput>,
) -> AppResult<Json<Substitute>> {
    let service = CatalogService::new(state.db);
    let substitute = service.add_substitute(product_id, input).await?;
    Ok(Json(substitute))
}

/// Get substitutes for a product (ascending priority, at most 5)
pub async fn get_substitutes(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> AppResult<Json<Vec<Substitute>>> {
    let service = CatalogService::new(state.db);
    let substitutes = service.get_substitutes(product_id).await?;
    Ok(Json(substitutes))
}

/// Write the stock level for a (product, warehouse) pair
pub async fn set_stock(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    Json(input): Json<SetStockInput>,
) -> AppResult<Json<StockLevel>> {
    let service = CatalogService::new(state.db);
    let stock = service.set_stock(product_id, input).await?;
    Ok(Json(stock))
}

/// Get the stock level for a product at one warehouse
pub async fn get_stock_at(
    State(state): State<AppState>,
    Path((product_id, warehouse)): Path<(i64, Warehouse)>,
) -> AppResult<Json<StockLevel>> {
    let service = CatalogService::new(state.db);
    let stock = service.get_stock_at(product_id, warehouse).await?;
    Ok(Json(stock))
}

/// Get stock levels for a product across warehouses
pub async fn get_stock(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> AppResult<Json<Vec<StockLevel>>> {
    let service = CatalogService::new(state.db);
    let stock = service.get_stock(product_id).await?;
    Ok(Json(stock))
}
