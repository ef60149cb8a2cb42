//! Route definitions for the Auto Parts Distribution Platform

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Public shared-quote lookup (unauthenticated - for QR code scanning)
        .route("/quotes/shared/:token", get(handlers::get_shared_quote))
        // Catalog management
        .nest("/products", product_routes())
        // Per-client pricing and limits
        .nest("/clients", client_routes())
        // Order management
        .nest("/orders", order_routes())
        // Quote management
        .nest("/quotes", quote_routes())
        // Inter-warehouse transfer workflow
        .nest("/transfers", transfer_routes())
        // Warehouse views
        .nest("/warehouses", warehouse_routes())
}

/// Product catalog routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route(
            "/:product_id",
            get(handlers::get_product).delete(handlers::deactivate_product),
        )
        .route(
            "/:product_id/substitutes",
            get(handlers::get_substitutes).post(handlers::add_substitute),
        )
        .route(
            "/:product_id/stock",
            get(handlers::get_stock).put(handlers::set_stock),
        )
        .route("/:product_id/stock/:warehouse", get(handlers::get_stock_at))
}

/// Per-client pricing and stock-limit routes
fn client_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:client_id/pricing",
            get(handlers::list_client_pricing).put(handlers::set_client_pricing),
        )
        .route(
            "/:client_id/pricing/:product_id",
            get(handlers::resolve_price),
        )
        .route("/:client_id/pricing/quote", post(handlers::price_line_items))
        .route("/:client_id/limits/validate", post(handlers::validate_limits))
}

/// Order management routes
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_order))
        .route("/:order_id", get(handlers::get_order))
        .route("/:order_id/status", put(handlers::update_order_status))
}

/// Quote management routes
fn quote_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_quotes).post(handlers::create_quote))
        .route("/:quote_id", get(handlers::get_quote))
        .route("/:quote_id/convert", post(handlers::convert_quote))
}

/// Transfer workflow routes
fn transfer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_transfers).post(handlers::create_transfer),
        )
        .route("/:transfer_id", get(handlers::get_transfer))
        .route("/:transfer_id/status", put(handlers::update_transfer_status))
        .route("/:transfer_id/reception", post(handlers::confirm_reception))
}

/// Warehouse-scoped views
fn warehouse_routes() -> Router<AppState> {
    Router::new().route(
        "/:warehouse/pending-receptions",
        get(handlers::list_pending_reception),
    )
}
