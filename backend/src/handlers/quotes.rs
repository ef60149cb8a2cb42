//! HTTP handlers for quote endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::services::quotes::{ConvertQuoteInput, CreateQuoteInput, QuoteService};
use crate::AppState;
use shared::models::{Quote, QuoteWithItems};

/// Query parameters for listing quotes
#[derive(Debug, Deserialize)]
pub struct ListQuotesQuery {
    pub client_id: Option<i64>,
}

/// Create a quote
pub async fn create_quote(
    State(state): State<AppState>,
    Json(input): Json<CreateQuoteInput>,
) -> AppResult<Json<QuoteWithItems>> {
    let service = QuoteService::new(state.db, state.config.quotes.clone());
    let quote = service.create_quote(input).await?;
    Ok(Json(quote))
}

/// Get a quote with its items
pub async fn get_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<i64>,
) -> AppResult<Json<QuoteWithItems>> {
    let service = QuoteService::new(state.db, state.config.quotes.clone());
    let quote = service.get_quote(quote_id).await?;
    Ok(Json(quote))
}

/// Public share-link lookup by token (QR code scanning)
pub async fn get_shared_quote(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<QuoteWithItems>> {
    let service = QuoteService::new(state.db, state.config.quotes.clone());
    let quote = service.get_quote_by_token(&token).await?;
    Ok(Json(quote))
}

/// List quotes, optionally filtered by client
pub async fn list_quotes(
    State(state): State<AppState>,
    Query(query): Query<ListQuotesQuery>,
) -> AppResult<Json<Vec<Quote>>> {
    let service = QuoteService::new(state.db, state.config.quotes.clone());
    let quotes = service.list_quotes(query.client_id).await?;
    Ok(Json(quotes))
}

/// Convert a quote into an order at the quoted prices
pub async fn convert_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<i64>,
    Json(input): Json<ConvertQuoteInput>,
) -> AppResult<Json<Quote>> {
    let service = QuoteService::new(state.db, state.config.quotes.clone());
    let quote = service.convert_to_order(quote_id, input).await?;
    Ok(Json(quote))
}
