use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::external::price_provider::ExternalSymbolMatch;
use crate::routes::trades::normalize_ticker;
use crate::services::stock_service::{self, StockDetail};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search", get(search_stocks))
        .route("/:ticker", get(get_stock_detail))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

pub async fn search_stocks(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ExternalSymbolMatch>>, AppError> {
    info!("GET /stocks/search - q={}", params.q);
    let matches = stock_service::search(state.price_provider.as_ref(), &params.q)
        .await
        .map_err(|e| {
            error!("Symbol search for '{}' failed: {}", params.q, e);
            e
        })?;
    Ok(Json(matches))
}

pub async fn get_stock_detail(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<StockDetail>, AppError> {
    info!("GET /stocks/{} - Fetching stock detail", ticker);
    let ticker = normalize_ticker(&ticker)?;

    let detail = stock_service::get_detail(&state.pool, state.price_provider.as_ref(), &ticker)
        .await
        .map_err(|e| {
            error!("Failed to fetch detail for {}: {}", ticker, e);
            e
        })?;
    Ok(Json(detail))
}
