use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use http::StatusCode;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::db;
use crate::errors::AppError;
use crate::models::PricePoint;
use crate::routes::trades::normalize_ticker;
use crate::services::price_service::{self, RefreshOutcome};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:ticker", get(get_prices))
        .route("/:ticker/latest", get(get_latest_price))
        .route("/:ticker/refresh", post(refresh_price))
        .route("/:ticker/synthetic", post(generate_synthetic_prices))
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub days: Option<i64>,
}

pub async fn get_prices(
    Path(ticker): Path<String>,
    Query(params): Query<HistoryParams>,
    State(state): State<AppState>,
) -> Result<Json<Vec<PricePoint>>, AppError> {
    info!("GET /prices/{} - Getting price history", ticker);
    let ticker = normalize_ticker(&ticker)?;
    let days = params.days.unwrap_or(30).clamp(1, 365);

    let prices = price_service::get_history(&state.pool, &ticker, days)
        .await
        .map_err(|e| {
            error!("Failed to get price history for {}: {}", ticker, e);
            e
        })?;
    Ok(Json(prices))
}

pub async fn get_latest_price(
    Path(ticker): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<PricePoint>, AppError> {
    info!("GET /prices/{}/latest - Getting latest price", ticker);
    let ticker = normalize_ticker(&ticker)?;

    let price = price_service::get_latest(&state.pool, &ticker)
        .await
        .map_err(|e| {
            error!("Failed to get latest price for {}: {}", ticker, e);
            e
        })?;
    Ok(Json(price))
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub ticker: String,
    pub status: &'static str,
}

pub async fn refresh_price(
    Path(ticker): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, AppError> {
    info!("POST /prices/{}/refresh - Refreshing from provider", ticker);
    let ticker = normalize_ticker(&ticker)?;

    let stock = db::stock_queries::fetch_by_ticker(&state.pool, &ticker)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock".to_string()))?;

    let _guard = state.rate_limiter.acquire().await;
    let outcome = price_service::refresh_latest(
        &state.pool,
        state.price_provider.as_ref(),
        &state.failure_cache,
        &stock,
    )
    .await
    .map_err(|e| {
        match &e {
            AppError::RateLimited => warn!("Rate limited refreshing {}", ticker),
            _ => error!("Failed to refresh price for {}: {}", ticker, e),
        }
        e
    })?;

    let status = match outcome {
        RefreshOutcome::Updated(_) => "updated",
        RefreshOutcome::Skipped => "skipped",
    };
    Ok(Json(RefreshResponse { ticker, status }))
}

pub async fn generate_synthetic_prices(
    Path(ticker): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    info!("POST /prices/{}/synthetic - Generating synthetic history", ticker);
    let ticker = normalize_ticker(&ticker)?;

    let stock = db::stock_queries::fetch_by_ticker(&state.pool, &ticker)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock".to_string()))?;

    price_service::generate_synthetic(&state.pool, stock.id, 180)
        .await
        .map_err(|e| {
            error!("Failed to generate synthetic prices for {}: {}", ticker, e);
            e
        })?;
    Ok(StatusCode::CREATED)
}
