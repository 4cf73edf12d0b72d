use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;
use tracing::{error, info};

use crate::auth::Parent;
use crate::errors::AppError;
use crate::jobs::refresh_prices_job;
use crate::services::job_scheduler_service::JobContext;
use crate::services::stock_service::{self, SeedResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/seed-stocks", post(seed_stocks))
        .route("/refresh-prices", post(refresh_prices))
}

pub async fn seed_stocks(
    State(state): State<AppState>,
    Parent(actor): Parent,
) -> Result<Json<Vec<SeedResult>>, AppError> {
    info!("POST /admin/seed-stocks - by {}", actor.id);
    let results = stock_service::seed_starter_stocks(
        &state.pool,
        state.price_provider.as_ref(),
        &state.failure_cache,
        &state.rate_limiter,
    )
    .await
    .map_err(|e| {
        error!("Stock seeding failed: {}", e);
        e
    })?;
    Ok(Json(results))
}

#[derive(Debug, serde::Serialize)]
pub struct RefreshSummary {
    pub processed: i32,
    pub failed: i32,
}

/// Manual trigger for the same refresh pass the scheduler runs nightly.
pub async fn refresh_prices(
    State(state): State<AppState>,
    Parent(actor): Parent,
) -> Result<Json<RefreshSummary>, AppError> {
    info!("POST /admin/refresh-prices - by {}", actor.id);

    let ctx = JobContext {
        pool: Arc::new(state.pool.clone()),
        price_provider: state.price_provider.clone(),
        failure_cache: Arc::new(state.failure_cache.clone()),
        rate_limiter: state.rate_limiter.clone(),
    };

    let result = refresh_prices_job::refresh_all_prices(ctx).await.map_err(|e| {
        error!("Manual price refresh failed: {}", e);
        e
    })?;

    Ok(Json(RefreshSummary {
        processed: result.items_processed,
        failed: result.items_failed,
    }))
}
