use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::Child;
use crate::errors::AppError;
use crate::models::{
    AssignmentWithChore, CashOutRequest, CashoutEligibility, ChoreAssignment, LedgerTransaction,
    PortfolioSnapshot,
};
use crate::services::{cashout_service, chore_service, portfolio_service};
use crate::services::portfolio_service::PortfolioView;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/portfolio", get(get_portfolio))
        .route("/portfolio-history", get(get_portfolio_history))
        .route("/transactions", get(get_transactions))
        .route("/cashout", get(get_cashout_eligibility).post(request_cashout))
        .route("/chores", get(list_chores))
        .route("/chores/:assignment_id/submit", post(submit_chore))
}

pub async fn get_portfolio(
    State(state): State<AppState>,
    Child(actor): Child,
) -> Result<Json<PortfolioView>, AppError> {
    info!("GET /child/portfolio - {}", actor.id);
    let view = portfolio_service::get_portfolio(&state.pool, actor.id)
        .await
        .map_err(|e| {
            error!("Failed to build portfolio for {}: {}", actor.id, e);
            e
        })?;
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub days: Option<i64>,
}

pub async fn get_portfolio_history(
    State(state): State<AppState>,
    Child(actor): Child,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<PortfolioSnapshot>>, AppError> {
    info!("GET /child/portfolio-history - {}", actor.id);
    let days = params.days.unwrap_or(30).clamp(1, 365);
    let history = portfolio_service::get_history(&state.pool, actor.id, days)
        .await
        .map_err(|e| {
            error!("Failed to fetch portfolio history for {}: {}", actor.id, e);
            e
        })?;
    Ok(Json(history))
}

pub async fn get_transactions(
    State(state): State<AppState>,
    Child(actor): Child,
) -> Result<Json<Vec<LedgerTransaction>>, AppError> {
    info!("GET /child/transactions - {}", actor.id);
    let transactions = crate::db::transaction_queries::fetch_recent(&state.pool, actor.id, 50)
        .await
        .map_err(|e| {
            error!("Failed to fetch transactions for {}: {}", actor.id, e);
            AppError::Db(e)
        })?;
    Ok(Json(transactions))
}

pub async fn get_cashout_eligibility(
    State(state): State<AppState>,
    Child(actor): Child,
) -> Result<Json<CashoutEligibility>, AppError> {
    info!("GET /child/cashout - {}", actor.id);
    let eligibility = cashout_service::eligibility(&state.pool, &state.policy, actor.id)
        .await
        .map_err(|e| {
            error!("Failed to compute eligibility for {}: {}", actor.id, e);
            e
        })?;
    Ok(Json(eligibility))
}

#[derive(Debug, Deserialize)]
pub struct CashoutBody {
    pub amount: BigDecimal,
}

pub async fn request_cashout(
    State(state): State<AppState>,
    Child(actor): Child,
    Json(data): Json<CashoutBody>,
) -> Result<Json<CashOutRequest>, AppError> {
    info!("POST /child/cashout - {} requesting {}", actor.id, data.amount);
    let request = cashout_service::request(&state.pool, &state.policy, actor.id, data.amount)
        .await
        .map_err(|e| {
            error!("Cash-out request failed for {}: {}", actor.id, e);
            e
        })?;
    Ok(Json(request))
}

pub async fn list_chores(
    State(state): State<AppState>,
    Child(actor): Child,
) -> Result<Json<Vec<AssignmentWithChore>>, AppError> {
    info!("GET /child/chores - {}", actor.id);
    let chores = chore_service::list_for_child(&state.pool, actor.id)
        .await
        .map_err(|e| {
            error!("Failed to list chores for {}: {}", actor.id, e);
            e
        })?;
    Ok(Json(chores))
}

pub async fn submit_chore(
    State(state): State<AppState>,
    Child(actor): Child,
    Path(assignment_id): Path<Uuid>,
) -> Result<Json<ChoreAssignment>, AppError> {
    info!(
        "POST /child/chores/{}/submit - {}",
        assignment_id, actor.id
    );
    let assignment = chore_service::submit(&state.pool, actor.id, assignment_id)
        .await
        .map_err(|e| {
            error!(
                "Chore submission {} failed for {}: {}",
                assignment_id, actor.id, e
            );
            e
        })?;
    Ok(Json(assignment))
}
