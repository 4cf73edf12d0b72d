use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::Parent;
use crate::errors::AppError;
use crate::models::{
    AssignmentWithChore, CashOutRequest, Chore, ChoreAssignment, CreateChore, PendingCashout,
    ReviewAction,
};
use crate::services::chore_service::ReviewOutcome;
use crate::services::portfolio_service::{ChildOverview, DepositOutcome};
use crate::services::{cashout_service, chore_service, portfolio_service};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/overview", get(get_overview))
        .route("/assignments", get(list_submitted_assignments))
        .route("/assignments/:assignment_id/review", patch(review_assignment))
        .route("/cashouts", get(list_pending_cashouts))
        .route("/cashouts/:request_id/review", patch(review_cashout))
        .route("/chores", post(create_chore))
        .route("/chores/:chore_id/assign", post(assign_chore))
        .route("/children/:account_id/deposit", post(deposit))
}

#[derive(Debug, Deserialize)]
pub struct ReviewBody {
    pub action: ReviewAction,
}

pub async fn get_overview(
    State(state): State<AppState>,
    Parent(actor): Parent,
) -> Result<Json<Vec<ChildOverview>>, AppError> {
    info!("GET /family/overview - family {}", actor.family_id);
    let overview = portfolio_service::family_overview(&state.pool, actor.family_id)
        .await
        .map_err(|e| {
            error!("Failed to build overview for family {}: {}", actor.family_id, e);
            e
        })?;
    Ok(Json(overview))
}

pub async fn list_submitted_assignments(
    State(state): State<AppState>,
    Parent(actor): Parent,
) -> Result<Json<Vec<AssignmentWithChore>>, AppError> {
    info!("GET /family/assignments - family {}", actor.family_id);
    let assignments = chore_service::list_submitted_for_family(&state.pool, actor.family_id)
        .await
        .map_err(|e| {
            error!("Failed to list assignments for family {}: {}", actor.family_id, e);
            e
        })?;
    Ok(Json(assignments))
}

pub async fn review_assignment(
    State(state): State<AppState>,
    Parent(actor): Parent,
    Path(assignment_id): Path<Uuid>,
    Json(data): Json<ReviewBody>,
) -> Result<Json<ReviewOutcome>, AppError> {
    info!(
        "PATCH /family/assignments/{}/review - {:?} by {}",
        assignment_id, data.action, actor.id
    );
    let outcome = chore_service::review(
        &state.pool,
        actor.id,
        actor.family_id,
        assignment_id,
        data.action,
    )
    .await
    .map_err(|e| {
        error!("Assignment review {} failed: {}", assignment_id, e);
        e
    })?;
    Ok(Json(outcome))
}

pub async fn list_pending_cashouts(
    State(state): State<AppState>,
    Parent(actor): Parent,
) -> Result<Json<Vec<PendingCashout>>, AppError> {
    info!("GET /family/cashouts - family {}", actor.family_id);
    let pending = cashout_service::pending_for_family(&state.pool, actor.family_id)
        .await
        .map_err(|e| {
            error!("Failed to list cash-outs for family {}: {}", actor.family_id, e);
            e
        })?;
    Ok(Json(pending))
}

pub async fn review_cashout(
    State(state): State<AppState>,
    Parent(actor): Parent,
    Path(request_id): Path<Uuid>,
    Json(data): Json<ReviewBody>,
) -> Result<Json<CashOutRequest>, AppError> {
    info!(
        "PATCH /family/cashouts/{}/review - {:?} by {}",
        request_id, data.action, actor.id
    );
    let request = cashout_service::review(
        &state.pool,
        actor.id,
        actor.family_id,
        request_id,
        data.action,
    )
    .await
    .map_err(|e| {
        error!("Cash-out review {} failed: {}", request_id, e);
        e
    })?;
    Ok(Json(request))
}

pub async fn create_chore(
    State(state): State<AppState>,
    Parent(actor): Parent,
    Json(data): Json<CreateChore>,
) -> Result<Json<Chore>, AppError> {
    info!("POST /family/chores - family {}", actor.family_id);
    let chore = chore_service::create_chore(&state.pool, actor.family_id, data)
        .await
        .map_err(|e| {
            error!("Failed to create chore for family {}: {}", actor.family_id, e);
            e
        })?;
    Ok(Json(chore))
}

#[derive(Debug, Deserialize)]
pub struct AssignBody {
    pub account_id: Uuid,
}

pub async fn assign_chore(
    State(state): State<AppState>,
    Parent(actor): Parent,
    Path(chore_id): Path<Uuid>,
    Json(data): Json<AssignBody>,
) -> Result<Json<ChoreAssignment>, AppError> {
    info!(
        "POST /family/chores/{}/assign - to {}",
        chore_id, data.account_id
    );
    let assignment =
        chore_service::assign_chore(&state.pool, actor.family_id, chore_id, data.account_id)
            .await
            .map_err(|e| {
                error!("Failed to assign chore {}: {}", chore_id, e);
                e
            })?;
    Ok(Json(assignment))
}

#[derive(Debug, Deserialize)]
pub struct DepositBody {
    pub amount: BigDecimal,
}

pub async fn deposit(
    State(state): State<AppState>,
    Parent(actor): Parent,
    Path(account_id): Path<Uuid>,
    Json(data): Json<DepositBody>,
) -> Result<Json<DepositOutcome>, AppError> {
    info!(
        "POST /family/children/{}/deposit - {} by {}",
        account_id, data.amount, actor.id
    );
    let outcome =
        portfolio_service::parent_deposit(&state.pool, actor.family_id, account_id, data.amount)
            .await
            .map_err(|e| {
                error!("Deposit to {} failed: {}", account_id, e);
                e
            })?;
    Ok(Json(outcome))
}
