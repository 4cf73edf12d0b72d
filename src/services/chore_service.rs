use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::models::{
    AssignmentStatus, AssignmentWithChore, Chore, ChoreAssignment, CreateChore,
    LedgerTransaction, ReviewAction,
};

pub async fn create_chore(
    pool: &PgPool,
    family_id: Uuid,
    input: CreateChore,
) -> Result<Chore, AppError> {
    if input.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if input.reward <= BigDecimal::zero() {
        return Err(AppError::Validation(
            "Reward must be greater than 0".to_string(),
        ));
    }

    let chore = Chore::new(
        family_id,
        input.title,
        input.description,
        input.reward,
        input.is_recurring,
    );
    Ok(db::chore_queries::insert_chore(pool, chore).await?)
}

pub async fn assign_chore(
    pool: &PgPool,
    family_id: Uuid,
    chore_id: Uuid,
    account_id: Uuid,
) -> Result<ChoreAssignment, AppError> {
    let chore = db::chore_queries::fetch_chore(pool, chore_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chore".to_string()))?;
    if chore.family_id != family_id {
        return Err(AppError::NotFound("Chore".to_string()));
    }

    let account = db::account_queries::fetch_one(pool, account_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account".to_string()))?;
    if account.family_id != family_id {
        return Err(AppError::NotFound("Account".to_string()));
    }

    let assignment = ChoreAssignment::new(chore_id, account_id);
    Ok(db::chore_queries::insert_assignment(pool, assignment).await?)
}

pub async fn list_for_child(
    pool: &PgPool,
    account_id: Uuid,
) -> Result<Vec<AssignmentWithChore>, AppError> {
    Ok(db::chore_queries::fetch_for_account(pool, account_id).await?)
}

pub async fn list_submitted_for_family(
    pool: &PgPool,
    family_id: Uuid,
) -> Result<Vec<AssignmentWithChore>, AppError> {
    Ok(db::chore_queries::fetch_submitted_for_family(pool, family_id).await?)
}

/// Child marks their assigned chore as done, queueing it for review.
pub async fn submit(
    pool: &PgPool,
    account_id: Uuid,
    assignment_id: Uuid,
) -> Result<ChoreAssignment, AppError> {
    match db::chore_queries::mark_submitted(pool, assignment_id, account_id, Utc::now()).await? {
        Some(assignment) => Ok(assignment),
        None => {
            // Distinguish a missing assignment from one in the wrong state.
            match db::chore_queries::fetch_assignment(pool, assignment_id).await? {
                Some(existing) if existing.account_id == account_id => {
                    Err(AppError::ConflictingState(
                        "Assignment is not in a submittable state".to_string(),
                    ))
                }
                _ => Err(AppError::NotFound("Assignment".to_string())),
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewOutcome {
    pub assignment: ChoreAssignment,
    pub transaction: Option<LedgerTransaction>,
}

/// Parent reviews submitted work. Approval flips the status, credits the
/// reward, and appends a CHORE_EARNING row in one transaction; rejection is
/// a pure status transition.
pub async fn review(
    pool: &PgPool,
    reviewer_id: Uuid,
    reviewer_family_id: Uuid,
    assignment_id: Uuid,
    action: ReviewAction,
) -> Result<ReviewOutcome, AppError> {
    let assignment = db::chore_queries::fetch_assignment(pool, assignment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Assignment".to_string()))?;

    let chore = db::chore_queries::fetch_chore(pool, assignment.chore_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chore".to_string()))?;
    if chore.family_id != reviewer_family_id {
        return Err(AppError::NotFound("Assignment".to_string()));
    }

    let status = match action {
        ReviewAction::Approve => AssignmentStatus::Approved,
        ReviewAction::Reject => AssignmentStatus::Rejected,
    };

    let mut tx = pool.begin().await?;

    let updated =
        db::chore_queries::mark_reviewed(&mut tx, assignment_id, status, reviewer_id, Utc::now())
            .await?
            .ok_or_else(|| {
                AppError::ConflictingState(
                    "Assignment is not in a reviewable state".to_string(),
                )
            })?;

    let transaction = if matches!(action, ReviewAction::Approve) {
        db::account_queries::lock(&mut tx, updated.account_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Account".to_string()))?;

        db::account_queries::credit_balance(&mut tx, updated.account_id, &chore.reward).await?;

        Some(
            db::transaction_queries::insert(
                &mut tx,
                LedgerTransaction::chore_earning(
                    updated.account_id,
                    updated.id,
                    &chore.title,
                    chore.reward.clone(),
                ),
            )
            .await?,
        )
    } else {
        None
    };

    tx.commit().await.map_err(|e| {
        error!(
            "Failed to commit review for assignment {}: {}",
            assignment_id, e
        );
        AppError::Db(e)
    })?;

    Ok(ReviewOutcome {
        assignment: updated,
        transaction,
    })
}
