use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::{AssignmentStatus, AssignmentWithChore, Chore, ChoreAssignment};

const CHORE_COLUMNS: &str = "id, family_id, title, description, reward, is_recurring, created_at";
const ASSIGNMENT_COLUMNS: &str =
    "id, chore_id, account_id, status, submitted_at, approved_at, reviewed_by, created_at";

pub async fn insert_chore(pool: &PgPool, chore: Chore) -> Result<Chore, sqlx::Error> {
    sqlx::query_as::<_, Chore>(&format!(
        "INSERT INTO chores ({CHORE_COLUMNS})
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {CHORE_COLUMNS}"
    ))
    .bind(chore.id)
    .bind(chore.family_id)
    .bind(chore.title)
    .bind(chore.description)
    .bind(chore.reward)
    .bind(chore.is_recurring)
    .bind(chore.created_at)
    .fetch_one(pool)
    .await
}

pub async fn fetch_chore(pool: &PgPool, id: Uuid) -> Result<Option<Chore>, sqlx::Error> {
    sqlx::query_as::<_, Chore>(&format!("SELECT {CHORE_COLUMNS} FROM chores WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_assignment(
    pool: &PgPool,
    assignment: ChoreAssignment,
) -> Result<ChoreAssignment, sqlx::Error> {
    sqlx::query_as::<_, ChoreAssignment>(&format!(
        "INSERT INTO chore_assignments ({ASSIGNMENT_COLUMNS})
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {ASSIGNMENT_COLUMNS}"
    ))
    .bind(assignment.id)
    .bind(assignment.chore_id)
    .bind(assignment.account_id)
    .bind(assignment.status)
    .bind(assignment.submitted_at)
    .bind(assignment.approved_at)
    .bind(assignment.reviewed_by)
    .bind(assignment.created_at)
    .fetch_one(pool)
    .await
}

pub async fn fetch_assignment(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<ChoreAssignment>, sqlx::Error> {
    sqlx::query_as::<_, ChoreAssignment>(&format!(
        "SELECT {ASSIGNMENT_COLUMNS} FROM chore_assignments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Child marks assigned work as done. CAS on ASSIGNED; None means the
/// assignment was not theirs or not in a submittable state.
pub async fn mark_submitted(
    pool: &PgPool,
    id: Uuid,
    account_id: Uuid,
    submitted_at: DateTime<Utc>,
) -> Result<Option<ChoreAssignment>, sqlx::Error> {
    sqlx::query_as::<_, ChoreAssignment>(&format!(
        "UPDATE chore_assignments
         SET status = 'SUBMITTED', submitted_at = $3
         WHERE id = $1 AND account_id = $2 AND status = 'ASSIGNED'
         RETURNING {ASSIGNMENT_COLUMNS}"
    ))
    .bind(id)
    .bind(account_id)
    .bind(submitted_at)
    .fetch_optional(pool)
    .await
}

/// Compare-and-swap SUBMITTED to APPROVED/REJECTED inside the review
/// transaction. None when the assignment is not reviewable.
pub async fn mark_reviewed(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    status: AssignmentStatus,
    reviewer: Uuid,
    reviewed_at: DateTime<Utc>,
) -> Result<Option<ChoreAssignment>, sqlx::Error> {
    let approved_at = matches!(status, AssignmentStatus::Approved).then_some(reviewed_at);

    sqlx::query_as::<_, ChoreAssignment>(&format!(
        "UPDATE chore_assignments
         SET status = $2, approved_at = $3, reviewed_by = $4
         WHERE id = $1 AND status = 'SUBMITTED'
         RETURNING {ASSIGNMENT_COLUMNS}"
    ))
    .bind(id)
    .bind(status)
    .bind(approved_at)
    .bind(reviewer)
    .fetch_optional(&mut **tx)
    .await
}

pub async fn fetch_for_account(
    pool: &PgPool,
    account_id: Uuid,
) -> Result<Vec<AssignmentWithChore>, sqlx::Error> {
    sqlx::query_as::<_, AssignmentWithChore>(
        "SELECT ca.id, ca.chore_id, ca.account_id, ca.status,
                c.title, c.reward, ca.submitted_at, ca.created_at
         FROM chore_assignments ca
         JOIN chores c ON c.id = ca.chore_id
         WHERE ca.account_id = $1
         ORDER BY ca.created_at DESC",
    )
    .bind(account_id)
    .fetch_all(pool)
    .await
}

pub async fn fetch_submitted_for_family(
    pool: &PgPool,
    family_id: Uuid,
) -> Result<Vec<AssignmentWithChore>, sqlx::Error> {
    sqlx::query_as::<_, AssignmentWithChore>(
        "SELECT ca.id, ca.chore_id, ca.account_id, ca.status,
                c.title, c.reward, ca.submitted_at, ca.created_at
         FROM chore_assignments ca
         JOIN chores c ON c.id = ca.chore_id
         WHERE c.family_id = $1 AND ca.status = 'SUBMITTED'
         ORDER BY ca.submitted_at ASC",
    )
    .bind(family_id)
    .fetch_all(pool)
    .await
}
