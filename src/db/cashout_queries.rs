use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::{CashOutRequest, CashoutStatus, PendingCashout};

const COLUMNS: &str = "id, account_id, amount, status, requested_at, processed_at, reviewed_by";

pub async fn fetch_one(pool: &PgPool, id: Uuid) -> Result<Option<CashOutRequest>, sqlx::Error> {
    sqlx::query_as::<_, CashOutRequest>(&format!(
        "SELECT {COLUMNS} FROM cash_out_requests WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_pending_for_account(
    pool: &PgPool,
    account_id: Uuid,
) -> Result<Option<CashOutRequest>, sqlx::Error> {
    sqlx::query_as::<_, CashOutRequest>(&format!(
        "SELECT {COLUMNS}
         FROM cash_out_requests
         WHERE account_id = $1 AND status = 'PENDING'"
    ))
    .bind(account_id)
    .fetch_optional(pool)
    .await
}

/// Total of previously approved cash-outs; what eligibility subtracts.
pub async fn sum_approved(pool: &PgPool, account_id: Uuid) -> Result<BigDecimal, sqlx::Error> {
    sqlx::query_scalar::<_, BigDecimal>(
        "SELECT COALESCE(SUM(amount), 0)
         FROM cash_out_requests
         WHERE account_id = $1 AND status = 'APPROVED'",
    )
    .bind(account_id)
    .fetch_one(pool)
    .await
}

pub async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    request: CashOutRequest,
) -> Result<CashOutRequest, sqlx::Error> {
    sqlx::query_as::<_, CashOutRequest>(&format!(
        "INSERT INTO cash_out_requests ({COLUMNS})
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {COLUMNS}"
    ))
    .bind(request.id)
    .bind(request.account_id)
    .bind(request.amount)
    .bind(request.status)
    .bind(request.requested_at)
    .bind(request.processed_at)
    .bind(request.reviewed_by)
    .fetch_one(&mut **tx)
    .await
}

/// Compare-and-swap PENDING to a terminal state. Returns None when the
/// request was already processed; the status check and the write are one
/// statement, so a concurrent reviewer cannot double-process.
pub async fn mark_reviewed(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    status: CashoutStatus,
    reviewer: Uuid,
    processed_at: DateTime<Utc>,
) -> Result<Option<CashOutRequest>, sqlx::Error> {
    sqlx::query_as::<_, CashOutRequest>(&format!(
        "UPDATE cash_out_requests
         SET status = $2, processed_at = $3, reviewed_by = $4
         WHERE id = $1 AND status = 'PENDING'
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(status)
    .bind(processed_at)
    .bind(reviewer)
    .fetch_optional(&mut **tx)
    .await
}

pub async fn fetch_pending_for_family(
    pool: &PgPool,
    family_id: Uuid,
) -> Result<Vec<PendingCashout>, sqlx::Error> {
    sqlx::query_as::<_, PendingCashout>(
        "SELECT r.id, r.account_id, a.first_name, r.amount, r.requested_at
         FROM cash_out_requests r
         JOIN accounts a ON a.id = r.account_id
         WHERE a.family_id = $1 AND r.status = 'PENDING'
         ORDER BY r.requested_at ASC",
    )
    .bind(family_id)
    .fetch_all(pool)
    .await
}
