use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::LedgerTransaction;

const COLUMNS: &str = "id, account_id, kind, amount, shares, price_per_share, stock_id, \
                       chore_assignment_id, cash_out_request_id, description, created_at";

/// Append to the audit trail. Only ever called inside the same transaction
/// as the balance/holding mutation the row describes.
pub async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    record: LedgerTransaction,
) -> Result<LedgerTransaction, sqlx::Error> {
    sqlx::query_as::<_, LedgerTransaction>(&format!(
        "INSERT INTO ledger_transactions ({COLUMNS})
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         RETURNING {COLUMNS}"
    ))
    .bind(record.id)
    .bind(record.account_id)
    .bind(record.kind)
    .bind(record.amount)
    .bind(record.shares)
    .bind(record.price_per_share)
    .bind(record.stock_id)
    .bind(record.chore_assignment_id)
    .bind(record.cash_out_request_id)
    .bind(record.description)
    .bind(record.created_at)
    .fetch_one(&mut **tx)
    .await
}

pub async fn fetch_recent(
    pool: &PgPool,
    account_id: Uuid,
    limit: i64,
) -> Result<Vec<LedgerTransaction>, sqlx::Error> {
    sqlx::query_as::<_, LedgerTransaction>(&format!(
        "SELECT {COLUMNS}
         FROM ledger_transactions
         WHERE account_id = $1
         ORDER BY created_at DESC
         LIMIT $2"
    ))
    .bind(account_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}
