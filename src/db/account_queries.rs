use bigdecimal::BigDecimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::Account;

pub async fn fetch_one(pool: &PgPool, id: Uuid) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        "SELECT id, family_id, first_name, cash_balance, created_at
         FROM accounts
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_children(pool: &PgPool, family_id: Uuid) -> Result<Vec<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        "SELECT id, family_id, first_name, cash_balance, created_at
         FROM accounts
         WHERE family_id = $1
         ORDER BY created_at ASC",
    )
    .bind(family_id)
    .fetch_all(pool)
    .await
}

pub async fn fetch_all(pool: &PgPool) -> Result<Vec<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        "SELECT id, family_id, first_name, cash_balance, created_at
         FROM accounts
         ORDER BY created_at ASC",
    )
    .fetch_all(pool)
    .await
}

/// Row-lock an account for the duration of the transaction. Every ledger
/// operation takes this lock first (account before holding) so concurrent
/// mutations of the same account serialize.
pub async fn lock(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        "SELECT id, family_id, first_name, cash_balance, created_at
         FROM accounts
         WHERE id = $1
         FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
}

pub async fn debit_balance(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    amount: &BigDecimal,
) -> Result<BigDecimal, sqlx::Error> {
    sqlx::query_scalar::<_, BigDecimal>(
        "UPDATE accounts
         SET cash_balance = cash_balance - $2
         WHERE id = $1
         RETURNING cash_balance",
    )
    .bind(id)
    .bind(amount)
    .fetch_one(&mut **tx)
    .await
}

pub async fn credit_balance(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    amount: &BigDecimal,
) -> Result<BigDecimal, sqlx::Error> {
    sqlx::query_scalar::<_, BigDecimal>(
        "UPDATE accounts
         SET cash_balance = cash_balance + $2
         WHERE id = $1
         RETURNING cash_balance",
    )
    .bind(id)
    .bind(amount)
    .fetch_one(&mut **tx)
    .await
}
