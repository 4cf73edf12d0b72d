use bigdecimal::BigDecimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::{Holding, HoldingPosition};

/// Holdings joined with stock metadata and the latest cached price.
pub async fn fetch_positions(
    pool: &PgPool,
    account_id: Uuid,
) -> Result<Vec<HoldingPosition>, sqlx::Error> {
    sqlx::query_as::<_, HoldingPosition>(
        "SELECT h.id, h.stock_id, s.ticker, s.name AS stock_name,
                h.shares, h.cost_basis, p.close_price AS latest_price, p.date AS price_date
         FROM holdings h
         JOIN stocks s ON s.id = h.stock_id
         LEFT JOIN LATERAL (
             SELECT close_price, date
             FROM price_points
             WHERE stock_id = h.stock_id
             ORDER BY date DESC
             LIMIT 1
         ) p ON TRUE
         WHERE h.account_id = $1
         ORDER BY s.ticker ASC",
    )
    .bind(account_id)
    .fetch_all(pool)
    .await
}

/// Row-lock one holding. Always taken after the account lock.
pub async fn lock(
    tx: &mut Transaction<'_, Postgres>,
    account_id: Uuid,
    stock_id: Uuid,
) -> Result<Option<Holding>, sqlx::Error> {
    sqlx::query_as::<_, Holding>(
        "SELECT id, account_id, stock_id, shares, cost_basis, created_at, updated_at
         FROM holdings
         WHERE account_id = $1 AND stock_id = $2
         FOR UPDATE",
    )
    .bind(account_id)
    .bind(stock_id)
    .fetch_optional(&mut **tx)
    .await
}

/// Create the holding on first buy, or fold the purchase into an existing
/// one. The conflict arm does the increment in SQL so the upsert is a single
/// atomic statement.
pub async fn upsert_buy(
    tx: &mut Transaction<'_, Postgres>,
    holding: Holding,
) -> Result<Holding, sqlx::Error> {
    sqlx::query_as::<_, Holding>(
        "INSERT INTO holdings (id, account_id, stock_id, shares, cost_basis, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         ON CONFLICT (account_id, stock_id) DO UPDATE
             SET shares = holdings.shares + EXCLUDED.shares,
                 cost_basis = holdings.cost_basis + EXCLUDED.cost_basis,
                 updated_at = NOW()
         RETURNING id, account_id, stock_id, shares, cost_basis, created_at, updated_at",
    )
    .bind(holding.id)
    .bind(holding.account_id)
    .bind(holding.stock_id)
    .bind(holding.shares)
    .bind(holding.cost_basis)
    .bind(holding.created_at)
    .bind(holding.updated_at)
    .fetch_one(&mut **tx)
    .await
}

pub async fn update_after_sale(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    shares: &BigDecimal,
    cost_basis: &BigDecimal,
) -> Result<Holding, sqlx::Error> {
    sqlx::query_as::<_, Holding>(
        "UPDATE holdings
         SET shares = $2, cost_basis = $3, updated_at = NOW()
         WHERE id = $1
         RETURNING id, account_id, stock_id, shares, cost_basis, created_at, updated_at",
    )
    .bind(id)
    .bind(shares)
    .bind(cost_basis)
    .fetch_one(&mut **tx)
    .await
}

pub async fn delete(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM holdings WHERE id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
