use sqlx::PgPool;
use uuid::Uuid;

use crate::models::PortfolioSnapshot;

const COLUMNS: &str =
    "id, account_id, date, portfolio_value, cash_balance, total_value, created_at";

/// Write the day's rollup. Returns false when a snapshot already exists for
/// the (account, date) pair; snapshots are never revised.
pub async fn insert(pool: &PgPool, snapshot: PortfolioSnapshot) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(&format!(
        "INSERT INTO portfolio_snapshots ({COLUMNS})
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         ON CONFLICT (account_id, date) DO NOTHING"
    ))
    .bind(snapshot.id)
    .bind(snapshot.account_id)
    .bind(snapshot.date)
    .bind(snapshot.portfolio_value)
    .bind(snapshot.cash_balance)
    .bind(snapshot.total_value)
    .bind(snapshot.created_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Most recent `limit` snapshots, oldest first for charting.
pub async fn fetch_history(
    pool: &PgPool,
    account_id: Uuid,
    limit: i64,
) -> Result<Vec<PortfolioSnapshot>, sqlx::Error> {
    sqlx::query_as::<_, PortfolioSnapshot>(&format!(
        "SELECT {COLUMNS}
         FROM portfolio_snapshots
         WHERE account_id = $1
         ORDER BY date DESC
         LIMIT $2"
    ))
    .bind(account_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map(|mut snapshots| {
        snapshots.reverse();
        snapshots
    })
}
