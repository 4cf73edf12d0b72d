use sqlx::PgPool;
use uuid::Uuid;

use crate::models::PricePoint;

pub async fn fetch_latest(pool: &PgPool, stock_id: Uuid) -> Result<Option<PricePoint>, sqlx::Error> {
    sqlx::query_as::<_, PricePoint>(
        "SELECT id, stock_id, date, close_price, created_at
         FROM price_points
         WHERE stock_id = $1
         ORDER BY date DESC
         LIMIT 1",
    )
    .bind(stock_id)
    .fetch_optional(pool)
    .await
}

/// Most recent `limit` observations, returned oldest first for charting.
pub async fn fetch_window(
    pool: &PgPool,
    stock_id: Uuid,
    limit: i64,
) -> Result<Vec<PricePoint>, sqlx::Error> {
    sqlx::query_as::<_, PricePoint>(
        "SELECT id, stock_id, date, close_price, created_at
         FROM price_points
         WHERE stock_id = $1
         ORDER BY date DESC
         LIMIT $2",
    )
    .bind(stock_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map(|mut points| {
        points.reverse();
        points
    })
}

/// Append one observation. Returns false when a row already exists for the
/// (stock, date) pair; existing rows are never rewritten.
pub async fn insert_observation(pool: &PgPool, point: PricePoint) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO price_points (id, stock_id, date, close_price, created_at)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (stock_id, date) DO NOTHING",
    )
    .bind(point.id)
    .bind(point.stock_id)
    .bind(point.date)
    .bind(point.close_price)
    .bind(point.created_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
