use sqlx::PgPool;
use crate::models::Stock;

pub async fn fetch_by_ticker(pool: &PgPool, ticker: &str) -> Result<Option<Stock>, sqlx::Error> {
    sqlx::query_as::<_, Stock>(
        "SELECT id, ticker, name, logo_url, is_active, created_at
         FROM stocks
         WHERE ticker = $1",
    )
    .bind(ticker)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_active(pool: &PgPool) -> Result<Vec<Stock>, sqlx::Error> {
    sqlx::query_as::<_, Stock>(
        "SELECT id, ticker, name, logo_url, is_active, created_at
         FROM stocks
         WHERE is_active = TRUE
         ORDER BY ticker ASC",
    )
    .fetch_all(pool)
    .await
}

/// Insert a stock, or return the existing row when the ticker is already
/// tracked. First-lookup caching can race with itself; the no-op conflict
/// update makes the insert return the winner either way.
pub async fn upsert(pool: &PgPool, stock: Stock) -> Result<Stock, sqlx::Error> {
    sqlx::query_as::<_, Stock>(
        "INSERT INTO stocks (id, ticker, name, logo_url, is_active, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (ticker) DO UPDATE SET ticker = EXCLUDED.ticker
         RETURNING id, ticker, name, logo_url, is_active, created_at",
    )
    .bind(stock.id)
    .bind(stock.ticker)
    .bind(stock.name)
    .bind(stock.logo_url)
    .bind(stock.is_active)
    .bind(stock.created_at)
    .fetch_one(pool)
    .await
}
