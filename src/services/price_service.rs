use bigdecimal::{BigDecimal, Zero};
use chrono::{Duration as ChronoDuration, Utc};
use sqlx::PgPool;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::external::price_provider::{trading_date, PriceProvider, PriceProviderError};
use crate::models::{PricePoint, Stock};
use crate::services::failure_cache::{FailureCache, FailureType};

pub async fn get_history(
    pool: &PgPool,
    ticker: &str,
    limit: i64,
) -> Result<Vec<PricePoint>, AppError> {
    let stock = require_stock(pool, ticker).await?;
    db::price_queries::fetch_window(pool, stock.id, limit)
        .await
        .map_err(|e| {
            error!("Failed to fetch price history for {}: {}", ticker, e);
            AppError::Db(e)
        })
}

pub async fn get_latest(pool: &PgPool, ticker: &str) -> Result<PricePoint, AppError> {
    let stock = require_stock(pool, ticker).await?;
    db::price_queries::fetch_latest(pool, stock.id)
        .await?
        .ok_or_else(|| AppError::NoPriceData(stock.ticker))
}

async fn require_stock(pool: &PgPool, ticker: &str) -> Result<Stock, AppError> {
    db::stock_queries::fetch_by_ticker(pool, ticker)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock".to_string()))
}

#[derive(Debug, PartialEq)]
pub enum RefreshOutcome {
    /// A new observation was stored.
    Updated(BigDecimal),
    /// An observation already existed for the quote's trading date.
    Skipped,
}

/// Ingest one stock's previous-close price for the current trading day.
/// The (stock, date) unique key makes this idempotent; a failed provider
/// call leaves the cache untouched.
pub async fn refresh_latest(
    pool: &PgPool,
    provider: &dyn PriceProvider,
    failure_cache: &FailureCache,
    stock: &Stock,
) -> Result<RefreshOutcome, AppError> {
    if let Some(failure) = failure_cache.is_failed(&stock.ticker) {
        info!(
            "⚠️ Skipping quote fetch for {} - in failure cache ({:?})",
            stock.ticker, failure.error_type
        );
        return Err(AppError::External(format!(
            "Ticker {} is in the failure cache",
            stock.ticker
        )));
    }

    let quote = match provider.fetch_quote(&stock.ticker).await {
        Ok(quote) => {
            failure_cache.clear(&stock.ticker);
            quote
        }
        Err(PriceProviderError::RateLimited) => {
            failure_cache.record_failure(&stock.ticker, FailureType::RateLimited);
            return Err(AppError::RateLimited);
        }
        Err(PriceProviderError::NotFound) => {
            failure_cache.record_failure(&stock.ticker, FailureType::NotFound);
            return Err(AppError::NoPriceData(stock.ticker.clone()));
        }
        Err(e) => {
            failure_cache.record_failure(&stock.ticker, FailureType::ApiError);
            return Err(AppError::External(e.to_string()));
        }
    };

    // Previous close is the official price of the last completed session.
    let price = decimal_from_f64(quote.previous_close)?;
    if price <= BigDecimal::zero() {
        return Err(AppError::NoPriceData(stock.ticker.clone()));
    }

    let date = trading_date(quote.timestamp);
    let inserted =
        db::price_queries::insert_observation(pool, PricePoint::new(stock.id, date, price.clone()))
            .await
            .map_err(|e| {
                error!("Failed to store observation for {}: {}", stock.ticker, e);
                AppError::Db(e)
            })?;

    if inserted {
        Ok(RefreshOutcome::Updated(price))
    } else {
        Ok(RefreshOutcome::Skipped)
    }
}

/// Random-walk price history for demo environments without provider access.
pub async fn generate_synthetic(
    pool: &PgPool,
    stock_id: Uuid,
    days: u32,
) -> Result<(), AppError> {
    let today = Utc::now().date_naive();
    let mut current = 100.0_f64;

    for i in 0..i64::from(days) {
        current *= 1.0 + (rand::random::<f64>() - 0.5) * 0.02;

        let price = decimal_from_f64(current)?;
        let date = today - ChronoDuration::days(i);
        db::price_queries::insert_observation(pool, PricePoint::new(stock_id, date, price))
            .await
            .map_err(|e| {
                error!("Failed to store synthetic price for {}: {}", stock_id, e);
                AppError::Db(e)
            })?;
    }

    Ok(())
}

/// Provider quotes arrive as JSON floats; ledger values are decimal. Going
/// through the display string keeps the human-visible digits rather than
/// the full binary expansion.
pub fn decimal_from_f64(value: f64) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(&value.to_string())
        .map_err(|e| AppError::External(format!("Unparseable price {}: {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_quotes_convert_via_display_digits() {
        assert_eq!(
            decimal_from_f64(171.25).unwrap(),
            BigDecimal::from_str("171.25").unwrap()
        );
        assert_eq!(
            decimal_from_f64(0.1).unwrap(),
            BigDecimal::from_str("0.1").unwrap()
        );
    }
}
