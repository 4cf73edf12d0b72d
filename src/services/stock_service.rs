use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::db;
use crate::errors::AppError;
use crate::external::price_provider::{
    ExternalMarketStatus, ExternalQuote, ExternalSymbolMatch, PriceProvider, PriceProviderError,
};
use crate::models::Stock;
use crate::services::failure_cache::FailureCache;
use crate::services::price_service::{self, RefreshOutcome};
use crate::services::rate_limiter::RateLimiter;

/// Starter set offered to new families before anyone has searched for
/// custom tickers.
pub const STARTER_TICKERS: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "DIS", "NFLX", "NKE", "MCD", "KO",
];

pub async fn search(
    provider: &dyn PriceProvider,
    query: &str,
) -> Result<Vec<ExternalSymbolMatch>, AppError> {
    if query.trim().is_empty() {
        return Err(AppError::Validation("Search query is required".to_string()));
    }

    match provider.search_symbols(query).await {
        Ok(matches) => Ok(matches),
        Err(PriceProviderError::RateLimited) => Err(AppError::RateLimited),
        Err(e) => Err(AppError::External(e.to_string())),
    }
}

#[derive(Debug, Serialize)]
pub struct PriceHistoryPoint {
    pub date: NaiveDate,
    pub price: f64,
}

#[derive(Debug, Serialize)]
pub struct StockDetail {
    pub ticker: String,
    pub name: String,
    pub logo: Option<String>,
    pub is_tracked: bool,
    pub quote: ExternalQuote,
    pub price_history: Vec<PriceHistoryPoint>,
    pub market: Option<ExternalMarketStatus>,
}

/// Live detail for one ticker: cached metadata when we track it, provider
/// profile otherwise. An unknown ticker with a valid profile is cached on
/// this first lookup so later trades can reference it.
pub async fn get_detail(
    pool: &PgPool,
    provider: &dyn PriceProvider,
    ticker: &str,
) -> Result<StockDetail, AppError> {
    let ticker = ticker.to_uppercase();

    let cached = db::stock_queries::fetch_by_ticker(pool, &ticker).await?;

    let (quote, candles, market) = futures::join!(
        provider.fetch_quote(&ticker),
        provider.fetch_candles(&ticker, 30),
        provider.fetch_market_status(),
    );

    let quote = match quote {
        Ok(quote) => quote,
        Err(PriceProviderError::NotFound) => {
            return Err(AppError::NotFound("Stock".to_string()))
        }
        Err(PriceProviderError::RateLimited) => return Err(AppError::RateLimited),
        Err(e) => return Err(AppError::External(e.to_string())),
    };

    let stock = match cached {
        Some(stock) => Some(stock),
        None => match provider.fetch_profile(&ticker).await {
            Ok(profile) => {
                // First lookup of an untracked ticker: cache it.
                let stock = db::stock_queries::upsert(
                    pool,
                    Stock::new(ticker.clone(), profile.name, profile.logo),
                )
                .await?;
                info!("📥 Cached new stock {} on first lookup", stock.ticker);
                Some(stock)
            }
            Err(e) => {
                warn!("No profile for {}: {}", ticker, e);
                None
            }
        },
    };

    // Chart data comes from live candles when available, otherwise from our
    // own cached observations.
    let price_history = match candles {
        Ok(points) if !points.is_empty() => points
            .into_iter()
            .map(|p| PriceHistoryPoint {
                date: p.date,
                price: p.close,
            })
            .collect(),
        _ => match &stock {
            Some(stock) => db::price_queries::fetch_window(pool, stock.id, 30)
                .await?
                .into_iter()
                .map(|p| PriceHistoryPoint {
                    date: p.date,
                    price: decimal_to_f64(&p.close_price),
                })
                .collect(),
            None => Vec::new(),
        },
    };

    let (name, logo, is_tracked) = match &stock {
        Some(stock) => (stock.name.clone(), stock.logo_url.clone(), true),
        None => (ticker.clone(), None, false),
    };

    Ok(StockDetail {
        ticker,
        name,
        logo,
        is_tracked,
        quote,
        price_history,
        market: market.ok(),
    })
}

fn decimal_to_f64(value: &bigdecimal::BigDecimal) -> f64 {
    value.to_string().parse().unwrap_or(0.0)
}

#[derive(Debug, Serialize)]
pub struct SeedResult {
    pub ticker: String,
    pub status: &'static str,
    pub error: Option<String>,
}

/// Seed the starter tickers: profile for metadata, quote for the first
/// observation. One bad ticker never aborts the rest.
pub async fn seed_starter_stocks(
    pool: &PgPool,
    provider: &dyn PriceProvider,
    failure_cache: &FailureCache,
    rate_limiter: &RateLimiter,
) -> Result<Vec<SeedResult>, AppError> {
    let mut results = Vec::with_capacity(STARTER_TICKERS.len());

    for &ticker in STARTER_TICKERS {
        let guard = rate_limiter.acquire().await;

        let profile = match provider.fetch_profile(ticker).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!("❌ Seeding {} failed at profile fetch: {}", ticker, e);
                results.push(SeedResult {
                    ticker: ticker.to_string(),
                    status: "error",
                    error: Some(e.to_string()),
                });
                continue;
            }
        };

        let stock = db::stock_queries::upsert(
            pool,
            Stock::new(ticker.to_string(), profile.name, profile.logo),
        )
        .await?;
        drop(guard);

        let _guard = rate_limiter.acquire().await;
        match price_service::refresh_latest(pool, provider, failure_cache, &stock).await {
            Ok(RefreshOutcome::Updated(_)) | Ok(RefreshOutcome::Skipped) => {
                info!("✅ Seeded {}", ticker);
                results.push(SeedResult {
                    ticker: ticker.to_string(),
                    status: "seeded",
                    error: None,
                });
            }
            Err(e) => {
                warn!("❌ Seeding {} failed at price fetch: {}", ticker, e);
                results.push(SeedResult {
                    ticker: ticker.to_string(),
                    status: "error",
                    error: Some(e.to_string()),
                });
            }
        }
    }

    Ok(results)
}
