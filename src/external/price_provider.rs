use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Previous-close quote for one ticker.
#[derive(Debug, Clone, Serialize)]
pub struct ExternalQuote {
    pub current: f64,
    pub previous_close: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub change: f64,
    pub change_percent: f64,
    /// Provider timestamp, seconds since epoch.
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExternalProfile {
    pub name: String,
    pub logo: Option<String>,
    pub industry: Option<String>,
    pub exchange: Option<String>,
    pub market_cap: Option<f64>,
    pub website: Option<String>,
}

/// One point of chart history. Display data only; persisted observations go
/// through the ledger's decimal path instead.
#[derive(Debug, Clone, Serialize)]
pub struct ExternalPricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExternalMarketStatus {
    pub is_open: bool,
    pub session: Option<String>,
    pub holiday: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalSymbolMatch {
    pub symbol: String,
    pub name: String,
}

#[derive(Debug, Error)]
pub enum PriceProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,

    #[error("ticker not found")]
    NotFound,
}

#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn fetch_quote(&self, ticker: &str) -> Result<ExternalQuote, PriceProviderError>;

    async fn fetch_profile(&self, ticker: &str) -> Result<ExternalProfile, PriceProviderError>;

    async fn fetch_candles(
        &self,
        ticker: &str,
        days: u32,
    ) -> Result<Vec<ExternalPricePoint>, PriceProviderError>;

    async fn fetch_market_status(&self) -> Result<ExternalMarketStatus, PriceProviderError>;

    async fn search_symbols(
        &self,
        query: &str,
    ) -> Result<Vec<ExternalSymbolMatch>, PriceProviderError>;
}

/// Trading date a quote is attributed to: the provider timestamp's UTC
/// calendar date, independent of fetch time. Falls back to today when the
/// provider sends no timestamp.
pub fn trading_date(timestamp: i64) -> NaiveDate {
    if timestamp > 0 {
        if let Some(dt) = DateTime::<Utc>::from_timestamp(timestamp, 0) {
            return dt.date_naive();
        }
    }
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trading_date_uses_quote_timestamp() {
        // 2024-03-15 20:00:00 UTC
        assert_eq!(
            trading_date(1710532800),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
    }

    #[test]
    fn trading_date_falls_back_to_today() {
        assert_eq!(trading_date(0), Utc::now().date_naive());
        assert_eq!(trading_date(-5), Utc::now().date_naive());
    }
}
