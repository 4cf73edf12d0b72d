use crate::external::price_provider::{
    ExternalMarketStatus, ExternalPricePoint, ExternalProfile, ExternalQuote, ExternalSymbolMatch,
    PriceProvider, PriceProviderError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

const BASE_URL: &str = "https://finnhub.io/api/v1";

/// Finnhub REST client. Free tier allows 60 requests/minute; pacing is the
/// caller's job (see `services::rate_limiter`).
pub struct FinnhubProvider {
    client: reqwest::Client,
    api_key: String,
}

impl FinnhubProvider {
    pub fn from_env() -> Result<Self, PriceProviderError> {
        let api_key = std::env::var("FINNHUB_API_KEY")
            .map_err(|_| PriceProviderError::BadResponse("FINNHUB_API_KEY not set".into()))?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, PriceProviderError> {
        let url = format!("{}{}", BASE_URL, path);

        let resp = self
            .client
            .get(&url)
            .query(query)
            .query(&[("token", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceProviderError::RateLimited);
        }
        if !resp.status().is_success() {
            return Err(PriceProviderError::BadResponse(format!(
                "HTTP {}",
                resp.status()
            )));
        }

        resp.json::<T>()
            .await
            .map_err(|e| PriceProviderError::Parse(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct FinnhubQuote {
    #[serde(default)]
    c: f64,
    #[serde(default)]
    d: Option<f64>,
    #[serde(default)]
    dp: Option<f64>,
    #[serde(default)]
    h: f64,
    #[serde(default)]
    l: f64,
    #[serde(default)]
    o: f64,
    #[serde(default)]
    pc: f64,
    #[serde(default)]
    t: i64,
}

#[derive(Debug, Deserialize)]
struct FinnhubProfile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    logo: Option<String>,
    #[serde(rename = "finnhubIndustry")]
    industry: Option<String>,
    #[serde(default)]
    exchange: Option<String>,
    #[serde(rename = "marketCapitalization")]
    market_cap: Option<f64>,
    #[serde(rename = "weburl")]
    website: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FinnhubCandles {
    s: String,
    #[serde(default)]
    c: Vec<f64>,
    #[serde(default)]
    t: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct FinnhubMarketStatus {
    #[serde(rename = "isOpen", default)]
    is_open: bool,
    #[serde(default)]
    session: Option<String>,
    #[serde(default)]
    holiday: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FinnhubSearchResponse {
    #[serde(default)]
    result: Vec<FinnhubSearchMatch>,
}

#[derive(Debug, Deserialize)]
struct FinnhubSearchMatch {
    symbol: String,
    description: String,
}

#[async_trait]
impl PriceProvider for FinnhubProvider {
    async fn fetch_quote(&self, ticker: &str) -> Result<ExternalQuote, PriceProviderError> {
        let quote: FinnhubQuote = self.get_json("/quote", &[("symbol", ticker)]).await?;

        // Finnhub answers unknown tickers with an all-zero quote rather than
        // an error status.
        if quote.c == 0.0 && quote.pc == 0.0 {
            return Err(PriceProviderError::NotFound);
        }

        Ok(ExternalQuote {
            current: quote.c,
            previous_close: quote.pc,
            open: quote.o,
            high: quote.h,
            low: quote.l,
            change: quote.d.unwrap_or(0.0),
            change_percent: quote.dp.unwrap_or(0.0),
            timestamp: quote.t,
        })
    }

    async fn fetch_profile(&self, ticker: &str) -> Result<ExternalProfile, PriceProviderError> {
        let profile: FinnhubProfile = self
            .get_json("/stock/profile2", &[("symbol", ticker)])
            .await?;

        // An empty object means the ticker is unknown.
        if profile.name.is_empty() {
            return Err(PriceProviderError::NotFound);
        }

        Ok(ExternalProfile {
            name: profile.name,
            logo: profile.logo,
            industry: profile.industry,
            exchange: profile.exchange,
            market_cap: profile.market_cap,
            website: profile.website,
        })
    }

    async fn fetch_candles(
        &self,
        ticker: &str,
        days: u32,
    ) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
        let to = Utc::now().timestamp();
        let from = to - i64::from(days) * 86_400;

        let candles: FinnhubCandles = self
            .get_json(
                "/stock/candle",
                &[
                    ("symbol", ticker),
                    ("resolution", "D"),
                    ("from", &from.to_string()),
                    ("to", &to.to_string()),
                ],
            )
            .await?;

        if candles.s != "ok" {
            return Err(PriceProviderError::NotFound);
        }

        let points = candles
            .t
            .iter()
            .zip(candles.c.iter())
            .filter_map(|(ts, close)| {
                DateTime::<Utc>::from_timestamp(*ts, 0).map(|dt| ExternalPricePoint {
                    date: dt.date_naive(),
                    close: *close,
                })
            })
            .collect();

        Ok(points)
    }

    async fn fetch_market_status(&self) -> Result<ExternalMarketStatus, PriceProviderError> {
        let status: FinnhubMarketStatus = self
            .get_json("/stock/market-status", &[("exchange", "US")])
            .await?;

        Ok(ExternalMarketStatus {
            is_open: status.is_open,
            session: status.session,
            holiday: status.holiday,
        })
    }

    async fn search_symbols(
        &self,
        query: &str,
    ) -> Result<Vec<ExternalSymbolMatch>, PriceProviderError> {
        let body: FinnhubSearchResponse = self.get_json("/search", &[("q", query)]).await?;

        Ok(body
            .result
            .into_iter()
            .map(|m| ExternalSymbolMatch {
                symbol: m.symbol,
                name: m.description,
            })
            .collect())
    }
}
