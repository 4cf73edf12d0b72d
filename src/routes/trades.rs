use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use bigdecimal::BigDecimal;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::{error, info};

use crate::auth::Child;
use crate::errors::AppError;
use crate::services::trading_service::{self, TradeOutcome};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/buy", post(buy_stock))
        .route("/sell", post(sell_stock))
}

fn ticker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z.\-]{1,10}$").unwrap())
}

/// Uppercase and shape-check a ticker before it reaches the ledger.
pub fn normalize_ticker(ticker: &str) -> Result<String, AppError> {
    let ticker = ticker.trim();
    if !ticker_pattern().is_match(ticker) {
        return Err(AppError::Validation("Invalid ticker".to_string()));
    }
    Ok(ticker.to_uppercase())
}

#[derive(Debug, Deserialize)]
pub struct BuyRequest {
    pub ticker: String,
    pub amount: BigDecimal,
}

#[derive(Debug, Deserialize)]
pub struct SellRequest {
    pub ticker: String,
    pub shares: BigDecimal,
}

pub async fn buy_stock(
    State(state): State<AppState>,
    Child(actor): Child,
    Json(data): Json<BuyRequest>,
) -> Result<Json<TradeOutcome>, AppError> {
    info!("POST /trades/buy - {} buying {}", actor.id, data.ticker);
    let ticker = normalize_ticker(&data.ticker)?;

    let outcome =
        trading_service::buy(&state.pool, &state.policy, actor.id, &ticker, data.amount)
            .await
            .map_err(|e| {
                error!("Buy of {} failed for {}: {}", ticker, actor.id, e);
                e
            })?;
    Ok(Json(outcome))
}

pub async fn sell_stock(
    State(state): State<AppState>,
    Child(actor): Child,
    Json(data): Json<SellRequest>,
) -> Result<Json<TradeOutcome>, AppError> {
    info!("POST /trades/sell - {} selling {}", actor.id, data.ticker);
    let ticker = normalize_ticker(&data.ticker)?;

    let outcome =
        trading_service::sell(&state.pool, &state.policy, actor.id, &ticker, data.shares)
            .await
            .map_err(|e| {
                error!("Sell of {} failed for {}: {}", ticker, actor.id, e);
                e
            })?;
    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tickers_are_uppercased() {
        assert_eq!(normalize_ticker("aapl").unwrap(), "AAPL");
        assert_eq!(normalize_ticker("BRK.B").unwrap(), "BRK.B");
    }

    #[test]
    fn malformed_tickers_rejected() {
        assert!(normalize_ticker("").is_err());
        assert!(normalize_ticker("WAYTOOLONGNAME").is_err());
        assert!(normalize_ticker("AAPL; DROP").is_err());
    }
}
