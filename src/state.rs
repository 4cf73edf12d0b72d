use std::sync::Arc;

use sqlx::PgPool;

use crate::config::TradingPolicy;
use crate::external::price_provider::PriceProvider;
use crate::services::failure_cache::FailureCache;
use crate::services::rate_limiter::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub price_provider: Arc<dyn PriceProvider>,
    pub failure_cache: FailureCache,
    pub rate_limiter: Arc<RateLimiter>,
    pub policy: TradingPolicy,
}
