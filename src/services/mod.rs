pub mod cashout_service;
pub mod chore_service;
pub mod failure_cache;
pub mod job_scheduler_service;
pub mod portfolio_service;
pub mod price_service;
pub mod rate_limiter;
pub mod stock_service;
pub mod trading_service;
