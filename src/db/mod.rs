pub mod account_queries;
pub mod cashout_queries;
pub mod chore_queries;
pub mod holding_queries;
pub mod price_queries;
pub mod snapshot_queries;
pub mod stock_queries;
pub mod transaction_queries;
