pub mod finnhub;
pub mod price_provider;
