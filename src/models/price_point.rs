use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// One close price per stock per trading day. Append-only: once a row exists
// for a (stock, date) pair it is never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PricePoint {
    pub id: Uuid,
    pub stock_id: Uuid,
    pub date: NaiveDate,
    pub close_price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl PricePoint {
    pub fn new(stock_id: Uuid, date: NaiveDate, close_price: BigDecimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            stock_id,
            date,
            close_price,
            created_at: Utc::now(),
        }
    }
}
