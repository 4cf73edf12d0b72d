use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// A child's position in one stock: fractional share count plus the
// cumulative dollars paid for the shares currently held. Deleted once the
// share count falls to dust.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Holding {
    pub id: Uuid,
    pub account_id: Uuid,
    pub stock_id: Uuid,
    pub shares: BigDecimal,
    pub cost_basis: BigDecimal,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Holding {
    pub fn new(account_id: Uuid, stock_id: Uuid, shares: BigDecimal, cost_basis: BigDecimal) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: Uuid::new_v4(),
            account_id,
            stock_id,
            shares,
            cost_basis,
            created_at: now,
            updated_at: now,
        }
    }
}

// A holding joined with its stock and the latest cached price, as served to
// the portfolio views. `latest_price` is None for stocks with no
// observations yet; those positions value at zero.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HoldingPosition {
    pub id: Uuid,
    pub stock_id: Uuid,
    pub ticker: String,
    pub stock_name: String,
    pub shares: BigDecimal,
    pub cost_basis: BigDecimal,
    pub latest_price: Option<BigDecimal>,
    pub price_date: Option<chrono::NaiveDate>,
}
