use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Daily point-in-time rollup of one account: holdings at latest prices plus
// cash. Written once per (account, date), never revised.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PortfolioSnapshot {
    pub id: Uuid,
    pub account_id: Uuid,
    pub date: NaiveDate,
    pub portfolio_value: BigDecimal,
    pub cash_balance: BigDecimal,
    pub total_value: BigDecimal,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl PortfolioSnapshot {
    pub fn new(
        account_id: Uuid,
        date: NaiveDate,
        portfolio_value: BigDecimal,
        cash_balance: BigDecimal,
    ) -> Self {
        let total_value = &portfolio_value + &cash_balance;
        Self {
            id: Uuid::new_v4(),
            account_id,
            date,
            portfolio_value,
            cash_balance,
            total_value,
            created_at: chrono::Utc::now(),
        }
    }
}
