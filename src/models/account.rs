use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// A child's account. The cash balance only moves through ledger operations
// (chore credit, parent deposit, buy, sell) -- never through cash-out review.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub family_id: Uuid,
    pub first_name: String,
    pub cash_balance: BigDecimal,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
