use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "cashout_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashoutStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}

// A child's request to convert unrealized gains into real-world money. The
// parent pays out-of-band on approval; the in-app balance is never debited.
// Approved amounts are tracked so later eligibility subtracts them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CashOutRequest {
    pub id: Uuid,
    pub account_id: Uuid,
    pub amount: BigDecimal,
    pub status: CashoutStatus,
    pub requested_at: chrono::DateTime<chrono::Utc>,
    pub processed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub reviewed_by: Option<Uuid>,
}

impl CashOutRequest {
    pub fn new(account_id: Uuid, amount: BigDecimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            amount,
            status: CashoutStatus::Pending,
            requested_at: chrono::Utc::now(),
            processed_at: None,
            reviewed_by: None,
        }
    }
}

// Pending request joined with the requesting child's name, for the parent
// review queue.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PendingCashout {
    pub id: Uuid,
    pub account_id: Uuid,
    pub first_name: String,
    pub amount: BigDecimal,
    pub requested_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CashoutEligibility {
    pub eligible_amount: BigDecimal,
    pub has_pending_request: bool,
    pub pending_amount: Option<BigDecimal>,
}
