use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    ChoreEarning,
    StockBuy,
    StockSell,
    CashOut,
    ParentDeposit,
}

// One row per balance-affecting event. The audit trail of record: rows are
// appended inside the same transaction as the mutation they describe and are
// never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LedgerTransaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub kind: TransactionKind,
    pub amount: BigDecimal,
    pub shares: Option<BigDecimal>,
    pub price_per_share: Option<BigDecimal>,
    pub stock_id: Option<Uuid>,
    pub chore_assignment_id: Option<Uuid>,
    pub cash_out_request_id: Option<Uuid>,
    pub description: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl LedgerTransaction {
    pub fn stock_buy(
        account_id: Uuid,
        stock_id: Uuid,
        ticker: &str,
        amount: BigDecimal,
        shares: BigDecimal,
        price_per_share: BigDecimal,
    ) -> Self {
        let description = format!("Bought {} shares of {}", shares, ticker);
        Self {
            id: Uuid::new_v4(),
            account_id,
            kind: TransactionKind::StockBuy,
            amount,
            shares: Some(shares),
            price_per_share: Some(price_per_share),
            stock_id: Some(stock_id),
            chore_assignment_id: None,
            cash_out_request_id: None,
            description,
            created_at: chrono::Utc::now(),
        }
    }

    pub fn stock_sell(
        account_id: Uuid,
        stock_id: Uuid,
        ticker: &str,
        proceeds: BigDecimal,
        shares: BigDecimal,
        price_per_share: BigDecimal,
    ) -> Self {
        let description = format!("Sold {} shares of {}", shares, ticker);
        Self {
            id: Uuid::new_v4(),
            account_id,
            kind: TransactionKind::StockSell,
            amount: proceeds,
            shares: Some(shares),
            price_per_share: Some(price_per_share),
            stock_id: Some(stock_id),
            chore_assignment_id: None,
            cash_out_request_id: None,
            description,
            created_at: chrono::Utc::now(),
        }
    }

    pub fn chore_earning(
        account_id: Uuid,
        assignment_id: Uuid,
        chore_title: &str,
        reward: BigDecimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            kind: TransactionKind::ChoreEarning,
            amount: reward,
            shares: None,
            price_per_share: None,
            stock_id: None,
            chore_assignment_id: Some(assignment_id),
            cash_out_request_id: None,
            description: format!("Completed chore: {}", chore_title),
            created_at: chrono::Utc::now(),
        }
    }

    pub fn cash_out(account_id: Uuid, request_id: Uuid, amount: BigDecimal) -> Self {
        let description = format!("Cash out: ${}", amount);
        Self {
            id: Uuid::new_v4(),
            account_id,
            kind: TransactionKind::CashOut,
            amount,
            shares: None,
            price_per_share: None,
            stock_id: None,
            chore_assignment_id: None,
            cash_out_request_id: Some(request_id),
            description,
            created_at: chrono::Utc::now(),
        }
    }

    pub fn parent_deposit(account_id: Uuid, amount: BigDecimal) -> Self {
        let description = format!("Deposit from parent: ${}", amount);
        Self {
            id: Uuid::new_v4(),
            account_id,
            kind: TransactionKind::ParentDeposit,
            amount,
            shares: None,
            price_per_share: None,
            stock_id: None,
            chore_assignment_id: None,
            cash_out_request_id: None,
            description,
            created_at: chrono::Utc::now(),
        }
    }
}
