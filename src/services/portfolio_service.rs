use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::models::{
    Account, HoldingPosition, LedgerTransaction, PortfolioSnapshot,
};
use crate::valuation;

#[derive(Debug, Serialize)]
pub struct PositionView {
    pub ticker: String,
    pub stock_name: String,
    pub shares: BigDecimal,
    pub cost_basis: BigDecimal,
    pub latest_price: Option<BigDecimal>,
    pub current_value: BigDecimal,
    pub unrealized_gain: BigDecimal,
}

#[derive(Debug, Serialize)]
pub struct PortfolioView {
    pub cash_balance: BigDecimal,
    pub portfolio_value: BigDecimal,
    pub total_cost_basis: BigDecimal,
    pub total_unrealized_gain: BigDecimal,
    pub total_value: BigDecimal,
    pub positions: Vec<PositionView>,
}

/// Value each position at its latest cached price. Stocks with no
/// observations value at zero rather than failing the whole portfolio.
pub fn value_positions(positions: Vec<HoldingPosition>) -> Vec<PositionView> {
    positions
        .into_iter()
        .map(|p| {
            let current_value = match &p.latest_price {
                Some(price) => &p.shares * price,
                None => BigDecimal::zero(),
            };
            let unrealized_gain = valuation::unrealized_gain(&current_value, &p.cost_basis);
            PositionView {
                ticker: p.ticker,
                stock_name: p.stock_name,
                shares: p.shares,
                cost_basis: p.cost_basis,
                latest_price: p.latest_price,
                current_value,
                unrealized_gain,
            }
        })
        .collect()
}

pub async fn get_portfolio(pool: &PgPool, account_id: Uuid) -> Result<PortfolioView, AppError> {
    let account = db::account_queries::fetch_one(pool, account_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account".to_string()))?;

    let positions = value_positions(db::holding_queries::fetch_positions(pool, account_id).await?);

    let (portfolio_value, total_cost_basis) = totals_of(&positions);
    let total_unrealized_gain = valuation::unrealized_gain(&portfolio_value, &total_cost_basis);
    let total_value = &portfolio_value + &account.cash_balance;

    Ok(PortfolioView {
        cash_balance: account.cash_balance,
        portfolio_value,
        total_cost_basis,
        total_unrealized_gain,
        total_value,
        positions,
    })
}

/// Aggregate (market value, cost basis) across an account's holdings; the
/// input to cash-out eligibility.
pub async fn holdings_totals(
    pool: &PgPool,
    account_id: Uuid,
) -> Result<(BigDecimal, BigDecimal), AppError> {
    let positions = value_positions(db::holding_queries::fetch_positions(pool, account_id).await?);
    Ok(totals_of(&positions))
}

fn totals_of(positions: &[PositionView]) -> (BigDecimal, BigDecimal) {
    positions.iter().fold(
        (BigDecimal::zero(), BigDecimal::zero()),
        |(value, basis), p| (value + &p.current_value, basis + &p.cost_basis),
    )
}

pub async fn get_history(
    pool: &PgPool,
    account_id: Uuid,
    limit: i64,
) -> Result<Vec<PortfolioSnapshot>, AppError> {
    Ok(db::snapshot_queries::fetch_history(pool, account_id, limit).await?)
}

#[derive(Debug, Serialize)]
pub struct DepositOutcome {
    pub balance: BigDecimal,
    pub transaction: LedgerTransaction,
}

/// Parent tops up a child's spendable cash. Credits the balance and appends
/// a PARENT_DEPOSIT row in one transaction.
pub async fn parent_deposit(
    pool: &PgPool,
    parent_family_id: Uuid,
    account_id: Uuid,
    amount: BigDecimal,
) -> Result<DepositOutcome, AppError> {
    if amount <= BigDecimal::zero() {
        return Err(AppError::Validation(
            "Deposit amount must be greater than 0".to_string(),
        ));
    }

    let account = db::account_queries::fetch_one(pool, account_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account".to_string()))?;
    if account.family_id != parent_family_id {
        return Err(AppError::NotFound("Account".to_string()));
    }

    let mut tx = pool.begin().await?;

    db::account_queries::lock(&mut tx, account_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account".to_string()))?;

    let balance = db::account_queries::credit_balance(&mut tx, account_id, &amount).await?;
    let transaction = db::transaction_queries::insert(
        &mut tx,
        LedgerTransaction::parent_deposit(account_id, amount),
    )
    .await?;

    tx.commit().await.map_err(|e| {
        error!("Failed to commit deposit for account {}: {}", account_id, e);
        AppError::Db(e)
    })?;

    Ok(DepositOutcome {
        balance,
        transaction,
    })
}

#[derive(Debug, Serialize)]
pub struct ChildOverview {
    pub account_id: Uuid,
    pub first_name: String,
    pub cash_balance: BigDecimal,
    pub portfolio_value: BigDecimal,
    pub total_value: BigDecimal,
}

pub async fn family_overview(
    pool: &PgPool,
    family_id: Uuid,
) -> Result<Vec<ChildOverview>, AppError> {
    let children = db::account_queries::fetch_children(pool, family_id).await?;

    let mut overview = Vec::with_capacity(children.len());
    for child in children {
        let (portfolio_value, _) = holdings_totals(pool, child.id).await?;
        let total_value = &portfolio_value + &child.cash_balance;
        overview.push(ChildOverview {
            account_id: child.id,
            first_name: child.first_name,
            cash_balance: child.cash_balance,
            portfolio_value,
            total_value,
        });
    }

    Ok(overview)
}

#[derive(Debug, PartialEq)]
pub enum SnapshotOutcome {
    Created(BigDecimal),
    Skipped,
}

/// Write today's rollup for one account. The (account, date) unique key
/// makes a re-run a no-op.
pub async fn snapshot_account(
    pool: &PgPool,
    account: &Account,
    date: NaiveDate,
) -> Result<SnapshotOutcome, AppError> {
    let (portfolio_value, _) = holdings_totals(pool, account.id).await?;

    let snapshot = PortfolioSnapshot::new(
        account.id,
        date,
        portfolio_value,
        account.cash_balance.clone(),
    );
    let total_value = snapshot.total_value.clone();

    if db::snapshot_queries::insert(pool, snapshot).await? {
        Ok(SnapshotOutcome::Created(total_value))
    } else {
        Ok(SnapshotOutcome::Skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn position(ticker: &str, shares: &str, basis: &str, price: Option<&str>) -> HoldingPosition {
        HoldingPosition {
            id: Uuid::new_v4(),
            stock_id: Uuid::new_v4(),
            ticker: ticker.to_string(),
            stock_name: ticker.to_string(),
            shares: dec(shares),
            cost_basis: dec(basis),
            latest_price: price.map(dec),
            price_date: None,
        }
    }

    #[test]
    fn positions_value_at_latest_price() {
        let views = value_positions(vec![position("AAPL", "0.25", "50", Some("240"))]);

        assert_eq!(views[0].current_value, dec("60.00"));
        assert_eq!(views[0].unrealized_gain, dec("10.00"));
    }

    #[test]
    fn missing_price_values_position_at_zero() {
        let views = value_positions(vec![position("NEWCO", "2", "80", None)]);

        assert_eq!(views[0].current_value, dec("0"));
        assert_eq!(views[0].unrealized_gain, dec("-80"));
    }
}
