use bigdecimal::{BigDecimal, Zero};
use serde::Serialize;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::config::TradingPolicy;
use crate::db;
use crate::errors::AppError;
use crate::models::{Holding, LedgerTransaction};
use crate::valuation;

#[derive(Debug, Serialize)]
pub struct TradeOutcome {
    pub balance: BigDecimal,
    pub holding: Option<Holding>,
    pub transaction: LedgerTransaction,
}

/// Validated purchase: the share count the dollar amount buys at `price`.
pub fn plan_purchase(
    amount: &BigDecimal,
    price: &BigDecimal,
    policy: &TradingPolicy,
) -> Result<BigDecimal, AppError> {
    if amount < &policy.min_buy_amount {
        return Err(AppError::Validation(format!(
            "Minimum purchase is ${}",
            policy.min_buy_amount
        )));
    }

    let shares = valuation::shares_from_amount(amount, price);
    if shares <= BigDecimal::zero() {
        return Err(AppError::AmountTooSmall);
    }

    Ok(shares)
}

#[derive(Debug, Clone)]
pub struct SalePlan {
    pub proceeds: BigDecimal,
    pub cost_basis_removed: BigDecimal,
    pub remaining_shares: BigDecimal,
    pub remaining_cost_basis: BigDecimal,
    /// The residual position is dust and the holding row goes away.
    pub delete_holding: bool,
}

/// Validated sale against a holding's current shares and cost basis.
pub fn plan_sale(
    held_shares: &BigDecimal,
    held_cost_basis: &BigDecimal,
    shares_to_sell: &BigDecimal,
    price: &BigDecimal,
    policy: &TradingPolicy,
) -> Result<SalePlan, AppError> {
    if shares_to_sell <= &BigDecimal::zero() {
        return Err(AppError::Validation(
            "Shares must be greater than 0".to_string(),
        ));
    }
    if shares_to_sell > held_shares {
        return Err(AppError::InsufficientShares);
    }

    let proceeds = valuation::proceeds_from_sale(shares_to_sell, price);
    let cost_basis_removed =
        valuation::cost_basis_to_remove(held_cost_basis, held_shares, shares_to_sell);

    let remaining_shares = held_shares - shares_to_sell;
    let remaining_cost_basis = held_cost_basis - &cost_basis_removed;
    let delete_holding = valuation::is_dust(&remaining_shares, &policy.dust_threshold);

    Ok(SalePlan {
        proceeds,
        cost_basis_removed,
        remaining_shares,
        remaining_cost_basis,
        delete_holding,
    })
}

/// Buy `amount` dollars of `ticker` at the latest cached price. Balance
/// debit, holding upsert, and the ledger append commit together or not at
/// all.
pub async fn buy(
    pool: &PgPool,
    policy: &TradingPolicy,
    account_id: Uuid,
    ticker: &str,
    amount: BigDecimal,
) -> Result<TradeOutcome, AppError> {
    let stock = db::stock_queries::fetch_by_ticker(pool, ticker)
        .await?
        .filter(|s| s.is_active)
        .ok_or_else(|| AppError::NotFound("Stock".to_string()))?;

    let price_point = db::price_queries::fetch_latest(pool, stock.id)
        .await?
        .ok_or_else(|| AppError::NoPriceData(stock.ticker.clone()))?;
    let price = price_point.close_price;

    let shares = plan_purchase(&amount, &price, policy)?;

    let mut tx = pool.begin().await?;

    // Lock order: account before holding, everywhere.
    let account = db::account_queries::lock(&mut tx, account_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account".to_string()))?;

    if amount > account.cash_balance {
        return Err(AppError::InsufficientBalance);
    }

    let balance = db::account_queries::debit_balance(&mut tx, account_id, &amount).await?;

    let holding = db::holding_queries::upsert_buy(
        &mut tx,
        Holding::new(account_id, stock.id, shares.clone(), amount.clone()),
    )
    .await?;

    let transaction = db::transaction_queries::insert(
        &mut tx,
        LedgerTransaction::stock_buy(account_id, stock.id, &stock.ticker, amount, shares, price),
    )
    .await?;

    tx.commit().await.map_err(|e| {
        error!("Failed to commit buy for account {}: {}", account_id, e);
        AppError::Db(e)
    })?;

    Ok(TradeOutcome {
        balance,
        holding: Some(holding),
        transaction,
    })
}

/// Sell `shares_to_sell` of `ticker` at the latest cached price. The
/// holding row lock serializes concurrent sells: the loser re-reads the
/// committed share count and fails `InsufficientShares` instead of
/// over-selling.
pub async fn sell(
    pool: &PgPool,
    policy: &TradingPolicy,
    account_id: Uuid,
    ticker: &str,
    shares_to_sell: BigDecimal,
) -> Result<TradeOutcome, AppError> {
    let stock = db::stock_queries::fetch_by_ticker(pool, ticker)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock".to_string()))?;

    let price_point = db::price_queries::fetch_latest(pool, stock.id)
        .await?
        .ok_or_else(|| AppError::NoPriceData(stock.ticker.clone()))?;
    let price = price_point.close_price;

    let mut tx = pool.begin().await?;

    db::account_queries::lock(&mut tx, account_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account".to_string()))?;

    let holding = db::holding_queries::lock(&mut tx, account_id, stock.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Holding".to_string()))?;

    let plan = plan_sale(
        &holding.shares,
        &holding.cost_basis,
        &shares_to_sell,
        &price,
        policy,
    )?;

    let updated_holding = if plan.delete_holding {
        db::holding_queries::delete(&mut tx, holding.id).await?;
        None
    } else {
        Some(
            db::holding_queries::update_after_sale(
                &mut tx,
                holding.id,
                &plan.remaining_shares,
                &plan.remaining_cost_basis,
            )
            .await?,
        )
    };

    let balance = db::account_queries::credit_balance(&mut tx, account_id, &plan.proceeds).await?;

    let transaction = db::transaction_queries::insert(
        &mut tx,
        LedgerTransaction::stock_sell(
            account_id,
            stock.id,
            &stock.ticker,
            plan.proceeds,
            shares_to_sell,
            price,
        ),
    )
    .await?;

    tx.commit().await.map_err(|e| {
        error!("Failed to commit sell for account {}: {}", account_id, e);
        AppError::Db(e)
    })?;

    Ok(TradeOutcome {
        balance,
        holding: updated_holding,
        transaction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn policy() -> TradingPolicy {
        TradingPolicy::default()
    }

    #[test]
    fn purchase_below_minimum_rejected() {
        let err = plan_purchase(&dec("4.99"), &dec("100"), &policy()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn purchase_rounding_to_zero_shares_rejected() {
        // $5 at $10M/share truncates to zero shares at 6-decimal precision
        let err = plan_purchase(&dec("5"), &dec("10000000"), &policy()).unwrap_err();
        assert!(matches!(err, AppError::AmountTooSmall));
    }

    #[test]
    fn purchase_of_fifty_at_two_hundred_yields_quarter_share() {
        let shares = plan_purchase(&dec("50"), &dec("200"), &policy()).unwrap();
        assert_eq!(shares, dec("0.250000"));
    }

    #[test]
    fn sale_of_more_than_held_rejected() {
        let err = plan_sale(&dec("0.25"), &dec("50"), &dec("0.3"), &dec("240"), &policy())
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientShares));
    }

    #[test]
    fn sale_of_non_positive_shares_rejected() {
        let err =
            plan_sale(&dec("1"), &dec("50"), &dec("0"), &dec("240"), &policy()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn full_sale_deletes_holding_and_removes_full_basis() {
        // Scenario: bought $50 at $200 (0.25 shares), price rises to $240
        let plan =
            plan_sale(&dec("0.25"), &dec("50"), &dec("0.25"), &dec("240"), &policy()).unwrap();

        assert_eq!(plan.proceeds, dec("60.00"));
        assert_eq!(plan.cost_basis_removed.clone().with_scale(2), dec("50.00"));
        assert!(plan.delete_holding);
        assert_eq!(plan.remaining_shares, dec("0.00"));
    }

    #[test]
    fn partial_sale_keeps_proportional_basis() {
        let plan =
            plan_sale(&dec("2"), &dec("100"), &dec("0.5"), &dec("80"), &policy()).unwrap();

        assert_eq!(plan.proceeds, dec("40.0"));
        assert_eq!(plan.cost_basis_removed, dec("25.0"));
        assert_eq!(plan.remaining_shares, dec("1.5"));
        assert_eq!(plan.remaining_cost_basis, dec("75.0"));
        assert!(!plan.delete_holding);
    }

    #[test]
    fn residual_dust_triggers_deletion() {
        // Selling all but 1e-6 shares leaves dust
        let plan = plan_sale(
            &dec("1.000001"),
            &dec("100"),
            &dec("1.000000"),
            &dec("50"),
            &policy(),
        )
        .unwrap();

        assert_eq!(plan.remaining_shares, dec("0.000001"));
        assert!(plan.delete_holding);
    }
}
