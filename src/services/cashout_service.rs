use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::config::TradingPolicy;
use crate::db;
use crate::errors::{is_unique_violation, AppError};
use crate::models::{
    CashOutRequest, CashoutEligibility, CashoutStatus, LedgerTransaction, PendingCashout,
    ReviewAction,
};
use crate::services::portfolio_service;
use crate::valuation;

/// How much the child could cash out right now. Gains-only, net of
/// previously approved cash-outs, floored to the cash-out unit. Always
/// computed fresh; never cached.
pub async fn eligibility(
    pool: &PgPool,
    policy: &TradingPolicy,
    account_id: Uuid,
) -> Result<CashoutEligibility, AppError> {
    let eligible_amount = eligible_amount(pool, policy, account_id).await?;
    let pending = db::cashout_queries::fetch_pending_for_account(pool, account_id).await?;

    Ok(CashoutEligibility {
        eligible_amount,
        has_pending_request: pending.is_some(),
        pending_amount: pending.map(|r| r.amount),
    })
}

async fn eligible_amount(
    pool: &PgPool,
    policy: &TradingPolicy,
    account_id: Uuid,
) -> Result<BigDecimal, AppError> {
    let (current_value, cost_basis) =
        portfolio_service::holdings_totals(pool, account_id).await?;

    let mut gains = valuation::unrealized_gain(&current_value, &cost_basis);
    if gains < BigDecimal::zero() {
        gains = BigDecimal::zero();
    }

    let previous = db::cashout_queries::sum_approved(pool, account_id).await?;

    Ok(valuation::eligible_cashout(
        &gains,
        &previous,
        &policy.cashout_unit,
    ))
}

fn is_multiple_of(amount: &BigDecimal, unit: &BigDecimal) -> bool {
    &((amount / unit).with_scale(0) * unit) == amount
}

/// Child asks to convert gains into real money. Creates a PENDING request;
/// the partial unique index on (account_id, PENDING) closes the race two
/// simultaneous requests would otherwise win together.
pub async fn request(
    pool: &PgPool,
    policy: &TradingPolicy,
    account_id: Uuid,
    amount: BigDecimal,
) -> Result<CashOutRequest, AppError> {
    if amount < policy.cashout_unit {
        return Err(AppError::Validation(format!(
            "Minimum cash-out is ${}",
            policy.cashout_unit
        )));
    }
    if !is_multiple_of(&amount, &policy.cashout_unit) {
        return Err(AppError::Validation(format!(
            "Amount must be a multiple of ${}",
            policy.cashout_unit
        )));
    }

    let eligible = eligible_amount(pool, policy, account_id).await?;
    if amount > eligible {
        return Err(AppError::InsufficientBalance);
    }

    let mut tx = pool.begin().await?;

    // The account lock serializes with concurrent requests from the same
    // child; the pending check and insert then observe a settled state.
    db::account_queries::lock(&mut tx, account_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account".to_string()))?;

    if db::cashout_queries::fetch_pending_for_account(pool, account_id)
        .await?
        .is_some()
    {
        return Err(AppError::ConflictingState(
            "You already have a pending cash-out request".to_string(),
        ));
    }

    let request = db::cashout_queries::insert(&mut tx, CashOutRequest::new(account_id, amount))
        .await
        .map_err(|e| {
            if is_unique_violation(&e, Some("ux_cashout_one_pending")) {
                AppError::ConflictingState(
                    "You already have a pending cash-out request".to_string(),
                )
            } else {
                AppError::Db(e)
            }
        })?;

    tx.commit().await.map_err(|e| {
        error!(
            "Failed to commit cash-out request for account {}: {}",
            account_id, e
        );
        AppError::Db(e)
    })?;

    Ok(request)
}

pub async fn pending_for_family(
    pool: &PgPool,
    family_id: Uuid,
) -> Result<Vec<PendingCashout>, AppError> {
    Ok(db::cashout_queries::fetch_pending_for_family(pool, family_id).await?)
}

/// Parent approves or rejects a pending request. Approval appends a
/// CASH_OUT audit row but never debits the balance: the gains stay invested
/// and the parent pays in real life. Approved amounts reduce future
/// eligibility instead.
pub async fn review(
    pool: &PgPool,
    reviewer_id: Uuid,
    reviewer_family_id: Uuid,
    request_id: Uuid,
    action: ReviewAction,
) -> Result<CashOutRequest, AppError> {
    let request = db::cashout_queries::fetch_one(pool, request_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cash-out request".to_string()))?;

    let account = db::account_queries::fetch_one(pool, request.account_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account".to_string()))?;
    if account.family_id != reviewer_family_id {
        return Err(AppError::Forbidden);
    }

    let status = match action {
        ReviewAction::Approve => CashoutStatus::Approved,
        ReviewAction::Reject => CashoutStatus::Rejected,
    };

    let mut tx = pool.begin().await?;

    let updated = db::cashout_queries::mark_reviewed(
        &mut tx,
        request_id,
        status,
        reviewer_id,
        Utc::now(),
    )
    .await?
    .ok_or_else(|| AppError::ConflictingState("Request already processed".to_string()))?;

    if matches!(action, ReviewAction::Approve) {
        db::transaction_queries::insert(
            &mut tx,
            LedgerTransaction::cash_out(updated.account_id, updated.id, updated.amount.clone()),
        )
        .await?;
    }

    tx.commit().await.map_err(|e| {
        error!(
            "Failed to commit cash-out review for request {}: {}",
            request_id, e
        );
        AppError::Db(e)
    })?;

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn multiples_of_the_unit() {
        let unit = dec("5");
        assert!(is_multiple_of(&dec("5"), &unit));
        assert!(is_multiple_of(&dec("25"), &unit));
        assert!(!is_multiple_of(&dec("27"), &unit));
        assert!(!is_multiple_of(&dec("7.50"), &unit));
    }
}
