//! End-to-end scenario tests for the ledger math and state guards.
//!
//! These drive the same planning and valuation functions the request path
//! uses, against realistic balances and prices. Flows that need a live
//! Postgres (row locking, transactional commit) run against the database in
//! a deployed environment; the arithmetic and precondition logic they share
//! is exercised here.

use bigdecimal::BigDecimal;
use std::str::FromStr;

use kidfolio_backend::config::TradingPolicy;
use kidfolio_backend::errors::AppError;
use kidfolio_backend::models::{AssignmentStatus, LedgerTransaction, TransactionKind};
use kidfolio_backend::services::trading_service::{plan_purchase, plan_sale};
use kidfolio_backend::valuation;
use uuid::Uuid;

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

fn policy() -> TradingPolicy {
    TradingPolicy::default()
}

// ---------------------------------------------------------------------------
// Scenario A: first buy
// ---------------------------------------------------------------------------

#[test]
fn scenario_a_buy_quarter_share_of_aapl() {
    // Balance $100, buy $50 of AAPL at cached price $200.
    let balance = dec("100");
    let amount = dec("50");
    let price = dec("200");

    let shares = plan_purchase(&amount, &price, &policy()).unwrap();
    assert_eq!(shares, dec("0.250000"));
    assert!(amount <= balance);

    let balance_after = &balance - &amount;
    assert_eq!(balance_after, dec("50"));

    // New holding carries the purchase amount as its cost basis.
    let holding_shares = shares;
    let holding_basis = amount;
    assert_eq!(holding_shares, dec("0.25"));
    assert_eq!(holding_basis, dec("50"));
}

#[test]
fn scenario_a_buy_exceeding_balance_is_rejected() {
    let balance = dec("100");
    let amount = dec("150");
    let price = dec("200");

    // Share computation succeeds; the balance guard is what rejects it.
    assert!(plan_purchase(&amount, &price, &policy()).is_ok());
    assert!(amount > balance);
}

// ---------------------------------------------------------------------------
// Scenario B: price rises, sell everything
// ---------------------------------------------------------------------------

#[test]
fn scenario_b_sell_after_price_rise_realizes_gain() {
    // Continuing A: holding {shares: 0.25, basis: $50}, price now $240.
    let balance = dec("50");
    let plan = plan_sale(&dec("0.25"), &dec("50"), &dec("0.25"), &dec("240"), &policy()).unwrap();

    assert_eq!(plan.proceeds, dec("60.00"));
    assert_eq!(plan.cost_basis_removed.clone().with_scale(2), dec("50.00"));

    // 0 shares remain: holding is deleted, not kept at zero.
    assert!(plan.delete_holding);

    let balance_after = &balance + &plan.proceeds;
    assert_eq!(balance_after, dec("110.00"));

    let realized_gain = &plan.proceeds - &plan.cost_basis_removed;
    assert_eq!(realized_gain.with_scale(2), dec("10.00"));
}

#[test]
fn scenario_b_overselling_fails_before_any_mutation() {
    let err = plan_sale(&dec("0.25"), &dec("50"), &dec("0.26"), &dec("240"), &policy())
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientShares));
}

#[test]
fn concurrent_last_share_sale_has_one_winner() {
    // Two sells race for a holding with exactly enough shares for one. The
    // row lock serializes them; the loser replans against the post-commit
    // state and must fail.
    let held = dec("0.25");
    let basis = dec("50");
    let price = dec("240");

    let winner = plan_sale(&held, &basis, &dec("0.25"), &price, &policy()).unwrap();
    assert!(winner.delete_holding);

    // After the winner commits, the holding is gone; a replanned sale has
    // nothing to sell against. Planning against zero shares demonstrates
    // the guard that fires.
    let loser = plan_sale(&dec("0"), &dec("0"), &dec("0.25"), &price, &policy());
    assert!(matches!(loser.unwrap_err(), AppError::InsufficientShares));
}

// ---------------------------------------------------------------------------
// Scenario C: cash-out eligibility and request guards
// ---------------------------------------------------------------------------

#[test]
fn scenario_c_eligibility_floors_to_five_dollar_unit() {
    let unit = policy().cashout_unit;

    // $27 of unrealized gains, no prior cash-outs -> $25 eligible.
    let eligible = valuation::eligible_cashout(&dec("27"), &dec("0"), &unit);
    assert_eq!(eligible, dec("25"));

    // Requesting $30 exceeds the eligible amount.
    assert!(dec("30") > eligible);

    // Requesting $25 is allowed: a unit multiple within eligibility.
    let requested = dec("25");
    assert!(requested <= eligible);
    assert_eq!((&requested / &unit).with_scale(0) * &unit, requested);
}

#[test]
fn scenario_c_approvals_reduce_future_eligibility() {
    let unit = policy().cashout_unit;

    // After the $25 approval, the same $27 of gains leaves only $2.
    let eligible = valuation::eligible_cashout(&dec("27"), &dec("25"), &unit);
    assert_eq!(eligible, dec("0"));
}

#[test]
fn cash_out_audit_row_never_touches_balance_fields() {
    let record = LedgerTransaction::cash_out(Uuid::new_v4(), Uuid::new_v4(), dec("25"));

    assert_eq!(record.kind, TransactionKind::CashOut);
    assert_eq!(record.amount, dec("25"));
    // No share or price data: cash-outs are not trades.
    assert!(record.shares.is_none());
    assert!(record.price_per_share.is_none());
    assert!(record.cash_out_request_id.is_some());
}

// ---------------------------------------------------------------------------
// Scenario D: chore approval credits the reward
// ---------------------------------------------------------------------------

#[test]
fn scenario_d_chore_approval_credits_reward() {
    let balance = dec("5");
    let reward = dec("10");

    let account_id = Uuid::new_v4();
    let assignment_id = Uuid::new_v4();
    let record =
        LedgerTransaction::chore_earning(account_id, assignment_id, "Take out trash", reward.clone());

    assert_eq!(record.kind, TransactionKind::ChoreEarning);
    assert_eq!(record.amount, reward);
    assert_eq!(record.account_id, account_id);
    assert_eq!(record.chore_assignment_id, Some(assignment_id));

    let balance_after = &balance + &record.amount;
    assert_eq!(balance_after, dec("15"));
}

#[test]
fn only_submitted_assignments_are_reviewable() {
    assert!(AssignmentStatus::Submitted.is_reviewable());
    assert!(!AssignmentStatus::Assigned.is_reviewable());
    assert!(!AssignmentStatus::Approved.is_reviewable());
    assert!(!AssignmentStatus::Rejected.is_reviewable());
}

// ---------------------------------------------------------------------------
// Dust handling across partial sales
// ---------------------------------------------------------------------------

#[test]
fn repeated_partial_sales_end_in_dust_deletion() {
    let policy = policy();
    let mut shares = dec("1.000000");
    let mut basis = dec("400");
    let price = dec("500");

    // Sell half, then half again, then everything but a sub-dust residue.
    for to_sell in [dec("0.5"), dec("0.25"), dec("0.249999")] {
        let plan = plan_sale(&shares, &basis, &to_sell, &price, &policy).unwrap();
        shares = plan.remaining_shares.clone();
        basis = plan.remaining_cost_basis.clone();
        if plan.delete_holding {
            // 0.000001 shares remain: at the threshold, deleted.
            assert_eq!(shares, dec("0.000001"));
            return;
        }
    }
    panic!("expected the final sale to leave dust and delete the holding");
}
