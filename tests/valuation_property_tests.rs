//! Property-based tests for the trading ledger's valuation math.
//!
//! These verify the universal laws the ledger relies on across randomized
//! inputs: purchases never grant more share value than was paid, proceeds
//! are exact, proportional cost-basis removal is consistent, and cash-out
//! eligibility always lands on a unit boundary.

use bigdecimal::{BigDecimal, Zero};
use proptest::prelude::*;
use std::str::FromStr;

use kidfolio_backend::valuation;

// =============================================================================
// Generators
// =============================================================================

/// Dollar amounts as exact cents in (0, $100,000].
fn arb_amount() -> impl Strategy<Value = BigDecimal> {
    (1u64..=10_000_000).prop_map(|cents| BigDecimal::from(cents) / BigDecimal::from(100))
}

/// Per-share prices as exact cents in (0, $50,000].
fn arb_price() -> impl Strategy<Value = BigDecimal> {
    (1u64..=5_000_000).prop_map(|cents| BigDecimal::from(cents) / BigDecimal::from(100))
}

/// Share counts at the ledger's 6-decimal precision, in (0, 10,000].
fn arb_shares() -> impl Strategy<Value = BigDecimal> {
    (1u64..=10_000_000_000).prop_map(|micro| BigDecimal::from(micro) / BigDecimal::from(1_000_000))
}

fn tolerance() -> BigDecimal {
    BigDecimal::from_str("0.0000000001").unwrap()
}

fn approx_eq(a: &BigDecimal, b: &BigDecimal) -> bool {
    (a - b).abs() < tolerance()
}

// =============================================================================
// Laws
// =============================================================================

proptest! {
    /// Rounding is always downward: the shares granted for a dollar amount
    /// are never worth more than the amount paid.
    #[test]
    fn purchase_never_exceeds_amount_paid(amount in arb_amount(), price in arb_price()) {
        let shares = valuation::shares_from_amount(&amount, &price);
        prop_assert!(&shares * &price <= amount);
    }

    /// Truncation loses less than one share-quantum of value.
    #[test]
    fn purchase_truncation_is_tight(amount in arb_amount(), price in arb_price()) {
        let shares = valuation::shares_from_amount(&amount, &price);
        let quantum = BigDecimal::from_str("0.000001").unwrap();
        // One more quantum of shares would overshoot the amount paid.
        prop_assert!((&shares + &quantum) * &price > amount);
    }

    /// Proceeds are an exact product, no rounding.
    #[test]
    fn proceeds_are_exact(shares in arb_shares(), price in arb_price()) {
        let proceeds = valuation::proceeds_from_sale(&shares, &price);
        prop_assert_eq!(proceeds, &shares * &price);
    }

    /// Selling the entire position removes the entire cost basis.
    #[test]
    fn full_sale_removes_full_basis(basis in arb_amount(), shares in arb_shares()) {
        let removed = valuation::cost_basis_to_remove(&basis, &shares, &shares);
        prop_assert!(approx_eq(&removed, &basis));
    }

    /// Removing the basis for a partial sale and then adding it back
    /// restores the original basis: removal is a consistent split.
    #[test]
    fn partial_sale_basis_round_trips(
        basis in arb_amount(),
        shares in arb_shares(),
        fraction in 1u32..=100,
    ) {
        let to_sell = &shares * BigDecimal::from(fraction) / BigDecimal::from(100);
        let removed = valuation::cost_basis_to_remove(&basis, &shares, &to_sell);
        let after_sale = &basis - &removed;

        prop_assert!(removed >= BigDecimal::zero());
        prop_assert!(removed <= &basis + tolerance());
        prop_assert!(approx_eq(&(&after_sale + &removed), &basis));
    }

    /// Dollars -> shares -> dollars at one price round-trips to within one
    /// share-quantum's worth of value.
    #[test]
    fn shares_dollars_round_trip(shares in arb_shares(), price in arb_price()) {
        let proceeds = valuation::proceeds_from_sale(&shares, &price);
        let rebought = valuation::shares_from_amount(&proceeds, &price);
        let quantum = BigDecimal::from_str("0.000001").unwrap();
        prop_assert!((&shares - &rebought).abs() <= quantum);
    }

    /// Eligibility is always a multiple of the unit and never exceeds the
    /// remaining (gains minus prior cash-outs).
    #[test]
    fn eligibility_lands_on_unit_boundary(
        gains in arb_amount(),
        previous in arb_amount(),
    ) {
        let unit = BigDecimal::from(5);
        let eligible = valuation::eligible_cashout(&gains, &previous, &unit);

        prop_assert!(eligible >= BigDecimal::zero());

        // Multiple of the unit: dividing by 5 yields an integer.
        let quotient = &eligible / &unit;
        prop_assert_eq!(quotient.clone().with_scale(0), quotient);

        let remaining = if gains > previous {
            &gains - &previous
        } else {
            BigDecimal::zero()
        };
        prop_assert!(eligible <= remaining);
    }

    /// Dust classification agrees with the threshold comparison.
    #[test]
    fn dust_is_threshold_comparison(micro in 0u64..=10u64) {
        let threshold = BigDecimal::from_str("0.000001").unwrap();
        let shares = BigDecimal::from(micro) / BigDecimal::from(1_000_000);
        prop_assert_eq!(valuation::is_dust(&shares, &threshold), micro <= 1);
    }
}
