//! Pure money/share arithmetic for the trading ledger.
//!
//! Everything here operates on `BigDecimal` so values map 1:1 onto the
//! NUMERIC columns they are persisted to. Rounding is always truncation
//! toward zero (`with_scale` to a smaller scale divides the underlying
//! integer), never up: a buy can never be granted more share value than the
//! dollar amount paid for.

use bigdecimal::{BigDecimal, Zero};

/// Fractional shares are stored with 6 decimal places.
pub const SHARE_SCALE: i64 = 6;

/// Shares purchasable for `amount` at `price_per_share`, truncated to
/// [`SHARE_SCALE`] decimals. Returns zero for a non-positive price.
pub fn shares_from_amount(amount: &BigDecimal, price_per_share: &BigDecimal) -> BigDecimal {
    if price_per_share <= &BigDecimal::zero() {
        return BigDecimal::zero();
    }
    (amount / price_per_share).with_scale(SHARE_SCALE)
}

/// Sale proceeds, full precision. Persisted values keep the exact product.
pub fn proceeds_from_sale(shares: &BigDecimal, price_per_share: &BigDecimal) -> BigDecimal {
    shares * price_per_share
}

/// Proportional cost basis attributable to `shares_to_sell` out of a holding
/// of `total_shares` carrying `total_cost_basis`.
pub fn cost_basis_to_remove(
    total_cost_basis: &BigDecimal,
    total_shares: &BigDecimal,
    shares_to_sell: &BigDecimal,
) -> BigDecimal {
    if total_shares <= &BigDecimal::zero() {
        return BigDecimal::zero();
    }
    (total_cost_basis / total_shares) * shares_to_sell
}

/// Current market value minus cost basis. Negative when underwater.
pub fn unrealized_gain(current_value: &BigDecimal, cost_basis: &BigDecimal) -> BigDecimal {
    current_value - cost_basis
}

/// Gains-only cash-out eligibility: previously approved cash-outs are
/// subtracted first, then the remainder is floored to a multiple of `unit`.
pub fn eligible_cashout(
    total_gains: &BigDecimal,
    previous_cashouts: &BigDecimal,
    unit: &BigDecimal,
) -> BigDecimal {
    if unit <= &BigDecimal::zero() {
        return BigDecimal::zero();
    }
    let remaining = total_gains - previous_cashouts;
    if remaining <= BigDecimal::zero() {
        return BigDecimal::zero();
    }
    (remaining / unit).with_scale(0) * unit
}

/// A residual position at or below `threshold` shares is dust and the
/// holding row is deleted rather than kept.
pub fn is_dust(shares: &BigDecimal, threshold: &BigDecimal) -> bool {
    shares <= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn shares_round_down_to_six_decimals() {
        // $50 at $200/share -> exactly 0.25
        assert_eq!(
            shares_from_amount(&dec("50"), &dec("200")),
            dec("0.250000")
        );
        // $100 at $3/share -> 33.333333... truncated, not rounded up
        assert_eq!(
            shares_from_amount(&dec("100"), &dec("3")),
            dec("33.333333")
        );
    }

    #[test]
    fn shares_zero_for_non_positive_price() {
        assert_eq!(shares_from_amount(&dec("100"), &dec("0")), dec("0"));
        assert_eq!(shares_from_amount(&dec("100"), &dec("-1")), dec("0"));
    }

    #[test]
    fn shares_never_worth_more_than_amount_paid() {
        let cases = [
            ("5", "123.45"),
            ("10", "0.03"),
            ("999.99", "177.53"),
            ("0.01", "3000"),
        ];
        for (amount, price) in cases {
            let amount = dec(amount);
            let price = dec(price);
            let shares = shares_from_amount(&amount, &price);
            assert!(
                &shares * &price <= amount,
                "{} shares at {} exceeds paid amount",
                shares,
                price
            );
        }
    }

    #[test]
    fn proceeds_are_exact() {
        assert_eq!(proceeds_from_sale(&dec("0.25"), &dec("240")), dec("60.00"));
        assert_eq!(
            proceeds_from_sale(&dec("1.333333"), &dec("3")),
            dec("3.999999")
        );
    }

    #[test]
    fn cost_basis_removal_is_proportional() {
        // Half the shares carry half the basis.
        assert_eq!(
            cost_basis_to_remove(&dec("100"), &dec("2"), &dec("1")),
            dec("50")
        );
        // Selling the full position removes the full basis.
        assert_eq!(
            cost_basis_to_remove(&dec("50"), &dec("0.25"), &dec("0.25")),
            dec("50.0000")
        );
    }

    #[test]
    fn cost_basis_removal_zero_for_empty_position() {
        assert_eq!(
            cost_basis_to_remove(&dec("100"), &dec("0"), &dec("1")),
            dec("0")
        );
    }

    #[test]
    fn unrealized_gain_may_be_negative() {
        assert_eq!(unrealized_gain(&dec("60"), &dec("50")), dec("10"));
        assert_eq!(unrealized_gain(&dec("40"), &dec("50")), dec("-10"));
    }

    #[test]
    fn eligible_cashout_floors_to_unit() {
        let unit = dec("5");
        // $27 of gains, nothing cashed out yet -> $25
        assert_eq!(eligible_cashout(&dec("27"), &dec("0"), &unit), dec("25"));
        // $27 of gains, $25 already approved -> $2 remaining -> $0
        assert_eq!(eligible_cashout(&dec("27"), &dec("25"), &unit), dec("0"));
        // Losses never become eligible
        assert_eq!(eligible_cashout(&dec("-12"), &dec("0"), &unit), dec("0"));
        // Prior cash-outs above gains clamp to zero
        assert_eq!(eligible_cashout(&dec("10"), &dec("40"), &unit), dec("0"));
    }

    #[test]
    fn dust_threshold_is_inclusive() {
        let threshold = dec("0.000001");
        assert!(is_dust(&dec("0.000001"), &threshold));
        assert!(is_dust(&dec("0"), &threshold));
        assert!(!is_dust(&dec("0.000002"), &threshold));
    }
}
