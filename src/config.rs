use bigdecimal::BigDecimal;
use std::str::FromStr;

/// Trading policy knobs. Defaults match observed production behavior; all
/// three can be overridden from the environment.
#[derive(Debug, Clone)]
pub struct TradingPolicy {
    /// Smallest dollar amount accepted for a buy order.
    pub min_buy_amount: BigDecimal,
    /// Cash-out requests must be a positive multiple of this.
    pub cashout_unit: BigDecimal,
    /// Holdings at or below this share count are deleted.
    pub dust_threshold: BigDecimal,
}

impl TradingPolicy {
    pub fn from_env() -> Self {
        Self {
            min_buy_amount: env_decimal("MIN_BUY_AMOUNT", "5"),
            cashout_unit: env_decimal("CASHOUT_UNIT", "5"),
            dust_threshold: env_decimal("DUST_THRESHOLD", "0.000001"),
        }
    }
}

impl Default for TradingPolicy {
    fn default() -> Self {
        Self {
            min_buy_amount: BigDecimal::from(5),
            cashout_unit: BigDecimal::from(5),
            dust_threshold: BigDecimal::from_str("0.000001").unwrap(),
        }
    }
}

fn env_decimal(var: &str, default: &str) -> BigDecimal {
    std::env::var(var)
        .ok()
        .and_then(|v| BigDecimal::from_str(&v).ok())
        .unwrap_or_else(|| BigDecimal::from_str(default).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy() {
        let policy = TradingPolicy::default();
        assert_eq!(policy.min_buy_amount, BigDecimal::from(5));
        assert_eq!(policy.cashout_unit, BigDecimal::from(5));
        assert_eq!(
            policy.dust_threshold,
            BigDecimal::from_str("0.000001").unwrap()
        );
    }
}
