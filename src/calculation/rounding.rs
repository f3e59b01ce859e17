//! Currency rounding.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds an amount to the nearest whole currency unit, halves away from zero.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::round_currency;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_currency(Decimal::new(1005, 1)), Decimal::from(101));
/// assert_eq!(round_currency(Decimal::new(-1005, 1)), Decimal::from(-101));
/// assert_eq!(round_currency(Decimal::new(1004, 1)), Decimal::from(100));
/// ```
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_whole_amount_unchanged() {
        assert_eq!(round_currency(dec("1825000")), dec("1825000"));
        assert_eq!(round_currency(dec("1825000.00")), dec("1825000"));
    }

    #[test]
    fn test_midpoint_rounds_away_from_zero() {
        assert_eq!(round_currency(dec("0.5")), dec("1"));
        assert_eq!(round_currency(dec("2.5")), dec("3"));
        assert_eq!(round_currency(dec("-2.5")), dec("-3"));
    }

    #[test]
    fn test_result_has_no_fraction() {
        let rounded = round_currency(dec("100423.4999"));
        assert_eq!(rounded, dec("100423"));
        assert_eq!(rounded.scale(), 0);
    }
}
