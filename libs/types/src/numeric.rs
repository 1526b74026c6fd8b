//! Monetary rounding
//!
//! Every price, VAT amount and total is rounded to two decimal places at the
//! point it is computed, not only at aggregation. Midpoints round away from zero.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept for monetary values
pub const MONEY_DP: u32 = 2;

/// Round a monetary value to two decimal places, half away from zero
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Sum values that are already rounded and round the result
pub fn sum_money<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    round_money(values.into_iter().sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_money(dec("2.675")), dec("2.68"));
        assert_eq!(round_money(dec("2.665")), dec("2.67"));
        assert_eq!(round_money(dec("-1.005")), dec("-1.01"));
        assert_eq!(round_money(dec("3.14159")), dec("3.14"));
    }

    #[test]
    fn test_sum_of_rounded_values() {
        let total = sum_money(vec![dec("0.33"), dec("0.33"), dec("0.33")]);
        assert_eq!(total, dec("0.99"));
    }

    proptest! {
        #[test]
        fn prop_round_is_idempotent(cents in -10_000_000i64..10_000_000, extra in 0u32..1000) {
            let value = Decimal::new(cents * 1000 + extra as i64, 5);
            let once = round_money(value);
            prop_assert_eq!(round_money(once), once);
            prop_assert!(once.scale() <= MONEY_DP);
        }
    }
}
