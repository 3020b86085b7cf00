//! Decimal-safe summation and rounding for monetary amounts.
//!
//! Totals are accumulated unrounded; [`round2`] is applied exactly once when a
//! figure leaves the core (report output, summaries).

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fractional digits in every reported amount.
pub const MONEY_SCALE: u32 = 2;

/// Fractional digits a stored amount may carry (`NUMERIC(19, 4)`).
pub const STORAGE_SCALE: u32 = 4;

/// Integer digits a stored amount may carry (`NUMERIC(19, 4)`).
pub const STORAGE_INTEGER_DIGITS: u32 = 15;

/// Rejection message for amounts outside [`fits_storage`].
pub const AMOUNT_RANGE_MESSAGE: &str =
    "amount must have at most 4 decimal places and be below 1000000000000000";

/// Returns true if `amount` is stored without rounding or overflow.
///
/// Trailing zeros do not count towards the scale, so `1.50000` fits.
#[must_use]
pub fn fits_storage(amount: Decimal) -> bool {
    let limit = Decimal::from(10i64.pow(STORAGE_INTEGER_DIGITS));
    amount.normalize().scale() <= STORAGE_SCALE && amount.abs() < limit
}

/// Sums all amounts. An empty sequence sums to zero.
pub fn sum<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().fold(Decimal::ZERO, |acc, amount| acc + amount)
}

/// Rounds half away from zero to two decimal places.
///
/// For the non-negative figures that dominate reports this is the usual
/// round-half-up currency display rule: `10.005 + 10.005 = 20.01`.
#[must_use]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// `part / whole * 100`, or zero when `whole` is not positive. Unrounded.
#[must_use]
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part / whole * Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sum_empty_is_zero() {
        assert_eq!(sum(Vec::<Decimal>::new()), Decimal::ZERO);
    }

    #[test]
    fn test_sum_keeps_full_precision() {
        assert_eq!(sum([dec!(10.005), dec!(10.005)]), dec!(20.010));
        assert_eq!(sum([dec!(0.1), dec!(0.2)]), dec!(0.3));
    }

    #[rstest]
    #[case(dec!(20.010), dec!(20.01))]
    #[case(dec!(10.005), dec!(10.01))]
    #[case(dec!(10.004), dec!(10.00))]
    #[case(dec!(-10.005), dec!(-10.01))]
    #[case(dec!(7), dec!(7))]
    fn test_round2(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(round2(input), expected);
    }

    #[test]
    fn test_sum_then_round_once() {
        // Rounding each element first would give 20.02.
        let summed = round2(sum([dec!(10.005), dec!(10.005)]));
        assert_eq!(summed, dec!(20.01));
    }

    #[rstest]
    #[case(dec!(0.0001), true)]
    #[case(dec!(1.50000), true)]
    #[case(dec!(999999999999999.9999), true)]
    #[case(dec!(0.00001), false)]
    #[case(dec!(1000000000000000), false)]
    #[case(Decimal::MAX, false)]
    fn test_fits_storage(#[case] amount: Decimal, #[case] expected: bool) {
        assert_eq!(fits_storage(amount), expected);
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(dec!(6000), dec!(10000)), dec!(60));
        assert_eq!(percent_of(dec!(5), dec!(0)), Decimal::ZERO);
        assert_eq!(percent_of(dec!(5), dec!(-1)), Decimal::ZERO);
    }
}
