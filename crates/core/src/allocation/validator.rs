//! Price ceiling check for allocation pools.

use rust_decimal::Decimal;

use super::error::AllocationError;
use super::ledger::AllocationPool;

/// Outcome of a ceiling check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationCheck {
    /// The proposed amount fits.
    Within,
    /// The proposed amount would overshoot the ceiling.
    Exceeds {
        /// Ceiling the check ran against.
        ceiling: Decimal,
        /// Pool total before the proposed amount.
        allocated: Decimal,
        /// `ceiling - allocated`; negative if the pool is already over.
        remaining: Decimal,
    },
}

impl AllocationCheck {
    /// Returns true if the proposed amount was accepted.
    #[must_use]
    pub const fn is_within(&self) -> bool {
        matches!(self, Self::Within)
    }

    /// Converts a rejection into `AllocationError::BudgetExceeded`.
    pub fn into_result(self, pool: AllocationPool) -> Result<(), AllocationError> {
        match self {
            Self::Within => Ok(()),
            Self::Exceeds {
                ceiling,
                allocated,
                remaining,
            } => Err(AllocationError::BudgetExceeded {
                pool,
                ceiling,
                allocated,
                remaining,
            }),
        }
    }
}

/// Decides whether a proposed amount fits under a project's price.
pub struct AllocationValidator;

impl AllocationValidator {
    /// Checks `prior + proposed <= ceiling`.
    ///
    /// A ceiling of zero or less means the project has no price set, and
    /// every amount is accepted. A sum that overflows `Decimal` exceeds any
    /// ceiling.
    #[must_use]
    pub fn validate(ceiling: Decimal, prior: Decimal, proposed: Decimal) -> AllocationCheck {
        if ceiling <= Decimal::ZERO {
            return AllocationCheck::Within;
        }
        if prior
            .checked_add(proposed)
            .is_some_and(|total| total <= ceiling)
        {
            return AllocationCheck::Within;
        }

        AllocationCheck::Exceeds {
            ceiling,
            allocated: prior,
            remaining: ceiling - prior,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(1000), dec!(800), dec!(200))]
    #[case(dec!(1000), dec!(0), dec!(1000))]
    #[case(dec!(1000), dec!(999.99), dec!(0.01))]
    fn test_within_ceiling(
        #[case] ceiling: Decimal,
        #[case] prior: Decimal,
        #[case] proposed: Decimal,
    ) {
        assert!(AllocationValidator::validate(ceiling, prior, proposed).is_within());
    }

    #[test]
    fn test_exceeds_reports_remaining() {
        let check = AllocationValidator::validate(dec!(1000), dec!(800), dec!(300));
        assert_eq!(
            check,
            AllocationCheck::Exceeds {
                ceiling: dec!(1000),
                allocated: dec!(800),
                remaining: dec!(200),
            }
        );
    }

    #[test]
    fn test_full_pool_rejects_one_cent() {
        let check = AllocationValidator::validate(dec!(1000), dec!(1000), dec!(0.01));
        assert!(
            matches!(check, AllocationCheck::Exceeds { remaining, .. } if remaining == dec!(0))
        );
    }

    #[test]
    fn test_over_allocated_pool_reports_negative_remaining() {
        // price lowered after allocations were accepted
        let check = AllocationValidator::validate(dec!(500), dec!(800), dec!(1));
        assert!(
            matches!(check, AllocationCheck::Exceeds { remaining, .. } if remaining == dec!(-300))
        );
    }

    #[test]
    fn test_overflowing_sum_exceeds_ceiling() {
        let check = AllocationValidator::validate(Decimal::MAX, Decimal::MAX, dec!(1));
        assert!(matches!(
            check,
            AllocationCheck::Exceeds { remaining, .. } if remaining == Decimal::ZERO
        ));

        let check = AllocationValidator::validate(dec!(1000), dec!(800), Decimal::MAX);
        assert!(
            matches!(check, AllocationCheck::Exceeds { remaining, .. } if remaining == dec!(200))
        );
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-1))]
    fn test_unset_ceiling_accepts_anything(#[case] ceiling: Decimal) {
        assert!(AllocationValidator::validate(ceiling, dec!(1000000), dec!(1000000)).is_within());
    }

    #[test]
    fn test_into_result_carries_pool() {
        let err = AllocationValidator::validate(dec!(100), dec!(90), dec!(20))
            .into_result(AllocationPool::Phases)
            .unwrap_err();
        assert!(matches!(
            err,
            AllocationError::BudgetExceeded { pool: AllocationPool::Phases, remaining, .. }
                if remaining == dec!(10)
        ));
    }
}
