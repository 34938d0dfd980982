//! Rounding policy for earned-rest totals.
//!
//! Earned rest days accumulate as fractions and are rounded once, at the
//! end, to a whole number of days. The midpoint rule is configurable and
//! defaults to rounding half away from zero.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// How an exact `.5` is resolved.
///
/// # Example
///
/// ```
/// use roster_engine::calculation::RoundingPolicy;
///
/// // 5/2 = 2.5
/// assert_eq!(RoundingPolicy::HalfAwayFromZero.round_ratio(5, 2), 3);
/// assert_eq!(RoundingPolicy::HalfEven.round_ratio(5, 2), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    /// 0.5 -> 1, 1.5 -> 2, 2.5 -> 3.
    #[default]
    HalfAwayFromZero,
    /// Banker's rounding: 0.5 -> 0, 1.5 -> 2, 2.5 -> 2.
    HalfEven,
}

impl RoundingPolicy {
    /// Rounds the non-negative fraction `numerator / denominator` to an
    /// integer using exact integer arithmetic.
    ///
    /// A zero denominator yields zero.
    pub fn round_ratio(&self, numerator: u64, denominator: u64) -> u64 {
        if denominator == 0 {
            return 0;
        }
        let quotient = numerator / denominator;
        let twice_remainder = 2 * (numerator % denominator);

        if twice_remainder > denominator {
            quotient + 1
        } else if twice_remainder < denominator {
            quotient
        } else {
            match self {
                RoundingPolicy::HalfAwayFromZero => quotient + 1,
                RoundingPolicy::HalfEven => quotient + quotient % 2,
            }
        }
    }

    /// The equivalent `rust_decimal` strategy.
    pub fn strategy(&self) -> RoundingStrategy {
        match self {
            RoundingPolicy::HalfAwayFromZero => RoundingStrategy::MidpointAwayFromZero,
            RoundingPolicy::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }

    /// Rounds a decimal to a whole number.
    pub fn round(&self, value: Decimal) -> Decimal {
        value.round_dp_with_strategy(0, self.strategy())
    }
}
