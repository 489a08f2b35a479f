//! Common utility functions for tax calculations.
//!
//! This module provides shared functionality used across the calculation
//! engines: rounding to cents and flooring inputs at zero.

use rust_decimal::Decimal;
use tracing::warn;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns `value`, or zero if it is negative.
///
/// A negative input is logged at WARN under `field` before being replaced.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::non_negative;
///
/// assert_eq!(non_negative("wages", dec!(-50.00)), dec!(0));
/// assert_eq!(non_negative("wages", dec!(50.00)), dec!(50.00));
/// ```
pub fn non_negative(
    field: &'static str,
    value: Decimal,
) -> Decimal {
    if value < Decimal::ZERO {
        warn!(field, value = %value, "Negative amount treated as zero");
        return Decimal::ZERO;
    }
    value
}
