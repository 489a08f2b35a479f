//! Progressive bracket calculations.
//!
//! These functions walk a [`BracketTable`] from the lowest bracket upward.
//! They are shared by the ordinary income tax path and, through
//! [`crate::calculations::capital_gains`], by the preferential-rate path.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::BracketTable;
//! use tax_core::calculations::brackets::{apply_progressive, marginal_rate};
//!
//! let table = BracketTable::from_thresholds(&[
//!     (dec!(0), dec!(0.10)),
//!     (dec!(12400), dec!(0.12)),
//!     (dec!(50400), dec!(0.22)),
//! ])
//! .unwrap();
//!
//! // 12,400 × 10% + 38,000 × 12% + 9,600 × 22%
//! assert_eq!(apply_progressive(dec!(60000), &table), dec!(7912.00));
//! assert_eq!(marginal_rate(dec!(60000), &table), dec!(0.22));
//! ```

use rust_decimal::Decimal;

use crate::calculations::common::{non_negative, round_half_up};
use crate::models::BracketTable;

/// Computes progressive tax on `amount`.
///
/// Each bracket taxes the part of `amount` that falls inside it at the
/// bracket's rate. A negative amount is treated as zero. The result is
/// rounded to cents once, after all brackets are summed.
pub fn apply_progressive(
    amount: Decimal,
    table: &BracketTable,
) -> Decimal {
    let mut remaining = non_negative("amount", amount);
    let mut tax = Decimal::ZERO;

    for bracket in table.brackets() {
        if remaining <= Decimal::ZERO {
            break;
        }

        let in_bracket = match bracket.width() {
            Some(width) => remaining.min(width),
            None => remaining,
        };

        tax += in_bracket * bracket.tax_rate;
        remaining -= in_bracket;
    }

    round_half_up(tax)
}

/// Returns the rate of the first bracket whose upper bound is at or above
/// `amount`.
///
/// An amount sitting exactly on a boundary takes the lower bracket's rate.
pub fn marginal_rate(
    amount: Decimal,
    table: &BracketTable,
) -> Decimal {
    table
        .brackets()
        .iter()
        .find(|bracket| bracket.max_income.is_none_or(|max| max >= amount))
        .map(|bracket| bracket.tax_rate)
        .unwrap_or_else(|| table.top_rate())
}

/// Returns how much more income fits below the top of the bracket taxed at
/// `target_rate`.
///
/// - `Some(room)` with `room >= 0` when the matching bracket is bounded
///   (zero once `amount` has passed it).
/// - `None` when the matching bracket is the unbounded top bracket.
/// - `Some(0)` when no bracket has `target_rate`.
pub fn room_in_bracket(
    amount: Decimal,
    target_rate: Decimal,
    table: &BracketTable,
) -> Option<Decimal> {
    match table
        .brackets()
        .iter()
        .find(|bracket| bracket.tax_rate == target_rate)
    {
        Some(bracket) => bracket
            .max_income
            .map(|max| (max - amount).max(Decimal::ZERO)),
        None => Some(Decimal::ZERO),
    }
}
