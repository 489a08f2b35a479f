//! Preferential-rate tax on long-term capital gains and qualified dividends.
//!
//! Capital-gains brackets are applied to the combined income stack. Ordinary
//! taxable income fills the bottom of the stack first and is taxed elsewhere;
//! the gain fills whatever headroom is left above it, bracket by bracket.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::BracketTable;
//! use tax_core::calculations::capital_gains::tax_preferential_gain;
//!
//! let table = BracketTable::from_thresholds(&[
//!     (dec!(0), dec!(0.00)),
//!     (dec!(49450), dec!(0.15)),
//!     (dec!(545500), dec!(0.20)),
//! ])
//! .unwrap();
//!
//! // 40,000 of ordinary income leaves 9,450 of room in the 0% bracket;
//! // the other 10,550 of gain is taxed at 15%.
//! assert_eq!(tax_preferential_gain(dec!(20000), dec!(40000), &table), dec!(1582.50));
//! ```

use rust_decimal::Decimal;

use crate::calculations::common::{non_negative, round_half_up};
use crate::models::BracketTable;

/// Computes tax on `gain` stacked on top of `ordinary_taxable_income`.
///
/// Brackets lying entirely below the ordinary income contribute nothing. In
/// the bracket holding the top of the ordinary income, only the space above it
/// is available. Negative inputs are treated as zero. The result never exceeds
/// `gain × top rate`, and with no ordinary income it equals
/// [`apply_progressive`](crate::calculations::brackets::apply_progressive) on
/// the gain.
pub fn tax_preferential_gain(
    gain: Decimal,
    ordinary_taxable_income: Decimal,
    table: &BracketTable,
) -> Decimal {
    let mut remaining_gain = non_negative("gain", gain);
    let ordinary = non_negative("ordinary_taxable_income", ordinary_taxable_income);
    let mut tax = Decimal::ZERO;

    for bracket in table.brackets() {
        if remaining_gain <= Decimal::ZERO {
            break;
        }

        let headroom = match bracket.max_income {
            Some(max) if ordinary >= max => continue,
            Some(max) => max - ordinary.max(bracket.min_income),
            None => remaining_gain,
        };

        let taxed = remaining_gain.min(headroom);
        tax += taxed * bracket.tax_rate;
        remaining_gain -= taxed;
    }

    round_half_up(tax)
}
