//! Net Investment Income Tax.

use rust_decimal::Decimal;

use crate::calculations::common::{non_negative, round_half_up};
use crate::models::{FilingStatus, NiitParameters};

/// Computes the Net Investment Income Tax.
///
/// The taxed base is the smaller of net investment income and the amount by
/// which MAGI exceeds the filing status threshold. Negative inputs are
/// treated as zero.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::{FilingStatus, NiitParameters, PerStatus};
/// use tax_core::calculations::niit::niit;
///
/// let params = NiitParameters {
///     rate: dec!(0.038),
///     threshold: PerStatus::from_fn(|_| dec!(200000)),
/// };
///
/// // min(50,000, 60,000) × 3.8%
/// assert_eq!(niit(dec!(260000), dec!(50000), FilingStatus::Single, &params), dec!(1900.00));
/// ```
pub fn niit(
    magi: Decimal,
    net_investment_income: Decimal,
    filing_status: FilingStatus,
    params: &NiitParameters,
) -> Decimal {
    let magi = non_negative("magi", magi);
    let net_investment_income = non_negative("net_investment_income", net_investment_income);
    let threshold = *params.threshold.get(filing_status);

    let excess_magi = (magi - threshold).max(Decimal::ZERO);
    let base = net_investment_income.min(excess_magi);

    round_half_up(base * params.rate)
}
