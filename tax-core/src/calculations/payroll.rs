//! Payroll (FICA) tax calculations.
//!
//! [`fica_withholding`] covers a single payment: social security up to the
//! annual wage base, plus uncapped Medicare. The Additional Medicare Tax is an
//! annual computation on total Medicare wages and lives in
//! [`additional_medicare_tax`].
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::{FicaParameters, PerStatus};
//! use tax_core::calculations::payroll::fica_withholding;
//!
//! let params = FicaParameters {
//!     social_security_rate: dec!(0.062),
//!     social_security_wage_base: dec!(184500),
//!     medicare_rate: dec!(0.0145),
//!     additional_medicare_rate: dec!(0.009),
//!     additional_medicare_threshold: PerStatus::from_fn(|_| dec!(200000)),
//! };
//!
//! // Only 4,500 of this payment is still under the wage base.
//! let result = fica_withholding(dec!(10000), dec!(180000), &params);
//!
//! assert_eq!(result.social_security_wages, dec!(4500));
//! assert_eq!(result.social_security, dec!(279.00));
//! assert_eq!(result.medicare, dec!(145.00));
//! assert_eq!(result.total, dec!(424.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{non_negative, round_half_up};
use crate::models::{FicaParameters, FilingStatus};

/// Employee FICA withholding for one payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FicaWithholding {
    /// Part of the payment still below the social security wage base.
    pub social_security_wages: Decimal,

    /// Social security tax on `social_security_wages`.
    pub social_security: Decimal,

    /// Medicare tax on the whole payment.
    pub medicare: Decimal,

    /// `social_security + medicare`.
    pub total: Decimal,
}

/// Computes FICA withholding on `wages` given the wages already paid this
/// year before this payment.
///
/// Social security applies only to the part of the payment that keeps
/// year-to-date wages at or under the wage base; once `ytd_wages` reaches the
/// base the social security component is zero. Negative inputs are treated
/// as zero.
pub fn fica_withholding(
    wages: Decimal,
    ytd_wages: Decimal,
    params: &FicaParameters,
) -> FicaWithholding {
    let wages = non_negative("wages", wages);
    let ytd_wages = non_negative("ytd_wages", ytd_wages);

    let remaining_base = (params.social_security_wage_base - ytd_wages).max(Decimal::ZERO);
    let social_security_wages = wages.min(remaining_base);

    let social_security = round_half_up(social_security_wages * params.social_security_rate);
    let medicare = round_half_up(wages * params.medicare_rate);

    FicaWithholding {
        social_security_wages,
        social_security,
        medicare,
        total: social_security + medicare,
    }
}

/// Computes the Additional Medicare Tax on a year's total Medicare wages.
///
/// The surtax applies only to wages above the filing status threshold.
pub fn additional_medicare_tax(
    annual_medicare_wages: Decimal,
    filing_status: FilingStatus,
    params: &FicaParameters,
) -> Decimal {
    let wages = non_negative("annual_medicare_wages", annual_medicare_wages);
    let threshold = *params.additional_medicare_threshold.get(filing_status);

    let excess = (wages - threshold).max(Decimal::ZERO);
    round_half_up(excess * params.additional_medicare_rate)
}
