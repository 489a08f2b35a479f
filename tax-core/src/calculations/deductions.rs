//! Standard deduction calculations.
//!
//! [`standard_deduction`] is the base amount for the filing status plus one
//! additional amount per person aged 65 or older and one more if the filer is
//! blind. [`senior_deduction`] is the separate deduction for people aged 65 or
//! older, which phases down linearly once MAGI passes a status threshold.

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::CalculationError;
use crate::calculations::common::{non_negative, round_half_up};
use crate::models::{FilingStatus, StandardDeductionParameters};

fn check_qualifying_persons(
    filing_status: FilingStatus,
    count: u8,
) -> Result<(), CalculationError> {
    let max = filing_status.max_qualifying_persons();
    if count > max {
        return Err(CalculationError::TooManyQualifyingPersons {
            status: filing_status,
            count,
            max,
        });
    }
    Ok(())
}

/// Computes the standard deduction.
///
/// Single and Head of Household filers use the unmarried additional amount;
/// the married statuses use the married amount.
///
/// # Errors
///
/// Returns [`CalculationError::TooManyQualifyingPersons`] if `num_over_65`
/// exceeds the number of people the filing status covers.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::{FilingStatus, PerStatus, SeniorDeductionParameters, StandardDeductionParameters};
/// use tax_core::calculations::deductions::standard_deduction;
///
/// let params = StandardDeductionParameters {
///     base: PerStatus {
///         single: dec!(16100),
///         married_filing_jointly: dec!(32200),
///         married_filing_separately: dec!(16100),
///         head_of_household: dec!(24150),
///     },
///     additional_unmarried: dec!(2050),
///     additional_married: dec!(1650),
///     senior: SeniorDeductionParameters {
///         amount: dec!(6000),
///         phaseout_threshold: PerStatus::from_fn(|_| dec!(75000)),
///         phaseout_rate: dec!(0.06),
///     },
/// };
///
/// let amount = standard_deduction(FilingStatus::MarriedFilingJointly, 2, false, &params).unwrap();
///
/// assert_eq!(amount, dec!(35500));
/// ```
pub fn standard_deduction(
    filing_status: FilingStatus,
    num_over_65: u8,
    is_blind: bool,
    params: &StandardDeductionParameters,
) -> Result<Decimal, CalculationError> {
    check_qualifying_persons(filing_status, num_over_65)?;

    let base = *params.base.get(filing_status);
    let additional = if filing_status.is_joint_type() {
        params.additional_married
    } else {
        params.additional_unmarried
    };

    let conditions = u32::from(num_over_65) + u32::from(is_blind);

    Ok(base + additional * Decimal::from(conditions))
}

/// Computes the senior deduction after its income phase-down.
///
/// Each qualifying person gets `amount`, reduced by `phaseout_rate` for every
/// dollar of MAGI above the filing status threshold and floored at zero. The
/// per-person amount is then multiplied by `num_over_65`, so a couple phases
/// out over the same MAGI range as a single filer.
///
/// # Errors
///
/// Returns [`CalculationError::TooManyQualifyingPersons`] if `num_over_65`
/// exceeds the number of people the filing status covers.
pub fn senior_deduction(
    filing_status: FilingStatus,
    num_over_65: u8,
    magi: Decimal,
    params: &StandardDeductionParameters,
) -> Result<Decimal, CalculationError> {
    check_qualifying_persons(filing_status, num_over_65)?;

    let senior = &params.senior;
    let threshold = *senior.phaseout_threshold.get(filing_status);

    let excess = (non_negative("magi", magi) - threshold).max(Decimal::ZERO);
    let reduction = excess * senior.phaseout_rate;
    let per_person = (senior.amount - reduction).max(Decimal::ZERO);
    let deduction = round_half_up(per_person * Decimal::from(num_over_65));

    debug!(
        filing_status = %filing_status,
        num_over_65,
        reduction = %reduction,
        per_person = %per_person,
        deduction = %deduction,
        "Senior deduction phase-down applied"
    );

    Ok(deduction)
}
