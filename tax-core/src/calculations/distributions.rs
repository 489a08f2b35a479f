//! Retirement distribution calculations.
//!
//! Required minimum distributions divide the prior year-end balance by the
//! Uniform Lifetime Table divisor for the owner's age. Social Security
//! benefits scale the full-retirement-age benefit by a factor for the age at
//! which benefits are claimed.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

use crate::calculations::CalculationError;
use crate::calculations::common::{non_negative, round_half_up};
use crate::models::{RmdParameters, SocialSecurityParameters};

fn whole_age(age: i32) -> Result<u32, CalculationError> {
    u32::try_from(age).map_err(|_| CalculationError::NegativeAge(age))
}

/// Computes the required minimum distribution for `age`.
///
/// Returns zero before the configured start age. Ages past the end of the
/// divisor table use the last divisor; ages with no entry use the table's
/// fallback divisor, which is never zero.
///
/// # Errors
///
/// Returns [`CalculationError::NegativeAge`] or
/// [`CalculationError::NegativeBalance`] for negative inputs.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::{AgeIndexedTable, OutOfRangePolicy, RmdParameters};
/// use tax_core::calculations::distributions::rmd;
///
/// let params = RmdParameters {
///     start_age: 73,
///     start_age_by_birth_year: Vec::new(),
///     divisors: AgeIndexedTable::new(
///         [(72, dec!(27.4)), (80, dec!(20.2)), (120, dec!(2.0))],
///         dec!(2.0),
///         OutOfRangePolicy::Fallback,
///         OutOfRangePolicy::Clamp,
///     )
///     .unwrap(),
/// };
///
/// assert_eq!(rmd(72, dec!(100000), &params).unwrap(), dec!(0));
/// assert_eq!(rmd(80, dec!(202000), &params).unwrap(), dec!(10000.00));
/// ```
pub fn rmd(
    age: i32,
    balance: Decimal,
    params: &RmdParameters,
) -> Result<Decimal, CalculationError> {
    let age = whole_age(age)?;
    if balance < Decimal::ZERO {
        return Err(CalculationError::NegativeBalance(balance));
    }

    if age < params.start_age {
        return Ok(Decimal::ZERO);
    }

    let divisor = params.divisors.lookup(age);
    let distribution = round_half_up(balance / divisor);

    debug!(age, divisor = %divisor, distribution = %distribution, "RMD computed");

    Ok(distribution)
}

/// Returns the age at which RMDs begin for an owner born in `birth_year`.
///
/// The latest schedule entry whose `born_on_or_after` is not after
/// `birth_year` wins; owners born before every entry use the base start age.
pub fn rmd_start_age(
    birth_year: i32,
    params: &RmdParameters,
) -> u32 {
    params
        .start_age_by_birth_year
        .iter()
        .rev()
        .find(|entry| entry.born_on_or_after <= birth_year)
        .map_or(params.start_age, |entry| entry.start_age)
}

/// Scales a full-retirement-age benefit by the claiming-age factor.
///
/// Fractional claiming ages round to the nearest whole year, with halves
/// rounding up. Ages without a factor use the table fallback (1.0 in the
/// bundled data). A negative benefit is treated as zero, and a product too
/// large for `Decimal` saturates at `Decimal::MAX`.
///
/// # Errors
///
/// Returns [`CalculationError::NegativeClaimingAge`] if `claiming_age` is
/// negative.
pub fn adjusted_ss_benefit(
    fra_benefit: Decimal,
    claiming_age: Decimal,
    params: &SocialSecurityParameters,
) -> Result<Decimal, CalculationError> {
    if claiming_age < Decimal::ZERO {
        return Err(CalculationError::NegativeClaimingAge(claiming_age));
    }

    let age = claiming_age
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(u32::MAX);
    let factor = params.claiming_factors.lookup(age);
    let benefit = non_negative("fra_benefit", fra_benefit);

    let adjusted = benefit.checked_mul(factor).unwrap_or_else(|| {
        warn!(
            fra_benefit = %benefit,
            factor = %factor,
            "Adjusted benefit overflowed; saturating"
        );
        Decimal::MAX
    });

    Ok(round_half_up(adjusted))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tracing_subscriber::fmt::format::FmtSpan;

    use super::*;
    use crate::models::RmdStartAge;
    use crate::models::fixtures::parameters_2026;

    fn rmd_params() -> RmdParameters {
        parameters_2026().rmd
    }

    fn ss_params() -> SocialSecurityParameters {
        parameters_2026().social_security
    }

    /// Initializes tracing subscriber for tests that exercise fallback warnings.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_span_events(FmtSpan::NONE)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    // =========================================================================
    // rmd tests
    // =========================================================================

    #[test]
    fn rmd_before_start_age_is_zero() {
        let result = rmd(72, dec!(100000), &rmd_params());

        assert_eq!(result, Ok(dec!(0)));
    }

    #[test]
    fn rmd_at_start_age() {
        let result = rmd(73, dec!(265000), &rmd_params());

        assert_eq!(result, Ok(dec!(10000.00)));
    }

    #[test]
    fn rmd_uses_age_divisor() {
        let result = rmd(80, dec!(202000), &rmd_params());

        assert_eq!(result, Ok(dec!(10000.00)));
    }

    #[test]
    fn rmd_rounds_to_cents() {
        let result = rmd(74, dec!(100000), &rmd_params());

        // 100,000 / 25.5 = 3,921.5686...
        assert_eq!(result, Ok(dec!(3921.57)));
    }

    #[test]
    fn rmd_past_table_end_clamps_to_last_divisor() {
        let result = rmd(125, dec!(10000), &rmd_params());

        assert_eq!(result, Ok(dec!(5000.00)));
    }

    #[test]
    fn rmd_missing_divisor_uses_fallback() {
        let _guard = init_test_tracing();

        let result = rmd(90, dec!(64000), &rmd_params());

        assert_eq!(result, Ok(dec!(10000.00)));
    }

    #[test]
    fn rmd_zero_balance_is_zero() {
        let result = rmd(80, dec!(0), &rmd_params());

        assert_eq!(result, Ok(dec!(0)));
    }

    #[test]
    fn rmd_rejects_negative_age() {
        let result = rmd(-1, dec!(100000), &rmd_params());

        assert_eq!(result, Err(CalculationError::NegativeAge(-1)));
    }

    #[test]
    fn rmd_rejects_negative_balance() {
        let result = rmd(80, dec!(-100), &rmd_params());

        assert_eq!(result, Err(CalculationError::NegativeBalance(dec!(-100))));
    }

    // =========================================================================
    // rmd_start_age tests
    // =========================================================================

    #[test]
    fn rmd_start_age_before_schedule_uses_base_age() {
        assert_eq!(rmd_start_age(1955, &rmd_params()), 73);
    }

    #[test]
    fn rmd_start_age_on_schedule_boundary() {
        assert_eq!(rmd_start_age(1960, &rmd_params()), 75);
    }

    #[test]
    fn rmd_start_age_after_schedule_boundary() {
        assert_eq!(rmd_start_age(1972, &rmd_params()), 75);
    }

    #[test]
    fn rmd_start_age_picks_latest_matching_entry() {
        let params = RmdParameters {
            start_age_by_birth_year: vec![
                RmdStartAge {
                    born_on_or_after: 1951,
                    start_age: 73,
                },
                RmdStartAge {
                    born_on_or_after: 1960,
                    start_age: 75,
                },
            ],
            start_age: 72,
            ..rmd_params()
        };

        assert_eq!(rmd_start_age(1950, &params), 72);
        assert_eq!(rmd_start_age(1955, &params), 73);
        assert_eq!(rmd_start_age(1965, &params), 75);
    }

    // =========================================================================
    // adjusted_ss_benefit tests
    // =========================================================================

    #[test]
    fn ss_benefit_at_full_retirement_age_is_unchanged() {
        let result = adjusted_ss_benefit(dec!(2000), dec!(67), &ss_params());

        assert_eq!(result, Ok(dec!(2000.00)));
    }

    #[test]
    fn ss_benefit_reduced_at_62() {
        let result = adjusted_ss_benefit(dec!(2000), dec!(62), &ss_params());

        assert_eq!(result, Ok(dec!(1400.00)));
    }

    #[test]
    fn ss_benefit_increased_at_70() {
        let result = adjusted_ss_benefit(dec!(2000), dec!(70), &ss_params());

        assert_eq!(result, Ok(dec!(2480.00)));
    }

    #[test]
    fn ss_benefit_rounds_factor_to_cents() {
        let result = adjusted_ss_benefit(dec!(1999), dec!(65), &ss_params());

        // 1,999 × 0.867 = 1,733.133
        assert_eq!(result, Ok(dec!(1733.13)));
    }

    #[test]
    fn ss_benefit_fractional_age_rounds_to_nearest_year() {
        let params = ss_params();

        let down = adjusted_ss_benefit(dec!(2000), dec!(62.4), &params);
        let half = adjusted_ss_benefit(dec!(2000), dec!(62.5), &params);

        assert_eq!(down, Ok(dec!(1400.00)));
        assert_eq!(half, Ok(dec!(1500.00)));
    }

    #[test]
    fn ss_benefit_outside_table_uses_unit_factor() {
        let _guard = init_test_tracing();
        let params = ss_params();

        assert_eq!(adjusted_ss_benefit(dec!(2000), dec!(60), &params), Ok(dec!(2000.00)));
        assert_eq!(adjusted_ss_benefit(dec!(2000), dec!(75), &params), Ok(dec!(2000.00)));
    }

    #[test]
    fn ss_benefit_negative_benefit_is_zero() {
        let result = adjusted_ss_benefit(dec!(-50), dec!(67), &ss_params());

        assert_eq!(result, Ok(dec!(0)));
    }

    #[test]
    fn ss_benefit_saturates_instead_of_overflowing() {
        let _guard = init_test_tracing();

        let result = adjusted_ss_benefit(Decimal::MAX, dec!(70), &ss_params());

        assert_eq!(result, Ok(Decimal::MAX));
    }

    #[test]
    fn ss_benefit_rejects_negative_claiming_age() {
        let result = adjusted_ss_benefit(dec!(2000), dec!(-1), &ss_params());

        assert_eq!(result, Err(CalculationError::NegativeClaimingAge(dec!(-1))));
    }
}
