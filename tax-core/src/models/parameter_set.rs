use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{AgeIndexedTable, BracketTable, FilingStatus, IrmaaSchedule, PerStatus};

/// Configuration errors found while validating a [`ParameterSet`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParameterSetError {
    #[error("{field} must be between 0 and 1, got {value}")]
    InvalidRate { field: String, value: Decimal },

    #[error("{field} must not be negative, got {value}")]
    NegativeAmount { field: String, value: Decimal },

    #[error("social security wage base must be positive, got {0}")]
    InvalidWageBase(Decimal),

    #[error("full retirement age {0} has no claiming factor")]
    MissingFullRetirementFactor(u32),

    #[error("RMD start age schedule must be sorted by birth year; {0} is out of order")]
    UnsortedStartAgeSchedule(i32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeniorDeductionParameters {
    /// Deduction per person aged 65 or older.
    pub amount: Decimal,
    pub phaseout_threshold: PerStatus<Decimal>,
    /// Reduction per dollar of MAGI above the threshold.
    pub phaseout_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StandardDeductionParameters {
    pub base: PerStatus<Decimal>,
    /// Additional amount per age/blind condition for Single and Head of Household.
    pub additional_unmarried: Decimal,
    /// Additional amount per age/blind condition for the married statuses.
    pub additional_married: Decimal,
    pub senior: SeniorDeductionParameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FicaParameters {
    pub social_security_rate: Decimal,
    pub social_security_wage_base: Decimal,
    pub medicare_rate: Decimal,
    pub additional_medicare_rate: Decimal,
    pub additional_medicare_threshold: PerStatus<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NiitParameters {
    pub rate: Decimal,
    pub threshold: PerStatus<Decimal>,
}

/// Later RMD start age for owners born in or after `born_on_or_after`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RmdStartAge {
    pub born_on_or_after: i32,
    pub start_age: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RmdParameters {
    pub start_age: u32,
    #[serde(default)]
    pub start_age_by_birth_year: Vec<RmdStartAge>,
    /// Uniform Lifetime Table divisors.
    pub divisors: AgeIndexedTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SocialSecurityParameters {
    pub full_retirement_age: u32,
    /// Benefit multiplier by whole claiming age, 1.0 at full retirement age.
    pub claiming_factors: AgeIndexedTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IrmaaParameters {
    /// Standard monthly Part B premium.
    pub standard_premium: Decimal,
    pub tiers: PerStatus<IrmaaSchedule>,
}

/// Every numeric parameter for one tax year.
///
/// A parameter set is loaded once per year and then only read. Bracket, age
/// and IRMAA tables check their own structure when they are built; the
/// remaining scalar limits are checked by [`ParameterSet::validate`], which
/// loaders call before handing the set to the engines. The set holds no
/// interior mutability and may be shared freely across threads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterSet {
    pub tax_year: i32,
    pub federal_brackets: PerStatus<BracketTable>,
    pub capital_gains_brackets: PerStatus<BracketTable>,
    pub standard_deduction: StandardDeductionParameters,
    pub fica: FicaParameters,
    pub niit: NiitParameters,
    pub rmd: RmdParameters,
    pub social_security: SocialSecurityParameters,
    pub irmaa: IrmaaParameters,
}

fn check_rate(
    field: &str,
    value: Decimal,
) -> Result<(), ParameterSetError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(ParameterSetError::InvalidRate {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

fn check_amount(
    field: &str,
    value: Decimal,
) -> Result<(), ParameterSetError> {
    if value < Decimal::ZERO {
        return Err(ParameterSetError::NegativeAmount {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

fn check_per_status(
    field: &str,
    values: &PerStatus<Decimal>,
) -> Result<(), ParameterSetError> {
    for (status, value) in values.iter() {
        check_amount(&format!("{field}.{}", status.name()), *value)?;
    }
    Ok(())
}

impl ParameterSet {
    /// Checks the scalar limits that the table types cannot check themselves.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterSetError`] if:
    /// - any rate is outside `[0, 1]`
    /// - any amount or threshold is negative
    /// - the social security wage base is not positive
    /// - the claiming-factor table has no entry for the full retirement age
    /// - the RMD start age schedule is not sorted by birth year
    pub fn validate(&self) -> Result<(), ParameterSetError> {
        let deduction = &self.standard_deduction;
        check_per_status("standard_deduction.base", &deduction.base)?;
        check_amount(
            "standard_deduction.additional_unmarried",
            deduction.additional_unmarried,
        )?;
        check_amount(
            "standard_deduction.additional_married",
            deduction.additional_married,
        )?;
        check_amount("standard_deduction.senior.amount", deduction.senior.amount)?;
        check_per_status(
            "standard_deduction.senior.phaseout_threshold",
            &deduction.senior.phaseout_threshold,
        )?;
        check_rate(
            "standard_deduction.senior.phaseout_rate",
            deduction.senior.phaseout_rate,
        )?;

        let fica = &self.fica;
        check_rate("fica.social_security_rate", fica.social_security_rate)?;
        check_rate("fica.medicare_rate", fica.medicare_rate)?;
        check_rate("fica.additional_medicare_rate", fica.additional_medicare_rate)?;
        check_per_status(
            "fica.additional_medicare_threshold",
            &fica.additional_medicare_threshold,
        )?;
        if fica.social_security_wage_base <= Decimal::ZERO {
            return Err(ParameterSetError::InvalidWageBase(
                fica.social_security_wage_base,
            ));
        }

        check_rate("niit.rate", self.niit.rate)?;
        check_per_status("niit.threshold", &self.niit.threshold)?;

        let schedule = &self.rmd.start_age_by_birth_year;
        if let Some(pair) = schedule
            .windows(2)
            .find(|pair| pair[1].born_on_or_after <= pair[0].born_on_or_after)
        {
            return Err(ParameterSetError::UnsortedStartAgeSchedule(
                pair[1].born_on_or_after,
            ));
        }

        let fra = self.social_security.full_retirement_age;
        if self.social_security.claiming_factors.get(fra).is_none() {
            return Err(ParameterSetError::MissingFullRetirementFactor(fra));
        }

        check_amount("irmaa.standard_premium", self.irmaa.standard_premium)?;

        Ok(())
    }

    pub fn federal_table(
        &self,
        status: FilingStatus,
    ) -> &BracketTable {
        self.federal_brackets.get(status)
    }

    pub fn capital_gains_table(
        &self,
        status: FilingStatus,
    ) -> &BracketTable {
        self.capital_gains_brackets.get(status)
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::fixtures::parameters_2026;
    use super::*;

    #[test]
    fn validate_accepts_valid_parameters() {
        let params = parameters_2026();

        assert_eq!(params.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_rate_above_one() {
        let mut params = parameters_2026();
        params.niit.rate = dec!(3.8);

        assert_eq!(
            params.validate(),
            Err(ParameterSetError::InvalidRate {
                field: "niit.rate".to_string(),
                value: dec!(3.8),
            })
        );
    }

    #[test]
    fn validate_rejects_negative_threshold_and_names_status() {
        let mut params = parameters_2026();
        params.niit.threshold.head_of_household = dec!(-1);

        assert_eq!(
            params.validate(),
            Err(ParameterSetError::NegativeAmount {
                field: "niit.threshold.head_of_household".to_string(),
                value: dec!(-1),
            })
        );
    }

    #[test]
    fn validate_rejects_zero_wage_base() {
        let mut params = parameters_2026();
        params.fica.social_security_wage_base = dec!(0);

        assert_eq!(
            params.validate(),
            Err(ParameterSetError::InvalidWageBase(dec!(0)))
        );
    }

    #[test]
    fn validate_rejects_full_retirement_age_without_factor() {
        let mut params = parameters_2026();
        params.social_security.full_retirement_age = 71;

        assert_eq!(
            params.validate(),
            Err(ParameterSetError::MissingFullRetirementFactor(71))
        );
    }

    #[test]
    fn validate_rejects_unsorted_start_age_schedule() {
        let mut params = parameters_2026();
        params.rmd.start_age_by_birth_year = vec![
            RmdStartAge {
                born_on_or_after: 1960,
                start_age: 75,
            },
            RmdStartAge {
                born_on_or_after: 1951,
                start_age: 73,
            },
        ];

        assert_eq!(
            params.validate(),
            Err(ParameterSetError::UnsortedStartAgeSchedule(1951))
        );
    }

    #[test]
    fn parameter_set_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<ParameterSet>();
    }

    #[test]
    fn tables_are_keyed_by_status() {
        let params = parameters_2026();

        assert_eq!(
            params.federal_table(FilingStatus::MarriedFilingJointly).brackets()[0].max_income,
            Some(dec!(24800))
        );
        assert_eq!(
            params.capital_gains_table(FilingStatus::HeadOfHousehold).brackets()[0].max_income,
            Some(dec!(66200))
        );
    }
}
