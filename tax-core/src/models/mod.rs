mod age_table;
mod filing_status;
mod irmaa_schedule;
mod parameter_set;
mod per_status;
mod tax_bracket;

pub use age_table::{AgeFactor, AgeIndexedTable, AgeTableError, OutOfRangePolicy};
pub use filing_status::{FilingStatus, UnknownFilingStatus};
pub use irmaa_schedule::{IrmaaSchedule, IrmaaScheduleError, IrmaaTier};
pub use parameter_set::{
    FicaParameters, IrmaaParameters, NiitParameters, ParameterSet, ParameterSetError,
    RmdParameters, RmdStartAge, SeniorDeductionParameters, SocialSecurityParameters,
    StandardDeductionParameters,
};
pub use per_status::PerStatus;
pub use tax_bracket::{BracketTable, BracketTableError, TaxBracket};

#[cfg(test)]
pub(crate) use parameter_set::fixtures;
