use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::FilingStatus;

/// Invalid inputs rejected by the calculation engines.
///
/// Negative money amounts are not errors; they are treated as zero. Ages,
/// balances and head counts have no meaningful negative or oversized reading
/// and are rejected instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalculationError {
    #[error("age must not be negative, got {0}")]
    NegativeAge(i32),

    #[error("claiming age must not be negative, got {0}")]
    NegativeClaimingAge(Decimal),

    #[error("account balance must not be negative, got {0}")]
    NegativeBalance(Decimal),

    #[error("{status} returns have at most {max} qualifying persons, got {count}")]
    TooManyQualifyingPersons {
        status: FilingStatus,
        count: u8,
        max: u8,
    },
}
