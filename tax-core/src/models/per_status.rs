use serde::{Deserialize, Serialize};

use crate::models::FilingStatus;

/// One value for every filing status.
///
/// Lookups are an exhaustive match over [`FilingStatus`], so a table built
/// from this type can never be missing an entry. Parameter files must name all
/// four statuses; a missing key fails deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PerStatus<T> {
    #[serde(alias = "S")]
    pub single: T,
    #[serde(alias = "MFJ")]
    pub married_filing_jointly: T,
    #[serde(alias = "MFS")]
    pub married_filing_separately: T,
    #[serde(alias = "HOH")]
    pub head_of_household: T,
}

impl<T> PerStatus<T> {
    pub fn get(
        &self,
        status: FilingStatus,
    ) -> &T {
        match status {
            FilingStatus::Single => &self.single,
            FilingStatus::MarriedFilingJointly => &self.married_filing_jointly,
            FilingStatus::MarriedFilingSeparately => &self.married_filing_separately,
            FilingStatus::HeadOfHousehold => &self.head_of_household,
        }
    }

    pub fn from_fn(mut f: impl FnMut(FilingStatus) -> T) -> Self {
        Self {
            single: f(FilingStatus::Single),
            married_filing_jointly: f(FilingStatus::MarriedFilingJointly),
            married_filing_separately: f(FilingStatus::MarriedFilingSeparately),
            head_of_household: f(FilingStatus::HeadOfHousehold),
        }
    }

    /// Builds a table from a fallible constructor, stopping at the first error.
    pub fn try_from_fn<E>(mut f: impl FnMut(FilingStatus) -> Result<T, E>) -> Result<Self, E> {
        Ok(Self {
            single: f(FilingStatus::Single)?,
            married_filing_jointly: f(FilingStatus::MarriedFilingJointly)?,
            married_filing_separately: f(FilingStatus::MarriedFilingSeparately)?,
            head_of_household: f(FilingStatus::HeadOfHousehold)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilingStatus, &T)> {
        FilingStatus::ALL
            .into_iter()
            .map(move |status| (status, self.get(status)))
    }
}
