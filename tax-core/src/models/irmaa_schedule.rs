use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One Medicare Part B income-related adjustment tier.
///
/// Applies to MAGI up to and including `magi_max`; `None` is the top tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IrmaaTier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magi_max: Option<Decimal>,
    pub monthly_surcharge: Decimal,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IrmaaScheduleError {
    #[error("IRMAA schedule has no tiers")]
    Empty,

    #[error("IRMAA tier {index} surcharge must not be negative, got {surcharge}")]
    NegativeSurcharge { index: usize, surcharge: Decimal },

    #[error("IRMAA tier {index} upper bound {max} is not above the previous bound {previous}")]
    NotAscending {
        index: usize,
        max: Decimal,
        previous: Decimal,
    },

    #[error("IRMAA tier {index} is unbounded but is not the last tier")]
    UnboundedBeforeEnd { index: usize },

    #[error("last IRMAA tier must be unbounded, got upper bound {0}")]
    BoundedTop(Decimal),
}

/// Ascending IRMAA tiers whose last tier is unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<IrmaaTier>", into = "Vec<IrmaaTier>")]
pub struct IrmaaSchedule {
    tiers: Vec<IrmaaTier>,
}

impl IrmaaSchedule {
    pub fn new(tiers: Vec<IrmaaTier>) -> Result<Self, IrmaaScheduleError> {
        if tiers.is_empty() {
            return Err(IrmaaScheduleError::Empty);
        }

        let last_index = tiers.len() - 1;
        let mut previous_max: Option<Decimal> = None;

        for (index, tier) in tiers.iter().enumerate() {
            if tier.monthly_surcharge < Decimal::ZERO {
                return Err(IrmaaScheduleError::NegativeSurcharge {
                    index,
                    surcharge: tier.monthly_surcharge,
                });
            }

            match tier.magi_max {
                Some(max) if index == last_index => {
                    return Err(IrmaaScheduleError::BoundedTop(max));
                }
                Some(max) => {
                    if let Some(previous) = previous_max.filter(|previous| max <= *previous) {
                        return Err(IrmaaScheduleError::NotAscending {
                            index,
                            max,
                            previous,
                        });
                    }
                    previous_max = Some(max);
                }
                None if index != last_index => {
                    return Err(IrmaaScheduleError::UnboundedBeforeEnd { index });
                }
                None => {}
            }
        }

        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[IrmaaTier] {
        &self.tiers
    }

    /// Index of the tier that covers `magi`.
    pub fn tier_index(
        &self,
        magi: Decimal,
    ) -> usize {
        self.tiers
            .iter()
            .position(|tier| tier.magi_max.is_none_or(|max| magi <= max))
            .unwrap_or(self.tiers.len() - 1)
    }
}

impl TryFrom<Vec<IrmaaTier>> for IrmaaSchedule {
    type Error = IrmaaScheduleError;

    fn try_from(tiers: Vec<IrmaaTier>) -> Result<Self, Self::Error> {
        Self::new(tiers)
    }
}

impl From<IrmaaSchedule> for Vec<IrmaaTier> {
    fn from(schedule: IrmaaSchedule) -> Self {
        schedule.tiers
    }
}
