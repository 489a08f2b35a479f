use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// What an [`AgeIndexedTable`] returns for an age outside its keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfRangePolicy {
    /// Use the entry at the nearest boundary key.
    Clamp,
    /// Use the table's fallback factor.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgeFactor {
    pub age: u32,
    pub factor: Decimal,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgeTableError {
    #[error("age table has no entries")]
    Empty,

    #[error("age {0} appears more than once")]
    DuplicateAge(u32),

    #[error("factor for age {age} must be positive, got {factor}")]
    NonPositiveFactor { age: u32, factor: Decimal },

    #[error("fallback factor must be positive, got {0}")]
    NonPositiveFallback(Decimal),
}

/// Serialized shape of an [`AgeIndexedTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct AgeTableRepr {
    entries: Vec<AgeFactor>,
    fallback: Decimal,
    #[serde(default = "default_policy")]
    below_min: OutOfRangePolicy,
    #[serde(default = "default_policy")]
    above_max: OutOfRangePolicy,
}

fn default_policy() -> OutOfRangePolicy {
    OutOfRangePolicy::Fallback
}

/// Mapping from whole-year age to a positive factor (RMD divisor, claiming
/// multiplier).
///
/// Ages below the smallest key or above the largest key follow their own
/// [`OutOfRangePolicy`]. Ages between the keys with no entry use the
/// fallback. Every factor, including the fallback, is positive, so a lookup
/// result is always safe to divide by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AgeTableRepr", into = "AgeTableRepr")]
pub struct AgeIndexedTable {
    factors: BTreeMap<u32, Decimal>,
    fallback: Decimal,
    below_min: OutOfRangePolicy,
    above_max: OutOfRangePolicy,
}

impl AgeIndexedTable {
    pub fn new(
        entries: impl IntoIterator<Item = (u32, Decimal)>,
        fallback: Decimal,
        below_min: OutOfRangePolicy,
        above_max: OutOfRangePolicy,
    ) -> Result<Self, AgeTableError> {
        if fallback <= Decimal::ZERO {
            return Err(AgeTableError::NonPositiveFallback(fallback));
        }

        let mut factors = BTreeMap::new();
        for (age, factor) in entries {
            if factor <= Decimal::ZERO {
                return Err(AgeTableError::NonPositiveFactor { age, factor });
            }
            if factors.insert(age, factor).is_some() {
                return Err(AgeTableError::DuplicateAge(age));
            }
        }

        if factors.is_empty() {
            return Err(AgeTableError::Empty);
        }

        Ok(Self {
            factors,
            fallback,
            below_min,
            above_max,
        })
    }

    /// The factor stored for exactly `age`, if any.
    pub fn get(
        &self,
        age: u32,
    ) -> Option<Decimal> {
        self.factors.get(&age).copied()
    }

    pub fn min_age(&self) -> u32 {
        self.factors.keys().next().copied().unwrap_or_default()
    }

    pub fn max_age(&self) -> u32 {
        self.factors.keys().next_back().copied().unwrap_or_default()
    }

    pub fn fallback(&self) -> Decimal {
        self.fallback
    }

    /// Looks up the factor for `age`, applying the out-of-range policies.
    pub fn lookup(
        &self,
        age: u32,
    ) -> Decimal {
        if let Some(factor) = self.get(age) {
            return factor;
        }

        let (policy, boundary) = if age < self.min_age() {
            (self.below_min, self.min_age())
        } else if age > self.max_age() {
            (self.above_max, self.max_age())
        } else {
            warn!(age, fallback = %self.fallback, "No table entry for age; using fallback");
            return self.fallback;
        };

        match policy {
            OutOfRangePolicy::Clamp => self.get(boundary).unwrap_or(self.fallback),
            OutOfRangePolicy::Fallback => {
                warn!(
                    age,
                    min_age = self.min_age(),
                    max_age = self.max_age(),
                    fallback = %self.fallback,
                    "Age outside table range; using fallback"
                );
                self.fallback
            }
        }
    }
}

impl TryFrom<AgeTableRepr> for AgeIndexedTable {
    type Error = AgeTableError;

    fn try_from(repr: AgeTableRepr) -> Result<Self, Self::Error> {
        Self::new(
            repr.entries.into_iter().map(|entry| (entry.age, entry.factor)),
            repr.fallback,
            repr.below_min,
            repr.above_max,
        )
    }
}

impl From<AgeIndexedTable> for AgeTableRepr {
    fn from(table: AgeIndexedTable) -> Self {
        Self {
            entries: table
                .factors
                .into_iter()
                .map(|(age, factor)| AgeFactor { age, factor })
                .collect(),
            fallback: table.fallback,
            below_min: table.below_min,
            above_max: table.above_max,
        }
    }
}
