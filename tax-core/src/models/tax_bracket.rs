use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A contiguous income range taxed at one marginal rate.
///
/// `max_income` of `None` marks the top, unbounded bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaxBracket {
    pub min_income: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_income: Option<Decimal>,
    pub tax_rate: Decimal,
}

impl TaxBracket {
    /// Width of the bracket, or `None` for the unbounded top bracket.
    pub fn width(&self) -> Option<Decimal> {
        self.max_income.map(|max| max - self.min_income)
    }
}

/// Errors raised while building a [`BracketTable`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BracketTableError {
    #[error("bracket table is empty")]
    Empty,

    #[error("first bracket must start at 0, got {0}")]
    FirstBracketNotAtZero(Decimal),

    #[error("bracket {index} upper bound {max} is not above its lower bound {min}")]
    EmptyBracket {
        index: usize,
        min: Decimal,
        max: Decimal,
    },

    #[error("bracket {index} starts at {found} but the previous bracket ends at {expected}")]
    NotContiguous {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    #[error("bracket {index} is unbounded but is not the last bracket")]
    UnboundedBeforeEnd { index: usize },

    #[error("last bracket must be unbounded, got upper bound {0}")]
    BoundedTop(Decimal),

    #[error("bracket {index} rate must be between 0 and 1, got {rate}")]
    InvalidRate { index: usize, rate: Decimal },

    #[error("bracket {index} rate {rate} is below the preceding rate {previous}")]
    DecreasingRate {
        index: usize,
        rate: Decimal,
        previous: Decimal,
    },
}

/// An ordered, contiguous progressive bracket table covering `[0, ∞)`.
///
/// The only way to obtain a table is through [`BracketTable::new`] (or the
/// serde and threshold conveniences built on it), so every table in hand
/// satisfies these invariants:
///
/// - at least one bracket, the first starting at 0
/// - each bracket starts where the previous one ended
/// - only the last bracket is unbounded, and it always is
/// - rates lie in `[0, 1]` and never decrease
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::{BracketTable, TaxBracket};
///
/// let table = BracketTable::new(vec![
///     TaxBracket { min_income: dec!(0), max_income: Some(dec!(12400)), tax_rate: dec!(0.10) },
///     TaxBracket { min_income: dec!(12400), max_income: None, tax_rate: dec!(0.12) },
/// ])
/// .unwrap();
///
/// assert_eq!(table.top_rate(), dec!(0.12));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct BracketTable {
    brackets: Vec<TaxBracket>,
}

impl BracketTable {
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self, BracketTableError> {
        let first = brackets.first().ok_or(BracketTableError::Empty)?;
        if first.min_income != Decimal::ZERO {
            return Err(BracketTableError::FirstBracketNotAtZero(first.min_income));
        }

        let last_index = brackets.len() - 1;
        let mut previous: Option<&TaxBracket> = None;

        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.tax_rate < Decimal::ZERO || bracket.tax_rate > Decimal::ONE {
                return Err(BracketTableError::InvalidRate {
                    index,
                    rate: bracket.tax_rate,
                });
            }

            if let Some(prev) = previous {
                // Only the last bracket may be unbounded, so `prev` has a max.
                let expected = prev.max_income.unwrap_or(prev.min_income);
                if bracket.min_income != expected {
                    return Err(BracketTableError::NotContiguous {
                        index,
                        expected,
                        found: bracket.min_income,
                    });
                }
                if bracket.tax_rate < prev.tax_rate {
                    return Err(BracketTableError::DecreasingRate {
                        index,
                        rate: bracket.tax_rate,
                        previous: prev.tax_rate,
                    });
                }
            }

            match bracket.max_income {
                Some(max) if index == last_index => {
                    return Err(BracketTableError::BoundedTop(max));
                }
                Some(max) if max <= bracket.min_income => {
                    return Err(BracketTableError::EmptyBracket {
                        index,
                        min: bracket.min_income,
                        max,
                    });
                }
                None if index != last_index => {
                    return Err(BracketTableError::UnboundedBeforeEnd { index });
                }
                _ => {}
            }

            previous = Some(bracket);
        }

        Ok(Self { brackets })
    }

    /// Builds a table from `(lower bound, rate)` pairs in ascending order.
    ///
    /// Each bracket ends where the next one starts; the last is unbounded.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tax_core::BracketTable;
    ///
    /// let table = BracketTable::from_thresholds(&[
    ///     (dec!(0), dec!(0.00)),
    ///     (dec!(49450), dec!(0.15)),
    ///     (dec!(545500), dec!(0.20)),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(table.brackets()[1].max_income, Some(dec!(545500)));
    /// assert_eq!(table.brackets()[2].max_income, None);
    /// ```
    pub fn from_thresholds(thresholds: &[(Decimal, Decimal)]) -> Result<Self, BracketTableError> {
        let brackets = thresholds
            .iter()
            .enumerate()
            .map(|(index, &(min_income, tax_rate))| TaxBracket {
                min_income,
                max_income: thresholds.get(index + 1).map(|&(next_min, _)| next_min),
                tax_rate,
            })
            .collect();

        Self::new(brackets)
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Rate of the unbounded top bracket.
    pub fn top_rate(&self) -> Decimal {
        self.brackets
            .last()
            .map(|bracket| bracket.tax_rate)
            .unwrap_or(Decimal::ZERO)
    }
}

impl TryFrom<Vec<TaxBracket>> for BracketTable {
    type Error = BracketTableError;

    fn try_from(brackets: Vec<TaxBracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<BracketTable> for Vec<TaxBracket> {
    fn from(table: BracketTable) -> Self {
        table.brackets
    }
}
