use std::collections::BTreeMap;
use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{
    BracketTable, BracketTableError, FilingStatus, ParameterSet, PerStatus, TaxBracket,
    UnknownFilingStatus,
};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur when loading tax bracket data.
#[derive(Debug, Error)]
pub enum BracketLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("row {row}: {source}")]
    UnknownFilingStatus {
        row: usize,
        #[source]
        source: UnknownFilingStatus,
    },

    #[error("no {kind} brackets for {status} in tax year {tax_year}")]
    MissingTable {
        kind: BracketKind,
        status: FilingStatus,
        tax_year: i32,
    },

    #[error("invalid {kind} table for {status}: {source}")]
    InvalidTable {
        kind: BracketKind,
        status: FilingStatus,
        #[source]
        source: BracketTableError,
    },
}

impl From<csv::Error> for BracketLoaderError {
    fn from(err: csv::Error) -> Self {
        BracketLoaderError::CsvParse(err.to_string())
    }
}

/// Which bracket schedule a CSV row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketKind {
    Federal,
    CapitalGains,
}

impl std::fmt::Display for BracketKind {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            BracketKind::Federal => write!(f, "federal"),
            BracketKind::CapitalGains => write!(f, "capital_gains"),
        }
    }
}

/// A single record from the tax brackets CSV file.
///
/// - `tax_year`: The tax year (e.g., 2026)
/// - `table`: `federal` or `capital_gains`
/// - `filing_status`: A status code (S, MFJ, MFS, HOH) or snake_case name
/// - `min_income`: The lower bound of this bracket
/// - `max_income`: The upper bound of this bracket (empty for unlimited)
/// - `rate`: The marginal tax rate as a decimal (e.g., 0.10 for 10%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub tax_year: i32,
    pub table: BracketKind,
    pub filing_status: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Validated federal and capital-gains tables for one tax year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedBrackets {
    pub tax_year: i32,
    pub federal: PerStatus<BracketTable>,
    pub capital_gains: PerStatus<BracketTable>,
}

impl LoadedBrackets {
    /// Replaces the bracket tables of `params` with the loaded ones.
    pub fn apply(
        self,
        params: ParameterSet,
    ) -> ParameterSet {
        if params.tax_year != self.tax_year {
            warn!(
                parameters_year = params.tax_year,
                brackets_year = self.tax_year,
                "Bracket tables are for a different tax year than the parameter set"
            );
        }

        ParameterSet {
            federal_brackets: self.federal,
            capital_gains_brackets: self.capital_gains,
            ..params
        }
    }
}

/// Loader for bracket tables from CSV files.
///
/// Rows are grouped by table and filing status, sorted by `min_income` and
/// built into validated [`BracketTable`]s. Every filing status must have both
/// a federal and a capital-gains table for the requested year.
pub struct BracketTableLoader;

impl BracketTableLoader {
    /// Parse bracket records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, BracketLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Builds the tables for `tax_year` from parsed records.
    ///
    /// Rows for other tax years are skipped.
    pub fn build(
        records: &[BracketRecord],
        tax_year: i32,
    ) -> Result<LoadedBrackets, BracketLoaderError> {
        let mut groups: BTreeMap<(BracketKind, FilingStatus), Vec<TaxBracket>> = BTreeMap::new();
        let mut skipped = 0;

        for (index, record) in records.iter().enumerate() {
            if record.tax_year != tax_year {
                skipped += 1;
                continue;
            }

            // Header is line 1, so the first record is line 2.
            let status = record
                .filing_status
                .parse::<FilingStatus>()
                .map_err(|source| BracketLoaderError::UnknownFilingStatus {
                    row: index + 2,
                    source,
                })?;

            groups
                .entry((record.table, status))
                .or_default()
                .push(TaxBracket {
                    min_income: record.min_income,
                    max_income: record.max_income,
                    tax_rate: record.rate,
                });
        }

        debug!(
            tax_year,
            tables = groups.len(),
            skipped,
            "Grouped bracket records"
        );

        let mut take_table = |kind: BracketKind, status: FilingStatus| {
            let mut brackets = groups
                .remove(&(kind, status))
                .ok_or(BracketLoaderError::MissingTable {
                    kind,
                    status,
                    tax_year,
                })?;
            brackets.sort_by(|a, b| a.min_income.cmp(&b.min_income));

            BracketTable::new(brackets).map_err(|source| BracketLoaderError::InvalidTable {
                kind,
                status,
                source,
            })
        };

        let federal = PerStatus::try_from_fn(|status| take_table(BracketKind::Federal, status))?;
        let capital_gains =
            PerStatus::try_from_fn(|status| take_table(BracketKind::CapitalGains, status))?;

        Ok(LoadedBrackets {
            tax_year,
            federal,
            capital_gains,
        })
    }

    /// Parses and builds the tables for `tax_year` in one step.
    pub fn load<R: Read>(
        reader: R,
        tax_year: i32,
    ) -> Result<LoadedBrackets, BracketLoaderError> {
        let records = Self::parse(reader)?;
        Self::build(&records, tax_year)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::BRACKETS_2026;

    const HEADER: &str = "tax_year,table,filing_status,min_income,max_income,rate\n";

    #[test]
    fn test_parse_csv_single_bracket() {
        let csv = format!("{HEADER}2026,federal,S,0,12400,0.10");

        let records = BracketTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0],
            BracketRecord {
                tax_year: 2026,
                table: BracketKind::Federal,
                filing_status: "S".to_string(),
                min_income: dec!(0),
                max_income: Some(dec!(12400)),
                rate: dec!(0.10),
            }
        );
    }

    #[test]
    fn test_parse_csv_unlimited_max_income() {
        let csv = format!("{HEADER}2026,capital_gains,MFJ,613700,,0.20");

        let records = BracketTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records[0].table, BracketKind::CapitalGains);
        assert_eq!(records[0].max_income, None);
        assert_eq!(records[0].rate, dec!(0.20));
    }

    #[test]
    fn test_parse_bundled_csv() {
        let records =
            BracketTableLoader::parse(BRACKETS_2026.as_bytes()).expect("Failed to parse CSV");

        // 4 statuses × (7 federal + 3 capital gains)
        assert_eq!(records.len(), 40);
    }

    #[test]
    fn test_parse_invalid_csv_missing_column() {
        let csv = "tax_year,table,min_income\n2026,federal,0";

        let err = BracketTableLoader::parse(csv.as_bytes()).expect_err("Should fail");

        let BracketLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(
            msg.contains("missing field"),
            "Expected 'missing field' in error, got: {}",
            msg
        );
    }

    #[test]
    fn test_parse_invalid_csv_unknown_table() {
        let csv = format!("{HEADER}2026,state,S,0,,0.05");

        let result = BracketTableLoader::parse(csv.as_bytes());

        assert!(matches!(result, Err(BracketLoaderError::CsvParse(_))));
    }

    #[test]
    fn test_parse_invalid_csv_bad_decimal() {
        let csv = format!("{HEADER}2026,federal,S,abc,12400,0.10");

        let result = BracketTableLoader::parse(csv.as_bytes());

        assert!(matches!(result, Err(BracketLoaderError::CsvParse(_))));
    }

    #[test]
    fn test_build_bundled_2026() {
        let loaded = BracketTableLoader::load(BRACKETS_2026.as_bytes(), 2026).expect("builds");

        let hoh = loaded.federal.get(FilingStatus::HeadOfHousehold);
        assert_eq!(hoh.brackets().len(), 7);
        assert_eq!(hoh.brackets()[0].max_income, Some(dec!(17700)));

        let joint = loaded.capital_gains.get(FilingStatus::MarriedFilingJointly);
        assert_eq!(joint.brackets()[1].min_income, dec!(98900));
        assert_eq!(joint.brackets()[2].max_income, None);
    }

    #[test]
    fn test_build_sorts_rows() {
        let mut csv = HEADER.to_string();
        for status in ["S", "MFJ", "MFS", "HOH"] {
            csv.push_str(&format!("2026,federal,{status},10000,,0.20\n"));
            csv.push_str(&format!("2026,federal,{status},0,10000,0.10\n"));
            csv.push_str(&format!("2026,capital_gains,{status},0,,0.15\n"));
        }

        let loaded = BracketTableLoader::load(csv.as_bytes(), 2026).expect("builds");

        let single = loaded.federal.get(FilingStatus::Single);
        assert_eq!(single.brackets()[0].tax_rate, dec!(0.10));
        assert_eq!(single.brackets()[1].tax_rate, dec!(0.20));
    }

    #[test]
    fn test_build_ignores_other_years() {
        let csv = format!("{BRACKETS_2026}2025,federal,S,0,,0.99\n");

        let loaded = BracketTableLoader::load(csv.as_bytes(), 2026).expect("builds");

        assert_eq!(loaded.federal.get(FilingStatus::Single).top_rate(), dec!(0.37));
    }

    #[test]
    fn test_build_missing_year() {
        let result = BracketTableLoader::load(BRACKETS_2026.as_bytes(), 2030);

        match result {
            Err(BracketLoaderError::MissingTable {
                kind,
                status,
                tax_year,
            }) => {
                assert_eq!(kind, BracketKind::Federal);
                assert_eq!(status, FilingStatus::Single);
                assert_eq!(tax_year, 2030);
            }
            other => panic!("expected MissingTable, got {other:?}"),
        }
    }

    #[test]
    fn test_build_missing_status() {
        let csv: String = BRACKETS_2026
            .lines()
            .filter(|line| !line.contains(",capital_gains,HOH,"))
            .map(|line| format!("{line}\n"))
            .collect();

        let result = BracketTableLoader::load(csv.as_bytes(), 2026);

        assert!(matches!(
            result,
            Err(BracketLoaderError::MissingTable {
                kind: BracketKind::CapitalGains,
                status: FilingStatus::HeadOfHousehold,
                ..
            })
        ));
    }

    #[test]
    fn test_build_unknown_filing_status_reports_row() {
        let csv = format!("{HEADER}2026,federal,S,0,,0.10\n2026,federal,QSS,0,,0.10\n");

        let result = BracketTableLoader::load(csv.as_bytes(), 2026);

        match result {
            Err(BracketLoaderError::UnknownFilingStatus { row, source }) => {
                assert_eq!(row, 3);
                assert_eq!(source, UnknownFilingStatus("QSS".to_string()));
            }
            other => panic!("expected UnknownFilingStatus, got {other:?}"),
        }
    }

    #[test]
    fn test_build_rejects_gap_between_brackets() {
        let csv = BRACKETS_2026.replace(
            "2026,federal,S,12400,50400,0.12",
            "2026,federal,S,13000,50400,0.12",
        );

        let result = BracketTableLoader::load(csv.as_bytes(), 2026);

        assert!(matches!(
            result,
            Err(BracketLoaderError::InvalidTable {
                kind: BracketKind::Federal,
                status: FilingStatus::Single,
                source: BracketTableError::NotContiguous { .. },
            })
        ));
    }

    #[test]
    fn test_apply_replaces_tables() {
        let params = crate::ParameterFile::bundled_2026().expect("bundled parameters");
        let csv = BRACKETS_2026.replace(
            "2026,federal,S,640600,,0.37",
            "2026,federal,S,640600,,0.396",
        );
        let loaded = BracketTableLoader::load(csv.as_bytes(), 2026).expect("builds");

        let updated = loaded.apply(params.clone());

        assert_eq!(updated.federal_table(FilingStatus::Single).top_rate(), dec!(0.396));
        assert_eq!(updated.fica, params.fica);
    }
}
