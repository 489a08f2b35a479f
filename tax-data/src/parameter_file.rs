use std::fs;
use std::path::{Path, PathBuf};

use tax_core::{ParameterSet, ParameterSetError};
use thiserror::Error;
use tracing::{debug, info};

/// The bundled 2026 parameter file.
pub const PARAMETERS_2026: &str = include_str!("../data/parameters_2026.toml");

/// The 2026 bracket tables in CSV form.
pub const BRACKETS_2026: &str = include_str!("../data/brackets_2026.csv");

/// Errors that can occur when loading a parameter file.
#[derive(Debug, Error)]
pub enum ParameterFileError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid parameters: {0}")]
    Invalid(#[from] ParameterSetError),
}

/// Loader for TOML parameter files.
///
/// Every table in the file is checked while it is deserialized; the scalar
/// limits are checked by [`ParameterSet::validate`] before the set is
/// returned, so callers never see an unvalidated set.
pub struct ParameterFile;

impl ParameterFile {
    /// Parses and validates a parameter set from TOML text.
    pub fn parse(text: &str) -> Result<ParameterSet, ParameterFileError> {
        let params: ParameterSet = toml::from_str(text)?;
        params.validate()?;

        debug!(tax_year = params.tax_year, "Parameter set validated");

        Ok(params)
    }

    /// Reads, parses and validates the parameter file at `path`.
    pub fn load(path: &Path) -> Result<ParameterSet, ParameterFileError> {
        let text = fs::read_to_string(path).map_err(|source| ParameterFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let params = Self::parse(&text)?;
        info!(
            path = %path.display(),
            tax_year = params.tax_year,
            "Loaded parameter file"
        );

        Ok(params)
    }

    /// The bundled 2026 parameter set.
    pub fn bundled_2026() -> Result<ParameterSet, ParameterFileError> {
        Self::parse(PARAMETERS_2026)
    }

    /// Renders a parameter set back to TOML.
    pub fn to_toml(params: &ParameterSet) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(params)
    }
}
