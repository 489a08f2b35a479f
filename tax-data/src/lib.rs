//! Parameter loading and logging for the tax engines.
//!
//! A [`ParameterSet`](tax_core::ParameterSet) comes from a TOML parameter
//! file ([`ParameterFile`]) and may have its bracket tables replaced from a
//! CSV file ([`BracketTableLoader`]). The 2026 parameters are bundled.

pub mod bracket_loader;
pub mod logging;
pub mod parameter_file;

pub use bracket_loader::{
    BracketKind, BracketLoaderError, BracketRecord, BracketTableLoader, LoadedBrackets,
};
pub use parameter_file::{BRACKETS_2026, PARAMETERS_2026, ParameterFile, ParameterFileError};
