//! Calculation engines.
//!
//! Each engine is a pure function of its inputs and the relevant slice of a
//! [`ParameterSet`](crate::models::ParameterSet). [`TaxCalculator`] bundles
//! them behind one borrowed parameter set.

pub mod brackets;
pub mod calculator;
pub mod capital_gains;
pub mod common;
pub mod deductions;
pub mod distributions;
mod error;
pub mod irmaa;
pub mod niit;
pub mod payroll;

pub use brackets::{apply_progressive, marginal_rate, room_in_bracket};
pub use calculator::{IncomeTaxResult, TaxCalculator};
pub use capital_gains::tax_preferential_gain;
pub use deductions::{senior_deduction, standard_deduction};
pub use distributions::{adjusted_ss_benefit, rmd, rmd_start_age};
pub use error::CalculationError;
pub use irmaa::{IrmaaPremium, irmaa_premium};
pub use niit::niit;
pub use payroll::{FicaWithholding, additional_medicare_tax, fica_withholding};
