pub mod calculations;
pub mod models;

pub use calculations::{CalculationError, IncomeTaxResult, TaxCalculator};
pub use models::*;
