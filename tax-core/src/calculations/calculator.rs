//! A calculator bound to one year's parameters.
//!
//! [`TaxCalculator`] borrows a [`ParameterSet`] and selects the per-status
//! table for every engine call, so callers only supply a [`FilingStatus`] and
//! the request amounts.
//!
//! # Example
//!
//! ```no_run
//! use rust_decimal_macros::dec;
//! use tax_core::{FilingStatus, ParameterSet};
//! use tax_core::calculations::TaxCalculator;
//!
//! fn report(params: &ParameterSet) {
//!     let calculator = TaxCalculator::new(params);
//!     let result = calculator.income_tax(FilingStatus::Single, dec!(80000), dec!(20000));
//!
//!     println!("total tax: {}", result.total_tax);
//! }
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::CalculationError;
use crate::calculations::brackets::{apply_progressive, marginal_rate, room_in_bracket};
use crate::calculations::capital_gains::tax_preferential_gain;
use crate::calculations::common::non_negative;
use crate::calculations::deductions::{senior_deduction, standard_deduction};
use crate::calculations::distributions::{adjusted_ss_benefit, rmd, rmd_start_age};
use crate::calculations::irmaa::{IrmaaPremium, irmaa_premium};
use crate::calculations::niit::niit;
use crate::calculations::payroll::{FicaWithholding, additional_medicare_tax, fica_withholding};
use crate::models::{FilingStatus, ParameterSet};

/// Federal income tax split into its ordinary and preferential parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxResult {
    /// Taxable income that is not long-term gain or qualified dividends.
    pub ordinary_income: Decimal,

    /// Tax on `ordinary_income` from the federal brackets.
    pub ordinary_tax: Decimal,

    /// Preferential income actually taxed, capped at taxable income.
    pub preferential_income: Decimal,

    /// Tax on `preferential_income` stacked on top of ordinary income.
    pub preferential_tax: Decimal,

    /// `ordinary_tax + preferential_tax`.
    pub total_tax: Decimal,

    /// Federal bracket rate at the top of ordinary income.
    pub marginal_rate: Decimal,
}

/// Calculator for every engine against a single [`ParameterSet`].
#[derive(Debug, Clone, Copy)]
pub struct TaxCalculator<'a> {
    params: &'a ParameterSet,
}

impl<'a> TaxCalculator<'a> {
    pub fn new(params: &'a ParameterSet) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &'a ParameterSet {
        self.params
    }

    /// Computes federal income tax with preferential income stacked on top.
    ///
    /// `preferential_income` is the part of `taxable_income` made up of
    /// long-term capital gains and qualified dividends. Any excess over
    /// `taxable_income` is ignored.
    pub fn income_tax(
        &self,
        filing_status: FilingStatus,
        taxable_income: Decimal,
        preferential_income: Decimal,
    ) -> IncomeTaxResult {
        let taxable_income = non_negative("taxable_income", taxable_income);
        let preferential_income =
            non_negative("preferential_income", preferential_income).min(taxable_income);
        let ordinary_income = taxable_income - preferential_income;

        let federal = self.params.federal_table(filing_status);
        let ordinary_tax = apply_progressive(ordinary_income, federal);
        let preferential_tax = tax_preferential_gain(
            preferential_income,
            ordinary_income,
            self.params.capital_gains_table(filing_status),
        );

        let result = IncomeTaxResult {
            ordinary_income,
            ordinary_tax,
            preferential_income,
            preferential_tax,
            total_tax: ordinary_tax + preferential_tax,
            marginal_rate: marginal_rate(ordinary_income, federal),
        };

        debug!(
            filing_status = %filing_status,
            ordinary_tax = %result.ordinary_tax,
            preferential_tax = %result.preferential_tax,
            total_tax = %result.total_tax,
            "Income tax computed"
        );

        result
    }

    /// Progressive tax on ordinary income only.
    pub fn ordinary_tax(
        &self,
        filing_status: FilingStatus,
        taxable_income: Decimal,
    ) -> Decimal {
        apply_progressive(taxable_income, self.params.federal_table(filing_status))
    }

    pub fn marginal_rate(
        &self,
        filing_status: FilingStatus,
        taxable_income: Decimal,
    ) -> Decimal {
        marginal_rate(taxable_income, self.params.federal_table(filing_status))
    }

    /// Room left below the top of the federal bracket taxed at `target_rate`.
    ///
    /// `None` means the bracket is unbounded.
    pub fn room_in_bracket(
        &self,
        filing_status: FilingStatus,
        taxable_income: Decimal,
        target_rate: Decimal,
    ) -> Option<Decimal> {
        room_in_bracket(
            taxable_income,
            target_rate,
            self.params.federal_table(filing_status),
        )
    }

    pub fn preferential_tax(
        &self,
        filing_status: FilingStatus,
        gain: Decimal,
        ordinary_taxable_income: Decimal,
    ) -> Decimal {
        tax_preferential_gain(
            gain,
            ordinary_taxable_income,
            self.params.capital_gains_table(filing_status),
        )
    }

    pub fn fica_withholding(
        &self,
        wages: Decimal,
        ytd_wages: Decimal,
    ) -> FicaWithholding {
        fica_withholding(wages, ytd_wages, &self.params.fica)
    }

    pub fn additional_medicare_tax(
        &self,
        filing_status: FilingStatus,
        annual_medicare_wages: Decimal,
    ) -> Decimal {
        additional_medicare_tax(annual_medicare_wages, filing_status, &self.params.fica)
    }

    pub fn standard_deduction(
        &self,
        filing_status: FilingStatus,
        num_over_65: u8,
        is_blind: bool,
    ) -> Result<Decimal, CalculationError> {
        standard_deduction(
            filing_status,
            num_over_65,
            is_blind,
            &self.params.standard_deduction,
        )
    }

    pub fn senior_deduction(
        &self,
        filing_status: FilingStatus,
        num_over_65: u8,
        magi: Decimal,
    ) -> Result<Decimal, CalculationError> {
        senior_deduction(
            filing_status,
            num_over_65,
            magi,
            &self.params.standard_deduction,
        )
    }

    pub fn niit(
        &self,
        filing_status: FilingStatus,
        magi: Decimal,
        net_investment_income: Decimal,
    ) -> Decimal {
        niit(magi, net_investment_income, filing_status, &self.params.niit)
    }

    pub fn rmd(
        &self,
        age: i32,
        balance: Decimal,
    ) -> Result<Decimal, CalculationError> {
        rmd(age, balance, &self.params.rmd)
    }

    pub fn rmd_start_age(
        &self,
        birth_year: i32,
    ) -> u32 {
        rmd_start_age(birth_year, &self.params.rmd)
    }

    pub fn adjusted_ss_benefit(
        &self,
        fra_benefit: Decimal,
        claiming_age: Decimal,
    ) -> Result<Decimal, CalculationError> {
        adjusted_ss_benefit(fra_benefit, claiming_age, &self.params.social_security)
    }

    pub fn irmaa_premium(
        &self,
        filing_status: FilingStatus,
        magi: Decimal,
    ) -> IrmaaPremium {
        irmaa_premium(magi, filing_status, &self.params.irmaa)
    }
}
