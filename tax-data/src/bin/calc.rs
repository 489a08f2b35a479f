use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tax_core::{FilingStatus, ParameterSet, TaxCalculator};
use tax_data::{BracketTableLoader, ParameterFile, logging};
use tracing::info;

/// Federal tax and benefit calculator.
///
/// Uses the bundled 2026 parameters unless a parameter file is given. Bracket
/// tables can be replaced from a CSV file with the columns
/// tax_year, table, filing_status, min_income, max_income, rate.
#[derive(Parser, Debug)]
#[command(name = "tax-calc")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a TOML parameter file
    #[arg(long, global = true)]
    params: Option<PathBuf>,

    /// Path to a CSV file whose bracket tables replace the parameter file's
    #[arg(long, global = true)]
    brackets: Option<PathBuf>,

    /// Log filter (e.g. "debug" or "warn,tax_core=debug"); RUST_LOG takes precedence
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Federal income tax with preferential income stacked on top
    IncomeTax {
        /// Filing status (S, MFJ, MFS, HOH)
        #[arg(short, long)]
        status: FilingStatus,

        /// Taxable income after deductions
        #[arg(short, long)]
        taxable_income: Decimal,

        /// Long-term gains and qualified dividends included in taxable income
        #[arg(long, default_value_t = Decimal::ZERO)]
        preferential_income: Decimal,
    },

    /// Employee FICA withholding for one payment
    Fica {
        /// Wages in this payment
        #[arg(short, long)]
        wages: Decimal,

        /// Wages already paid this year before this payment
        #[arg(long, default_value_t = Decimal::ZERO)]
        ytd_wages: Decimal,
    },

    /// Additional Medicare Tax on a year's Medicare wages
    AdditionalMedicare {
        #[arg(short, long)]
        status: FilingStatus,

        /// Total Medicare wages for the year
        #[arg(short, long)]
        wages: Decimal,
    },

    /// Standard deduction and senior deduction
    Deduction {
        #[arg(short, long)]
        status: FilingStatus,

        /// Number of people on the return aged 65 or older
        #[arg(long, default_value_t = 0)]
        over_65: u8,

        /// The filer is blind
        #[arg(long, default_value_t = false)]
        blind: bool,

        /// MAGI used to phase down the senior deduction
        #[arg(long)]
        magi: Option<Decimal>,
    },

    /// Net Investment Income Tax
    Niit {
        #[arg(short, long)]
        status: FilingStatus,

        #[arg(short, long)]
        magi: Decimal,

        /// Net investment income
        #[arg(short, long)]
        nii: Decimal,
    },

    /// Required minimum distribution
    Rmd {
        /// Owner's age at year end
        #[arg(short, long)]
        age: i32,

        /// Prior year-end account balance
        #[arg(short, long)]
        balance: Decimal,
    },

    /// Age at which RMDs begin
    RmdStartAge {
        #[arg(short, long)]
        birth_year: i32,
    },

    /// Social Security benefit adjusted for claiming age
    SsBenefit {
        /// Monthly benefit at full retirement age
        #[arg(short, long)]
        fra_benefit: Decimal,

        /// Age when benefits start; fractions round to the nearest year
        #[arg(short, long)]
        claiming_age: Decimal,
    },

    /// Medicare Part B premium with IRMAA surcharge
    Irmaa {
        #[arg(short, long)]
        status: FilingStatus,

        #[arg(short, long)]
        magi: Decimal,
    },

    /// Print the active parameter set as TOML
    Show,
}

fn load_parameters(args: &Args) -> Result<ParameterSet> {
    let params = match &args.params {
        Some(path) => ParameterFile::load(path)
            .with_context(|| format!("Failed to load parameters: {}", path.display()))?,
        None => ParameterFile::bundled_2026().context("Bundled parameters are invalid")?,
    };

    let Some(path) = &args.brackets else {
        return Ok(params);
    };

    let file =
        File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
    let loaded = BracketTableLoader::load(file, params.tax_year)
        .with_context(|| format!("Failed to load brackets: {}", path.display()))?;
    info!(path = %path.display(), "Replaced bracket tables");

    Ok(loaded.apply(params))
}

fn run(
    command: &Command,
    params: &ParameterSet,
) -> Result<()> {
    let calculator = TaxCalculator::new(params);

    match *command {
        Command::IncomeTax {
            status,
            taxable_income,
            preferential_income,
        } => {
            let result = calculator.income_tax(status, taxable_income, preferential_income);
            println!("Ordinary income:      {}", result.ordinary_income);
            println!("Ordinary tax:         {}", result.ordinary_tax);
            println!("Preferential income:  {}", result.preferential_income);
            println!("Preferential tax:     {}", result.preferential_tax);
            println!("Total tax:            {}", result.total_tax);
            println!("Marginal rate:        {}", result.marginal_rate);
        }
        Command::Fica { wages, ytd_wages } => {
            let result = calculator.fica_withholding(wages, ytd_wages);
            println!("Social security:      {}", result.social_security);
            println!("Medicare:             {}", result.medicare);
            println!("Total:                {}", result.total);
        }
        Command::AdditionalMedicare { status, wages } => {
            let tax = calculator.additional_medicare_tax(status, wages);
            println!("Additional Medicare:  {tax}");
        }
        Command::Deduction {
            status,
            over_65,
            blind,
            magi,
        } => {
            let standard = calculator.standard_deduction(status, over_65, blind)?;
            println!("Standard deduction:   {standard}");
            if let Some(magi) = magi {
                let senior = calculator.senior_deduction(status, over_65, magi)?;
                println!("Senior deduction:     {senior}");
            }
        }
        Command::Niit { status, magi, nii } => {
            println!("NIIT:                 {}", calculator.niit(status, magi, nii));
        }
        Command::Rmd { age, balance } => {
            println!("RMD:                  {}", calculator.rmd(age, balance)?);
        }
        Command::RmdStartAge { birth_year } => {
            println!("RMD start age:        {}", calculator.rmd_start_age(birth_year));
        }
        Command::SsBenefit {
            fra_benefit,
            claiming_age,
        } => {
            let benefit = calculator.adjusted_ss_benefit(fra_benefit, claiming_age)?;
            println!("Adjusted benefit:     {benefit}");
        }
        Command::Irmaa { status, magi } => {
            let premium = calculator.irmaa_premium(status, magi);
            println!("IRMAA tier:           {}", premium.tier);
            println!("Monthly surcharge:    {}", premium.monthly_surcharge);
            println!("Monthly premium:      {}", premium.monthly_premium);
        }
        Command::Show => {
            let text =
                ParameterFile::to_toml(params).context("Failed to render parameters")?;
            print!("{text}");
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.log_level.as_deref())?;

    let params = load_parameters(&args)?;
    run(&args.command, &params)
}
