use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_calc_core::amortization::loan::{self, LoanSpecification};
use loan_calc_core::currency::conversion::{self, LoanConversionInput};
use loan_calc_core::DEFAULT_BASE_CURRENCY;

use crate::commands::currency::load_rates;
use crate::input;

/// Loan terms, from flags or a JSON/YAML file
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct LoanArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long, alias = "amount")]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (8.5 = 8.5%)
    #[arg(long, alias = "interest-rate")]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long, alias = "term")]
    pub years: Option<Decimal>,
}

impl LoanArgs {
    fn into_spec(self) -> Result<LoanSpecification, Box<dyn std::error::Error>> {
        let spec: LoanSpecification = if let Some(ref path) = self.input {
            input::file::read_document(path)?
        } else if let Some(spec) = input::stdin::read_stdin()? {
            spec
        } else {
            LoanSpecification {
                principal: self
                    .principal
                    .ok_or("--principal is required (or provide --input)")?,
                annual_rate_percent: self
                    .rate
                    .ok_or("--rate is required (or provide --input)")?,
                term_years: self
                    .years
                    .ok_or("--years is required (or provide --input)")?,
            }
        };
        Ok(spec)
    }
}

/// Arguments for the monthly installment summary
#[derive(Args)]
pub struct EmiArgs {
    #[command(flatten)]
    pub loan: LoanArgs,
}

/// Arguments for the month-by-month amortisation schedule
#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Display currency for every amount (requires --rates)
    #[arg(long)]
    pub currency: Option<String>,

    /// Currency the loan is denominated in
    #[arg(long, default_value = DEFAULT_BASE_CURRENCY)]
    pub from: String,

    /// Exchange-rate table: bare {"CODE": rate} object or provider payload
    #[arg(long)]
    pub rates: Option<String>,
}

pub fn run_emi(args: EmiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let spec = args.loan.into_spec()?;
    let result = loan::calculate_loan(&spec)?;

    let mut value = serde_json::to_value(result)?;
    if let Some(summary) = value.get_mut("result").and_then(Value::as_object_mut) {
        summary.remove("schedule");
    }
    Ok(value)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let spec = args.loan.into_spec()?;

    let Some(currency) = args.currency else {
        let result = loan::calculate_loan(&spec)?;
        return Ok(serde_json::to_value(result)?);
    };

    let rates_path = args
        .rates
        .ok_or("--rates <file> is required to display the schedule in another currency")?;
    let conversion_input = LoanConversionInput {
        loan: spec,
        from_currency: args.from.to_uppercase(),
        to_currency: currency.to_uppercase(),
        rates: load_rates(&rates_path)?,
    };
    let result = conversion::convert_loan(&conversion_input)?;
    Ok(serde_json::to_value(result)?)
}
