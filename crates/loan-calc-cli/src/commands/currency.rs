use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use loan_calc_core::currency::conversion::{self, ConversionInput};
use loan_calc_core::currency::rates::{self, ExchangeRateTable};
use loan_calc_core::DEFAULT_BASE_CURRENCY;

use crate::input;

/// Arguments for converting a single amount
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ConvertArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount to convert
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Source currency code
    #[arg(long, default_value = DEFAULT_BASE_CURRENCY)]
    pub from: String,

    /// Target currency code
    #[arg(long)]
    pub to: Option<String>,

    /// Exchange-rate table: bare {"CODE": rate} object or provider payload
    #[arg(long)]
    pub rates: Option<String>,
}

/// Arguments for listing an exchange-rate table
#[derive(Args)]
pub struct RatesArgs {
    /// Exchange-rate table: bare {"CODE": rate} object or provider payload
    #[arg(long)]
    pub rates: String,
}

/// Load a rate table from a JSON or YAML file.
pub fn load_rates(path: &str) -> Result<ExchangeRateTable, Box<dyn std::error::Error>> {
    let document = input::file::read_value(path)?;
    Ok(rates::rate_table_from_value(document)?)
}

pub fn run_convert(args: ConvertArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let conversion_input: ConversionInput = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        let rates_path = args
            .rates
            .ok_or("--rates is required (or provide --input)")?;
        ConversionInput {
            amount: args.amount.ok_or("--amount is required (or provide --input)")?,
            from_currency: args.from.to_uppercase(),
            to_currency: args
                .to
                .ok_or("--to is required (or provide --input)")?
                .to_uppercase(),
            rates: load_rates(&rates_path)?,
        }
    };

    let result = conversion::convert_amount(&conversion_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_rates(args: RatesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let table = load_rates(&args.rates)?;
    let rows: Vec<Value> = table
        .iter()
        .map(|(code, rate)| json!({ "currency": code, "rate": rate }))
        .collect();

    Ok(json!({
        "base_currency": table.base_currency(),
        "currencies": table.len(),
        "rates": rows,
    }))
}
