mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::currency::{ConvertArgs, RatesArgs};
use commands::loan::{EmiArgs, ScheduleArgs};

/// Loan installments, amortisation schedules and currency conversion
#[derive(Parser)]
#[command(
    name = "loancalc",
    version,
    about = "Loan installments, amortisation schedules and currency conversion",
    long_about = "A CLI for computing the equated monthly installment (EMI) of a loan, \
                  its month-by-month amortisation schedule, and expressing the results \
                  in another currency from an exchange-rate table, with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log computation detail to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the equated monthly installment and loan totals
    Emi(EmiArgs),
    /// Build the month-by-month amortisation schedule
    Schedule(ScheduleArgs),
    /// Convert an amount between currencies via an exchange-rate table
    Convert(ConvertArgs),
    /// List the currencies and rates in an exchange-rate table
    Rates(RatesArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
    Yaml,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Emi(args) => commands::loan::run_emi(args),
        Commands::Schedule(args) => commands::loan::run_schedule(args),
        Commands::Convert(args) => commands::currency::run_convert(args),
        Commands::Rates(args) => commands::currency::run_rates(args),
        Commands::Version => {
            println!("loancalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
