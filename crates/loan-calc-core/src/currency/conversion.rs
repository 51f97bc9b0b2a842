use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::currency::rates::ExchangeRateTable;
use crate::error::LoanCalcError;
use crate::types::*;
use crate::LoanCalcResult;

#[cfg(feature = "amortization")]
use crate::amortization::loan::{build_loan_output, LoanOutput, LoanSpecification};
#[cfg(feature = "amortization")]
use crate::amortization::schedule::{AmortizationRow, AmortizationSchedule};

/// Convert `amount` from one currency to another by pivoting through the
/// table's base currency: `amount / rates[from] * rates[to]`.
///
/// When either currency is missing from `rates` the amount comes back
/// unchanged. Converting a currency to itself is the identity.
///
/// # Panics
///
/// Panics if the converted amount falls outside the `Decimal` range, as
/// `Decimal` arithmetic does. Use [`checked_convert`] to get an error instead.
pub fn convert(amount: Money, from: &str, to: &str, rates: &ExchangeRateTable) -> Money {
    match lookup(from, to, rates) {
        Some((from_rate, to_rate)) => amount / from_rate * to_rate,
        None => amount,
    }
}

/// [`convert`] with overflow reported as an error.
pub fn checked_convert(
    amount: Money,
    from: &str,
    to: &str,
    rates: &ExchangeRateTable,
) -> LoanCalcResult<Money> {
    match lookup(from, to, rates) {
        Some((from_rate, to_rate)) => amount
            .checked_div(from_rate)
            .and_then(|base| base.checked_mul(to_rate))
            .ok_or_else(|| {
                LoanCalcError::FinancialImpossibility(format!(
                    "{amount} {from} in {to} exceeds the representable range"
                ))
            }),
        None => Ok(amount),
    }
}

/// Units of `to` per unit of `from`, or `None` when the pair is not covered
/// or the ratio is out of range.
pub fn cross_rate(from: &str, to: &str, rates: &ExchangeRateTable) -> Option<Rate> {
    lookup(from, to, rates).and_then(|(from_rate, to_rate)| to_rate.checked_div(from_rate))
}

/// Rates for both legs; an identity pair resolves to (1, 1).
fn lookup(from: &str, to: &str, rates: &ExchangeRateTable) -> Option<(Rate, Rate)> {
    if from == to {
        return Some((Decimal::ONE, Decimal::ONE));
    }
    match (rates.rate(from), rates.rate(to)) {
        (Some(from_rate), Some(to_rate)) => Some((from_rate, to_rate)),
        (from_rate, to_rate) => {
            log::debug!(
                "no conversion {from} -> {to} (from rate: {:?}, to rate: {:?}); amount unchanged",
                from_rate,
                to_rate
            );
            None
        }
    }
}

/// Express every amount of a schedule in another currency.
#[cfg(feature = "amortization")]
pub fn convert_schedule(
    schedule: &[AmortizationRow],
    from: &str,
    to: &str,
    rates: &ExchangeRateTable,
) -> LoanCalcResult<AmortizationSchedule> {
    schedule
        .iter()
        .map(|row| {
            Ok(AmortizationRow {
                period: row.period,
                principal_portion: checked_convert(row.principal_portion, from, to, rates)?,
                interest_portion: checked_convert(row.interest_portion, from, to, rates)?,
                remaining_balance: checked_convert(row.remaining_balance, from, to, rates)?,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Enveloped conversion of a single amount
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionInput {
    pub amount: Money,
    pub from_currency: CurrencyCode,
    pub to_currency: CurrencyCode,
    pub rates: ExchangeRateTable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    pub converted_amount: Money,
    pub amount: Money,
    pub from_currency: CurrencyCode,
    pub to_currency: CurrencyCode,
    /// Units of `to_currency` per unit of `from_currency`; 1 when unconverted.
    pub applied_rate: Rate,
    /// True when a missing rate left the amount unconverted.
    pub fallback_applied: bool,
}

/// Convert one amount, reporting the rate used and any fallback.
pub fn convert_amount(
    input: &ConversionInput,
) -> LoanCalcResult<ComputationOutput<ConversionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let (applied_rate, fallback_applied) = resolve_pair(
        &input.from_currency,
        &input.to_currency,
        &input.rates,
        &mut warnings,
    );
    let converted_amount = checked_convert(
        input.amount,
        &input.from_currency,
        &input.to_currency,
        &input.rates,
    )?;

    let output = ConversionOutput {
        converted_amount,
        amount: input.amount,
        from_currency: input.from_currency.clone(),
        to_currency: input.to_currency.clone(),
        applied_rate,
        fallback_applied,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Pivot conversion through the rate table's base currency",
        &pivot_assumptions(&input.rates),
        warnings,
        elapsed,
        output,
    ))
}

fn resolve_pair(
    from: &str,
    to: &str,
    rates: &ExchangeRateTable,
    warnings: &mut Vec<String>,
) -> (Rate, bool) {
    match cross_rate(from, to, rates) {
        Some(rate) => (rate, false),
        None => {
            for code in [from, to] {
                if !rates.contains(code) {
                    warnings.push(format!(
                        "No exchange rate for {code}; amounts left in {from}."
                    ));
                }
            }
            (Decimal::ONE, true)
        }
    }
}

fn pivot_assumptions(rates: &ExchangeRateTable) -> serde_json::Value {
    serde_json::json!({
        "base_currency": rates.base_currency(),
        "currencies_available": rates.len(),
        "formula": "amount / rate[from] * rate[to]",
        "missing_rate": "amount returned unconverted",
    })
}

// ---------------------------------------------------------------------------
// Loan expressed in a display currency
// ---------------------------------------------------------------------------

#[cfg(feature = "amortization")]
fn default_base_currency() -> CurrencyCode {
    DEFAULT_BASE_CURRENCY.to_string()
}

#[cfg(feature = "amortization")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanConversionInput {
    #[serde(flatten)]
    pub loan: LoanSpecification,
    /// Currency the loan is denominated in.
    #[serde(default = "default_base_currency")]
    pub from_currency: CurrencyCode,
    /// Display currency.
    pub to_currency: CurrencyCode,
    pub rates: ExchangeRateTable,
}

#[cfg(feature = "amortization")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertedLoanOutput {
    pub from_currency: CurrencyCode,
    pub to_currency: CurrencyCode,
    pub applied_rate: Rate,
    pub fallback_applied: bool,
    #[serde(flatten)]
    pub loan: LoanOutput,
}

/// Compute a loan and express its installment, totals and schedule in
/// `to_currency`. The engine itself always runs in `from_currency`.
#[cfg(feature = "amortization")]
pub fn convert_loan(
    input: &LoanConversionInput,
) -> LoanCalcResult<ComputationOutput<ConvertedLoanOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let native = build_loan_output(&input.loan, &mut warnings)?;
    let (from, to) = (input.from_currency.as_str(), input.to_currency.as_str());
    let (applied_rate, fallback_applied) = resolve_pair(from, to, &input.rates, &mut warnings);

    let loan = LoanOutput {
        emi: checked_convert(native.emi, from, to, &input.rates)?,
        term_months: native.term_months,
        monthly_rate: native.monthly_rate,
        total_payment: checked_convert(native.total_payment, from, to, &input.rates)?,
        total_interest: checked_convert(native.total_interest, from, to, &input.rates)?,
        schedule: convert_schedule(&native.schedule, from, to, &input.rates)?,
    };

    let output = ConvertedLoanOutput {
        from_currency: input.from_currency.clone(),
        to_currency: input.to_currency.clone(),
        applied_rate,
        fallback_applied,
        loan,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Equated monthly installment, converted by pivot through the base currency",
        &pivot_assumptions(&input.rates),
        warnings,
        elapsed,
        output,
    ))
}
