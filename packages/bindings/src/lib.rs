use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;

use loan_calc_core::amortization::{installment, loan, schedule};
use loan_calc_core::currency::{conversion, rates};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortisation
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_loan(input_json: String) -> NapiResult<String> {
    let input: loan::LoanSpecification =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan::calculate_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// EMI as a decimal string.
#[napi]
pub fn monthly_installment(input_json: String) -> NapiResult<String> {
    let input: loan::LoanSpecification =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let emi = installment::compute_monthly_installment(&input).map_err(to_napi_error)?;
    Ok(emi.to_string())
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: loan::LoanSpecification =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let rows = schedule::generate_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&rows).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

/// Convert a decimal-string amount with a rate document (bare table or
/// provider payload). Missing currencies leave the amount unchanged.
#[napi]
pub fn convert_amount(
    amount: String,
    from_currency: String,
    to_currency: String,
    rates_json: String,
) -> NapiResult<String> {
    let amount: Decimal = amount.trim().parse().map_err(to_napi_error)?;
    let table = rates::parse_rate_document(&rates_json).map_err(to_napi_error)?;
    let converted = conversion::checked_convert(amount, &from_currency, &to_currency, &table)
        .map_err(to_napi_error)?;
    Ok(converted.to_string())
}

#[napi]
pub fn convert_loan(input_json: String) -> NapiResult<String> {
    let input: conversion::LoanConversionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = conversion::convert_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn available_currencies(rates_json: String) -> NapiResult<Vec<String>> {
    let table = rates::parse_rate_document(&rates_json).map_err(to_napi_error)?;
    Ok(table.currencies().into_iter().map(String::from).collect())
}
