use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::installment::compute_monthly_installment;
use crate::amortization::schedule::{
    schedule_with_installment, total_interest, total_payment, AmortizationSchedule,
};
use crate::error::LoanCalcError;
use crate::time_value;
use crate::types::*;
use crate::LoanCalcResult;

/// Loan terms as entered by the borrower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSpecification {
    /// Amount borrowed.
    #[serde(alias = "loan_amount")]
    pub principal: Money,
    /// Nominal annual rate as a percentage (8.5 = 8.5%).
    #[serde(alias = "interest_rate")]
    pub annual_rate_percent: Percent,
    /// Term in years; resolved to whole months.
    #[serde(alias = "loan_term")]
    pub term_years: Years,
}

impl LoanSpecification {
    pub fn new(principal: Money, annual_rate_percent: Percent, term_years: Years) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_years,
        }
    }

    /// Reject principal <= 0, negative rates and terms that resolve to no months.
    pub fn validate(&self) -> LoanCalcResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(LoanCalcError::InvalidInput {
                field: "principal".into(),
                reason: "Principal must be positive".into(),
            });
        }
        if self.annual_rate_percent < Decimal::ZERO {
            return Err(LoanCalcError::InvalidInput {
                field: "annual_rate_percent".into(),
                reason: "Interest rate cannot be negative".into(),
            });
        }
        time_value::term_months(self.term_years)?;
        Ok(())
    }

    pub fn monthly_rate(&self) -> Rate {
        time_value::monthly_rate(self.annual_rate_percent)
    }

    pub fn term_months(&self) -> LoanCalcResult<u32> {
        time_value::term_months(self.term_years)
    }
}

/// EMI, totals and the full schedule for one loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanOutput {
    pub emi: Money,
    pub term_months: u32,
    pub monthly_rate: Rate,
    pub total_payment: Money,
    pub total_interest: Money,
    pub schedule: AmortizationSchedule,
}

/// Compute the installment and amortisation schedule for a loan.
pub fn calculate_loan(spec: &LoanSpecification) -> LoanCalcResult<ComputationOutput<LoanOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let output = build_loan_output(spec, &mut warnings)?;

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "compounding": "monthly",
        "monthly_rate": "annual_rate_percent / 12 / 100",
        "term_resolution": "term_years * 12 rounded to the nearest month",
        "final_period": "principal portion retires the remaining balance",
    });

    Ok(with_metadata(
        "Equated monthly installment (level-payment annuity)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

pub(crate) fn build_loan_output(
    spec: &LoanSpecification,
    warnings: &mut Vec<String>,
) -> LoanCalcResult<LoanOutput> {
    let emi = compute_monthly_installment(spec)?;
    let term_months = spec.term_months()?;

    if time_value::has_partial_month(spec.term_years) {
        log::warn!(
            "term of {} years is not a whole number of months; using {} months",
            spec.term_years,
            term_months
        );
        warnings.push(format!(
            "Term of {} years rounded to {} monthly periods.",
            spec.term_years, term_months
        ));
    }
    if spec.annual_rate_percent.is_zero() {
        warnings.push("Zero interest rate: installment is principal / term_months.".into());
    }

    let schedule = schedule_with_installment(spec, emi)?;
    log::debug!(
        "loan {} at {}% over {} months: emi {}",
        spec.principal,
        spec.annual_rate_percent,
        term_months,
        emi
    );

    Ok(LoanOutput {
        emi,
        term_months,
        monthly_rate: spec.monthly_rate(),
        total_payment: total_payment(&schedule)?,
        total_interest: total_interest(&schedule)?,
        schedule,
    })
}
