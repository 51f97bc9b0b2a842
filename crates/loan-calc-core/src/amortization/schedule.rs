use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::installment::compute_monthly_installment;
use crate::amortization::loan::LoanSpecification;
use crate::error::LoanCalcError;
use crate::types::Money;
use crate::LoanCalcResult;

/// One month of the amortisation schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based month number.
    pub period: u32,
    pub principal_portion: Money,
    pub interest_portion: Money,
    /// Balance after this month's payment, never below zero.
    pub remaining_balance: Money,
}

/// Month-by-month breakdown of a loan, in period order.
pub type AmortizationSchedule = Vec<AmortizationRow>;

/// Lay out every monthly payment of a loan.
///
/// Each month accrues interest on the opening balance and applies the rest of
/// the installment to principal. All `term_months` rows are produced. The last
/// row's principal portion is the balance carried into it, so the loan closes
/// at exactly zero and the principal portions sum to the amount borrowed.
pub fn generate_schedule(spec: &LoanSpecification) -> LoanCalcResult<AmortizationSchedule> {
    let emi = compute_monthly_installment(spec)?;
    schedule_with_installment(spec, emi)
}

/// Schedule for an installment already produced by `compute_monthly_installment`.
pub(crate) fn schedule_with_installment(
    spec: &LoanSpecification,
    emi: Money,
) -> LoanCalcResult<AmortizationSchedule> {
    let rate = spec.monthly_rate();
    let periods = spec.term_months()?;

    let mut schedule = Vec::with_capacity(periods as usize);
    let mut balance = spec.principal;

    for period in 1..=periods {
        let interest_portion = balance * rate;
        let principal_portion = if period == periods {
            balance
        } else {
            emi - interest_portion
        };
        balance = (balance - principal_portion).max(Decimal::ZERO);

        schedule.push(AmortizationRow {
            period,
            principal_portion,
            interest_portion,
            remaining_balance: balance,
        });
    }

    Ok(schedule)
}

/// Sum of interest paid over the schedule.
pub fn total_interest(schedule: &[AmortizationRow]) -> LoanCalcResult<Money> {
    checked_sum(schedule.iter().map(|row| row.interest_portion), "interest")
}

/// Sum of principal repaid over the schedule.
pub fn total_principal(schedule: &[AmortizationRow]) -> LoanCalcResult<Money> {
    checked_sum(schedule.iter().map(|row| row.principal_portion), "principal")
}

/// Everything paid to the lender: principal plus interest.
pub fn total_payment(schedule: &[AmortizationRow]) -> LoanCalcResult<Money> {
    total_principal(schedule)?
        .checked_add(total_interest(schedule)?)
        .ok_or_else(|| overflow("payment"))
}

fn checked_sum(mut amounts: impl Iterator<Item = Money>, what: &str) -> LoanCalcResult<Money> {
    amounts.try_fold(Decimal::ZERO, |acc, amount| {
        acc.checked_add(amount).ok_or_else(|| overflow(what))
    })
}

fn overflow(what: &str) -> LoanCalcError {
    LoanCalcError::FinancialImpossibility(format!(
        "Total {what} over the schedule exceeds the representable range"
    ))
}
