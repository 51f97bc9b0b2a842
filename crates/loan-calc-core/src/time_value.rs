use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::LoanCalcError;
use crate::types::{Money, Percent, Rate, Years};
use crate::LoanCalcResult;

pub const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Longest loan the engine will lay out (100 years of monthly periods).
pub const MAX_TERM_MONTHS: u32 = 1200;

/// Monthly fractional rate from an annual percentage: 8.5 -> 0.0070833...
pub fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent / MONTHS_PER_YEAR / dec!(100)
}

/// Number of monthly periods in a term given in years.
///
/// Terms that do not land on a whole month (10.55 years = 126.6 months) are
/// rounded to the nearest month, midpoint away from zero.
pub fn term_months(term_years: Years) -> LoanCalcResult<u32> {
    if term_years <= Decimal::ZERO {
        return Err(LoanCalcError::InvalidInput {
            field: "term_years".into(),
            reason: "Loan term must be positive".into(),
        });
    }

    let months = term_years
        .checked_mul(MONTHS_PER_YEAR)
        .ok_or_else(|| LoanCalcError::InvalidInput {
            field: "term_years".into(),
            reason: "Loan term is out of range".into(),
        })?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    if months.is_zero() {
        return Err(LoanCalcError::InvalidInput {
            field: "term_years".into(),
            reason: "Loan term must cover at least one month".into(),
        });
    }

    match months.to_u32() {
        Some(n) if n <= MAX_TERM_MONTHS => Ok(n),
        _ => Err(LoanCalcError::InvalidInput {
            field: "term_years".into(),
            reason: format!("Loan term exceeds the {MAX_TERM_MONTHS}-month schedule limit"),
        }),
    }
}

/// True when `term_years * 12` is not a whole number of months.
pub fn has_partial_month(term_years: Years) -> bool {
    term_years
        .checked_mul(MONTHS_PER_YEAR)
        .map(|m| !m.fract().is_zero())
        .unwrap_or(false)
}

/// (1 + r)^n by iterative multiplication.
pub fn compound_factor(rate: Rate, periods: u32) -> LoanCalcResult<Decimal> {
    let base = Decimal::ONE + rate;
    let mut factor = Decimal::ONE;
    for _ in 0..periods {
        factor = factor.checked_mul(base).ok_or_else(|| {
            LoanCalcError::FinancialImpossibility(format!(
                "(1 + {rate})^{periods} exceeds the representable range"
            ))
        })?;
    }
    Ok(factor)
}

/// Level payment that amortises `principal` over `periods` at `rate` per period.
///
/// P * r * (1+r)^n / ((1+r)^n - 1), or P / n when the rate is zero.
pub fn annuity_payment(rate: Rate, periods: u32, principal: Money) -> LoanCalcResult<Money> {
    if periods == 0 {
        return Err(LoanCalcError::InvalidInput {
            field: "periods".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    let n = Decimal::from(periods);
    if rate.is_zero() {
        return Ok(principal / n);
    }

    let factor = compound_factor(rate, periods)?;
    let growth = factor - Decimal::ONE;

    // Rates below the 28-digit resolution leave the factor at exactly 1.
    if growth.is_zero() {
        log::debug!("rate {rate} vanishes over {periods} periods; using straight-line payment");
        return Ok(principal / n);
    }

    let per_unit = rate
        .checked_mul(factor)
        .map(|x| x / growth)
        .ok_or_else(|| {
            LoanCalcError::FinancialImpossibility(format!(
                "annuity factor at rate {rate} over {periods} periods is out of range"
            ))
        })?;

    principal.checked_mul(per_unit).ok_or_else(|| {
        LoanCalcError::FinancialImpossibility("installment exceeds the representable range".into())
    })
}
