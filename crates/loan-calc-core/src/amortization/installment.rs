use crate::amortization::loan::LoanSpecification;
use crate::time_value::annuity_payment;
use crate::types::Money;
use crate::LoanCalcResult;

/// Equated monthly installment for a loan.
///
/// EMI = P * r * (1+r)^n / ((1+r)^n - 1) with r the monthly rate and n the
/// term in months. A zero rate pays the principal off in n equal parts.
pub fn compute_monthly_installment(spec: &LoanSpecification) -> LoanCalcResult<Money> {
    spec.validate()?;
    let periods = spec.term_months()?;
    annuity_payment(spec.monthly_rate(), periods, spec.principal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoanCalcError;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_emi_reference_loan() {
        let loan = LoanSpecification::new(dec!(100000), dec!(8.5), dec!(10));
        let emi = compute_monthly_installment(&loan).unwrap();
        assert!(
            (emi - dec!(1239.86)).abs() < dec!(0.01),
            "EMI should be ~1239.86, got {emi}"
        );
    }

    #[test]
    fn test_emi_zero_rate_is_straight_line() {
        let loan = LoanSpecification::new(dec!(60000), Decimal::ZERO, dec!(5));
        assert_eq!(compute_monthly_installment(&loan).unwrap(), dec!(1000));
    }

    #[test]
    fn test_emi_rejects_zero_term() {
        let loan = LoanSpecification::new(dec!(1000), dec!(5), Decimal::ZERO);
        let err = compute_monthly_installment(&loan).unwrap_err();
        assert!(matches!(err, LoanCalcError::InvalidInput { .. }));
    }

    #[test]
    fn test_emi_absurd_rate_is_not_a_panic() {
        let loan = LoanSpecification::new(dec!(1000), dec!(5000), dec!(30));
        let err = compute_monthly_installment(&loan).unwrap_err();
        assert!(matches!(err, LoanCalcError::FinancialImpossibility(_)));
    }
}
