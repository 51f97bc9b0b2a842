use loan_calc_core::amortization::{installment, loan, schedule};
use loan_calc_core::LoanCalcError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn reference_loan() -> loan::LoanSpecification {
    // Default figures of the loan dashboard: 100k at 8.5% over 10 years
    loan::LoanSpecification::new(dec!(100000), dec!(8.5), dec!(10))
}

fn assorted_loans() -> Vec<loan::LoanSpecification> {
    vec![
        reference_loan(),
        loan::LoanSpecification::new(dec!(250000), dec!(6.75), dec!(30)),
        loan::LoanSpecification::new(dec!(5000), dec!(19.99), dec!(2)),
        loan::LoanSpecification::new(dec!(1), dec!(0.01), dec!(1)),
        loan::LoanSpecification::new(dec!(75000), Decimal::ZERO, dec!(7)),
        loan::LoanSpecification::new(dec!(12345.67), dec!(3.2), dec!(4.5)),
    ]
}

// ===========================================================================
// EMI
// ===========================================================================

#[test]
fn test_emi_reference_scenario() {
    let emi = installment::compute_monthly_installment(&reference_loan()).unwrap();
    // P r (1+r)^n / ((1+r)^n - 1) with r = 8.5/1200, n = 120
    assert!(
        (emi - dec!(1239.8569)).abs() < dec!(0.001),
        "EMI should be ~1239.86, got {}",
        emi
    );
}

#[test]
fn test_emi_zero_rate_exact() {
    let spec = loan::LoanSpecification::new(dec!(100000), Decimal::ZERO, dec!(10));
    let emi = installment::compute_monthly_installment(&spec).unwrap();
    assert_eq!(emi, dec!(100000) / dec!(120));
}

#[test]
fn test_emi_is_deterministic() {
    let a = installment::compute_monthly_installment(&reference_loan()).unwrap();
    let b = installment::compute_monthly_installment(&reference_loan()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_emi_invalid_inputs() {
    let cases = [
        (dec!(0), dec!(8.5), dec!(10), "principal"),
        (dec!(-100), dec!(8.5), dec!(10), "principal"),
        (dec!(1000), dec!(-1), dec!(10), "annual_rate_percent"),
        (dec!(1000), dec!(8.5), dec!(0), "term_years"),
        (dec!(1000), dec!(8.5), dec!(-2), "term_years"),
    ];
    for (principal, rate, years, expected_field) in cases {
        let spec = loan::LoanSpecification::new(principal, rate, years);
        match installment::compute_monthly_installment(&spec) {
            Err(LoanCalcError::InvalidInput { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("Expected InvalidInput on {expected_field}, got {other:?}"),
        }
    }
}

// ===========================================================================
// Schedule
// ===========================================================================

#[test]
fn test_schedule_reference_scenario() {
    let rows = schedule::generate_schedule(&reference_loan()).unwrap();
    assert_eq!(rows.len(), 120);

    let first = &rows[0];
    assert_eq!(first.period, 1);
    assert!(
        (first.interest_portion - dec!(708.33)).abs() < dec!(0.01),
        "First month interest should be ~708.33, got {}",
        first.interest_portion
    );
    assert!((first.principal_portion - dec!(531.52)).abs() < dec!(0.01));

    let last = rows.last().unwrap();
    assert_eq!(last.period, 120);
    assert_eq!(last.remaining_balance, Decimal::ZERO);
}

#[test]
fn test_schedule_principal_sums_to_loan() {
    for spec in assorted_loans() {
        let rows = schedule::generate_schedule(&spec).unwrap();
        let repaid = schedule::total_principal(&rows).unwrap();
        assert!(
            (repaid - spec.principal).abs() < dec!(0.000001),
            "Principal repaid {} differs from {}",
            repaid,
            spec.principal
        );
    }
}

#[test]
fn test_schedule_periods_contiguous_and_balance_non_increasing() {
    for spec in assorted_loans() {
        let rows = schedule::generate_schedule(&spec).unwrap();
        assert_eq!(rows.len() as u32, spec.term_months().unwrap());

        let mut previous = spec.principal;
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.period, i as u32 + 1);
            assert!(row.remaining_balance >= Decimal::ZERO);
            assert!(row.remaining_balance <= previous);
            previous = row.remaining_balance;
        }
        assert_eq!(rows.last().unwrap().remaining_balance, Decimal::ZERO);
    }
}

#[test]
fn test_schedule_rows_pay_the_installment() {
    for spec in assorted_loans() {
        let emi = installment::compute_monthly_installment(&spec).unwrap();
        let rows = schedule::generate_schedule(&spec).unwrap();
        for row in &rows {
            let paid = row.principal_portion + row.interest_portion;
            assert!(
                (paid - emi).abs() < dec!(0.0001),
                "Period {} paid {} against EMI {}",
                row.period,
                paid,
                emi
            );
        }
    }
}

#[test]
fn test_schedule_is_restartable() {
    let first = schedule::generate_schedule(&reference_loan()).unwrap();
    let second = schedule::generate_schedule(&reference_loan()).unwrap();
    assert_eq!(first, second);
    // Iterating twice over the same container yields the same rows
    let a: Vec<u32> = first.iter().map(|r| r.period).collect();
    let b: Vec<u32> = first.iter().map(|r| r.period).collect();
    assert_eq!(a, b);
}

#[test]
fn test_fractional_year_term_rounds_to_nearest_month() {
    // 10.5 years is a whole 126 months; 10.54 years is 126.48 -> 126
    for years in [dec!(10.5), dec!(10.54)] {
        let spec = loan::LoanSpecification::new(dec!(100000), dec!(8.5), years);
        let rows = schedule::generate_schedule(&spec).unwrap();
        assert_eq!(rows.len(), 126);
    }
}

// ===========================================================================
// Enveloped loan calculation
// ===========================================================================

#[test]
fn test_calculate_loan_envelope() {
    let out = loan::calculate_loan(&reference_loan()).unwrap();
    assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    assert!(out.methodology.contains("installment"));

    let r = &out.result;
    assert_eq!(r.term_months, 120);
    // 120 * 1239.86 ≈ 148,782.83 paid in total
    assert!((r.total_payment - dec!(148782.83)).abs() < dec!(0.05));
    assert!((r.total_interest - dec!(48782.83)).abs() < dec!(0.05));
}

#[test]
fn test_calculate_loan_serialises_schedule() {
    let out = loan::calculate_loan(&loan::LoanSpecification::new(
        dec!(1200),
        Decimal::ZERO,
        dec!(1),
    ))
    .unwrap();
    let value = serde_json::to_value(&out).unwrap();
    let rows = value["result"]["schedule"].as_array().unwrap();
    assert_eq!(rows.len(), 12);
    assert_eq!(rows[0]["period"], 1);
    assert!(rows[0].get("remaining_balance").is_some());
    assert!(out.warnings.iter().any(|w| w.contains("Zero interest rate")));
}

#[test]
fn test_calculate_loan_overflowing_totals_are_reported() {
    let huge = dec!(30000000000000000000000000000);
    let spec = loan::LoanSpecification::new(huge, dec!(12), dec!(30));
    assert!(schedule::generate_schedule(&spec).is_ok());
    assert!(matches!(
        loan::calculate_loan(&spec),
        Err(LoanCalcError::FinancialImpossibility(_))
    ));
}
