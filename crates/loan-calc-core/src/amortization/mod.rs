pub mod installment;
pub mod loan;
pub mod schedule;
