pub mod currency;
pub mod loan;
