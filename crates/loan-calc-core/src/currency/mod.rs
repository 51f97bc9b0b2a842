pub mod conversion;
pub mod rates;
