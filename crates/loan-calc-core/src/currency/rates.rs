use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::LoanCalcError;
use crate::types::{CurrencyCode, Rate};
use crate::LoanCalcResult;

/// Exchange rates quoted against a single base currency (base = 1).
///
/// Serialises as a plain `{ "USD": 1, "EUR": 0.9, ... }` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeRateTable {
    rates: BTreeMap<CurrencyCode, Rate>,
}

impl ExchangeRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_rate(mut self, code: impl Into<CurrencyCode>, rate: Rate) -> Self {
        self.rates.insert(code.into(), rate);
        self
    }

    /// Rate for `code`, treating zero and negative quotes as missing.
    pub fn rate(&self, code: &str) -> Option<Rate> {
        self.rates
            .get(code)
            .copied()
            .filter(|r| *r > Decimal::ZERO)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rate(code).is_some()
    }

    /// Currency codes with a usable rate, in code order.
    pub fn currencies(&self) -> Vec<&str> {
        self.iter().map(|(code, _)| code).collect()
    }

    /// The currency quoted at exactly 1, if the table has one.
    pub fn base_currency(&self) -> Option<&str> {
        self.iter()
            .find(|(_, rate)| *rate == Decimal::ONE)
            .map(|(code, _)| code)
    }

    /// Usable (code, rate) pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Rate)> {
        self.rates
            .iter()
            .filter(|(_, r)| **r > Decimal::ZERO)
            .map(|(code, r)| (code.as_str(), *r))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<(CurrencyCode, Rate)> for ExchangeRateTable {
    fn from_iter<I: IntoIterator<Item = (CurrencyCode, Rate)>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}

/// Payload returned by the exchange-rate provider's `latest/<BASE>` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// "success" or "error".
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_code: Option<CurrencyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_last_update_utc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_rates: Option<ExchangeRateTable>,
    #[serde(
        default,
        rename = "error-type",
        skip_serializing_if = "Option::is_none"
    )]
    pub error_type: Option<String>,
}

impl ProviderResponse {
    /// Extract the rate table from a successful payload.
    pub fn into_table(self) -> LoanCalcResult<ExchangeRateTable> {
        if self.result != "success" {
            let detail = self.error_type.unwrap_or_else(|| self.result.clone());
            return Err(LoanCalcError::RateSource(format!(
                "Failed to fetch exchange rates: {detail}"
            )));
        }
        let table = self.conversion_rates.ok_or_else(|| {
            LoanCalcError::RateSource("Successful response carried no conversion_rates".into())
        })?;

        if let Some(base) = &self.base_code {
            if table.rate(base) != Some(Decimal::ONE) {
                log::warn!("provider base {base} is not quoted at 1 in its own table");
            }
        }
        Ok(table)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RateDocument {
    Provider(ProviderResponse),
    Table(ExchangeRateTable),
}

/// Read a rate table from either a provider payload or a bare `{code: rate}` object.
pub fn rate_table_from_value(value: serde_json::Value) -> LoanCalcResult<ExchangeRateTable> {
    let document: RateDocument = serde_json::from_value(value)?;
    let table = match document {
        RateDocument::Provider(response) => response.into_table()?,
        RateDocument::Table(table) => table,
    };

    let unusable = table.rates.len() - table.len();
    if unusable > 0 {
        log::warn!("{unusable} non-positive rate(s) in table will be treated as missing");
    }
    log::debug!(
        "loaded {} exchange rates (base: {})",
        table.len(),
        table.base_currency().unwrap_or("unknown")
    );
    Ok(table)
}

/// JSON text flavour of [`rate_table_from_value`].
pub fn parse_rate_document(json: &str) -> LoanCalcResult<ExchangeRateTable> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    rate_table_from_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rate_lookup() {
        let table = ExchangeRateTable::new()
            .with_rate("USD", dec!(1))
            .with_rate("EUR", dec!(0.9))
            .with_rate("BAD", Decimal::ZERO);
        assert_eq!(table.rate("EUR"), Some(dec!(0.9)));
        assert_eq!(table.rate("GBP"), None);
        assert_eq!(table.rate("BAD"), None);
        assert_eq!(table.len(), 2);
        assert_eq!(table.currencies(), vec!["EUR", "USD"]);
        assert_eq!(table.base_currency(), Some("USD"));
    }

    #[test]
    fn test_collect_from_pairs() {
        let table: ExchangeRateTable = [
            ("USD".to_string(), dec!(1)),
            ("GBP".to_string(), dec!(0.79)),
        ]
        .into_iter()
        .collect();
        assert_eq!(table.rate("GBP"), Some(dec!(0.79)));
        assert!(!table.is_empty());
    }

    #[test]
    fn test_parse_bare_table() {
        let table = parse_rate_document(r#"{"USD": 1, "EUR": 0.9, "JPY": 151.2}"#).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.rate("JPY"), Some(dec!(151.2)));
    }

    #[test]
    fn test_parse_provider_payload() {
        let json = r#"{
            "result": "success",
            "documentation": "https://www.exchangerate-api.com/docs",
            "time_last_update_utc": "Fri, 27 Mar 2020 00:00:00 +0000",
            "base_code": "USD",
            "conversion_rates": {"USD": 1, "AUD": 1.4817, "EUR": 0.9013}
        }"#;
        let table = parse_rate_document(json).unwrap();
        assert_eq!(table.base_currency(), Some("USD"));
        assert_eq!(table.rate("AUD"), Some(dec!(1.4817)));
    }

    #[test]
    fn test_parse_provider_error() {
        let json = r#"{"result": "error", "error-type": "invalid-key"}"#;
        match parse_rate_document(json).unwrap_err() {
            LoanCalcError::RateSource(msg) => assert!(msg.contains("invalid-key")),
            e => panic!("Expected RateSource, got {e:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_non_numeric_rates() {
        assert!(parse_rate_document(r#"{"USD": "one"}"#).is_err());
    }

    #[test]
    fn test_serialises_as_plain_object() {
        let table = ExchangeRateTable::new().with_rate("USD", dec!(1));
        let value = serde_json::to_value(&table).unwrap();
        assert!(value.is_object());
        assert!(value.get("USD").is_some());
    }
}
