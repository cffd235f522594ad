use crate::error::CoreError;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A provider currency code such as `USD/RUB`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyPair(String);

impl CurrencyPair {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CurrencyPair {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let valid = match trimmed.split_once('/') {
            Some((base, quote)) => {
                !base.is_empty()
                    && !quote.is_empty()
                    && base.chars().all(|c| c.is_ascii_alphabetic())
                    && quote.chars().all(|c| c.is_ascii_alphabetic())
            }
            None => false,
        };
        if !valid {
            return Err(CoreError::InvalidInput(
                "currency pair".to_string(),
                format!("'{s}' is not of the form BASE/QUOTE"),
            ));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for CurrencyPair {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyPair> for String {
    fn from(pair: CurrencyPair) -> Self {
        pair.0
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One observed fixing from the provider feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRecord {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub value: Decimal,
}

/// The fixings of a single currency pair, in provider emission order.
///
/// The series is never re-sorted or deduplicated: what the extractor appends is
/// exactly what the renderer lays out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSeries {
    pub pair: CurrencyPair,
    records: Vec<RateRecord>,
}

impl RateSeries {
    pub fn new(pair: CurrencyPair) -> Self {
        Self {
            pair,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: RateRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[RateRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&RateRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RateRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a RateSeries {
    type Item = &'a RateRecord;
    type IntoIter = std::slice::Iter<'a, RateRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn currency_pair_is_normalized_to_uppercase() {
        let pair: CurrencyPair = " usd/rub ".parse().unwrap();
        assert_eq!(pair.as_str(), "USD/RUB");
        assert_eq!(pair.to_string(), "USD/RUB");
    }

    #[test]
    fn currency_pair_rejects_malformed_codes() {
        for bad in ["USDRUB", "/RUB", "USD/", "US1/RUB", ""] {
            assert!(bad.parse::<CurrencyPair>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn currency_pair_deserializes_through_validation() {
        let pair: CurrencyPair = serde_json::from_str("\"JPY/RUB\"").unwrap();
        assert_eq!(pair.as_str(), "JPY/RUB");
        assert!(serde_json::from_str::<CurrencyPair>("\"JPYRUB\"").is_err());
    }

    #[test]
    fn series_keeps_insertion_order() {
        let mut series = RateSeries::new("USD/RUB".parse().unwrap());
        let later = RateRecord {
            date: NaiveDate::from_ymd_opt(2026, 9, 2).unwrap(),
            time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            value: dec!(91.5),
        };
        let earlier = RateRecord {
            date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            value: dec!(90.25),
        };
        series.push(later.clone());
        series.push(earlier.clone());

        assert_eq!(series.len(), 2);
        assert_eq!(series.records(), &[later, earlier]);
    }
}
