use crate::error::ExtractError;
use crate::responses::{parse_rate_elements, RawRate};
use chrono::{NaiveDate, NaiveTime, Timelike};
use core_types::{CurrencyPair, RateRecord, RateSeries};
use rust_decimal::Decimal;
use std::str::FromStr;

/// The hour from which the provider publishes the evening clearing fixing.
pub const EVENING_CLEARING_HOUR: u32 = 18;

/// Turns a provider payload into the evening clearing series of one pair.
#[derive(Debug, Clone, Copy)]
pub struct RateExtractor {
    clearing_hour: u32,
}

impl Default for RateExtractor {
    fn default() -> Self {
        Self::new(EVENING_CLEARING_HOUR)
    }
}

impl RateExtractor {
    pub fn new(clearing_hour: u32) -> Self {
        Self { clearing_hour }
    }

    /// Parses every `<rate>` element and keeps the ones published at or after the
    /// clearing hour, in payload order. Every record is validated, including the
    /// ones that are filtered out.
    pub fn extract(&self, pair: &CurrencyPair, payload: &str) -> Result<RateSeries, ExtractError> {
        let raw_rates = parse_rate_elements(payload)?;
        let total = raw_rates.len();

        let mut series = RateSeries::new(pair.clone());
        for (index, raw) in raw_rates.into_iter().enumerate() {
            let record = parse_record(&raw)
                .map_err(|reason| ExtractError::MalformedRecord { index, reason })?;
            if record.time.hour() < self.clearing_hour {
                continue;
            }
            series.push(record);
        }

        tracing::debug!(
            pair = %pair,
            total,
            kept = series.len(),
            "Extracted evening clearing fixings."
        );
        Ok(series)
    }
}

fn parse_record(raw: &RawRate) -> Result<RateRecord, String> {
    let moment = raw
        .moment
        .as_deref()
        .ok_or_else(|| "missing 'moment' attribute".to_string())?;
    let value = raw
        .value
        .as_deref()
        .ok_or_else(|| "missing 'value' attribute".to_string())?;

    let (date, time) = parse_moment(moment)?;
    let value = parse_value(value)?;

    Ok(RateRecord { date, time, value })
}

/// Splits `YYYY-MM-DD HH:MM:SS` on its single space, then each half on its delimiter.
fn parse_moment(moment: &str) -> Result<(NaiveDate, NaiveTime), String> {
    let invalid = || format!("moment '{moment}' is not of the form YYYY-MM-DD HH:MM:SS");

    let (date, time) = moment.split_once(' ').ok_or_else(invalid)?;
    let [year, month, day] = split_numbers(date, '-').ok_or_else(invalid)?;
    let [hour, minute, second] = split_numbers(time, ':').ok_or_else(invalid)?;

    let date = i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month, day))
        .ok_or_else(invalid)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(invalid)?;
    Ok((date, time))
}

fn split_numbers(text: &str, delimiter: char) -> Option<[u32; 3]> {
    let mut parts = text.split(delimiter);
    let mut numbers = [0u32; 3];
    for slot in &mut numbers {
        let part = parts.next()?;
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    match parts.next() {
        Some(_) => None,
        None => Some(numbers),
    }
}

fn parse_value(value: &str) -> Result<Decimal, String> {
    let trimmed = value.trim();
    let parsed = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| format!("value '{value}' is not a number"))?;
    if parsed <= Decimal::ZERO {
        return Err(format!("value '{value}' is not a positive rate"));
    }
    Ok(parsed)
}
