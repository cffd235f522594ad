use core_types::{CurrencyPair, RateRecord, RateSeries, RowAlignment};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashSet;

/// Number of columns in the report: `[date, rate, time]` per pair plus the ratio.
pub const COLUMN_COUNT: usize = 7;

/// Spreadsheet column letters of the two value cells the ratio formula divides.
const FIRST_VALUE_COLUMN: char = 'B';
const SECOND_VALUE_COLUMN: char = 'E';

/// One data row of the report. Either side is `None` when its series has no
/// record for this row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub first: Option<RateRecord>,
    pub second: Option<RateRecord>,
}

impl ReportRow {
    /// `first / second` when both sides are present.
    pub fn ratio(&self) -> Option<Decimal> {
        match (&self.first, &self.second) {
            (Some(first), Some(second)) => first.value.checked_div(second.value),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.first.is_some() && self.second.is_some()
    }
}

/// The two series laid out side by side, ready to be written or printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    pairs: [CurrencyPair; 2],
    rows: Vec<ReportRow>,
}

impl ReportTable {
    /// Joins the two series into rows. `first` always lands in the left column block.
    pub fn build(first: &RateSeries, second: &RateSeries, alignment: RowAlignment) -> Self {
        if first.len() != second.len() {
            tracing::warn!(
                first = %first.pair,
                first_len = first.len(),
                second = %second.pair,
                second_len = second.len(),
                ?alignment,
                "Rate series differ in length; rows without both rates get no ratio."
            );
        }

        let rows = match alignment {
            RowAlignment::Positional => positional_rows(first, second),
            RowAlignment::ByDate => rows_by_date(first, second),
        };

        Self {
            pairs: [first.pair.clone(), second.pair.clone()],
            rows,
        }
    }

    pub fn pairs(&self) -> &[CurrencyPair; 2] {
        &self.pairs
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Number of data rows, excluding the header.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn header(&self) -> [String; COLUMN_COUNT] {
        let [first, second] = &self.pairs;
        [
            format!("Дата {first}"),
            format!("Курс {first}"),
            format!("Время {first}"),
            format!("Дата {second}"),
            format!("Курс {second}"),
            format!("Время {second}"),
            "Результат".to_string(),
        ]
    }
}

/// The ratio formula for a one-based spreadsheet row, e.g. `=B2/E2`.
pub fn ratio_formula(sheet_row: u32) -> String {
    format!("={FIRST_VALUE_COLUMN}{sheet_row}/{SECOND_VALUE_COLUMN}{sheet_row}")
}

fn positional_rows(first: &RateSeries, second: &RateSeries) -> Vec<ReportRow> {
    let height = first.len().max(second.len());
    (0..height)
        .map(|index| ReportRow {
            first: first.get(index).cloned(),
            second: second.get(index).cloned(),
        })
        .collect()
}

fn rows_by_date(first: &RateSeries, second: &RateSeries) -> Vec<ReportRow> {
    let mut seen = HashSet::new();
    let dates: Vec<NaiveDate> = first
        .iter()
        .chain(second.iter())
        .map(|record| record.date)
        .filter(|date| seen.insert(*date))
        .collect();

    let find = |series: &RateSeries, date: NaiveDate| {
        series.iter().find(|record| record.date == date).cloned()
    };

    dates
        .into_iter()
        .map(|date| ReportRow {
            first: find(first, date),
            second: find(second, date),
        })
        .collect()
}
