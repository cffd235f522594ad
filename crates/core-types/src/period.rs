use crate::error::CoreError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A full calendar month, the unit a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportPeriod {
    /// The period covering `month` of `year`.
    pub fn for_month(year: i32, month: u32) -> Result<Self, CoreError> {
        let invalid = || CoreError::InvalidMonth(format!("{year}-{month}"));

        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|first_of_next| first_of_next.pred_opt())
            .ok_or_else(invalid)?;

        Ok(Self { start, end })
    }

    /// The full calendar month before the one `today` falls in.
    pub fn preceding(today: NaiveDate) -> Result<Self, CoreError> {
        let (year, month) = if today.month() == 1 {
            (today.year() - 1, 12)
        } else {
            (today.year(), today.month() - 1)
        };
        Self::for_month(year, month)
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }

    pub fn month(&self) -> u32 {
        self.start.month()
    }

    /// First day formatted for the provider query (`YYYY-M-D`, no zero padding).
    pub fn moment_start(&self) -> String {
        provider_date(self.start)
    }

    /// Last day formatted for the provider query.
    pub fn moment_end(&self) -> String {
        provider_date(self.end)
    }

    /// File name of the spreadsheet for this month, e.g. `Report_2026-9.xlsx`.
    pub fn artifact_name(&self) -> String {
        format!("Report_{}.xlsx", self)
    }
}

fn provider_date(date: NaiveDate) -> String {
    format!("{}-{}-{}", date.year(), date.month(), date.day())
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year(), self.month())
    }
}

/// Parses `YYYY-MM` (or `YYYY-M`).
impl FromStr for ReportPeriod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::for_month(year, month).map_err(|_| invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn preceding_covers_the_whole_previous_month() {
        let period = ReportPeriod::preceding(date(2026, 10, 15)).unwrap();
        assert_eq!(period.start, date(2026, 9, 1));
        assert_eq!(period.end, date(2026, 9, 30));
    }

    #[test]
    fn preceding_wraps_around_the_new_year() {
        let period = ReportPeriod::preceding(date(2027, 1, 1)).unwrap();
        assert_eq!(period.start, date(2026, 12, 1));
        assert_eq!(period.end, date(2026, 12, 31));
    }

    #[test]
    fn february_of_a_leap_year_ends_on_the_29th() {
        let period = ReportPeriod::preceding(date(2028, 3, 10)).unwrap();
        assert_eq!(period.end, date(2028, 2, 29));
    }

    #[test]
    fn provider_dates_and_file_name_are_not_zero_padded() {
        let period = ReportPeriod::for_month(2026, 9).unwrap();
        assert_eq!(period.moment_start(), "2026-9-1");
        assert_eq!(period.moment_end(), "2026-9-30");
        assert_eq!(period.artifact_name(), "Report_2026-9.xlsx");
    }

    #[test]
    fn parses_month_arguments() {
        assert_eq!(
            "2026-09".parse::<ReportPeriod>().unwrap(),
            ReportPeriod::for_month(2026, 9).unwrap()
        );
        assert!("2026-13".parse::<ReportPeriod>().is_err());
        assert!("september".parse::<ReportPeriod>().is_err());
    }
}
