use super::error::{Error, Result};
use chrono::{Datelike, Duration, Local, NaiveDate};
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive range of calendar days a command operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::validation(format!(
                "start date {} is after end date {}",
                start.format(DATE_FORMAT),
                end.format(DATE_FORMAT)
            )));
        }
        Ok(Self { start, end })
    }

    /// From the first day of the current month to today.
    pub fn current_month() -> Self {
        let today = Local::now().date_naive();
        Self {
            start: first_day_of_month(today),
            end: today,
        }
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }

    pub fn start_str(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }

    /// End date shifted by one day, for endpoints with an exclusive end.
    pub fn exclusive_end_str(&self) -> String {
        (self.end + Duration::days(1)).format(DATE_FORMAT).to_string()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start_str(), self.end_str())
    }
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Parses a `YYYY-MM-DD` date, naming the argument in the error.
pub fn parse_date(value: &str, which: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| Error::validation(format!("{which} date is not in the format YYYY-MM-DD")))
}
