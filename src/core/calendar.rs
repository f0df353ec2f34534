//! Calendar helpers.
//!
//! Dates are opaque calendar-day keys: no time zone is ever applied. Months are
//! represented by their first day so they can be used as a unique key.

use crate::errors::{Error, Result};
use chrono::{Datelike, NaiveDate};

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` entry date.
///
/// # Errors
/// Returns [`Error::Validation`] when the text is not a real calendar date.
pub fn parse_entry_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DAY_FORMAT)
        .map_err(|e| Error::validation(format!("invalid date '{text}': {e}")))
}

/// Parses a month given as `YYYY-MM` or as any `YYYY-MM-DD` inside it, and
/// normalizes it to the first day of that month.
///
/// # Errors
/// Returns [`Error::Validation`] when neither form parses.
pub fn parse_month(text: &str) -> Result<NaiveDate> {
    let trimmed = text.trim();
    let day = NaiveDate::parse_from_str(trimmed, DAY_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(&format!("{trimmed}-01"), DAY_FORMAT))
        .map_err(|e| Error::validation(format!("invalid month '{text}': {e}")))?;
    Ok(first_of_month(day))
}

/// First day of the month containing `date`.
#[must_use]
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Whether two dates fall in the same year and month.
#[must_use]
pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// `YYYY-MM` label for the month containing `date`.
#[must_use]
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}
