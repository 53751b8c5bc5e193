//! Calendar date-range extraction
//!
//! Recognizes three shapes: "January 2025", a bare "2025", and
//! "January to March 2025". Everything else is a non-match.

use crate::error::Result;
use chrono::{Months, NaiveDate};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

const MONTH_NAMES: &str = "january|february|march|april|may|june|july|august|september|october|\
                           november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec";

/// Inclusive calendar range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Full calendar month
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let end = last_day_of_month(start)?;
        Some(Self { start, end })
    }

    /// Full calendar year
    pub fn year(year: i32) -> Option<Self> {
        Some(Self {
            start: NaiveDate::from_ymd_opt(year, 1, 1)?,
            end: NaiveDate::from_ymd_opt(year, 12, 31)?,
        })
    }

    /// From the first day of one month to the last day of another
    pub fn months(start_year: i32, start_month: u32, end_year: i32, end_month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(start_year, start_month, 1)?;
        let end = last_day_of_month(NaiveDate::from_ymd_opt(end_year, end_month, 1)?)?;
        if end < start {
            return None;
        }
        Some(Self { start, end })
    }
}

fn last_day_of_month(first: NaiveDate) -> Option<NaiveDate> {
    first.checked_add_months(Months::new(1))?.pred_opt()
}

/// Pre-compiled date patterns
pub struct DateExtractor {
    month_range: Regex,
    month_year: Regex,
    bare_year: Regex,
}

impl DateExtractor {
    pub fn new() -> Result<Self> {
        let month_range = RegexBuilder::new(&format!(
            r"\b({MONTH_NAMES})\.?\s*(\d{{4}})?\s*(?:to|through|until|thru|[-–])\s*({MONTH_NAMES})\.?\s+(\d{{4}})\b"
        ))
        .case_insensitive(true)
        .build()?;

        let month_year = RegexBuilder::new(&format!(r"\b({MONTH_NAMES})\.?\s+(\d{{4}})\b"))
            .case_insensitive(true)
            .build()?;

        let bare_year = Regex::new(r"\b(19\d{2}|20\d{2})\b")?;

        Ok(Self {
            month_range,
            month_year,
            bare_year,
        })
    }

    /// Extract the first recognized range; `None` on no match or malformed
    /// components
    pub fn extract(&self, text: &str) -> Option<DateRange> {
        // Most specific pattern first
        if let Some(caps) = self.month_range.captures(text) {
            let start_month = month_number(caps.get(1)?.as_str())?;
            let end_month = month_number(caps.get(3)?.as_str())?;
            let end_year: i32 = caps.get(4)?.as_str().parse().ok()?;
            let start_year = match caps.get(2) {
                Some(y) => y.as_str().parse().ok()?,
                None => end_year,
            };
            return DateRange::months(start_year, start_month, end_year, end_month);
        }

        if let Some(caps) = self.month_year.captures(text) {
            let month = month_number(caps.get(1)?.as_str())?;
            let year: i32 = caps.get(2)?.as_str().parse().ok()?;
            return DateRange::month(year, month);
        }

        if let Some(caps) = self.bare_year.captures(text) {
            let year: i32 = caps.get(1)?.as_str().parse().ok()?;
            return DateRange::year(year);
        }

        None
    }
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    let number = match lower.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(number)
}
