use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A calendar month, the period key for budgets and ledgers.
/// Rendered and parsed as `YYYY-MM` (e.g. "2024-01").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Result<Self, ParseMonthError> {
        if !(1..=12).contains(&month) {
            return Err(ParseMonthError::MonthOutOfRange);
        }
        if !(0..=9999).contains(&year) {
            return Err(ParseMonthError::InvalidFormat);
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The month immediately before this one.
    pub fn previous(&self) -> Month {
        if self.month == 1 {
            Month {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Month {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The month immediately after this one.
    pub fn next(&self) -> Month {
        if self.month == 12 {
            Month {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Month {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Midnight UTC on the first day of the month.
    pub fn start(&self) -> DateTime<Utc> {
        // Infallible: year/month are range-checked at construction.
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
    }

    /// Midnight UTC on the first day of the following month.
    /// Together with `start` this forms the half-open range `[start, end)`.
    pub fn end(&self) -> DateTime<Utc> {
        self.next().start()
    }
}

impl FromStr for Month {
    type Err = ParseMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s.split_once('-').ok_or(ParseMonthError::InvalidFormat)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(ParseMonthError::InvalidFormat);
        }
        let year: i32 = year.parse().map_err(|_| ParseMonthError::InvalidFormat)?;
        let month: u32 = month.parse().map_err(|_| ParseMonthError::InvalidFormat)?;
        Month::new(year, month)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseMonthError {
    InvalidFormat,
    MonthOutOfRange,
}

impl fmt::Display for ParseMonthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseMonthError::InvalidFormat => write!(f, "expected YYYY-MM"),
            ParseMonthError::MonthOutOfRange => write!(f, "month must be between 01 and 12"),
        }
    }
}

impl std::error::Error for ParseMonthError {}
