//! Calendar month with `MM-YYYY` as its only public representation.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> AppResult<Self> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(AppError::ValidationError(format!(
                "Invalid month {month:02}-{year:04}"
            )));
        }
        Ok(Self { year, month })
    }

    /// Parses `MM-YYYY`: two month digits, a dash, four year digits.
    pub fn parse(s: &str) -> AppResult<Self> {
        let invalid =
            || AppError::ValidationError(format!("Invalid month '{s}', expected MM-YYYY"));

        let (mm, yyyy) = s.split_once('-').ok_or_else(invalid)?;
        if mm.len() != 2
            || yyyy.len() != 4
            || !mm.bytes().all(|b| b.is_ascii_digit())
            || !yyyy.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let month: u32 = mm.parse().map_err(|_| invalid())?;
        let year: i32 = yyyy.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }

    /// Parses a named request field, reporting the field name on failure.
    pub fn parse_field(field: &str, value: &str) -> AppResult<Self> {
        Self::parse(value).map_err(|_| {
            AppError::ValidationError(format!("Invalid {field} format, expected MM-YYYY"))
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Storage form: the first day of the month.
    pub fn first_day(&self) -> NaiveDate {
        // `new` already checked that day 1 exists
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month, self.year)
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
        Month::parse(&s).map_err(serde::de::Error::custom)
    }
}
