//! Date keys - storage key for day records and lookup key for holidays
//!
//! The two keys use different formats and are never interchanged:
//! - `DayKey`: numeric month, day and year with separators removed (`10162026`)
//! - `HolidayDateKey`: long month name and unpadded day (`October 16`)

use std::fmt;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Key of a day record under `_randomizerData`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(String);

impl DayKey {
    pub fn for_date(date: NaiveDate) -> Self {
        Self(format!("{}{}{}", date.month(), date.day(), date.year()))
    }

    /// Key for the local calendar day
    pub fn today() -> Self {
        Self::for_date(Local::now().date_naive())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DayKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Holiday dataset lookup key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolidayDateKey(String);

impl HolidayDateKey {
    pub fn for_date(date: NaiveDate) -> Self {
        Self(format!("{} {}", date.format("%B"), date.day()))
    }

    pub fn today() -> Self {
        Self::for_date(Local::now().date_naive())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HolidayDateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
