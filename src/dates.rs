use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("Invalid date key '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Invalid month key '{0}', expected YYYY-MM")]
    InvalidMonth(String),
}

/// A calendar day identified by its local calendar fields, rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Today's date according to the local clock (never UTC)
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn month(&self) -> MonthKey {
        MonthKey::from_date(self.0)
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day()
        )
    }
}

impl FromStr for DateKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(3, '-');
        let fields = (
            parts.next().and_then(|p| p.parse::<i32>().ok()),
            parts.next().and_then(|p| p.parse::<u32>().ok()),
            parts.next().and_then(|p| p.parse::<u32>().ok()),
        );
        match fields {
            (Some(year), Some(month), Some(day)) if (MIN_YEAR..=MAX_YEAR).contains(&year) => {
                NaiveDate::from_ymd_opt(year, month, day)
                    .map(Self)
                    .ok_or_else(|| KeyParseError::InvalidDate(s.to_string()))
            }
            _ => Err(KeyParseError::InvalidDate(s.to_string())),
        }
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Years a date or month key may carry; keys are always four-digit `YYYY`
pub const MIN_YEAR: i32 = 0;
pub const MAX_YEAR: i32 = 9999;

/// A calendar month rendered as `YYYY-MM`. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Build a month key, rejecting months outside 1..=12 and years outside MIN_YEAR..=MAX_YEAR
    pub fn new(year: i32, month: u32) -> Option<Self> {
        ((MIN_YEAR..=MAX_YEAR).contains(&year) && (1..=12).contains(&month)).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// 1-based month number
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Shift by whole months, rolling the year over in either direction.
    /// Saturates at January of MIN_YEAR and December of MAX_YEAR.
    pub fn add_months(&self, n: i32) -> Self {
        let first = i64::from(MIN_YEAR) * 12;
        let last = i64::from(MAX_YEAR) * 12 + 11;
        let index = (i64::from(self.year) * 12 + i64::from(self.month) - 1 + i64::from(n)).clamp(first, last);
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// First day of the month, or None when the year is outside chrono's range
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| KeyParseError::InvalidMonth(s.to_string()))?;
        let year = year
            .parse::<i32>()
            .map_err(|_| KeyParseError::InvalidMonth(s.to_string()))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| KeyParseError::InvalidMonth(s.to_string()))?;
        Self::new(year, month).ok_or_else(|| KeyParseError::InvalidMonth(s.to_string()))
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_key_is_zero_padded() {
        let key = DateKey::new(NaiveDate::from_ymd_opt(2025, 3, 7).unwrap());
        assert_eq!(key.to_string(), "2025-03-07");
    }

    #[test]
    fn test_date_key_parse_normalizes() {
        let key: DateKey = "2025-3-7".parse().unwrap();
        assert_eq!(key.to_string(), "2025-03-07");
        assert!("2025-02-30".parse::<DateKey>().is_err());
        assert!("not-a-date".parse::<DateKey>().is_err());
    }

    #[test]
    fn test_month_key_rollover() {
        let anchor: MonthKey = "2025-11".parse().unwrap();
        assert_eq!(anchor.add_months(1).to_string(), "2025-12");
        assert_eq!(anchor.add_months(2).to_string(), "2026-01");
        assert_eq!(anchor.add_months(-11).to_string(), "2024-12");
        assert_eq!(anchor.add_months(-23).to_string(), "2023-12");
    }

    #[test]
    fn test_month_key_rejects_bad_month() {
        assert!("2025-13".parse::<MonthKey>().is_err());
        assert!("2025-00".parse::<MonthKey>().is_err());
        assert!("2025".parse::<MonthKey>().is_err());
        assert_eq!("2025-1".parse::<MonthKey>().unwrap().to_string(), "2025-01");
    }

    #[test]
    fn test_keys_reject_years_outside_four_digits() {
        assert!("2147483647-01".parse::<MonthKey>().is_err());
        assert!("10000-01".parse::<MonthKey>().is_err());
        assert!("-1-01".parse::<MonthKey>().is_err());
        assert!("10000-01-01".parse::<DateKey>().is_err());
        assert!(serde_json::from_str::<MonthKey>(r#""2147483647-01""#).is_err());
        assert_eq!("9999-12".parse::<MonthKey>().unwrap().to_string(), "9999-12");
    }

    #[test]
    fn test_add_months_saturates_at_year_bounds() {
        let last: MonthKey = "9999-12".parse().unwrap();
        assert_eq!(last.add_months(0), last);
        assert_eq!(last.add_months(1), last);
        assert_eq!(last.add_months(i32::MAX).to_string(), "9999-12");
        assert_eq!(last.add_months(-1).to_string(), "9999-11");

        let first: MonthKey = "0000-01".parse().unwrap();
        assert_eq!(first.add_months(i32::MIN).to_string(), "0000-01");
        assert_eq!(first.add_months(13).to_string(), "0001-02");
    }

    #[test]
    fn test_keys_as_json_map_keys() {
        use std::collections::BTreeMap;
        let mut map = BTreeMap::new();
        map.insert("2026-01".parse::<MonthKey>().unwrap(), 1);
        map.insert("2025-12".parse::<MonthKey>().unwrap(), 2);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"2025-12":2,"2026-01":1}"#);
        let back: BTreeMap<MonthKey, i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
