use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::warn;

use crate::dates::DateKey;

/// Korean public holidays (including substitute holidays) for 2025 and 2026.
/// Temporary holidays and election days are not included.
const KOREAN_HOLIDAYS: &[&str] = &[
    // 2025
    "2025-01-01",
    "2025-01-27",
    "2025-01-28",
    "2025-01-29",
    "2025-01-30",
    "2025-03-01",
    "2025-03-03",
    "2025-05-05",
    "2025-05-06",
    "2025-06-06",
    "2025-08-15",
    "2025-10-03",
    "2025-10-05",
    "2025-10-06",
    "2025-10-07",
    "2025-10-08",
    "2025-10-09",
    "2025-12-25",
    // 2026
    "2026-01-01",
    "2026-02-16",
    "2026-02-17",
    "2026-02-18",
    "2026-03-01",
    "2026-03-02",
    "2026-05-05",
    "2026-05-24",
    "2026-05-25",
    "2026-06-06",
    "2026-08-15",
    "2026-08-17",
    "2026-09-24",
    "2026-09-25",
    "2026-09-26",
    "2026-10-03",
    "2026-10-05",
    "2026-10-09",
    "2026-12-25",
];

/// Read-only set of holiday dates. Built once at startup.
#[derive(Debug, Clone)]
pub struct HolidaySet {
    dates: HashSet<NaiveDate>,
}

impl HolidaySet {
    /// The built-in Korean holiday list
    pub fn korean() -> Self {
        let dates = KOREAN_HOLIDAYS
            .iter()
            .filter_map(|raw| raw.parse::<DateKey>().ok())
            .map(|key| key.date())
            .collect();
        Self { dates }
    }

    /// Merge extra `YYYY-MM-DD` strings (from config). Unparseable entries are skipped.
    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for raw in extra {
            match raw.as_ref().parse::<DateKey>() {
                Ok(key) => {
                    self.dates.insert(key.date());
                }
                Err(e) => warn!("Ignoring extra holiday: {e}"),
            }
        }
        self
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl Default for HolidaySet {
    fn default() -> Self {
        Self::korean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse::<DateKey>().unwrap().date()
    }

    #[test]
    fn test_builtin_list_is_complete() {
        let set = HolidaySet::korean();
        assert_eq!(set.len(), KOREAN_HOLIDAYS.len());
        assert!(set.contains(date("2025-10-06")));
        assert!(set.contains(date("2026-09-25")));
        assert!(!set.contains(date("2025-10-10")));
    }

    #[test]
    fn test_extra_holidays_are_merged() {
        let set = HolidaySet::korean().with_extra(["2027-01-01", "garbage"]);
        assert!(set.contains(date("2027-01-01")));
        assert_eq!(set.len(), KOREAN_HOLIDAYS.len() + 1);
    }
}
