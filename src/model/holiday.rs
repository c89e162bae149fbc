use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::date::parse_date;

/// One row of the upstream holiday list. Only `date` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolidayEntry {
    pub date: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Calendar dates on which leave may neither start nor end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidaySet {
    dates: BTreeSet<NaiveDate>,
}

impl HolidaySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw upstream entries; unparseable dates are skipped.
    pub fn from_entries(entries: &[HolidayEntry]) -> Self {
        let mut dates = BTreeSet::new();
        for entry in entries {
            match parse_date(&entry.date) {
                Some(d) => {
                    dates.insert(d);
                }
                None => {
                    tracing::warn!(date = %entry.date, "Skipping holiday with unparseable date");
                }
            }
        }
        Self { dates }
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

impl FromIterator<NaiveDate> for HolidaySet {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self {
            dates: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(date: &str) -> HolidayEntry {
        HolidayEntry {
            date: date.to_string(),
            description: None,
        }
    }

    #[test]
    fn skips_unparseable_entries() {
        let set = HolidaySet::from_entries(&[entry("2025-08-17"), entry("not a date"), entry("")]);

        assert_eq!(set.len(), 1);
        assert!(set.contains(NaiveDate::from_ymd_opt(2025, 8, 17).unwrap()));
    }

    #[test]
    fn duplicate_dates_collapse() {
        let set = HolidaySet::from_entries(&[entry("2025-12-25"), entry("2025-12-25T00:00:00")]);
        assert_eq!(set.len(), 1);
    }
}
