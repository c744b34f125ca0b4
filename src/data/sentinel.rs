//! Sentinel date filtering
//!
//! Placeholder dates (data-entry defaults) are not real observations and
//! must be removed before any statistic is computed, otherwise they bias
//! the population mean and standard deviation.

use crate::data::BirthdateRecord;
use chrono::NaiveDate;

/// Filter that drops records whose date matches a configured sentinel
#[derive(Debug, Clone)]
pub struct SentinelFilter {
    /// Dates treated as placeholders
    pub sentinels: Vec<NaiveDate>,
}

impl Default for SentinelFilter {
    /// Default sentinel set: 2000-01-01, a common data-entry dummy date
    fn default() -> Self {
        Self {
            sentinels: vec![NaiveDate::from_ymd_opt(2000, 1, 1).expect("valid date")],
        }
    }
}

impl SentinelFilter {
    /// Create a filter with an explicit sentinel set
    pub fn new(sentinels: Vec<NaiveDate>) -> Self {
        Self { sentinels }
    }

    /// Check whether a date is a sentinel
    pub fn is_sentinel(&self, date: NaiveDate) -> bool {
        self.sentinels.contains(&date)
    }

    /// Return the records that survive filtering, in input order
    ///
    /// The input is not mutated, so callers can compare before/after
    /// counts to report how many placeholders were dropped.
    pub fn filter(&self, records: &[BirthdateRecord]) -> Vec<BirthdateRecord> {
        records
            .iter()
            .filter(|r| !self.is_sentinel(r.birthdate))
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_sentinel_removes_dummy_date() {
        let records = vec![
            BirthdateRecord::new(0, date(1990, 5, 1)),
            BirthdateRecord::new(1, date(2000, 1, 1)),
            BirthdateRecord::new(2, date(1985, 12, 12)),
        ];

        let filter = SentinelFilter::default();
        let kept = filter.filter(&records);

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].index, 0);
        assert_eq!(kept[1].index, 2);
        // input untouched
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_custom_sentinels() {
        let records = vec![
            BirthdateRecord::new(0, date(1970, 1, 1)),
            BirthdateRecord::new(1, date(1999, 9, 9)),
        ];

        let filter = SentinelFilter::new(vec![date(1970, 1, 1), date(1999, 9, 9)]);
        assert!(filter.filter(&records).is_empty());
    }

    #[test]
    fn test_empty_sentinel_set_keeps_everything() {
        let records = vec![BirthdateRecord::new(0, date(2000, 1, 1))];
        let filter = SentinelFilter::new(vec![]);
        assert_eq!(filter.filter(&records).len(), 1);
    }
}
