//! Date feature extraction
//!
//! Converts raw calendar dates into the numeric features the detectors
//! score: a monotonic calendar ordinal and an age in whole years relative
//! to a fixed reference date.

use crate::data::BirthdateRecord;
use crate::error::{Error, Result};
use chrono::{Datelike, NaiveDate, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Derived numeric features for one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Date encoded as `yyyy * 10000 + mm * 100 + dd`
    pub date_ordinal: i64,
    /// Whole years elapsed between the date and the reference date
    pub age: i32,
}

/// Which derived feature a detector scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    /// The `yyyy mm dd` integer encoding
    DateOrdinal,
    /// Age in whole years from the reference date
    Age,
}

impl FeatureKind {
    /// Get the selected feature value from a feature set
    pub fn value(&self, features: &FeatureSet) -> f64 {
        match self {
            FeatureKind::DateOrdinal => features.date_ordinal as f64,
            FeatureKind::Age => features.age as f64,
        }
    }

    /// Extract the selected feature as a column, in input order
    pub fn column(&self, features: &[FeatureSet]) -> Vec<f64> {
        features.iter().map(|f| self.value(f)).collect()
    }

    /// Display name of the feature
    pub fn name(&self) -> &'static str {
        match self {
            FeatureKind::DateOrdinal => "date_ordinal",
            FeatureKind::Age => "age",
        }
    }
}

/// Build the n x 1 sample matrix the isolation forest trains on
pub fn feature_matrix(features: &[FeatureSet], kind: FeatureKind) -> Array2<f64> {
    let column = kind.column(features);
    let n = column.len();
    Array2::from_shape_vec((n, 1), column).expect("column length matches shape")
}

/// Extractor anchored to a fixed reference date
///
/// Extraction is a pure function of the record's date and the reference
/// date; the same inputs always produce the same features.
#[derive(Debug, Clone, Copy)]
pub struct DateFeatureExtractor {
    /// The "now" used for age computation
    pub reference_date: NaiveDate,
}

impl DateFeatureExtractor {
    /// Create an extractor with an explicit reference date
    pub fn new(reference_date: NaiveDate) -> Self {
        Self { reference_date }
    }

    /// Create an extractor anchored to the current UTC date
    pub fn from_today() -> Self {
        Self::new(Utc::now().date_naive())
    }

    /// Extract both features for a single date
    ///
    /// Fails with `InvalidDate` when the year falls outside 1..=9999,
    /// the range where the ordinal encoding stays injective.
    pub fn extract(&self, date: NaiveDate) -> Result<FeatureSet> {
        let year = date.year();
        if !(1..=9999).contains(&year) {
            return Err(Error::invalid_date(format!(
                "year {year} outside supported range 1-9999"
            )));
        }

        let date_ordinal = year as i64 * 10_000 + date.month() as i64 * 100 + date.day() as i64;

        // Anniversary rule: subtract one year when the (month, day) of the
        // reference date precedes the (month, day) of the birthdate.
        let not_yet = (self.reference_date.month(), self.reference_date.day())
            < (date.month(), date.day());
        let age = self.reference_date.year() - year - i32::from(not_yet);

        Ok(FeatureSet { date_ordinal, age })
    }

    /// Extract features for every record, in input order
    pub fn extract_all(&self, records: &[BirthdateRecord]) -> Result<Vec<FeatureSet>> {
        records.iter().map(|r| self.extract(r.birthdate)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_ordinal_monotonic_with_calendar_order() {
        let extractor = DateFeatureExtractor::new(date(2024, 6, 15));
        let dates = [
            date(1, 1, 1),
            date(1899, 12, 31),
            date(1900, 1, 1),
            date(1999, 12, 31),
            date(2000, 1, 1),
            date(2000, 1, 2),
            date(2024, 6, 15),
            date(9999, 12, 31),
        ];

        for pair in dates.windows(2) {
            let a = extractor.extract(pair[0]).unwrap();
            let b = extractor.extract(pair[1]).unwrap();
            assert!(a.date_ordinal < b.date_ordinal, "{pair:?}");
            // fixed reference date: older birthdate implies age >= newer
            assert!(a.age >= b.age, "{pair:?}");
        }
    }

    #[test]
    fn test_ordinal_encoding() {
        let extractor = DateFeatureExtractor::new(date(2024, 6, 15));
        let features = extractor.extract(date(1985, 12, 12)).unwrap();
        assert_eq!(features.date_ordinal, 19851212);
    }

    #[test]
    fn test_age_anniversary_rule() {
        let extractor = DateFeatureExtractor::new(date(2024, 6, 15));

        // birthday tomorrow, not yet reached this year
        assert_eq!(extractor.extract(date(2000, 6, 16)).unwrap().age, 23);
        // birthday today counts as already reached
        assert_eq!(extractor.extract(date(2000, 6, 15)).unwrap().age, 24);
        // birthday yesterday
        assert_eq!(extractor.extract(date(2000, 6, 14)).unwrap().age, 24);
    }

    #[test]
    fn test_age_leap_year_birthdate() {
        // Feb 29 birthdate against a Feb 28 non-leap reference: the
        // (month, day) tuple comparison says the birthday is still ahead
        let extractor = DateFeatureExtractor::new(date(2023, 2, 28));
        assert_eq!(extractor.extract(date(2000, 2, 29)).unwrap().age, 22);

        // from Mar 1 the anniversary has passed
        let extractor = DateFeatureExtractor::new(date(2023, 3, 1));
        assert_eq!(extractor.extract(date(2000, 2, 29)).unwrap().age, 23);
    }

    #[test]
    fn test_future_date_gives_negative_age() {
        let extractor = DateFeatureExtractor::new(date(2024, 6, 15));
        assert_eq!(extractor.extract(date(2030, 1, 1)).unwrap().age, -6);
    }

    #[test]
    fn test_out_of_range_year_rejected() {
        let extractor = DateFeatureExtractor::new(date(2024, 6, 15));
        let result = extractor.extract(date(10_000, 1, 1));
        assert!(matches!(result, Err(Error::InvalidDate(_))));
    }

    #[test]
    fn test_feature_matrix_shape() {
        let extractor = DateFeatureExtractor::new(date(2024, 6, 15));
        let features: Vec<FeatureSet> = [date(1990, 5, 1), date(1985, 12, 12)]
            .iter()
            .map(|&d| extractor.extract(d).unwrap())
            .collect();

        let matrix = feature_matrix(&features, FeatureKind::Age);
        assert_eq!(matrix.shape(), &[2, 1]);
        assert_eq!(matrix[[0, 0]], features[0].age as f64);
    }
}
