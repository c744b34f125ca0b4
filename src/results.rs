//! Result containers
//!
//! Ordered per-record outputs of one scoring algorithm, with stable
//! sorting and top/bottom-N extraction for outlier reports.

use crate::anomaly::{IsolationOutcome, ZScoreOutcome};
use crate::data::BirthdateRecord;
use crate::features::FeatureSet;
use chrono::NaiveDate;
use serde::Serialize;

/// Sort and severity keys for a per-record outcome
pub trait Scored {
    /// Signed primary sort key (z-score, or isolation decision score)
    fn sort_score(&self) -> f64;

    /// Severity, higher = more anomalous, used to compare rankings
    /// across algorithms with different sign conventions
    fn severity(&self) -> f64;
}

impl Scored for ZScoreOutcome {
    fn sort_score(&self) -> f64 {
        self.zscore
    }

    fn severity(&self) -> f64 {
        self.zscore.abs()
    }
}

impl Scored for IsolationOutcome {
    fn sort_score(&self) -> f64 {
        self.score
    }

    // lower decision score = more anomalous
    fn severity(&self) -> f64 {
        -self.score
    }
}

/// One record with its derived features and algorithm outcome
#[derive(Debug, Clone, Serialize)]
pub struct ResultRow<T> {
    /// Original row position in the source table
    pub index: usize,
    pub birthdate: NaiveDate,
    pub features: FeatureSet,
    pub outcome: T,
}

/// Ordered collection of scored records
///
/// Wraps one algorithm's outputs without touching the underlying
/// records; sorting returns a new set.
#[derive(Debug, Clone, Serialize)]
pub struct ResultSet<T> {
    rows: Vec<ResultRow<T>>,
}

impl<T: Scored + Clone> ResultSet<T> {
    /// Create a result set from rows already in record order
    pub fn new(rows: Vec<ResultRow<T>>) -> Self {
        Self { rows }
    }

    /// Zip records, features and outcomes into a result set
    ///
    /// All three sequences must be parallel (one entry per surviving
    /// record, in the same order).
    pub fn from_parts(
        records: &[BirthdateRecord],
        features: &[FeatureSet],
        outcomes: Vec<T>,
    ) -> Self {
        let rows = records
            .iter()
            .zip(features.iter())
            .zip(outcomes)
            .map(|((record, feature), outcome)| ResultRow {
                index: record.index,
                birthdate: record.birthdate,
                features: *feature,
                outcome,
            })
            .collect();
        Self { rows }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in the current order
    pub fn rows(&self) -> &[ResultRow<T>] {
        &self.rows
    }

    /// Iterate rows lazily in the current order
    pub fn iter(&self) -> std::slice::Iter<'_, ResultRow<T>> {
        self.rows.iter()
    }

    /// Return a copy sorted by the primary score
    ///
    /// The sort is stable: ties keep their relative record order, so
    /// results are deterministic for a fixed input and seed.
    pub fn sorted(&self, ascending: bool) -> ResultSet<T> {
        let mut rows = self.rows.clone();
        if ascending {
            rows.sort_by(|a, b| a.outcome.sort_score().total_cmp(&b.outcome.sort_score()));
        } else {
            rows.sort_by(|a, b| b.outcome.sort_score().total_cmp(&a.outcome.sort_score()));
        }
        ResultSet { rows }
    }

    /// First n rows of the current order
    pub fn top(&self, n: usize) -> &[ResultRow<T>] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Last n rows of the current order
    pub fn bottom(&self, n: usize) -> &[ResultRow<T>] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }

    /// Indices of the n most anomalous rows by severity
    pub fn most_anomalous(&self, n: usize) -> Vec<usize> {
        let mut rows: Vec<&ResultRow<T>> = self.rows.iter().collect();
        rows.sort_by(|a, b| b.outcome.severity().total_cmp(&a.outcome.severity()));
        rows.into_iter().take(n).map(|row| row.index).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::{Band, Label};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn zscore_row(index: usize, zscore: f64) -> ResultRow<ZScoreOutcome> {
        ResultRow {
            index,
            birthdate: date(1990, 1, 1),
            features: FeatureSet {
                date_ordinal: 19_900_101,
                age: 34,
            },
            outcome: ZScoreOutcome {
                zscore,
                band: Band::Normal,
            },
        }
    }

    #[test]
    fn test_sorted_ascending_and_descending() {
        let set = ResultSet::new(vec![
            zscore_row(0, 1.5),
            zscore_row(1, -2.0),
            zscore_row(2, 0.3),
        ]);

        let ascending = set.sorted(true);
        let order: Vec<usize> = ascending.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![1, 2, 0]);

        let descending = set.sorted(false);
        let order: Vec<usize> = descending.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![0, 2, 1]);

        // original set untouched
        assert_eq!(set.rows()[0].index, 0);
    }

    #[test]
    fn test_sort_ties_keep_record_order() {
        let set = ResultSet::new(vec![
            zscore_row(0, 1.0),
            zscore_row(1, 1.0),
            zscore_row(2, -1.0),
            zscore_row(3, 1.0),
        ]);

        let ascending = set.sorted(true);
        let order: Vec<usize> = ascending.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![2, 0, 1, 3]);

        let descending = set.sorted(false);
        let order: Vec<usize> = descending.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![0, 1, 3, 2]);
    }

    #[test]
    fn test_top_bottom_clamp() {
        let set = ResultSet::new(vec![zscore_row(0, 0.0), zscore_row(1, 1.0)]);

        assert_eq!(set.top(1)[0].index, 0);
        assert_eq!(set.bottom(1)[0].index, 1);
        assert_eq!(set.top(10).len(), 2);
        assert_eq!(set.bottom(10).len(), 2);
    }

    #[test]
    fn test_severity_conventions() {
        let z = ZScoreOutcome {
            zscore: -4.0,
            band: Band::Anomalous,
        };
        assert_eq!(z.severity(), 4.0);

        let iso = IsolationOutcome {
            score: -0.2,
            label: Label::Outlier,
        };
        assert!(iso.severity() > 0.0);
    }

    #[test]
    fn test_most_anomalous_by_severity() {
        let set = ResultSet::new(vec![
            zscore_row(10, 0.1),
            zscore_row(11, -3.5),
            zscore_row(12, 2.0),
        ]);

        assert_eq!(set.most_anomalous(2), vec![11, 12]);
    }
}
