//! Z-score based anomaly classification
//!
//! Scores each value by how many standard deviations it lies from the
//! population mean and buckets it into normal / suspect / anomalous bands.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Mean and sample standard deviation of one feature column
///
/// Computed once per scoring pass over the filtered record set and
/// read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    pub mean: f64,
    /// Sample standard deviation (Bessel-corrected, divisor n - 1)
    pub std_dev: f64,
    /// Number of values the statistics were computed over
    pub count: usize,
}

/// Classification band derived from the absolute z-score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Band {
    /// |z| <= suspect threshold
    Normal,
    /// suspect threshold < |z| <= anomalous threshold
    Suspect,
    /// |z| > anomalous threshold
    Anomalous,
}

impl Band {
    /// Display name of the band
    pub fn name(&self) -> &'static str {
        match self {
            Band::Normal => "normal",
            Band::Suspect => "suspect",
            Band::Anomalous => "anomalous",
        }
    }
}

/// Band boundaries in standard deviations
///
/// Both boundaries are inclusive on the lower band: exactly `suspect` is
/// still normal, exactly `anomalous` is still suspect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZScoreThresholds {
    pub suspect: f64,
    pub anomalous: f64,
}

impl Default for ZScoreThresholds {
    /// Default policy: 1 sigma suspect boundary, 3 sigma anomalous boundary
    fn default() -> Self {
        Self {
            suspect: 1.0,
            anomalous: 3.0,
        }
    }
}

impl ZScoreThresholds {
    /// Create thresholds, validating the boundary ordering
    pub fn new(suspect: f64, anomalous: f64) -> Result<Self> {
        let thresholds = Self { suspect, anomalous };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Check that the boundaries are positive and ordered
    pub fn validate(&self) -> Result<()> {
        if !self.suspect.is_finite() || self.suspect <= 0.0 {
            return Err(Error::invalid_config(format!(
                "suspect threshold must be positive, got {}",
                self.suspect
            )));
        }
        if !self.anomalous.is_finite() || self.anomalous < self.suspect {
            return Err(Error::invalid_config(format!(
                "anomalous threshold must be >= suspect threshold, got {} < {}",
                self.anomalous, self.suspect
            )));
        }
        Ok(())
    }

    /// Classify an absolute z-score into a band
    pub fn band(&self, zscore: f64) -> Band {
        let magnitude = zscore.abs();
        if magnitude <= self.suspect {
            Band::Normal
        } else if magnitude <= self.anomalous {
            Band::Suspect
        } else {
            Band::Anomalous
        }
    }
}

/// Per-value output of the classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZScoreOutcome {
    /// Signed standard-deviation distance from the mean
    pub zscore: f64,
    pub band: Band,
}

/// Population z-score classifier
///
/// `fit` computes population statistics; `score` derives per-value
/// z-scores and bands. Both are pure, so repeated scoring with the same
/// stats yields identical results.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZScoreClassifier {
    pub thresholds: ZScoreThresholds,
}

impl ZScoreClassifier {
    /// Create a classifier with the default 1/3 sigma thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier with custom thresholds
    pub fn with_thresholds(thresholds: ZScoreThresholds) -> Result<Self> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    /// Compute mean and sample standard deviation of a feature column
    ///
    /// Fails with `InsufficientData` for fewer than 2 values (the sample
    /// std is undefined) and with `DegenerateDistribution` when every
    /// value is identical, so callers never see NaN z-scores.
    pub fn fit(&self, values: &[f64]) -> Result<PopulationStats> {
        if values.len() < 2 {
            return Err(Error::insufficient_data(2, values.len()));
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let std_dev = variance.sqrt();

        if std_dev == 0.0 {
            return Err(Error::DegenerateDistribution);
        }

        Ok(PopulationStats {
            mean,
            std_dev,
            count: values.len(),
        })
    }

    /// Score every value against fitted statistics, preserving input order
    pub fn score(&self, values: &[f64], stats: &PopulationStats) -> Vec<ZScoreOutcome> {
        values
            .iter()
            .map(|&value| {
                let zscore = (value - stats.mean) / stats.std_dev;
                ZScoreOutcome {
                    zscore,
                    band: self.thresholds.band(zscore),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_sample_statistics() {
        let classifier = ZScoreClassifier::new();
        let stats = classifier.fit(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();

        assert!((stats.mean - 5.0).abs() < 1e-12);
        // sample variance 32/7
        assert!((stats.std_dev - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(stats.count, 8);
    }

    #[test]
    fn test_band_boundaries_inclusive() {
        let thresholds = ZScoreThresholds::default();

        assert_eq!(thresholds.band(1.0), Band::Normal);
        assert_eq!(thresholds.band(-1.0), Band::Normal);
        assert_eq!(thresholds.band(1.0000001), Band::Suspect);
        assert_eq!(thresholds.band(3.0), Band::Suspect);
        assert_eq!(thresholds.band(-3.0), Band::Suspect);
        assert_eq!(thresholds.band(3.0000001), Band::Anomalous);
        assert_eq!(thresholds.band(0.0), Band::Normal);
    }

    #[test]
    fn test_score_preserves_order_and_zscores() {
        let classifier = ZScoreClassifier::new();
        let values = [10.0, 20.0, 30.0];
        let stats = classifier.fit(&values).unwrap();
        let outcomes = classifier.score(&values, &stats);

        assert_eq!(outcomes.len(), 3);
        assert!((outcomes[0].zscore - (10.0 - stats.mean) / stats.std_dev).abs() < 1e-12);
        assert!(outcomes[0].zscore < 0.0);
        assert!((outcomes[1].zscore).abs() < 1e-12);
        assert!(outcomes[2].zscore > 0.0);
    }

    #[test]
    fn test_score_is_idempotent() {
        let classifier = ZScoreClassifier::new();
        let values: Vec<f64> = (0..50).map(|i| 20.0 + (i % 7) as f64).collect();
        let stats = classifier.fit(&values).unwrap();

        let first = classifier.score(&values, &stats);
        let second = classifier.score(&values, &stats);
        assert_eq!(first, second);
    }

    #[test]
    fn test_insufficient_data() {
        let classifier = ZScoreClassifier::new();
        assert!(matches!(
            classifier.fit(&[42.0]),
            Err(Error::InsufficientData { needed: 2, got: 1 })
        ));
        assert!(matches!(
            classifier.fit(&[]),
            Err(Error::InsufficientData { needed: 2, got: 0 })
        ));
    }

    #[test]
    fn test_degenerate_distribution() {
        let classifier = ZScoreClassifier::new();
        assert!(matches!(
            classifier.fit(&[5.0; 100]),
            Err(Error::DegenerateDistribution)
        ));
    }

    #[test]
    fn test_threshold_validation() {
        assert!(ZScoreThresholds::new(1.0, 3.0).is_ok());
        assert!(matches!(
            ZScoreThresholds::new(-1.0, 3.0),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            ZScoreThresholds::new(3.0, 1.0),
            Err(Error::InvalidConfig(_))
        ));
    }
}
