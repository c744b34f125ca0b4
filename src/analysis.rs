//! End-to-end scoring pass
//!
//! Wires the pipeline together: sentinel filtering, feature extraction,
//! then z-score and Isolation Forest scoring of the same feature column.
//! Each pass works on immutable inputs and returns newly built results.

use crate::anomaly::{
    IsolationForest, IsolationForestConfig, IsolationOutcome, PopulationStats, ZScoreClassifier,
    ZScoreOutcome, ZScoreThresholds,
};
use crate::data::{RecordSet, SentinelFilter};
use crate::error::Result;
use crate::features::{feature_matrix, DateFeatureExtractor, FeatureKind};
use crate::results::{ResultSet, Scored};
use chrono::{NaiveDate, Utc};
use serde::Serialize;

/// Configuration for one analysis pass
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Reference date for age computation; `None` means today (UTC)
    pub reference_date: Option<NaiveDate>,
    /// Placeholder dates removed before any statistics
    pub sentinels: Vec<NaiveDate>,
    /// Which derived feature both detectors score
    pub feature: FeatureKind,
    /// Z-score band boundaries
    pub thresholds: ZScoreThresholds,
    /// Isolation forest options
    pub forest: IsolationForestConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            reference_date: None,
            sentinels: SentinelFilter::default().sentinels,
            feature: FeatureKind::Age,
            thresholds: ZScoreThresholds::default(),
            forest: IsolationForestConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit reference date
    pub fn reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// Replace the sentinel date set
    pub fn sentinels(mut self, sentinels: Vec<NaiveDate>) -> Self {
        self.sentinels = sentinels;
        self
    }

    /// Set the feature to score
    pub fn feature(mut self, feature: FeatureKind) -> Self {
        self.feature = feature;
        self
    }

    /// Set z-score band boundaries
    pub fn thresholds(mut self, thresholds: ZScoreThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set isolation forest options
    pub fn forest(mut self, forest: IsolationForestConfig) -> Self {
        self.forest = forest;
        self
    }

    /// Check all option values
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        self.forest.validate()
    }
}

/// Output of one analysis pass
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// Reference date the ages were computed against
    pub reference_date: NaiveDate,
    /// Records seen in the input
    pub total_records: usize,
    /// Records dropped by the sentinel filter
    pub filtered_out: usize,
    /// Statistics of the scored feature column
    pub stats: PopulationStats,
    /// Z-score classification, in surviving-record order
    pub zscore: ResultSet<ZScoreOutcome>,
    /// Isolation forest scores, in surviving-record order
    pub isolation: ResultSet<IsolationOutcome>,
}

/// Runs complete scoring passes over record sets
#[derive(Debug, Clone)]
pub struct BirthdateAnalyzer {
    config: AnalysisConfig,
}

impl BirthdateAnalyzer {
    /// Create an analyzer, validating the configuration up front
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The analyzer configuration
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Score every record with both algorithms
    ///
    /// Sentinel records never reach the statistics; both detectors see
    /// the same filtered feature column, so their rankings are directly
    /// comparable.
    pub fn analyze(&self, records: &RecordSet) -> Result<Analysis> {
        let filter = SentinelFilter::new(self.config.sentinels.clone());
        let kept = filter.filter(&records.records);
        let filtered_out = records.len() - kept.len();
        log::info!(
            "sentinel filter kept {} of {} records",
            kept.len(),
            records.len()
        );

        let reference_date = self
            .config
            .reference_date
            .unwrap_or_else(|| Utc::now().date_naive());
        let extractor = DateFeatureExtractor::new(reference_date);
        let features = extractor.extract_all(&kept)?;
        let column = self.config.feature.column(&features);

        let classifier = ZScoreClassifier {
            thresholds: self.config.thresholds,
        };
        let stats = classifier.fit(&column)?;
        log::info!(
            "{}: mean {:.3}, std {:.3} over {} records",
            self.config.feature.name(),
            stats.mean,
            stats.std_dev,
            stats.count
        );
        let zscore_outcomes = classifier.score(&column, &stats);

        let matrix = feature_matrix(&features, self.config.feature);
        let forest = IsolationForest::fit(&matrix, self.config.forest)?;
        let isolation_outcomes = forest.apply(&matrix);

        Ok(Analysis {
            reference_date,
            total_records: records.len(),
            filtered_out,
            stats,
            zscore: ResultSet::from_parts(&kept, &features, zscore_outcomes),
            isolation: ResultSet::from_parts(&kept, &features, isolation_outcomes),
        })
    }
}

/// Count how many of the n most anomalous records two rankings share
///
/// Compares by severity, so the two algorithms' different sign
/// conventions do not matter.
pub fn top_agreement<A, B>(a: &ResultSet<A>, b: &ResultSet<B>, n: usize) -> usize
where
    A: Scored + Clone,
    B: Scored + Clone,
{
    let left = a.most_anomalous(n);
    let right = b.most_anomalous(n);
    left.iter().filter(|index| right.contains(index)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RecordSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_records() -> RecordSet {
        // birth years spread over five decades, plus one sentinel
        let mut dates: Vec<NaiveDate> = (0..50).map(|i| date(1950 + i, 3, 10)).collect();
        dates.push(date(2000, 1, 1));
        RecordSet::from_dates(dates)
    }

    #[test]
    fn test_analyze_filters_sentinels_and_scores_rest() {
        let config = AnalysisConfig::new()
            .reference_date(date(2024, 6, 15))
            .forest(IsolationForestConfig::new().seed(42));
        let analyzer = BirthdateAnalyzer::new(config).unwrap();

        let analysis = analyzer.analyze(&sample_records()).unwrap();

        assert_eq!(analysis.total_records, 51);
        assert_eq!(analysis.filtered_out, 1);
        assert_eq!(analysis.zscore.len(), 50);
        assert_eq!(analysis.isolation.len(), 50);
        assert_eq!(analysis.stats.count, 50);
        // ages 25..=74 born 1950..=1999, birthday passed by June 15
        assert!((analysis.stats.mean - 49.5).abs() < 1e-9);
    }

    #[test]
    fn test_analyze_rejects_invalid_config() {
        let config = AnalysisConfig::new().forest(IsolationForestConfig::new().n_estimators(0));
        assert!(BirthdateAnalyzer::new(config).is_err());
    }

    #[test]
    fn test_top_agreement_counts_shared_indices() {
        let config = AnalysisConfig::new()
            .reference_date(date(2024, 6, 15))
            .forest(IsolationForestConfig::new().seed(7).contamination(0.1));
        let analyzer = BirthdateAnalyzer::new(config).unwrap();

        let mut records = sample_records();
        // an age far outside the population
        records.push(crate::data::BirthdateRecord::new(51, date(1874, 1, 1)));

        let analysis = analyzer.analyze(&records).unwrap();
        // both methods must rank the extreme record among their worst 5
        assert!(top_agreement(&analysis.zscore, &analysis.isolation, 5) >= 1);
    }
}
