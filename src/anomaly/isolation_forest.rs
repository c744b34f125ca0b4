//! Isolation Forest anomaly scoring
//!
//! Ensemble of randomized binary partitioning trees built over subsamples
//! of the feature column. Points that isolate in few partitions are
//! anomalous.
//!
//! Sign convention: the decision score is `0.5 - 2^(-E[h(x)] / c(psi))`,
//! so lower means more anomalous and clear outliers go negative. The
//! convention is kept consistent across scores, thresholds and labels.

use crate::error::{Error, Result};
use ndarray::Array2;
use rand::prelude::*;
use rand_distr::Uniform;
use serde::{Deserialize, Serialize};

/// Subsample cap used when `max_samples` is not configured
const DEFAULT_MAX_SAMPLES: usize = 256;

/// Inlier / outlier label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Inlier,
    Outlier,
}

impl Label {
    /// Display name of the label
    pub fn name(&self) -> &'static str {
        match self {
            Label::Inlier => "inlier",
            Label::Outlier => "outlier",
        }
    }
}

/// Per-record output of the forest
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsolationOutcome {
    /// Signed decision score, lower = more anomalous
    pub score: f64,
    pub label: Label,
}

/// Forest configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsolationForestConfig {
    /// Number of trees in the ensemble
    pub n_estimators: usize,
    /// Subsample size per tree; `None` means `min(256, n)`
    pub max_samples: Option<usize>,
    /// Expected outlier proportion in [0, 0.5], used only to place the
    /// decision threshold; `None` keeps the threshold at score 0.0
    pub contamination: Option<f64>,
    /// Random seed for reproducible training
    pub seed: Option<u64>,
}

impl Default for IsolationForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: None,
            contamination: None,
            seed: None,
        }
    }
}

impl IsolationForestConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of trees
    pub fn n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    /// Set the subsample size per tree
    pub fn max_samples(mut self, n: usize) -> Self {
        self.max_samples = Some(n);
        self
    }

    /// Set the expected outlier proportion
    pub fn contamination(mut self, fraction: f64) -> Self {
        self.contamination = Some(fraction);
        self
    }

    /// Set the random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check option values
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(Error::invalid_config("n_estimators must be at least 1"));
        }
        if let Some(samples) = self.max_samples {
            if samples < 2 {
                return Err(Error::invalid_config(format!(
                    "max_samples must be at least 2, got {samples}"
                )));
            }
        }
        if let Some(fraction) = self.contamination {
            if !(0.0..=0.5).contains(&fraction) {
                return Err(Error::invalid_config(format!(
                    "contamination must be in [0, 0.5], got {fraction}"
                )));
            }
        }
        Ok(())
    }
}

/// Isolation tree node
#[derive(Debug, Clone)]
enum IsolationNode {
    Internal {
        feature_idx: usize,
        split_value: f64,
        left: Box<IsolationNode>,
        right: Box<IsolationNode>,
    },
    Leaf {
        size: usize,
    },
}

/// Single randomized partitioning tree
#[derive(Debug, Clone)]
struct IsolationTree {
    root: IsolationNode,
}

impl IsolationTree {
    /// Build a tree over a subsample of rows
    fn build(rows: &[Vec<f64>], max_depth: usize, rng: &mut StdRng) -> Self {
        let root = Self::build_node(rows, 0, max_depth, rng);
        Self { root }
    }

    fn build_node(
        rows: &[Vec<f64>],
        depth: usize,
        max_depth: usize,
        rng: &mut StdRng,
    ) -> IsolationNode {
        if depth >= max_depth || rows.len() <= 1 {
            return IsolationNode::Leaf { size: rows.len() };
        }

        let n_features = rows[0].len();
        let feature_idx = rng.gen_range(0..n_features);

        let min_val = rows
            .iter()
            .map(|row| row[feature_idx])
            .fold(f64::INFINITY, f64::min);
        let max_val = rows
            .iter()
            .map(|row| row[feature_idx])
            .fold(f64::NEG_INFINITY, f64::max);

        // no range left to split on
        if (max_val - min_val).abs() < 1e-12 {
            return IsolationNode::Leaf { size: rows.len() };
        }

        let split_value = rng.sample(Uniform::new(min_val, max_val));

        let left_rows: Vec<Vec<f64>> = rows
            .iter()
            .filter(|row| row[feature_idx] < split_value)
            .cloned()
            .collect();
        let right_rows: Vec<Vec<f64>> = rows
            .iter()
            .filter(|row| row[feature_idx] >= split_value)
            .cloned()
            .collect();

        let left = Box::new(Self::build_node(&left_rows, depth + 1, max_depth, rng));
        let right = Box::new(Self::build_node(&right_rows, depth + 1, max_depth, rng));

        IsolationNode::Internal {
            feature_idx,
            split_value,
            left,
            right,
        }
    }

    /// Path length to isolation for one sample
    fn path_length(&self, sample: &[f64]) -> f64 {
        let mut node = &self.root;
        let mut depth = 0usize;
        loop {
            match node {
                IsolationNode::Leaf { size } => {
                    return depth as f64 + average_path_length(*size);
                }
                IsolationNode::Internal {
                    feature_idx,
                    split_value,
                    left,
                    right,
                } => {
                    node = if sample[*feature_idx] < *split_value {
                        left
                    } else {
                        right
                    };
                    depth += 1;
                }
            }
        }
    }
}

/// Average path length of an unsuccessful BST search over n points,
/// the normalization constant from the Isolation Forest paper
fn average_path_length(n: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    let n = n as f64;
    // 0.5772... is the Euler-Mascheroni constant
    2.0 * ((n - 1.0).ln() + 0.577_215_664_9) - 2.0 * (n - 1.0) / n
}

/// Trained isolation forest
///
/// Constructed by [`IsolationForest::fit`]; scoring a sample never
/// mutates the model, so one trained instance serves a whole pass.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    config: IsolationForestConfig,
    trees: Vec<IsolationTree>,
    /// Subsample size each tree was grown on
    sample_size: usize,
    /// Decision threshold: scores strictly below it are outliers
    threshold: f64,
}

impl IsolationForest {
    /// Train a forest on a sample matrix (rows = records)
    ///
    /// Fails with `InsufficientData` when fewer than 2 rows are given or
    /// a configured `max_samples` exceeds the row count, and with
    /// `InvalidConfig` for invalid option values.
    pub fn fit(data: &Array2<f64>, config: IsolationForestConfig) -> Result<Self> {
        config.validate()?;

        let n = data.nrows();
        if n < 2 {
            return Err(Error::insufficient_data(2, n));
        }

        let sample_size = match config.max_samples {
            Some(samples) if samples > n => {
                return Err(Error::insufficient_data(samples, n));
            }
            Some(samples) => samples,
            None => DEFAULT_MAX_SAMPLES.min(n),
        };

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let max_depth = (sample_size as f64).log2().ceil() as usize;
        let rows: Vec<Vec<f64>> = (0..n).map(|i| data.row(i).to_vec()).collect();

        let mut trees = Vec::with_capacity(config.n_estimators);
        for _ in 0..config.n_estimators {
            let indices = (0..n).choose_multiple(&mut rng, sample_size);
            let subsample: Vec<Vec<f64>> = indices.iter().map(|&i| rows[i].clone()).collect();
            trees.push(IsolationTree::build(&subsample, max_depth, &mut rng));
        }

        log::debug!(
            "trained {} isolation trees (subsample {}, depth cap {})",
            trees.len(),
            sample_size,
            max_depth
        );

        let mut forest = Self {
            config,
            trees,
            sample_size,
            threshold: 0.0,
        };
        forest.threshold = forest.calibrate_threshold(&rows);
        Ok(forest)
    }

    /// Pick the decision threshold from the training scores
    ///
    /// With a contamination fraction f, the floor(f * n) lowest-scoring
    /// training points fall strictly below the returned threshold. Without
    /// one, the threshold stays at 0.0 (raw score 0.5), the heuristic from
    /// the original paper.
    fn calibrate_threshold(&self, rows: &[Vec<f64>]) -> f64 {
        let Some(fraction) = self.config.contamination else {
            return 0.0;
        };

        let mut scores: Vec<f64> = rows.iter().map(|row| self.decision_score(row)).collect();
        scores.sort_by(f64::total_cmp);

        let k = (fraction * rows.len() as f64).floor() as usize;
        match scores.get(k) {
            Some(&score) => score,
            None => f64::INFINITY,
        }
    }

    /// Signed decision score for a single sample, lower = more anomalous
    pub fn decision_score(&self, sample: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.path_length(sample)).sum();
        let avg_path = total / self.trees.len() as f64;

        let normalization = average_path_length(self.sample_size);
        if normalization <= 0.0 {
            return 0.0;
        }

        0.5 - 2.0_f64.powf(-avg_path / normalization)
    }

    /// Decision scores for every row, in input order
    pub fn decision_scores(&self, data: &Array2<f64>) -> Vec<f64> {
        (0..data.nrows())
            .map(|i| self.decision_score(&data.row(i).to_vec()))
            .collect()
    }

    /// Score and label every row, in input order
    pub fn apply(&self, data: &Array2<f64>) -> Vec<IsolationOutcome> {
        self.decision_scores(data)
            .into_iter()
            .map(|score| IsolationOutcome {
                score,
                label: if score < self.threshold {
                    Label::Outlier
                } else {
                    Label::Inlier
                },
            })
            .collect()
    }

    /// The calibrated decision threshold
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// The configuration the forest was trained with
    pub fn config(&self) -> &IsolationForestConfig {
        &self.config
    }
}
