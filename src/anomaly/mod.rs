//! Anomaly scoring algorithms
//!
//! Two independent techniques over the same feature column:
//! - Z-score: parametric, mean/standard-deviation based tri-band
//!   classification
//! - Isolation Forest: non-parametric ensemble of randomized partitioning
//!   trees

mod isolation_forest;
mod zscore;

pub use isolation_forest::*;
pub use zscore::*;
