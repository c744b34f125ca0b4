//! Data-Quality Anomaly Scoring for Birthdate Datasets
//!
//! This library flags implausible birthdates (placeholder values,
//! data-entry errors) by deriving numeric features from each date and
//! scoring them with two independent techniques: a z-score tri-band
//! classifier and an Isolation Forest ensemble.
//!
//! # Modules
//!
//! - `data`: record structures, CSV loading and sentinel-date filtering
//! - `features`: date-to-number transformation (calendar ordinal, age)
//! - `anomaly`: z-score and Isolation Forest scoring
//! - `results`: ordered result sets with stable sorting and top-N reports
//! - `analysis`: the end-to-end scoring pass
//!
//! # Example
//!
//! ```no_run
//! use birthdate_quality::analysis::{AnalysisConfig, BirthdateAnalyzer};
//! use birthdate_quality::data::RecordSet;
//!
//! let records = RecordSet::from_csv("birthdates.csv", "birthdates").unwrap();
//!
//! let analyzer = BirthdateAnalyzer::new(AnalysisConfig::default()).unwrap();
//! let analysis = analyzer.analyze(&records).unwrap();
//!
//! for row in analysis.zscore.sorted(true).top(10) {
//!     println!("{} {} z={:.2}", row.index, row.birthdate, row.outcome.zscore);
//! }
//! ```

pub mod analysis;
pub mod anomaly;
pub mod data;
pub mod error;
pub mod features;
pub mod results;

pub use analysis::*;
pub use anomaly::*;
pub use data::*;
pub use error::{Error, Result};
pub use features::*;
pub use results::*;
