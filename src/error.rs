//! Error types for the birthdate quality library

use thiserror::Error;

/// Result type alias for scoring operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading records or scoring features
#[derive(Error, Debug)]
pub enum Error {
    /// Date is malformed or outside the supported range
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Too few records for the requested statistic
    #[error("insufficient data: need at least {needed} records, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Zero-variance population, z-scores are undefined
    #[error("degenerate distribution: all feature values are identical")]
    DegenerateDistribution,

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// CSV parsing or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new invalid date error
    pub fn invalid_date(msg: impl Into<String>) -> Self {
        Self::InvalidDate(msg.into())
    }

    /// Create a new insufficient data error
    pub fn insufficient_data(needed: usize, got: usize) -> Self {
        Self::InsufficientData { needed, got }
    }

    /// Create a new invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
