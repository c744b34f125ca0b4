//! Birthdate record structures
//!
//! Core data structures for representing loaded birthdate rows

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date formats accepted when loading raw text dates
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y"];

/// Parse a raw date string, trying each supported format in order
pub fn parse_birthdate(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }
    Err(Error::invalid_date(format!("unparseable date '{raw}'")))
}

/// Single birthdate record
///
/// `index` is the original row position in the source table and stays
/// stable through filtering and sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthdateRecord {
    pub index: usize,
    pub birthdate: NaiveDate,
}

impl BirthdateRecord {
    /// Create a new record
    pub fn new(index: usize, birthdate: NaiveDate) -> Self {
        Self { index, birthdate }
    }
}

/// Ordered collection of birthdate records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordSet {
    pub records: Vec<BirthdateRecord>,
}

impl RecordSet {
    /// Create an empty record set
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Create a record set from dates, indexed by position
    pub fn from_dates(dates: Vec<NaiveDate>) -> Self {
        let records = dates
            .into_iter()
            .enumerate()
            .map(|(index, birthdate)| BirthdateRecord::new(index, birthdate))
            .collect();
        Self { records }
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get the number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Get record at position
    pub fn get(&self, pos: usize) -> Option<&BirthdateRecord> {
        self.records.get(pos)
    }

    /// Append a record
    pub fn push(&mut self, record: BirthdateRecord) {
        self.records.push(record);
    }

    /// Get all dates in record order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.birthdate).collect()
    }

    /// Load records from a CSV file
    ///
    /// The date column is located by header name; every other column is
    /// ignored. Row position in the file becomes the record index.
    /// Fails with `InvalidDate` on any unparseable value, no silent
    /// defaulting.
    pub fn from_csv(path: &str, date_column: &str) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;

        let headers = reader.headers()?.clone();
        let column = headers
            .iter()
            .position(|h| h.trim() == date_column)
            .ok_or_else(|| {
                Error::invalid_config(format!("no column named '{date_column}' in {path}"))
            })?;

        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let row = row?;
            let raw = row.get(column).ok_or_else(|| {
                Error::invalid_date(format!("row {index} has no value in '{date_column}'"))
            })?;
            let birthdate = parse_birthdate(raw)?;
            records.push(BirthdateRecord::new(index, birthdate));
        }

        log::info!("loaded {} records from {}", records.len(), path);
        Ok(Self { records })
    }

    /// Save records to a CSV file
    pub fn to_csv(&self, path: &str) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["index", "birthdate"])?;
        for record in &self.records {
            writer.write_record([
                record.index.to_string(),
                record.birthdate.format("%Y-%m-%d").to_string(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}
