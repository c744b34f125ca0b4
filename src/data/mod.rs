//! Record loading and pre-filtering
//!
//! Birthdate record structures, CSV ingestion glue and sentinel
//! (placeholder date) filtering.

mod records;
mod sentinel;

pub use records::*;
pub use sentinel::*;
