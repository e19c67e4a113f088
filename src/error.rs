//! Error types for order analytics.

use thiserror::Error;

/// Errors surfaced by the aggregation core and the dataset loader.
///
/// Empty results are never errors: every computation over an empty
/// dataset returns an empty mapping or an all-zero table instead.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A requested group or metric field is not part of the order schema.
    #[error("field '{name}' does not exist in the dataset schema")]
    MissingField { name: String },

    /// An aggregation request named a reducer this crate does not support.
    #[error("unknown reducer '{name}' (expected one of: mean, sum, count, count_distinct, mode)")]
    UnknownReducer { name: String },

    /// CSV-level failure while reading the source file.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O failure while reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
