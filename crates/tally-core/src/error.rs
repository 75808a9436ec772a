//! Error types for Tally

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Unsupported bank format: {0}")]
    UnsupportedBank(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single CSV row was skipped
///
/// The `Display` text is what ends up in `ImportResult::warnings`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Missing both debit and credit amounts")]
    MissingAmount,

    #[error("Expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
}
