//! Tally Core Library
//!
//! Bank statement CSV import for the Tally personal finance app:
//! - Tokenizer for quoted CSV exports
//! - Bank format signatures and header-based detection
//! - Row normalization (ISO dates, signed amounts, dedup IDs)
//! - Import pipeline that never fails outward
//! - Import configuration (thresholds, keywords, custom bank formats)

pub mod config;
pub mod detect;
pub mod error;
pub mod formats;
pub mod import;
pub mod models;
pub mod normalize;
pub mod tokenize;

pub use config::ImportConfig;
pub use detect::{detect_format, FormatDetector};
pub use error::{Error, Result, RowError};
pub use formats::supported_banks;
pub use import::{parse_csv, CsvImporter};
pub use models::{
    AmountColumn, AmountSign, DateFormat, DetectedFormat, FormatOverride, FormatSignature,
    ImportResult, ParsedTransaction,
};
pub use normalize::transaction_id;
