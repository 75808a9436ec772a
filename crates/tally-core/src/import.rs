//! CSV import pipeline
//!
//! Runs tokenizer -> format detector -> row normalizer and folds the outcome
//! into an [`ImportResult`]. The pipeline never returns an error: anything
//! that goes wrong ends up in `ImportResult::errors`.

use std::sync::LazyLock;

use tracing::{debug, info, warn};

use crate::config::ImportConfig;
use crate::detect::FormatDetector;
use crate::error::{Result, RowError};
use crate::models::{DetectedFormat, FormatOverride, ImportResult};
use crate::normalize::{normalize_rows, row_warning};
use crate::tokenize::tokenize;

pub const EMPTY_FILE_ERROR: &str = "Empty file: no data rows found";
pub const UNDETECTED_FORMAT_ERROR: &str = "Unable to detect CSV format";
pub const NO_TRANSACTIONS_ERROR: &str = "No valid transactions found";

static DEFAULT_IMPORTER: LazyLock<CsvImporter> = LazyLock::new(CsvImporter::new);

/// Parse a bank CSV export with the built-in formats
///
/// `over` is shallow-merged onto whatever format is detected, letting the
/// caller fix a column mapping the detector got wrong.
pub fn parse_csv(content: &str, account_id: &str, over: Option<&FormatOverride>) -> ImportResult {
    DEFAULT_IMPORTER.import(content, account_id, over)
}

/// Import pipeline bound to a particular detector configuration
#[derive(Debug, Clone, Default)]
pub struct CsvImporter {
    detector: FormatDetector,
}

impl CsvImporter {
    pub fn new() -> Self {
        Self::with_detector(FormatDetector::new())
    }

    pub fn with_config(config: &ImportConfig) -> Self {
        Self::with_detector(FormatDetector::with_config(config))
    }

    pub fn with_detector(detector: FormatDetector) -> Self {
        Self { detector }
    }

    pub fn detector(&self) -> &FormatDetector {
        &self.detector
    }

    /// Detect the format of a file without normalizing any rows
    ///
    /// Returns `Ok(None)` for files with no data rows or no recognizable
    /// header.
    pub fn detect(&self, content: &str) -> Result<Option<DetectedFormat>> {
        let table = tokenize(content)?;
        if table.is_empty() {
            return Ok(None);
        }
        Ok(self.detector.detect(&table.headers))
    }

    /// Run the full pipeline over one file
    pub fn import(
        &self,
        content: &str,
        account_id: &str,
        over: Option<&FormatOverride>,
    ) -> ImportResult {
        match self.run(content, account_id, over) {
            Ok(result) => result,
            Err(e) => {
                warn!("CSV import failed: {}", e);
                ImportResult::failed(format!("Import failed: {}", e))
            }
        }
    }

    fn run(
        &self,
        content: &str,
        account_id: &str,
        over: Option<&FormatOverride>,
    ) -> Result<ImportResult> {
        let table = tokenize(content)?;
        if table.is_empty() {
            warn!("CSV import rejected: no data rows");
            return Ok(ImportResult::failed(EMPTY_FILE_ERROR));
        }
        let rows_read = table.rows_read();

        let Some(detected) = self.detector.detect(&table.headers) else {
            warn!("CSV import rejected: unknown headers {:?}", table.headers);
            return Ok(ImportResult {
                rows_read,
                ..ImportResult::failed(UNDETECTED_FORMAT_ERROR)
            });
        };

        let format = match over {
            Some(over) if !over.is_empty() => {
                debug!("Applying format override to {}", detected.name);
                detected.with_override(over)
            }
            _ => detected,
        };

        let mut warnings: Vec<String> = table
            .malformed
            .iter()
            .map(|m| {
                row_warning(
                    m.line,
                    &RowError::FieldCount {
                        expected: m.expected,
                        found: m.found,
                    },
                )
            })
            .collect();

        let normalized = normalize_rows(&format, account_id, &table.rows);
        warnings.extend(normalized.warnings);

        let mut errors = Vec::new();
        if normalized.transactions.is_empty() {
            errors.push(NO_TRANSACTIONS_ERROR.to_string());
        }
        let success = errors.is_empty() && !normalized.transactions.is_empty();

        if success {
            info!(
                "Parsed {} transactions from {} rows as {} ({} skipped)",
                normalized.transactions.len(),
                rows_read,
                format.name,
                warnings.len()
            );
        } else {
            warn!(
                "No valid transactions in {} rows as {}",
                rows_read, format.name
            );
        }

        Ok(ImportResult {
            success,
            format: Some(format),
            transactions: normalized.transactions,
            errors,
            warnings,
            rows_read,
        })
    }
}
