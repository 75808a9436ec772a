//! Bank format detection from CSV headers
//!
//! Detection runs in two passes:
//! - **Signatures**: every required column of a signature must be present
//!   (case-insensitive). Passing signatures are scored and the best one wins.
//! - **Generic**: if no signature is good enough, look for any header that
//!   mentions a date, a description and an amount.

use std::sync::LazyLock;

use tracing::debug;

use crate::config::{GenericKeywords, ImportConfig, GENERIC_CONFIDENCE};
use crate::error::{Error, Result};
use crate::formats::BUILTIN_FORMATS;
use crate::models::{AmountColumn, AmountSign, DateFormat, DetectedFormat, FormatSignature};

/// Name reported for formats found by keyword matching
pub const GENERIC_FORMAT_NAME: &str = "Generic";

/// Most that alternate columns can add to a signature's confidence
const ALTERNATE_BOOST: f64 = 0.3;

static DEFAULT_DETECTOR: LazyLock<FormatDetector> = LazyLock::new(FormatDetector::new);

/// Detect the format of a file from its header row using the built-in
/// signatures and default settings
pub fn detect_format(headers: &[String]) -> Option<DetectedFormat> {
    DEFAULT_DETECTOR.detect(headers)
}

/// Find the header matching `name` case-insensitively, returning the file's spelling
fn find_header<'a>(headers: &'a [String], name: &str) -> Option<&'a String> {
    let name = name.trim();
    headers.iter().find(|h| h.trim().eq_ignore_ascii_case(name))
}

/// First header containing a keyword, keywords tried in priority order
fn find_keyword<'a>(
    headers: &'a [String],
    keywords: &[String],
    taken: &[&String],
) -> Option<&'a String> {
    keywords.iter().find_map(|keyword| {
        let keyword = keyword.to_lowercase();
        headers
            .iter()
            .filter(|h| !taken.contains(h))
            .find(|h| h.to_lowercase().contains(&keyword))
    })
}

/// A signature that passed the required-column gate
#[derive(Debug)]
struct Candidate {
    confidence: f64,
    format: DetectedFormat,
}

impl Candidate {
    /// Strictly better than `other`; equal candidates keep registration order
    fn beats(&self, other: &Candidate) -> bool {
        self.confidence > other.confidence
    }
}

/// Scores headers against a table of signatures
#[derive(Debug, Clone)]
pub struct FormatDetector {
    signatures: Vec<FormatSignature>,
    min_confidence: f64,
    keywords: GenericKeywords,
    generic_fallback: bool,
}

impl Default for FormatDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatDetector {
    /// Detector over the built-in signatures with default settings
    pub fn new() -> Self {
        Self::with_config(&ImportConfig::default())
    }

    /// Detector over the built-in signatures plus any configured ones
    pub fn with_config(config: &ImportConfig) -> Self {
        let mut signatures = BUILTIN_FORMATS.clone();
        signatures.extend(config.custom_formats.iter().cloned());
        Self {
            signatures,
            min_confidence: config.min_confidence,
            keywords: config.generic.clone(),
            generic_fallback: true,
        }
    }

    /// Signatures in registration order
    pub fn signatures(&self) -> &[FormatSignature] {
        &self.signatures
    }

    /// Only consider the named signature from now on
    ///
    /// A restricted detector never falls back to the generic format.
    pub fn restrict_to(&mut self, bank: &str) -> Result<()> {
        let sig = self
            .signatures
            .iter()
            .find(|sig| sig.name.eq_ignore_ascii_case(bank.trim()))
            .cloned()
            .ok_or_else(|| Error::UnsupportedBank(bank.to_string()))?;
        self.signatures = vec![sig];
        self.generic_fallback = false;
        Ok(())
    }

    /// Confidence of one signature against a header row
    ///
    /// Returns `None` when any required column is missing.
    pub fn score(&self, sig: &FormatSignature, headers: &[String]) -> Option<f64> {
        self.candidate(sig, headers).map(|c| c.confidence)
    }

    fn candidate(&self, sig: &FormatSignature, headers: &[String]) -> Option<Candidate> {
        if sig.required_columns.is_empty() {
            return None;
        }
        if !sig
            .required_columns
            .iter()
            .all(|col| find_header(headers, col).is_some())
        {
            return None;
        }

        let matched_required = sig.required_columns.len() as f64;
        let mut confidence = matched_required / sig.required_columns.len() as f64;

        let alternate_ratio = if sig.alternate_columns.is_empty() {
            0.0
        } else {
            let matched = sig
                .alternate_columns
                .iter()
                .filter(|col| find_header(headers, col).is_some())
                .count();
            matched as f64 / sig.alternate_columns.len() as f64
        };
        confidence = (confidence + alternate_ratio * ALTERNATE_BOOST).min(1.0);

        let date_column = find_header(headers, &sig.date_column)?.clone();
        let description_column = find_header(headers, &sig.description_column)?.clone();
        let amount_column = match &sig.amount_column {
            AmountColumn::Single(column) => {
                AmountColumn::Single(find_header(headers, column)?.clone())
            }
            AmountColumn::Split { debit, credit } => AmountColumn::Split {
                debit: find_header(headers, debit)?.clone(),
                credit: find_header(headers, credit)?.clone(),
            },
        };
        let category_column = sig
            .category_column
            .as_deref()
            .and_then(|column| find_header(headers, column))
            .cloned();

        Some(Candidate {
            confidence,
            format: DetectedFormat {
                name: sig.name.clone(),
                confidence,
                date_column,
                description_column,
                amount_column,
                category_column,
                amount_multiplier: sig.amount_multiplier,
                date_format: sig.date_format,
            },
        })
    }

    /// Pick the best format for a header row, or `None` if nothing fits
    pub fn detect(&self, headers: &[String]) -> Option<DetectedFormat> {
        let mut best: Option<Candidate> = None;

        for sig in &self.signatures {
            let Some(candidate) = self.candidate(sig, headers) else {
                continue;
            };
            debug!(
                "Signature '{}' matched with confidence {:.2}",
                sig.name, candidate.confidence
            );
            if best.as_ref().map_or(true, |b| candidate.beats(b)) {
                best = Some(candidate);
            }
        }

        if let Some(best) = best {
            if best.confidence >= self.min_confidence {
                debug!("Detected format: {}", best.format.name);
                return Some(best.format);
            }
            debug!(
                "Best signature '{}' below threshold ({:.2} < {:.2})",
                best.format.name, best.confidence, self.min_confidence
            );
        }

        if !self.generic_fallback {
            return None;
        }
        self.detect_generic(headers)
    }

    /// Keyword-based fallback for unknown banks
    fn detect_generic(&self, headers: &[String]) -> Option<DetectedFormat> {
        let date = find_keyword(headers, &self.keywords.date, &[])?;
        let description = find_keyword(headers, &self.keywords.description, &[date])?;

        let amount_column = match find_keyword(headers, &self.keywords.amount, &[date, description])
        {
            Some(amount) => AmountColumn::Single(amount.clone()),
            None => {
                let debit = find_keyword(headers, &self.keywords.debit, &[date, description])?;
                let credit =
                    find_keyword(headers, &self.keywords.credit, &[date, description, debit])?;
                AmountColumn::Split {
                    debit: debit.clone(),
                    credit: credit.clone(),
                }
            }
        };

        debug!(
            "Generic format: date='{}' description='{}' amount='{}'",
            date, description, amount_column
        );

        Some(DetectedFormat {
            name: GENERIC_FORMAT_NAME.to_string(),
            confidence: GENERIC_CONFIDENCE,
            date_column: date.clone(),
            description_column: description.clone(),
            amount_column,
            category_column: None,
            amount_multiplier: AmountSign::AsIs,
            date_format: DateFormat::MonthDayYear,
        })
    }
}
