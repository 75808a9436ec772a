//! Import configuration
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/tally/config/import.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! An explicit path (CLI `--config`) takes the place of the data-dir override.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::FormatSignature;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/import.toml");

/// Confidence the generic fallback reports, and the default acceptance threshold
pub const GENERIC_CONFIDENCE: f64 = 0.5;

/// Header keywords used when no bank signature matches
#[derive(Debug, Clone, PartialEq)]
pub struct GenericKeywords {
    pub date: Vec<String>,
    pub description: Vec<String>,
    pub amount: Vec<String>,
    pub debit: Vec<String>,
    pub credit: Vec<String>,
}

impl Default for GenericKeywords {
    fn default() -> Self {
        fn list(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            date: list(&["transaction date", "date", "posted", "time"]),
            description: list(&[
                "description",
                "payee",
                "merchant",
                "name",
                "memo",
                "details",
                "narrative",
            ]),
            amount: list(&["amount", "value", "total", "sum"]),
            debit: list(&["debit", "withdrawal", "paid out", "money out"]),
            credit: list(&["credit", "deposit", "paid in", "money in"]),
        }
    }
}

/// Settings for format detection
#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
    /// Minimum signature confidence to accept a bank match
    pub min_confidence: f64,
    pub generic: GenericKeywords,
    /// User-defined signatures, checked after the built-in ones
    pub custom_formats: Vec<FormatSignature>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            min_confidence: GENERIC_CONFIDENCE,
            generic: GenericKeywords::default(),
            custom_formats: Vec::new(),
        }
    }
}

impl ImportConfig {
    /// Load config (data-dir override first, then embedded default)
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load config from an explicit path
    ///
    /// Unlike the data-dir override, a missing explicit file is an error.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        load_config(Some(path))
    }

    /// Parse config from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("config").join("import.toml"))
}

/// Path that `ImportConfig::load` would read, if an override exists
pub fn active_config_path() -> Option<PathBuf> {
    default_config_path().filter(|p| p.exists())
}

fn load_config(override_path: Option<&Path>) -> Result<ImportConfig> {
    let path = match override_path {
        Some(path) => Some(path.to_path_buf()),
        None => active_config_path(),
    };

    let content = match path {
        Some(ref path) => {
            debug!("Loading import config from {}", path.display());
            fs::read_to_string(path)?
        }
        None => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    detection: Option<RawDetection>,
    generic: Option<RawGeneric>,
    #[serde(default)]
    formats: Vec<FormatSignature>,
}

#[derive(Debug, Deserialize)]
struct RawDetection {
    min_confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawGeneric {
    date_keywords: Option<Vec<String>>,
    description_keywords: Option<Vec<String>>,
    amount_keywords: Option<Vec<String>>,
    debit_keywords: Option<Vec<String>>,
    credit_keywords: Option<Vec<String>>,
}

fn parse_config(content: &str) -> Result<ImportConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = ImportConfig::default();

    if let Some(detection) = raw.detection {
        if let Some(min) = detection.min_confidence {
            if !(0.0..=1.0).contains(&min) {
                return Err(Error::Config(format!(
                    "min_confidence must be between 0 and 1, got {}",
                    min
                )));
            }
            config.min_confidence = min;
        }
    }

    if let Some(generic) = raw.generic {
        let keywords = &mut config.generic;
        for (target, value) in [
            (&mut keywords.date, generic.date_keywords),
            (&mut keywords.description, generic.description_keywords),
            (&mut keywords.amount, generic.amount_keywords),
            (&mut keywords.debit, generic.debit_keywords),
            (&mut keywords.credit, generic.credit_keywords),
        ] {
            if let Some(list) = value {
                *target = list.into_iter().map(|k| k.to_lowercase()).collect();
            }
        }
    }

    for sig in &raw.formats {
        validate_signature(sig)?;
    }
    config.custom_formats = raw.formats;

    Ok(config)
}

fn validate_signature(sig: &FormatSignature) -> Result<()> {
    if sig.name.trim().is_empty() {
        return Err(Error::Config("Custom format is missing a name".into()));
    }
    if sig.required_columns.is_empty() {
        return Err(Error::Config(format!(
            "Custom format '{}' has no required columns",
            sig.name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AmountColumn, AmountSign, DateFormat};
    use std::io::Write;

    #[test]
    fn test_embedded_default_matches_builtin_defaults() {
        let config = ImportConfig::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, ImportConfig::default());
    }

    #[test]
    fn test_parse_custom_formats() {
        let toml = r#"
[detection]
min_confidence = 0.8

[[formats]]
name = "Credit Union"
required_columns = ["Posted", "Payee", "Withdrawal", "Deposit"]
date_column = "Posted"
description_column = "Payee"
amount_column = { debit = "Withdrawal", credit = "Deposit" }
date_format = "DD/MM/YYYY"

[[formats]]
name = "Card Export"
required_columns = ["Date", "Merchant", "Charge"]
date_column = "Date"
description_column = "Merchant"
amount_column = "Charge"
amount_multiplier = -1
"#;
        let config = ImportConfig::from_toml(toml).unwrap();
        assert_eq!(config.min_confidence, 0.8);
        assert_eq!(config.custom_formats.len(), 2);

        let union = &config.custom_formats[0];
        assert_eq!(
            union.amount_column,
            AmountColumn::Split {
                debit: "Withdrawal".into(),
                credit: "Deposit".into()
            }
        );
        assert_eq!(union.date_format, DateFormat::DayMonthYear);
        assert_eq!(union.amount_multiplier, AmountSign::AsIs);

        let card = &config.custom_formats[1];
        assert_eq!(card.amount_column, AmountColumn::Single("Charge".into()));
        assert_eq!(card.amount_multiplier, AmountSign::Inverted);
        assert!(card.alternate_columns.is_empty());
    }

    #[test]
    fn test_partial_generic_keywords() {
        let toml = r#"
[generic]
amount_keywords = ["Betrag"]
"#;
        let config = ImportConfig::from_toml(toml).unwrap();
        assert_eq!(config.generic.amount, vec!["betrag".to_string()]);
        assert_eq!(config.generic.date, GenericKeywords::default().date);
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let err = ImportConfig::from_toml("[detection]\nmin_confidence = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("min_confidence"));
    }

    #[test]
    fn test_rejects_bad_multiplier() {
        let toml = r#"
[[formats]]
name = "Broken"
required_columns = ["Date"]
date_column = "Date"
description_column = "Date"
amount_column = "Amount"
amount_multiplier = 3
"#;
        assert!(matches!(
            ImportConfig::from_toml(toml),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_rejects_format_without_required_columns() {
        let toml = r#"
[[formats]]
name = "Loose"
required_columns = []
date_column = "Date"
description_column = "Memo"
amount_column = "Amount"
"#;
        let err = ImportConfig::from_toml(toml).unwrap_err();
        assert!(err.to_string().contains("no required columns"));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[detection]\nmin_confidence = 0.6").unwrap();

        let config = ImportConfig::from_path(file.path()).unwrap();
        assert_eq!(config.min_confidence, 0.6);
    }

    #[test]
    fn test_unreadable_path_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = ImportConfig::from_path(dir.path());
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_from_missing_path() {
        let result = ImportConfig::from_path(Path::new("/nonexistent/tally/import.toml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
