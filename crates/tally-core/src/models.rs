//! Domain models for Tally

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date layouts a bank is known to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DateFormat {
    /// 01/15/2024 (US)
    #[default]
    #[serde(rename = "MM/DD/YYYY")]
    MonthDayYear,
    /// 15/01/2024 (UK/EU)
    #[serde(rename = "DD/MM/YYYY")]
    DayMonthYear,
    /// 2024-01-15
    #[serde(rename = "YYYY-MM-DD")]
    YearMonthDay,
}

impl DateFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MonthDayYear => "MM/DD/YYYY",
            Self::DayMonthYear => "DD/MM/YYYY",
            Self::YearMonthDay => "YYYY-MM-DD",
        }
    }
}

impl std::str::FromStr for DateFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MM/DD/YYYY" | "MDY" => Ok(Self::MonthDayYear),
            "DD/MM/YYYY" | "DMY" => Ok(Self::DayMonthYear),
            "YYYY-MM-DD" | "YMD" | "ISO" => Ok(Self::YearMonthDay),
            _ => Err(format!("Unknown date format: {}", s)),
        }
    }
}

impl std::fmt::Display for DateFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sign convention of a bank's amount column
///
/// Serialized as the multiplier itself (`1` or `-1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "i8", into = "i8")]
pub enum AmountSign {
    /// Bank already reports money out as negative
    #[default]
    AsIs,
    /// Bank reports charges as positive numbers (Amex, Discover)
    Inverted,
}

impl AmountSign {
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::AsIs => 1.0,
            Self::Inverted => -1.0,
        }
    }

    pub fn apply(&self, amount: f64) -> f64 {
        amount * self.multiplier()
    }
}

impl TryFrom<i8> for AmountSign {
    type Error = String;

    fn try_from(value: i8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::AsIs),
            -1 => Ok(Self::Inverted),
            other => Err(format!("amount multiplier must be 1 or -1, got {}", other)),
        }
    }
}

impl From<AmountSign> for i8 {
    fn from(sign: AmountSign) -> Self {
        match sign {
            AmountSign::AsIs => 1,
            AmountSign::Inverted => -1,
        }
    }
}

/// Where a format reads its amount from
///
/// In config files this is either a plain column name or a
/// `{ debit = "...", credit = "..." }` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountColumn {
    /// One signed amount column
    Single(String),
    /// Separate unsigned debit and credit columns, one filled per row
    Split { debit: String, credit: String },
}

impl AmountColumn {
    /// Column names this amount shape reads from
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Self::Single(column) => vec![column.as_str()],
            Self::Split { debit, credit } => vec![debit.as_str(), credit.as_str()],
        }
    }
}

impl std::fmt::Display for AmountColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(column) => write!(f, "{}", column),
            Self::Split { debit, credit } => write!(f, "{} / {}", debit, credit),
        }
    }
}

/// Column layout and sign convention of one bank's CSV export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatSignature {
    pub name: String,
    /// Every one of these must be present (case-insensitive) for a match
    pub required_columns: Vec<String>,
    /// Raise confidence when present, never required
    #[serde(default)]
    pub alternate_columns: Vec<String>,
    pub date_column: String,
    pub description_column: String,
    pub amount_column: AmountColumn,
    /// Bank-assigned category, picked up when the file has it
    #[serde(default)]
    pub category_column: Option<String>,
    #[serde(default)]
    pub amount_multiplier: AmountSign,
    #[serde(default)]
    pub date_format: DateFormat,
}

/// The format chosen for one file
///
/// Column fields hold the header strings exactly as they appear in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedFormat {
    pub name: String,
    pub confidence: f64,
    pub date_column: String,
    pub description_column: String,
    pub amount_column: AmountColumn,
    pub category_column: Option<String>,
    pub amount_multiplier: AmountSign,
    pub date_format: DateFormat,
}

impl DetectedFormat {
    /// Shallow-merge a caller override on top of this detection
    pub fn with_override(mut self, over: &FormatOverride) -> Self {
        if let Some(ref name) = over.name {
            self.name = name.clone();
        }
        if let Some(confidence) = over.confidence {
            self.confidence = confidence;
        }
        if let Some(ref column) = over.date_column {
            self.date_column = column.clone();
        }
        if let Some(ref column) = over.description_column {
            self.description_column = column.clone();
        }
        if let Some(ref amount) = over.amount_column {
            self.amount_column = amount.clone();
        }
        if let Some(ref column) = over.category_column {
            self.category_column = Some(column.clone());
        }
        if let Some(sign) = over.amount_multiplier {
            self.amount_multiplier = sign;
        }
        if let Some(date_format) = over.date_format {
            self.date_format = date_format;
        }
        self
    }
}

/// Partial `DetectedFormat` used to correct a detection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatOverride {
    pub name: Option<String>,
    pub confidence: Option<f64>,
    pub date_column: Option<String>,
    pub description_column: Option<String>,
    pub amount_column: Option<AmountColumn>,
    pub category_column: Option<String>,
    pub amount_multiplier: Option<AmountSign>,
    pub date_format: Option<DateFormat>,
}

impl FormatOverride {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A transaction parsed from one CSV row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub date: NaiveDate,
    pub description: String,
    /// Negative = money out
    pub amount: f64,
    /// Deterministic `csv_` ID used for dedup on re-import
    pub transaction_id: String,
    pub category: Option<String>,
    /// Source row as a JSON object (header -> cell)
    pub original_data: String,
}

/// Outcome of importing one file
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportResult {
    pub success: bool,
    pub format: Option<DetectedFormat>,
    pub transactions: Vec<ParsedTransaction>,
    /// Fatal problems; any entry means nothing was imported
    pub errors: Vec<String>,
    /// Skipped rows, one entry per row
    pub warnings: Vec<String>,
    /// Data lines seen, including malformed ones
    pub rows_read: usize,
}

impl ImportResult {
    pub(crate) fn failed(error: impl Into<String>) -> Self {
        Self {
            errors: vec![error.into()],
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chase_detection() -> DetectedFormat {
        DetectedFormat {
            name: "Chase Credit Card".to_string(),
            confidence: 1.0,
            date_column: "Transaction Date".to_string(),
            description_column: "Description".to_string(),
            amount_column: AmountColumn::Single("Amount".to_string()),
            category_column: Some("Category".to_string()),
            amount_multiplier: AmountSign::AsIs,
            date_format: DateFormat::MonthDayYear,
        }
    }

    #[test]
    fn test_amount_sign_apply() {
        assert_eq!(AmountSign::AsIs.apply(42.5), 42.5);
        assert_eq!(AmountSign::Inverted.apply(42.5), -42.5);
    }

    #[test]
    fn test_amount_sign_from_multiplier() {
        assert_eq!(AmountSign::try_from(1), Ok(AmountSign::AsIs));
        assert_eq!(AmountSign::try_from(-1), Ok(AmountSign::Inverted));
        assert!(AmountSign::try_from(2).is_err());
        assert_eq!(i8::from(AmountSign::Inverted), -1);
    }

    #[test]
    fn test_date_format_from_str() {
        assert_eq!("dd/mm/yyyy".parse::<DateFormat>(), Ok(DateFormat::DayMonthYear));
        assert_eq!("ISO".parse::<DateFormat>(), Ok(DateFormat::YearMonthDay));
        assert!("yyyy.mm.dd".parse::<DateFormat>().is_err());
    }

    #[test]
    fn test_override_merges_only_set_fields() {
        let over = FormatOverride {
            description_column: Some("Memo".to_string()),
            amount_multiplier: Some(AmountSign::Inverted),
            ..FormatOverride::default()
        };

        let merged = chase_detection().with_override(&over);
        assert_eq!(merged.description_column, "Memo");
        assert_eq!(merged.amount_multiplier, AmountSign::Inverted);
        assert_eq!(merged.date_column, "Transaction Date");
        assert_eq!(merged.name, "Chase Credit Card");
    }

    #[test]
    fn test_empty_override_is_noop() {
        let over = FormatOverride::default();
        assert!(over.is_empty());
        assert_eq!(chase_detection().with_override(&over), chase_detection());
    }

    #[test]
    fn test_amount_column_serializes_untagged() {
        let single = serde_json::to_string(&AmountColumn::Single("Amount".into())).unwrap();
        assert_eq!(single, r#""Amount""#);

        let split: AmountColumn =
            serde_json::from_str(r#"{"debit":"Debit","credit":"Credit"}"#).unwrap();
        assert_eq!(
            split,
            AmountColumn::Split {
                debit: "Debit".into(),
                credit: "Credit".into()
            }
        );
    }
}
