//! Row normalization: raw CSV cells to canonical transactions

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate};
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::RowError;
use crate::models::{AmountColumn, DateFormat, DetectedFormat, ParsedTransaction};
use crate::tokenize::RawRow;

/// Description used when a row has none
pub const UNKNOWN_DESCRIPTION: &str = "Unknown Transaction";

/// Source tag on every CSV transaction ID
pub const TRANSACTION_ID_PREFIX: &str = "csv_";

/// Hex characters of the digest kept in a transaction ID
const TRANSACTION_ID_HEX_LEN: usize = 16;

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})").expect("ISO date pattern"));

/// Layouts tried when a date is neither ISO nor slash-separated
///
/// `%Y` also accepts two-digit years; those come back as years 0-99 and are
/// widened afterwards.
const FALLBACK_DATE_FORMATS: &[&str] = &[
    "%m-%d-%Y",    // 01-15-2024
    "%d.%m.%Y",    // 15.01.2024
    "%Y.%m.%d",    // 2024.01.15
    "%Y%m%d",      // 20240115
    "%b %d, %Y",   // Jan 15, 2024
    "%B %d, %Y",   // January 15, 2024
    "%b %d %Y",    // Jan 15 2024
    "%d %b %Y",    // 15 Jan 2024
    "%d %B %Y",    // 15 January 2024
    "%d-%b-%Y",    // 15-Jan-2024, 15-Jan-24
    "%a, %d %b %Y", // Mon, 15 Jan 2024
];

/// Expand a two-digit year: above 50 is the 1900s, otherwise the 2000s
pub fn expand_two_digit_year(year: u32) -> i32 {
    if year > 50 {
        1900 + year as i32
    } else {
        2000 + year as i32
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn parse_slash_date(s: &str, layout: DateFormat) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('/').map(str::trim).collect();
    if parts.len() != 3 {
        return None;
    }

    // Drop any trailing time from the last part ("01/15/2024 10:32")
    let last = parts[2].split_whitespace().next()?;
    if !all_digits(parts[0]) || !all_digits(parts[1]) || !all_digits(last) {
        return None;
    }

    let (year, month, day) = if parts[0].len() == 4 {
        (parts[0], parts[1], last)
    } else if layout == DateFormat::DayMonthYear {
        (last, parts[1], parts[0])
    } else {
        (last, parts[0], parts[1])
    };

    let year: u32 = year.parse().ok()?;
    let year = if year < 100 {
        expand_two_digit_year(year)
    } else {
        year as i32
    };

    NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
}

fn parse_fallback_date(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }
    FALLBACK_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(widen_short_year)
}

fn widen_short_year(date: NaiveDate) -> Option<NaiveDate> {
    match u32::try_from(date.year()) {
        Ok(year) if year < 100 => date.with_year(expand_two_digit_year(year)),
        _ => Some(date),
    }
}

/// Parse a date cell
///
/// Tried in order: ISO `YYYY-MM-DD`, slash-separated (day first only when
/// the layout says so), then a list of common written layouts.
pub fn parse_date(raw: &str, layout: DateFormat) -> Result<NaiveDate, RowError> {
    let s = raw.trim();
    let invalid = || RowError::InvalidDate(s.to_string());

    if let Some(caps) = ISO_DATE.captures(s) {
        let year = caps[1].parse().map_err(|_| invalid())?;
        let month = caps[2].parse().map_err(|_| invalid())?;
        let day = caps[3].parse().map_err(|_| invalid())?;
        return NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid);
    }

    if s.contains('/') {
        if let Some(date) = parse_slash_date(s, layout) {
            return Ok(date);
        }
    }

    parse_fallback_date(s).ok_or_else(invalid)
}

/// Parse an amount cell, handling currency symbols, thousands separators and
/// accounting-style parentheses
pub fn parse_amount(raw: &str) -> Result<f64, RowError> {
    let trimmed = raw.trim();
    let mut cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | '¥' | ',') && !c.is_whitespace())
        .collect();

    if cleaned.len() > 2 && cleaned.starts_with('(') && cleaned.ends_with(')') {
        cleaned = format!("-{}", &cleaned[1..cleaned.len() - 1]);
    }

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RowError::InvalidAmount(trimmed.to_string()))
}

/// Deterministic ID for deduplicating re-imports
///
/// Pure function of its inputs; the amount is hashed at two decimals.
pub fn transaction_id(account_id: &str, date: NaiveDate, amount: f64, description: &str) -> String {
    let rounded = (amount * 100.0).round() / 100.0;
    // -0.00 and 0.00 are the same transaction
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };

    let mut hasher = Sha256::new();
    hasher.update(account_id.as_bytes());
    hasher.update(b"|");
    hasher.update(date.format("%Y-%m-%d").to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(format!("{:.2}", rounded).as_bytes());
    hasher.update(b"|");
    hasher.update(description.as_bytes());

    let digest = hex::encode(hasher.finalize());
    format!(
        "{}{}",
        TRANSACTION_ID_PREFIX,
        &digest[..TRANSACTION_ID_HEX_LEN]
    )
}

fn cell<'a>(row: &'a RawRow, column: &str) -> &'a str {
    row.get(column).map(str::trim).unwrap_or("")
}

fn row_amount(format: &DetectedFormat, row: &RawRow) -> Result<f64, RowError> {
    match &format.amount_column {
        AmountColumn::Single(column) => {
            let amount = parse_amount(cell(row, column))?;
            Ok(format.amount_multiplier.apply(amount))
        }
        AmountColumn::Split { debit, credit } => {
            let debit = cell(row, debit);
            let credit = cell(row, credit);
            if !debit.is_empty() {
                Ok(-parse_amount(debit)?.abs())
            } else if !credit.is_empty() {
                Ok(parse_amount(credit)?.abs())
            } else {
                Err(RowError::MissingAmount)
            }
        }
    }
}

/// Convert one raw row into a transaction
pub fn normalize_row(
    format: &DetectedFormat,
    account_id: &str,
    row: &RawRow,
) -> Result<ParsedTransaction, RowError> {
    let date = parse_date(cell(row, &format.date_column), format.date_format)?;
    let amount = row_amount(format, row)?;

    let description = match cell(row, &format.description_column) {
        "" => UNKNOWN_DESCRIPTION.to_string(),
        text => text.to_string(),
    };

    let category = format
        .category_column
        .as_deref()
        .map(|column| cell(row, column))
        .filter(|s| !s.is_empty())
        .map(String::from);

    let transaction_id = transaction_id(account_id, date, amount, &description);

    Ok(ParsedTransaction {
        date,
        description,
        amount,
        transaction_id,
        category,
        original_data: row.to_json(),
    })
}

/// Transactions and per-row warnings from one batch of rows
#[derive(Debug, Default)]
pub struct NormalizedRows {
    pub transactions: Vec<ParsedTransaction>,
    pub warnings: Vec<String>,
}

/// Format a row-level problem the way it is shown to users
pub fn row_warning(line: u64, err: &RowError) -> String {
    format!("Row {}: {}", line, err)
}

/// Normalize every row, turning failures into warnings
pub fn normalize_rows(format: &DetectedFormat, account_id: &str, rows: &[RawRow]) -> NormalizedRows {
    let mut out = NormalizedRows::default();

    for row in rows {
        match normalize_row(format, account_id, row) {
            Ok(tx) => out.transactions.push(tx),
            Err(e) => {
                debug!("Skipping row {}: {}", row.line, e);
                out.warnings.push(row_warning(row.line, &e));
            }
        }
    }

    debug!(
        "Normalized {} of {} rows as {}",
        out.transactions.len(),
        rows.len(),
        format.name
    );
    out
}
