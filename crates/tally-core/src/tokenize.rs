//! CSV tokenizer: file text to header row plus raw rows

use csv::{ReaderBuilder, StringRecord, Trim};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::Result;

/// One data line, keyed by the header it sits under
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based source line reported by the CSV reader (header is line 1)
    pub line: u64,
    pub cells: Vec<(String, String)>,
}

impl RawRow {
    /// Cell under an exact header name
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    /// Row as a JSON object using headers as keys
    pub fn to_json(&self) -> String {
        let mut map = serde_json::Map::new();
        for (header, value) in &self.cells {
            map.entry(header.clone())
                .or_insert_with(|| Value::String(value.clone()));
        }
        json!(map).to_string()
    }
}

/// A data line whose field count differs from the header
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedRow {
    pub line: u64,
    pub expected: usize,
    pub found: usize,
}

/// Tokenized file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    pub malformed: Vec<MalformedRow>,
}

impl CsvTable {
    /// Data lines seen, well-formed or not
    pub fn rows_read(&self) -> usize {
        self.rows.len() + self.malformed.len()
    }

    /// True when the file had no data lines at all
    pub fn is_empty(&self) -> bool {
        self.rows_read() == 0
    }
}

fn reader(content: &str, has_headers: bool) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes())
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.is_empty())
}

/// Split a single CSV line into fields
///
/// Commas inside double quotes are data and `""` inside quotes is a literal
/// quote. Fields are trimmed.
pub fn split_line(line: &str) -> Result<Vec<String>> {
    let mut rdr = reader(line, false);
    match rdr.records().next() {
        Some(record) => Ok(record?.iter().map(String::from).collect()),
        None => Ok(Vec::new()),
    }
}

/// Tokenize a whole file
///
/// The first non-empty line is the header. Blank lines (including lines of
/// nothing but separators) are skipped. Lines with the wrong number of fields
/// are reported in `malformed` rather than returned as rows. A file without
/// any data line yields an empty table.
pub fn tokenize(content: &str) -> Result<CsvTable> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut rdr = reader(content, true);

    let headers: Vec<String> = rdr.headers()?.iter().map(String::from).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Ok(CsvTable::default());
    }

    let mut rows = Vec::new();
    let mut malformed = Vec::new();

    for result in rdr.records() {
        let record = result?;
        if is_blank(&record) {
            continue;
        }

        let line = record.position().map(|p| p.line()).unwrap_or_default();

        if record.len() != headers.len() {
            malformed.push(MalformedRow {
                line,
                expected: headers.len(),
                found: record.len(),
            });
            continue;
        }

        let cells = headers
            .iter()
            .cloned()
            .zip(record.iter().map(String::from))
            .collect();
        rows.push(RawRow { line, cells });
    }

    if rows.is_empty() && malformed.is_empty() {
        return Ok(CsvTable::default());
    }

    debug!(
        "Tokenized {} columns, {} rows ({} malformed)",
        headers.len(),
        rows.len(),
        malformed.len()
    );

    Ok(CsvTable {
        headers,
        rows,
        malformed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_line_quotes() {
        let fields = split_line(r#"A,"B, and C","D""E""#).unwrap();
        assert_eq!(fields, vec!["A", "B, and C", "D\"E"]);
    }

    #[test]
    fn test_split_line_trims_fields() {
        let fields = split_line("  01/15/2024 , Coffee Shop ,-4.50").unwrap();
        assert_eq!(fields, vec!["01/15/2024", "Coffee Shop", "-4.50"]);
    }

    #[test]
    fn test_split_line_trims_quoted_padding() {
        let fields = split_line(r#"01/15/2024,"  Corner Bakery  ",-3.20"#).unwrap();
        assert_eq!(fields[1], "Corner Bakery");
    }

    #[test]
    fn test_split_empty_line() {
        assert!(split_line("").unwrap().is_empty());
    }

    #[test]
    fn test_tokenize_crlf() {
        let csv = "Date,Description,Amount\r\n01/15/2024,Coffee,-4.50\r\n01/16/2024,Lunch,-12.00\r\n";
        let table = tokenize(csv).unwrap();
        assert_eq!(table.headers, vec!["Date", "Description", "Amount"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].get("Description"), Some("Lunch"));
        assert_eq!(table.rows[1].get("Amount"), Some("-12.00"));
    }

    #[test]
    fn test_tokenize_line_numbers() {
        let csv = "Date,Description,Amount\n01/15/2024,Coffee,-4.50\n01/16/2024,Lunch,-12.00\n";
        let table = tokenize(csv).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[1].line, 3);
    }

    #[test]
    fn test_tokenize_reports_field_count_mismatch() {
        let csv = "Date,Description,Amount\n01/15/2024,Coffee,-4.50\n01/16/2024,Lunch\n";
        let table = tokenize(csv).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(
            table.malformed,
            vec![MalformedRow {
                line: 3,
                expected: 3,
                found: 2
            }]
        );
        assert_eq!(table.rows_read(), 2);
    }

    #[test]
    fn test_tokenize_skips_separator_only_lines() {
        let csv = "Date,Description,Amount\n01/15/2024,Coffee,-4.50\n,,\n";
        let table = tokenize(csv).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert!(table.malformed.is_empty());
    }

    #[test]
    fn test_tokenize_header_only_is_empty() {
        let table = tokenize("Date,Description,Amount\n").unwrap();
        assert!(table.is_empty());
        assert!(table.headers.is_empty());
    }

    #[test]
    fn test_tokenize_empty_input() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_tokenize_strips_bom() {
        let csv = "\u{feff}Date,Description,Amount\n01/15/2024,Coffee,-4.50\n";
        let table = tokenize(csv).unwrap();
        assert_eq!(table.headers[0], "Date");
    }

    #[test]
    fn test_quoted_field_with_embedded_newline() {
        let csv = "Date,Description,Amount\n01/15/2024,\"ADOBE\nSAN JOSE CA\",-22.99\n";
        let table = tokenize(csv).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].get("Description"), Some("ADOBE\nSAN JOSE CA"));
    }

    #[test]
    fn test_row_to_json() {
        let row = RawRow {
            line: 2,
            cells: vec![
                ("Date".to_string(), "01/15/2024".to_string()),
                ("Amount".to_string(), "-4.50".to_string()),
            ],
        };
        let value: Value = serde_json::from_str(&row.to_json()).unwrap();
        assert_eq!(value["Date"], "01/15/2024");
        assert_eq!(value["Amount"], "-4.50");
    }
}
