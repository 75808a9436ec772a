//! Built-in bank export signatures
//!
//! Every built-in signature has a required-column set no other one is a
//! subset of, so a header row never gates two of them alone. When a file
//! does pass several gates, the one registered first wins.

use std::sync::LazyLock;

use crate::models::{AmountColumn, AmountSign, DateFormat, FormatSignature};

/// Built-in signatures, in registration order
pub static BUILTIN_FORMATS: LazyLock<Vec<FormatSignature>> = LazyLock::new(builtin_formats);

/// Names of the banks Tally recognizes out of the box
pub fn supported_banks() -> Vec<&'static str> {
    BUILTIN_FORMATS.iter().map(|sig| sig.name.as_str()).collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn single(column: &str) -> AmountColumn {
    AmountColumn::Single(column.to_string())
}

fn split(debit: &str, credit: &str) -> AmountColumn {
    AmountColumn::Split {
        debit: debit.to_string(),
        credit: credit.to_string(),
    }
}

fn builtin_formats() -> Vec<FormatSignature> {
    vec![
        // Chase credit card: Transaction Date,Post Date,Description,Category,Type,Amount,Memo
        FormatSignature {
            name: "Chase Credit Card".to_string(),
            required_columns: strings(&["Transaction Date", "Description", "Amount"]),
            alternate_columns: strings(&["Post Date", "Category", "Type", "Memo"]),
            date_column: "Transaction Date".to_string(),
            description_column: "Description".to_string(),
            amount_column: single("Amount"),
            category_column: Some("Category".to_string()),
            amount_multiplier: AmountSign::AsIs,
            date_format: DateFormat::MonthDayYear,
        },
        // Chase checking: Details,Posting Date,Description,Amount,Type,Balance,Check or Slip #
        FormatSignature {
            name: "Chase Checking".to_string(),
            required_columns: strings(&["Posting Date", "Description", "Amount"]),
            alternate_columns: strings(&["Details", "Type", "Balance", "Check or Slip #"]),
            date_column: "Posting Date".to_string(),
            description_column: "Description".to_string(),
            amount_column: single("Amount"),
            category_column: None,
            amount_multiplier: AmountSign::AsIs,
            date_format: DateFormat::MonthDayYear,
        },
        // Capital One: Transaction Date,Posted Date,Card No.,Description,Category,Debit,Credit
        FormatSignature {
            name: "Capital One".to_string(),
            required_columns: strings(&["Transaction Date", "Description", "Debit", "Credit"]),
            alternate_columns: strings(&["Posted Date", "Card No.", "Category"]),
            date_column: "Transaction Date".to_string(),
            description_column: "Description".to_string(),
            amount_column: split("Debit", "Credit"),
            category_column: Some("Category".to_string()),
            amount_multiplier: AmountSign::AsIs,
            date_format: DateFormat::YearMonthDay,
        },
        // Citi: Status,Date,Description,Debit,Credit,Member Name
        FormatSignature {
            name: "Citi".to_string(),
            required_columns: strings(&["Date", "Description", "Debit", "Credit"]),
            alternate_columns: strings(&["Status", "Member Name"]),
            date_column: "Date".to_string(),
            description_column: "Description".to_string(),
            amount_column: split("Debit", "Credit"),
            category_column: None,
            amount_multiplier: AmountSign::AsIs,
            date_format: DateFormat::MonthDayYear,
        },
        // Discover reports purchases as positive numbers
        FormatSignature {
            name: "Discover".to_string(),
            required_columns: strings(&["Trans. Date", "Description", "Amount"]),
            alternate_columns: strings(&["Post Date", "Category"]),
            date_column: "Trans. Date".to_string(),
            description_column: "Description".to_string(),
            amount_column: single("Amount"),
            category_column: Some("Category".to_string()),
            amount_multiplier: AmountSign::Inverted,
            date_format: DateFormat::MonthDayYear,
        },
        // Bank of America: Date,Description,Amount,Running Bal.
        FormatSignature {
            name: "Bank of America".to_string(),
            required_columns: strings(&["Date", "Description", "Amount", "Running Bal."]),
            alternate_columns: Vec::new(),
            date_column: "Date".to_string(),
            description_column: "Description".to_string(),
            amount_column: single("Amount"),
            category_column: None,
            amount_multiplier: AmountSign::AsIs,
            date_format: DateFormat::MonthDayYear,
        },
        // Amex shows charges as positive numbers. Only the extended export is
        // recognized; the plain Date,Description,Amount one is left to the
        // generic matcher.
        FormatSignature {
            name: "American Express".to_string(),
            required_columns: strings(&[
                "Date",
                "Description",
                "Card Member",
                "Account #",
                "Amount",
            ]),
            alternate_columns: strings(&[
                "Extended Details",
                "Appears On Your Statement As",
                "Reference",
                "Category",
            ]),
            date_column: "Date".to_string(),
            description_column: "Description".to_string(),
            amount_column: single("Amount"),
            category_column: Some("Category".to_string()),
            amount_multiplier: AmountSign::Inverted,
            date_format: DateFormat::MonthDayYear,
        },
        FormatSignature {
            name: "Wells Fargo".to_string(),
            required_columns: strings(&["Date", "Description", "Amount", "Check Number"]),
            alternate_columns: strings(&["Status"]),
            date_column: "Date".to_string(),
            description_column: "Description".to_string(),
            amount_column: single("Amount"),
            category_column: None,
            amount_multiplier: AmountSign::AsIs,
            date_format: DateFormat::MonthDayYear,
        },
        // U.S. Bank: Date,Transaction,Name,Memo,Amount
        FormatSignature {
            name: "US Bank".to_string(),
            required_columns: strings(&["Date", "Transaction", "Name", "Memo", "Amount"]),
            alternate_columns: Vec::new(),
            date_column: "Date".to_string(),
            description_column: "Name".to_string(),
            amount_column: single("Amount"),
            category_column: None,
            amount_multiplier: AmountSign::AsIs,
            date_format: DateFormat::YearMonthDay,
        },
        FormatSignature {
            name: "Monzo".to_string(),
            required_columns: strings(&["Transaction ID", "Date", "Name", "Emoji", "Amount"]),
            alternate_columns: strings(&["Time", "Type", "Category", "Currency", "Notes and #tags"]),
            date_column: "Date".to_string(),
            description_column: "Name".to_string(),
            amount_column: single("Amount"),
            category_column: Some("Category".to_string()),
            amount_multiplier: AmountSign::AsIs,
            date_format: DateFormat::DayMonthYear,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_banks_follow_registration_order() {
        let banks = supported_banks();
        assert_eq!(banks.len(), BUILTIN_FORMATS.len());
        assert_eq!(banks[0], "Chase Credit Card");
        assert!(banks.contains(&"American Express"));
        assert!(banks.contains(&"Capital One"));
    }

    #[test]
    fn test_builtin_names_are_unique() {
        let mut names = supported_banks();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), BUILTIN_FORMATS.len());
    }

    #[test]
    fn test_mapped_columns_are_declared() {
        // Every column a signature reads must be part of its required set,
        // otherwise a gated match could still miss the column.
        for sig in BUILTIN_FORMATS.iter() {
            let required: Vec<String> = sig
                .required_columns
                .iter()
                .map(|c| c.to_lowercase())
                .collect();
            assert!(required.contains(&sig.date_column.to_lowercase()), "{}", sig.name);
            assert!(
                required.contains(&sig.description_column.to_lowercase()),
                "{}",
                sig.name
            );
            for column in sig.amount_column.columns() {
                assert!(required.contains(&column.to_lowercase()), "{}", sig.name);
            }
        }
    }

    #[test]
    fn test_required_sets_do_not_nest() {
        // A signature whose required columns sit inside another's would
        // shadow it or be shadowed by registration order alone
        let lower = |sig: &FormatSignature| -> Vec<String> {
            sig.required_columns.iter().map(|c| c.to_lowercase()).collect()
        };
        for (i, a) in BUILTIN_FORMATS.iter().enumerate() {
            for (j, b) in BUILTIN_FORMATS.iter().enumerate() {
                if i == j {
                    continue;
                }
                let (a_cols, b_cols) = (lower(a), lower(b));
                assert!(
                    !a_cols.iter().all(|c| b_cols.contains(c)),
                    "{} is covered by {}",
                    a.name,
                    b.name
                );
            }
        }
    }
}
