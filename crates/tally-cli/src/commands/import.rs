//! Import command implementation

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tally_core::{
    AmountColumn, AmountSign, CsvImporter, DateFormat, FormatDetector, FormatOverride,
    ImportConfig, ImportResult,
};
use tracing::debug;

use super::truncate;
use crate::cli::ColumnArgs;

/// Rows shown in the transaction table before eliding the rest
const PREVIEW_ROWS: usize = 20;

/// Load the import config from `--config` or the default locations
pub fn load_config(path: Option<&Path>) -> Result<ImportConfig> {
    match path {
        Some(path) => ImportConfig::from_path(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => ImportConfig::load().context("Failed to load import config"),
    }
}

/// Build an importer, optionally pinned to one bank format
pub fn build_importer(config: &ImportConfig, bank: Option<&str>) -> Result<CsvImporter> {
    let mut detector = FormatDetector::with_config(config);
    if let Some(bank) = bank {
        detector.restrict_to(bank).with_context(|| {
            format!(
                "Unknown bank format: {}\nRun `tally banks` to see supported formats",
                bank
            )
        })?;
    }
    Ok(CsvImporter::with_detector(detector))
}

impl ColumnArgs {
    /// Column corrections as a format override
    pub fn to_override(&self) -> FormatOverride {
        let amount_column = match (&self.amount_column, &self.debit_column, &self.credit_column) {
            (Some(column), _, _) => Some(AmountColumn::Single(column.clone())),
            (None, Some(debit), Some(credit)) => Some(AmountColumn::Split {
                debit: debit.clone(),
                credit: credit.clone(),
            }),
            _ => None,
        };

        let amount_multiplier = if self.invert_amounts {
            Some(AmountSign::Inverted)
        } else if self.as_is_amounts {
            Some(AmountSign::AsIs)
        } else {
            None
        };

        FormatOverride {
            date_column: self.date_column.clone(),
            description_column: self.description_column.clone(),
            amount_column,
            amount_multiplier,
            date_format: self.day_first.then_some(DateFormat::DayMonthYear),
            ..FormatOverride::default()
        }
    }
}

pub fn cmd_import(
    config_path: Option<&Path>,
    file: &Path,
    account: Option<&str>,
    bank: Option<&str>,
    columns: &ColumnArgs,
    json: bool,
) -> Result<ImportResult> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;

    let config = load_config(config_path)?;
    let importer = build_importer(&config, bank)?;

    // Account names default to the detected bank, so detect before importing
    let account = match account {
        Some(account) => account.to_string(),
        None => {
            let detected = importer
                .detect(&content)
                .with_context(|| format!("Failed to parse CSV: {}", file.display()))?;
            match detected {
                Some(format) => format!("{} Account", format.name),
                None => "Imported Account".to_string(),
            }
        }
    };

    debug!("Importing {} into account '{}'", file.display(), account);

    let over = columns.to_override();

    if !json {
        println!("📥 Importing {}...", file.display());
    }

    let result = importer.import(&content, &account, Some(&over));

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result, &account);
    }

    Ok(result)
}

fn print_result(result: &ImportResult, account: &str) {
    if let Some(ref format) = result.format {
        println!(
            "   Format: {} (confidence {:.0}%)",
            format.name,
            format.confidence * 100.0
        );
    }
    println!("   Account: {}", account);
    println!("   Rows read: {}", result.rows_read);

    if !result.warnings.is_empty() {
        println!();
        println!("⚠️  Skipped {} rows:", result.warnings.len());
        for warning in &result.warnings {
            println!("   {}", warning);
        }
    }

    if !result.success {
        println!();
        println!("❌ Import failed");
        for error in &result.errors {
            println!("   {}", error);
        }
        return;
    }

    println!();
    println!(
        "{:<12} {:>12}  {:<40} {}",
        "Date", "Amount", "Description", "ID"
    );
    println!("{}", "-".repeat(90));
    for tx in result.transactions.iter().take(PREVIEW_ROWS) {
        println!(
            "{:<12} {:>12.2}  {:<40} {}",
            tx.date.to_string(),
            tx.amount,
            truncate(&tx.description, 40),
            tx.transaction_id
        );
    }
    if result.transactions.len() > PREVIEW_ROWS {
        println!(
            "   ... and {} more",
            result.transactions.len() - PREVIEW_ROWS
        );
    }

    let total: f64 = result.transactions.iter().map(|tx| tx.amount).sum();

    println!();
    println!("✅ Import complete!");
    println!("   Parsed: {}", result.transactions.len());
    println!("   Skipped: {}", result.warnings.len());
    println!("   Net amount: {:.2}", total);
}
