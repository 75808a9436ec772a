//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Tally - Import bank statement CSVs
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Bank statement CSV importer with automatic format detection", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Import config file
    ///
    /// Defaults to ~/.local/share/tally/config/import.toml when it exists,
    /// otherwise the built-in settings.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a bank CSV export into transactions
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,

        /// Account identifier used for transaction IDs (defaults to "<bank> Account")
        #[arg(short, long)]
        account: Option<String>,

        /// Bank format (auto-detected if not specified, see `tally banks`)
        #[arg(short, long)]
        bank: Option<String>,

        /// Print the full import result as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        columns: ColumnArgs,
    },

    /// Show which format a CSV file is detected as
    Detect {
        /// CSV file to inspect
        #[arg(short, long)]
        file: PathBuf,
    },

    /// List supported bank formats
    Banks,

    /// Show the import configuration in use
    Config,
}

/// Manual corrections applied on top of the detected format
#[derive(Args, Debug, Default, Clone)]
pub struct ColumnArgs {
    /// Column holding the transaction date
    #[arg(long)]
    pub date_column: Option<String>,

    /// Column holding the description
    #[arg(long)]
    pub description_column: Option<String>,

    /// Column holding a signed amount
    #[arg(long, conflicts_with_all = ["debit_column", "credit_column"])]
    pub amount_column: Option<String>,

    /// Column holding debits (use with --credit-column)
    #[arg(long, requires = "credit_column")]
    pub debit_column: Option<String>,

    /// Column holding credits (use with --debit-column)
    #[arg(long, requires = "debit_column")]
    pub credit_column: Option<String>,

    /// Treat positive amounts as money out (how Amex and Discover export them)
    #[arg(long, conflicts_with = "as_is_amounts")]
    pub invert_amounts: bool,

    /// Keep amount signs as exported, even for a bank detected as inverted
    #[arg(long)]
    pub as_is_amounts: bool,

    /// Read slash dates as DD/MM/YYYY
    #[arg(long)]
    pub day_first: bool,
}
