//! Tally CLI - Bank statement CSV importer
//!
//! Usage:
//!   tally import --file CSV     Parse transactions (auto-detects bank format)
//!   tally detect --file CSV     Show the detected format
//!   tally banks                 List supported banks
//!   tally config                Show the import configuration

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Import {
            file,
            account,
            bank,
            json,
            columns,
        } => {
            let result = commands::cmd_import(
                config,
                &file,
                account.as_deref(),
                bank.as_deref(),
                &columns,
                json,
            )?;
            if !result.success {
                anyhow::bail!("Import of {} failed", file.display());
            }
            Ok(())
        }
        Commands::Detect { file } => commands::cmd_detect(config, &file).map(|_| ()),
        Commands::Banks => commands::cmd_banks(config),
        Commands::Config => commands::cmd_config(config),
    }
}
