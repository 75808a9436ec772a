//! Format inspection commands (detect, banks, config)

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tally_core::{config::active_config_path, formats::BUILTIN_FORMATS, AmountSign, DetectedFormat};

use super::{build_importer, load_config};

pub fn cmd_detect(config_path: Option<&Path>, file: &Path) -> Result<Option<DetectedFormat>> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;

    let config = load_config(config_path)?;
    let importer = build_importer(&config, None)?;
    let detected = importer
        .detect(&content)
        .with_context(|| format!("Failed to parse CSV: {}", file.display()))?;

    println!("🔍 Detecting format of {}...", file.display());
    match detected {
        Some(ref format) => {
            println!("   Format:      {}", format.name);
            println!("   Confidence:  {:.0}%", format.confidence * 100.0);
            println!("   Date:        {} ({})", format.date_column, format.date_format);
            println!("   Description: {}", format.description_column);
            println!("   Amount:      {}", format.amount_column);
            if let Some(ref category) = format.category_column {
                println!("   Category:    {}", category);
            }
            if format.amount_multiplier == AmountSign::Inverted {
                println!("   Signs:       inverted (charges exported as positive)");
            }
        }
        None => {
            println!("   ❌ Unrecognized format");
            println!();
            println!("   Map the columns by hand, e.g.:");
            println!("   tally import --file {} --date-column ... --description-column ... --amount-column ...", file.display());
        }
    }

    Ok(detected)
}

pub fn cmd_banks(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let importer = build_importer(&config, None)?;

    println!("🏦 Supported bank formats:");
    println!();
    println!("{:<22} {:<14} {:<24} Signs", "Name", "Dates", "Amount");
    println!("{}", "-".repeat(70));
    for (i, sig) in importer.detector().signatures().iter().enumerate() {
        let source = if i < BUILTIN_FORMATS.len() {
            ""
        } else {
            " (custom)"
        };
        let signs = if sig.amount_multiplier == AmountSign::Inverted {
            "inverted"
        } else {
            "as-is"
        };
        println!(
            "{:<22} {:<14} {:<24} {}{}",
            sig.name,
            sig.date_format.as_str(),
            sig.amount_column.to_string(),
            signs,
            source
        );
    }

    println!();
    println!("💡 Unrecognized exports fall back to keyword-based column matching");

    Ok(())
}

pub fn cmd_config(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;

    println!("⚙️  Import configuration");
    println!();
    match config_path
        .map(Path::to_path_buf)
        .or_else(active_config_path)
    {
        Some(path) => println!("   Source: {}", path.display()),
        None => println!("   Source: built-in defaults"),
    }
    println!("   Minimum confidence: {:.2}", config.min_confidence);
    println!();
    println!("   Generic column keywords:");
    println!("     date:        {}", config.generic.date.join(", "));
    println!("     description: {}", config.generic.description.join(", "));
    println!("     amount:      {}", config.generic.amount.join(", "));
    println!("     debit:       {}", config.generic.debit.join(", "));
    println!("     credit:      {}", config.generic.credit.join(", "));

    if !config.custom_formats.is_empty() {
        println!();
        println!("   Custom formats:");
        for sig in &config.custom_formats {
            println!(
                "     {} (requires: {})",
                sig.name,
                sig.required_columns.join(", ")
            );
        }
    }

    Ok(())
}
