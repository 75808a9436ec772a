//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `import` - CSV import command and config loading shared by all commands
//! - `formats` - Format inspection commands (detect, banks, config)

pub mod formats;
pub mod import;

// Re-export command functions for main.rs
pub use formats::*;
pub use import::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
