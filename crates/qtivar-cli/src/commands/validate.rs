//! The `qtivar validate` command.

use std::path::PathBuf;

use anyhow::Result;

use qtivar_core::config::load_config_from;
use qtivar_core::declarations::{parse_declarations, validate_declarations};

pub fn execute(declarations_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let declarations = parse_declarations(&declarations_path)?;

    println!(
        "Declarations: {} ({} items, {} variables)",
        declarations_path.display(),
        declarations.items.len(),
        declarations.variable_count()
    );

    let warnings = validate_declarations(&declarations, config.directed_pair_delimiter);
    for w in &warnings {
        let prefix = match (&w.item, &w.variable) {
            (Some(item), Some(var)) => format!("  [{item}.{var}]"),
            (Some(item), None) => format!("  [{item}]"),
            _ => "  ".to_string(),
        };
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("All declarations valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
