//! Subcommand implementations.

pub mod decode;
pub mod encode;
pub mod init;
pub mod status;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};

use qtivar_core::config::load_config_from;
use qtivar_core::declarations::parse_declarations;
use qtivar_core::engine::{Engine, TracingSink};

/// Load config and declarations into a ready engine.
pub fn load_engine(declarations_path: &Path, config_path: Option<&Path>) -> Result<Engine> {
    let config = load_config_from(config_path)?;
    let declarations = parse_declarations(declarations_path)?;

    let mut engine = Engine::new(config).with_sink(TracingSink);
    engine
        .load_declarations(&declarations)
        .with_context(|| format!("failed to load declarations: {}", declarations_path.display()))?;
    Ok(engine)
}

/// Restore a recovery payload file into the engine.
pub fn restore_file(engine: &mut Engine, input: &Path) -> Result<()> {
    let payload = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read payload: {}", input.display()))?;
    let summary = engine
        .restore_document(&payload)
        .with_context(|| format!("failed to restore payload: {}", input.display()))?;
    for skipped in &summary.skipped {
        eprintln!("skipped unknown response: {skipped}");
    }
    Ok(())
}
