//! The `qtivar decode` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use qtivar_core::engine::Engine;
use qtivar_core::model::VariableKind;
use qtivar_core::state::serialize_state;

use super::{load_engine, restore_file};

pub fn execute(
    declarations_path: PathBuf,
    input: PathBuf,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut engine = load_engine(&declarations_path, config_path.as_deref())?;
    restore_file(&mut engine, &input)?;

    match format.as_str() {
        "json" => print_json(&engine)?,
        _ => print_table(&engine)?,
    }
    Ok(())
}

fn kind_label(kind: VariableKind) -> &'static str {
    match kind {
        VariableKind::Response => "response",
        VariableKind::Parameter => "parameter",
    }
}

fn print_table(engine: &Engine) -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec![
        "Identifier",
        "Kind",
        "Cardinality",
        "Base type",
        "Value",
        "State",
    ]);

    for variable in engine.variables()? {
        let value = variable
            .value()
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".to_string());
        let state = match variable.state() {
            Some(s) => serialize_state(s)?,
            None => "-".to_string(),
        };
        table.add_row(vec![
            Cell::new(variable.identifier()),
            Cell::new(kind_label(variable.kind())),
            Cell::new(variable.cardinality()),
            Cell::new(variable.base_type()),
            Cell::new(value),
            Cell::new(state),
        ]);
    }

    println!("{table}");
    Ok(())
}

fn print_json(engine: &Engine) -> Result<()> {
    let mut rows = Vec::new();
    for variable in engine.variables()? {
        let state = variable.state().map(serialize_state).transpose()?;
        rows.push(serde_json::json!({
            "identifier": variable.identifier(),
            "kind": variable.kind(),
            "cardinality": variable.cardinality(),
            "baseType": variable.base_type(),
            "value": variable.value(),
            "state": state,
        }));
    }
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
