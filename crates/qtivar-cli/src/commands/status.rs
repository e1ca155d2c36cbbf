//! The `qtivar status` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use qtivar_core::model::VariableKind;
use qtivar_core::status::{response_status, ResponseStatus};

use super::{load_engine, restore_file};

fn label(status: ResponseStatus) -> &'static str {
    match status {
        ResponseStatus::NotAttempted => "-",
        other => other.as_str(),
    }
}

pub fn execute(
    declarations_path: PathBuf,
    input: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut engine = load_engine(&declarations_path, config_path.as_deref())?;
    if let Some(input) = &input {
        restore_file(&mut engine, input)?;
    }

    let mut report = Vec::new();
    for item in engine.items()? {
        let responses: Vec<_> = engine
            .variables_for_item(item)?
            .into_iter()
            .filter(|v| v.kind() == VariableKind::Response)
            .map(|v| (v.identifier().local().to_string(), response_status(v)))
            .collect();
        report.push((item.to_string(), engine.item_status(item)?, responses));
    }

    if format == "json" {
        let json: Vec<_> = report
            .iter()
            .map(|(item, status, responses)| {
                serde_json::json!({
                    "item": item,
                    "status": status.as_str(),
                    "responses": responses
                        .iter()
                        .map(|(id, s)| serde_json::json!({ "identifier": id, "status": s.as_str() }))
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Item", "Response", "Status"]);
    for (item, status, responses) in &report {
        table.add_row(vec![Cell::new(item), Cell::new("*"), Cell::new(label(*status))]);
        for (id, s) in responses {
            table.add_row(vec![Cell::new(""), Cell::new(id), Cell::new(label(*s))]);
        }
    }
    println!("{table}");
    Ok(())
}
