//! The `qtivar encode` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use qtivar_core::codec::decode_scalar;
use qtivar_core::literal::parse_scalar;
use qtivar_core::model::{BaseType, Cardinality, Scalar, Value};
use qtivar_core::state::deserialize_state;

use super::load_engine;

pub fn execute(
    declarations_path: PathBuf,
    item: String,
    response: String,
    literals: Vec<String>,
    state: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut engine = load_engine(&declarations_path, config_path.as_deref())?;

    let variable = engine.get_variable(&response, &item)?;
    let (base_type, cardinality) = (variable.base_type(), variable.cardinality());
    let delimiter = engine.config().directed_pair_delimiter;

    let scalars = literals
        .iter()
        .map(|text| match base_type {
            BaseType::Crobject => decode_scalar(base_type, text, engine.config()),
            other => parse_scalar(other, text, delimiter),
        })
        .collect::<qtivar_core::Result<Vec<Scalar>>>()
        .with_context(|| format!("invalid value for {item}.{response}"))?;

    let value = match (cardinality, scalars.len()) {
        (_, 0) => None,
        (Cardinality::Single, 1) => scalars.into_iter().next().map(Value::Scalar),
        (Cardinality::Single, n) => {
            anyhow::bail!("{item}.{response} is single cardinality but {n} values were given")
        }
        _ => Some(Value::list(scalars)),
    };

    engine.set_value(&item, &response, value)?;
    if let Some(text) = state {
        let parsed = deserialize_state(&text).context("invalid --state")?;
        engine.set_state(&item, &response, Some(parsed))?;
    }

    let element = engine.encode_response(&item, &response)?;
    println!(
        "{}",
        element
            .to_xml_element(&engine.config().response_element)
            .render()
    );
    Ok(())
}
