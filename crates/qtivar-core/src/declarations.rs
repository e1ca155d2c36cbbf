//! TOML declarations loader.
//!
//! A declarations document lists, per item, the response and parameter
//! variables the engine should hold. Defaults are written as literal text and
//! parsed per base type.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::VariableError;
use crate::literal::{create_composite_identifier, is_simple_identifier, parse_scalar};
use crate::model::{BaseType, Cardinality, InteractionType, Value, VariableKind};
use crate::variable::VariableSpec;

#[derive(Debug, Deserialize)]
struct TomlDeclarationsFile {
    #[serde(default)]
    custom_responses: Vec<String>,
    #[serde(default)]
    items: Vec<TomlItem>,
}

#[derive(Debug, Deserialize)]
struct TomlItem {
    identifier: String,
    #[serde(default)]
    responses: Vec<TomlVariable>,
    #[serde(default)]
    parameters: Vec<TomlVariable>,
}

#[derive(Debug, Deserialize)]
struct TomlVariable {
    identifier: String,
    cardinality: String,
    base_type: String,
    #[serde(default)]
    max_choices: Option<u32>,
    #[serde(default)]
    interaction: Option<String>,
    #[serde(default)]
    default: Vec<String>,
}

/// A parsed declarations document.
#[derive(Debug, Clone, PartialEq)]
pub struct Declarations {
    pub source: PathBuf,
    /// Registered `crobject` type names.
    pub custom_responses: Vec<String>,
    pub items: Vec<ItemDeclaration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemDeclaration {
    pub identifier: String,
    pub responses: Vec<VariableDeclaration>,
    pub parameters: Vec<VariableDeclaration>,
}

/// One `responseDeclaration` or `parameterDeclaration`.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub identifier: String,
    pub cardinality: Cardinality,
    pub base_type: BaseType,
    pub max_choices: Option<u32>,
    pub interaction: Option<InteractionType>,
    /// Literal text of each default element.
    pub default: Vec<String>,
}

impl VariableDeclaration {
    /// Parse the default literals into a value.
    pub fn default_value(&self, delimiter: char) -> crate::error::Result<Option<Value>> {
        if self.default.is_empty() {
            return Ok(None);
        }
        if self.cardinality == Cardinality::Single && self.default.len() > 1 {
            return Err(VariableError::InvalidArgumentCount {
                expected: 1,
                actual: self.default.len(),
            });
        }
        let mut scalars = self
            .default
            .iter()
            .map(|text| parse_scalar(self.base_type, text, delimiter))
            .collect::<crate::error::Result<Vec<_>>>()?;
        Ok(match self.cardinality {
            Cardinality::Single => scalars.pop().map(Value::Scalar),
            Cardinality::Multiple | Cardinality::Ordered => Some(Value::list(scalars)),
        })
    }

    /// Build the creation spec for this declaration within `item`.
    pub fn to_spec(
        &self,
        item: &str,
        kind: VariableKind,
        delimiter: char,
    ) -> crate::error::Result<VariableSpec> {
        let identifier = create_composite_identifier(item, &self.identifier)?;
        Ok(VariableSpec {
            kind,
            identifier,
            cardinality: self.cardinality,
            base_type: self.base_type,
            default_value: self.default_value(delimiter)?,
            max_choices: self.max_choices,
            interaction: self.interaction,
        })
    }
}

impl Declarations {
    /// Creation specs for every declared variable, in document order.
    pub fn variable_specs(&self, delimiter: char) -> crate::error::Result<Vec<VariableSpec>> {
        let mut specs = Vec::new();
        for item in &self.items {
            for response in &item.responses {
                specs.push(response.to_spec(
                    &item.identifier,
                    VariableKind::Response,
                    delimiter,
                )?);
            }
            for parameter in &item.parameters {
                specs.push(parameter.to_spec(
                    &item.identifier,
                    VariableKind::Parameter,
                    delimiter,
                )?);
            }
        }
        Ok(specs)
    }

    pub fn variable_count(&self) -> usize {
        self.items
            .iter()
            .map(|i| i.responses.len() + i.parameters.len())
            .sum()
    }
}

/// Parse a declarations file.
pub fn parse_declarations(path: &Path) -> Result<Declarations> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read declarations file: {}", path.display()))?;

    parse_declarations_str(&content, path)
}

/// Parse declarations from a string (useful for testing).
pub fn parse_declarations_str(content: &str, source_path: &Path) -> Result<Declarations> {
    let parsed: TomlDeclarationsFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let convert = |item: &str, v: TomlVariable| -> Result<VariableDeclaration> {
        let context = || format!("{item}.{}", v.identifier);
        let cardinality: Cardinality = v.cardinality.parse().with_context(context)?;
        let base_type: BaseType = v.base_type.parse().with_context(context)?;
        let interaction = v
            .interaction
            .as_deref()
            .map(|i| i.parse().map_err(|e: String| anyhow::anyhow!("{}: {e}", context())))
            .transpose()?;
        Ok(VariableDeclaration {
            identifier: v.identifier,
            cardinality,
            base_type,
            max_choices: v.max_choices,
            interaction,
            default: v.default,
        })
    };

    let items = parsed
        .items
        .into_iter()
        .map(|item| {
            let responses = item
                .responses
                .into_iter()
                .map(|v| convert(&item.identifier, v))
                .collect::<Result<Vec<_>>>()?;
            let parameters = item
                .parameters
                .into_iter()
                .map(|v| convert(&item.identifier, v))
                .collect::<Result<Vec<_>>>()?;
            Ok(ItemDeclaration {
                identifier: item.identifier,
                responses,
                parameters,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Declarations {
        source: source_path.to_path_buf(),
        custom_responses: parsed.custom_responses,
        items,
    })
}

/// A warning from declarations validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    /// The item identifier (if applicable).
    pub item: Option<String>,
    /// The variable identifier within the item (if applicable).
    pub variable: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn item(item: &str, message: impl Into<String>) -> Self {
        Self {
            item: Some(item.to_string()),
            variable: None,
            message: message.into(),
        }
    }

    fn variable(item: &str, variable: &str, message: impl Into<String>) -> Self {
        Self {
            item: Some(item.to_string()),
            variable: Some(variable.to_string()),
            message: message.into(),
        }
    }
}

fn is_multi_slot(interaction: Option<InteractionType>) -> bool {
    matches!(
        interaction,
        Some(
            InteractionType::Choice
                | InteractionType::GapMatch
                | InteractionType::Match
                | InteractionType::Associate
        )
    )
}

/// Validate declarations for common issues.
pub fn validate_declarations(
    declarations: &Declarations,
    delimiter: char,
) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let custom: HashSet<&str> = declarations
        .custom_responses
        .iter()
        .map(String::as_str)
        .collect();

    let mut seen_items = HashSet::new();
    for item in &declarations.items {
        if !seen_items.insert(&item.identifier) {
            warnings.push(ValidationWarning::item(
                &item.identifier,
                format!("duplicate item identifier: {}", item.identifier),
            ));
        }
        if !is_simple_identifier(&item.identifier) {
            warnings.push(ValidationWarning::item(
                &item.identifier,
                "item identifier is not a valid identifier",
            ));
        }

        let mut seen_variables = HashSet::new();
        for var in item.responses.iter().chain(&item.parameters) {
            let warn = |message: String| {
                ValidationWarning::variable(&item.identifier, &var.identifier, message)
            };

            if !seen_variables.insert(&var.identifier) {
                warnings.push(warn(format!("duplicate variable identifier: {}", var.identifier)));
            }
            if !is_simple_identifier(&var.identifier) {
                warnings.push(warn("variable identifier is not a valid identifier".into()));
            }
            if var.cardinality == Cardinality::Single && var.max_choices.is_some_and(|n| n != 1) {
                warnings.push(warn(format!(
                    "single cardinality requires max_choices 1, got {}",
                    var.max_choices.unwrap_or_default()
                )));
            }
            if var.base_type == BaseType::Crobject {
                if !var.default.is_empty() {
                    warnings.push(warn("crobject defaults cannot be written as literals".into()));
                }
                if custom.is_empty() {
                    warnings.push(warn(
                        "crobject variable but no custom_responses registered".into(),
                    ));
                }
            } else if let Err(e) = var.default_value(delimiter) {
                warnings.push(warn(format!("default does not parse: {e}")));
            }
            if var.cardinality.is_container()
                && var.max_choices.is_none()
                && is_multi_slot(var.interaction)
            {
                warnings.push(warn(
                    "multi-slot interaction without max_choices; status counts answered slots only"
                        .into(),
                ));
            }
        }
    }

    warnings
}
