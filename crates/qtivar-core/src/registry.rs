//! The base type × cardinality compatibility table.
//!
//! Each base type contributes a scalar test; cardinality decides how that
//! test applies to a whole value. Custom response (`crobject`) type names are
//! the only open-ended part of the table and are registered per engine.

use std::collections::BTreeSet;

use crate::error::{Result, VariableError};
use crate::literal::{is_identifier, is_uri};
use crate::model::{BaseType, Cardinality, Scalar, Value};

/// Owns the per-engine type tables.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    custom_responses: BTreeSet<String>,
}

fn is_exact_identifier(s: &str) -> bool {
    s.trim() == s && is_identifier(s)
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom response type name so `crobject` values of that
    /// type become compatible.
    pub fn register_custom_response(&mut self, type_name: impl Into<String>) {
        self.custom_responses.insert(type_name.into());
    }

    pub fn is_custom_response(&self, type_name: &str) -> bool {
        self.custom_responses.contains(type_name)
    }

    pub fn custom_responses(&self) -> impl Iterator<Item = &str> {
        self.custom_responses.iter().map(String::as_str)
    }

    /// The per-base-type scalar test.
    pub fn is_compatible_scalar(&self, base_type: BaseType, scalar: &Scalar) -> bool {
        match (base_type, scalar) {
            (BaseType::String, Scalar::String(_)) => true,
            (BaseType::Identifier, Scalar::Identifier(s)) => is_exact_identifier(s),
            (BaseType::Boolean, Scalar::Boolean(_)) => true,
            (BaseType::Integer, Scalar::Integer(_)) => true,
            (BaseType::Float, Scalar::Float(_)) => true,
            (BaseType::Point, Scalar::Point(_)) => true,
            (BaseType::Pair, Scalar::Pair(p)) => {
                is_exact_identifier(&p.a) && is_exact_identifier(&p.b)
            }
            (BaseType::DirectedPair, Scalar::DirectedPair(p)) => {
                is_exact_identifier(&p.key) && is_exact_identifier(&p.value)
            }
            (BaseType::Duration, Scalar::Duration(secs)) => secs.is_finite() && *secs >= 0.0,
            (BaseType::Uri, Scalar::Uri(s)) => is_uri(s),
            (BaseType::Crobject, Scalar::Crobject(c)) => self.is_custom_response(&c.type_name),
            _ => false,
        }
    }

    /// Whether `value` may be assigned to a variable of the given shape.
    ///
    /// An absent value is always compatible. Containers accept a bare scalar
    /// or a list of scalars; only `ordered` points may leave holes.
    pub fn is_compatible_value(
        &self,
        cardinality: Cardinality,
        base_type: BaseType,
        value: Option<&Value>,
    ) -> bool {
        self.check(cardinality, base_type, value).is_ok()
    }

    fn check(
        &self,
        cardinality: Cardinality,
        base_type: BaseType,
        value: Option<&Value>,
    ) -> std::result::Result<(), String> {
        let Some(value) = value else {
            return Ok(());
        };
        match (cardinality, value) {
            (Cardinality::Single, Value::List(_)) => {
                Err("single cardinality does not accept a list".into())
            }
            (_, Value::Scalar(s)) => {
                if self.is_compatible_scalar(base_type, s) {
                    Ok(())
                } else {
                    Err(format!("{} is not a {base_type}", s.base_type()))
                }
            }
            (_, Value::List(items)) => {
                let holes_allowed =
                    cardinality == Cardinality::Ordered && base_type == BaseType::Point;
                for (index, item) in items.iter().enumerate() {
                    match item {
                        Some(s) if !self.is_compatible_scalar(base_type, s) => {
                            return Err(format!(
                                "element {index} is {} not {base_type}",
                                s.base_type()
                            ));
                        }
                        None if !holes_allowed => {
                            return Err(format!("element {index} is empty"));
                        }
                        _ => {}
                    }
                }
                Ok(())
            }
        }
    }

    /// Check compatibility and normalize containers to lists.
    pub fn canonicalize_value(
        &self,
        identifier: &str,
        cardinality: Cardinality,
        base_type: BaseType,
        value: Option<Value>,
    ) -> Result<Option<Value>> {
        if let Err(reason) = self.check(cardinality, base_type, value.as_ref()) {
            return Err(VariableError::IncompatibleValue {
                identifier: identifier.to_string(),
                cardinality,
                base_type,
                reason,
            });
        }
        let canonical = match (cardinality, value) {
            (_, None) => None,
            (Cardinality::Single, v) => v,
            (_, Some(Value::Scalar(s))) => Some(Value::List(vec![Some(s)])),
            (_, list) => list,
        };
        Ok(canonical)
    }
}
