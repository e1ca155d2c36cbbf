//! The typed, identified answer slot.

use serde::Serialize;

use crate::error::{Result, VariableError};
use crate::literal::CompositeIdentifier;
use crate::model::{BaseType, Cardinality, InteractionType, Value, VariableKind};
use crate::registry::TypeRegistry;
use crate::state::{is_response_state, StateValue};

/// Everything needed to create a variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSpec {
    pub kind: VariableKind,
    pub identifier: CompositeIdentifier,
    pub cardinality: Cardinality,
    pub base_type: BaseType,
    pub default_value: Option<Value>,
    /// `None` takes 1 for `single` and 0 (unbounded) for containers.
    pub max_choices: Option<u32>,
    pub interaction: Option<InteractionType>,
}

impl VariableSpec {
    pub fn response(
        identifier: CompositeIdentifier,
        cardinality: Cardinality,
        base_type: BaseType,
    ) -> Self {
        Self {
            kind: VariableKind::Response,
            identifier,
            cardinality,
            base_type,
            default_value: None,
            max_choices: None,
            interaction: None,
        }
    }

    pub fn parameter(
        identifier: CompositeIdentifier,
        cardinality: Cardinality,
        base_type: BaseType,
    ) -> Self {
        Self {
            kind: VariableKind::Parameter,
            ..Self::response(identifier, cardinality, base_type)
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_max_choices(mut self, max_choices: u32) -> Self {
        self.max_choices = Some(max_choices);
        self
    }

    pub fn with_interaction(mut self, interaction: InteractionType) -> Self {
        self.interaction = Some(interaction);
        self
    }
}

/// A committed value change, returned by `set_value` and handed to listeners.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueChange {
    pub identifier: CompositeIdentifier,
    pub kind: VariableKind,
    pub previous: Option<Value>,
    pub current: Option<Value>,
}

/// A response or parameter variable.
///
/// Identity, shape and default are fixed at creation; only `value` and
/// `state` change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    kind: VariableKind,
    identifier: CompositeIdentifier,
    cardinality: Cardinality,
    base_type: BaseType,
    default_value: Option<Value>,
    value: Option<Value>,
    state: Option<StateValue>,
    max_choices: u32,
    interaction: Option<InteractionType>,
}

impl Variable {
    /// Create a variable seeded with its canonicalized default value.
    pub fn create(spec: VariableSpec, registry: &TypeRegistry) -> Result<Self> {
        let max_choices = match (spec.cardinality, spec.max_choices) {
            (Cardinality::Single, None | Some(1)) => 1,
            (Cardinality::Single, Some(other)) => {
                return Err(VariableError::InvalidMaxChoices {
                    identifier: spec.identifier.to_string(),
                    max_choices: other,
                })
            }
            (_, Some(n)) => n,
            (_, None) => 0,
        };

        let default_value = registry.canonicalize_value(
            &spec.identifier.to_string(),
            spec.cardinality,
            spec.base_type,
            spec.default_value,
        )?;

        Ok(Self {
            kind: spec.kind,
            identifier: spec.identifier,
            cardinality: spec.cardinality,
            base_type: spec.base_type,
            value: default_value.clone(),
            default_value,
            state: None,
            max_choices,
            interaction: spec.interaction,
        })
    }

    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    pub fn identifier(&self) -> &CompositeIdentifier {
        &self.identifier
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn base_type(&self) -> BaseType {
        self.base_type
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn state(&self) -> Option<&StateValue> {
        self.state.as_ref()
    }

    /// 0 means unbounded.
    pub fn max_choices(&self) -> u32 {
        self.max_choices
    }

    pub fn interaction(&self) -> Option<InteractionType> {
        self.interaction
    }

    /// Canonicalize, check and assign a new value.
    pub fn set_value(
        &mut self,
        value: Option<Value>,
        registry: &TypeRegistry,
    ) -> Result<ValueChange> {
        let canonical = registry.canonicalize_value(
            &self.identifier.to_string(),
            self.cardinality,
            self.base_type,
            value,
        )?;
        let previous = std::mem::replace(&mut self.value, canonical);
        Ok(ValueChange {
            identifier: self.identifier.clone(),
            kind: self.kind,
            previous,
            current: self.value.clone(),
        })
    }

    /// Assign interaction edit-state; it must be writable in the state notation.
    pub fn set_state(&mut self, state: Option<StateValue>) -> Result<()> {
        if let Some(s) = &state {
            if !is_response_state(s) {
                return Err(VariableError::InvalidResponseState(format!(
                    "{}: state cannot be written in the state notation",
                    self.identifier
                )));
            }
        }
        self.state = state;
        Ok(())
    }

    /// Reset value to the default and clear state.
    pub fn reset(&mut self) {
        self.value = self.default_value.clone();
        self.state = None;
    }
}
