//! Engine error types.
//!
//! Every failure is synchronous and final: scoring-critical data is never
//! coerced, so each operation either fully succeeds or returns one of these.

use thiserror::Error;

use crate::model::{BaseType, Cardinality};

/// Errors raised by the response variable engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VariableError {
    /// An operation received the wrong number of arguments or parts.
    #[error("invalid argument count: expected {expected}, got {actual}")]
    InvalidArgumentCount { expected: usize, actual: usize },

    /// A base type name is not one of the supported base types.
    #[error("unknown base type: {0}")]
    UnknownBaseType(String),

    /// A cardinality name is not `single`, `multiple` or `ordered`.
    #[error("unknown cardinality: {0}")]
    UnknownCardinality(String),

    /// A string does not conform to the identifier grammar.
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// An item identifier cannot be used as the prefix of a composite identifier.
    #[error("invalid item identifier: {0:?}")]
    InvalidItemIdentifier(String),

    /// A value does not satisfy the declared cardinality and base type.
    #[error("incompatible value for {identifier} ({cardinality}/{base_type}): {reason}")]
    IncompatibleValue {
        identifier: String,
        cardinality: Cardinality,
        base_type: BaseType,
        reason: String,
    },

    /// A literal could not be parsed as the requested base type.
    #[error("invalid {base_type} literal: {text:?}")]
    InvalidLiteral { base_type: BaseType, text: String },

    /// A `single` variable was declared with a `maxChoices` other than 1.
    #[error("{identifier}: single cardinality requires maxChoices 1, got {max_choices}")]
    InvalidMaxChoices { identifier: String, max_choices: u32 },

    /// A state value lies outside the serializable universe.
    #[error("invalid response state: {0}")]
    InvalidResponseState(String),

    /// A value cannot be written in the state notation.
    #[error("unserializable value: {0}")]
    UnserializableValue(String),

    /// State notation text could not be parsed.
    #[error("malformed state at offset {position}: {reason}")]
    MalformedState { position: usize, reason: String },

    /// A wire element is missing attributes or is not well-formed.
    #[error("malformed response element: {0}")]
    MalformedResponse(String),

    /// A variable with the same composite identifier already exists.
    #[error("duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    /// No variable is registered under the composite identifier.
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    /// The declarations document has not finished loading.
    #[error("engine is not ready: declarations have not been loaded")]
    NotReady,
}

impl VariableError {
    /// Stable short name of the error kind, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            VariableError::InvalidArgumentCount { .. } => "invalid_argument_count",
            VariableError::UnknownBaseType(_) => "unknown_base_type",
            VariableError::UnknownCardinality(_) => "unknown_cardinality",
            VariableError::InvalidIdentifier(_) => "invalid_identifier",
            VariableError::InvalidItemIdentifier(_) => "invalid_item_identifier",
            VariableError::IncompatibleValue { .. } => "incompatible_value",
            VariableError::InvalidLiteral { .. } => "invalid_literal",
            VariableError::InvalidMaxChoices { .. } => "invalid_max_choices",
            VariableError::InvalidResponseState(_) => "invalid_response_state",
            VariableError::UnserializableValue(_) => "unserializable_value",
            VariableError::MalformedState { .. } => "malformed_state",
            VariableError::MalformedResponse(_) => "malformed_response",
            VariableError::DuplicateIdentifier(_) => "duplicate_identifier",
            VariableError::UnknownVariable(_) => "unknown_variable",
            VariableError::NotReady => "not_ready",
        }
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, VariableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        let err = VariableError::UnknownBaseType("matrix".into());
        assert_eq!(err.to_string(), "unknown base type: matrix");

        let err = VariableError::MalformedState {
            position: 4,
            reason: "unexpected ']'".into(),
        };
        assert_eq!(err.to_string(), "malformed state at offset 4: unexpected ']'");
    }

    #[test]
    fn kind_is_stable() {
        assert_eq!(VariableError::NotReady.kind(), "not_ready");
        assert_eq!(
            VariableError::DuplicateIdentifier("item1.RESP".into()).kind(),
            "duplicate_identifier"
        );
    }
}
