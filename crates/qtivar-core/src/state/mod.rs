//! Interaction edit-state and its compact textual notation.
//!
//! The notation is its own grammar, not JSON: strings are double-quoted with
//! `&`, `<` and `>` written as entities, numbers and booleans are bare,
//! sequences are `[v,v]` and maps are `{key:value}` with unquoted keys.

mod lexer;
mod parser;
mod serialize;

use crate::error::{Result, VariableError};

pub use lexer::{tokenize, Punct, Spanned, Token};
pub use parser::deserialize_state;
pub use serialize::{is_bare_key, serialize_state};

/// A value in the restricted universe a variable's state may hold.
#[derive(Debug, Clone, PartialEq)]
pub enum StateValue {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<StateValue>),
    Map(StateMap),
}

impl From<bool> for StateValue {
    fn from(b: bool) -> Self {
        StateValue::Bool(b)
    }
}

impl From<f64> for StateValue {
    fn from(n: f64) -> Self {
        StateValue::Number(n)
    }
}

impl From<i32> for StateValue {
    fn from(n: i32) -> Self {
        StateValue::Number(f64::from(n))
    }
}

impl From<&str> for StateValue {
    fn from(s: &str) -> Self {
        StateValue::String(s.to_string())
    }
}

impl From<String> for StateValue {
    fn from(s: String) -> Self {
        StateValue::String(s)
    }
}

impl From<Vec<StateValue>> for StateValue {
    fn from(items: Vec<StateValue>) -> Self {
        StateValue::List(items)
    }
}

impl From<StateMap> for StateValue {
    fn from(map: StateMap) -> Self {
        StateValue::Map(map)
    }
}

/// An insertion-ordered map; inserting an existing key replaces its value in
/// place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateMap {
    entries: Vec<(String, StateValue)>,
}

impl StateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<StateValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<StateValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StateValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<Vec<(String, StateValue)>> for StateMap {
    fn from(pairs: Vec<(String, StateValue)>) -> Self {
        let mut map = StateMap::new();
        for (k, v) in pairs {
            map.insert(k, v);
        }
        map
    }
}

impl From<StateMap> for Vec<(String, StateValue)> {
    fn from(map: StateMap) -> Self {
        map.entries
    }
}

/// Whether `value` can be written in the state notation and read back.
pub fn is_response_state(value: &StateValue) -> bool {
    match value {
        StateValue::Bool(_) | StateValue::String(_) => true,
        StateValue::Number(n) => n.is_finite(),
        StateValue::List(items) => items.iter().all(is_response_state),
        StateValue::Map(map) => map
            .iter()
            .all(|(k, v)| is_bare_key(k) && is_response_state(v)),
    }
}

impl TryFrom<serde_json::Value> for StateValue {
    type Error = VariableError;

    fn try_from(json: serde_json::Value) -> Result<Self> {
        let value = match json {
            serde_json::Value::Null => {
                return Err(VariableError::InvalidResponseState(
                    "null is not a state value".into(),
                ))
            }
            serde_json::Value::Bool(b) => StateValue::Bool(b),
            serde_json::Value::Number(n) => StateValue::Number(n.as_f64().ok_or_else(|| {
                VariableError::InvalidResponseState(format!("number {n} is out of range"))
            })?),
            serde_json::Value::String(s) => StateValue::String(s),
            serde_json::Value::Array(items) => StateValue::List(
                items
                    .into_iter()
                    .map(StateValue::try_from)
                    .collect::<Result<Vec<_>>>()?,
            ),
            serde_json::Value::Object(fields) => {
                let mut map = StateMap::new();
                for (k, v) in fields {
                    map.insert(k, StateValue::try_from(v)?);
                }
                StateValue::Map(map)
            }
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_insert_replaces_in_place() {
        let mut map = StateMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        map.insert("a", 3);
        let keys: Vec<_> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(map.get("a"), Some(&StateValue::Number(3.0)));
    }

    #[test]
    fn response_state_universe() {
        assert!(is_response_state(&StateValue::from(vec![
            StateValue::from(1),
            StateValue::from("x"),
        ])));
        assert!(!is_response_state(&StateValue::Number(f64::NAN)));
        assert!(!is_response_state(&StateValue::Map(
            StateMap::new().with("has space", true)
        )));
    }

    #[test]
    fn from_json() {
        let json = serde_json::json!({"cursor": [1, 2], "open": true, "label": "a"});
        let state = StateValue::try_from(json).unwrap();
        let StateValue::Map(map) = &state else {
            panic!("expected map, got {state:?}");
        };
        assert_eq!(map.get("open"), Some(&StateValue::Bool(true)));
        assert_eq!(
            map.get("cursor"),
            Some(&StateValue::List(vec![1.into(), 2.into()]))
        );

        let err = StateValue::try_from(serde_json::json!([1, null])).unwrap_err();
        assert!(matches!(err, VariableError::InvalidResponseState(_)));
    }
}
