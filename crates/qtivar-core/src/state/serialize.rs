//! Writer for the state notation.
//!
//! Strings are double-quoted with `&`, `<` and `>` written as entities.
//! `"` and `\` inside a string are also written with a backslash (`\"`,
//! `\\`), which earlier writers of this notation did not do. This is a
//! deliberate change to the wire grammar: every string now survives a round
//! trip, and consumers that only know the older notation will see the
//! backslash pairs. A lone backslash before any other character is still
//! read literally.

use super::StateValue;
use crate::error::{Result, VariableError};

/// Whether `key` can be written unquoted as a map key.
pub fn is_bare_key(key: &str) -> bool {
    !key.is_empty()
        && !key
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '{' | '}' | '[' | ']' | ',' | ':' | '"'))
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            other => out.push(other),
        }
    }
    out.push('"');
}

fn write_value(out: &mut String, value: &StateValue) -> Result<()> {
    match value {
        StateValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        StateValue::Number(n) => {
            if !n.is_finite() {
                return Err(VariableError::UnserializableValue(format!(
                    "non-finite number {n}"
                )));
            }
            out.push_str(&n.to_string());
        }
        StateValue::String(s) => write_string(out, s),
        StateValue::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item)?;
            }
            out.push(']');
        }
        StateValue::Map(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if !is_bare_key(key) {
                    return Err(VariableError::UnserializableValue(format!(
                        "map key {key:?} cannot be written unquoted"
                    )));
                }
                if i > 0 {
                    out.push(',');
                }
                out.push_str(key);
                out.push(':');
                write_value(out, item)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

/// Write `value` in the state notation.
pub fn serialize_state(value: &StateValue) -> Result<String> {
    let mut out = String::new();
    write_value(&mut out, value)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateMap;

    #[test]
    fn writes_compact_notation() {
        let value: StateValue = StateMap::new()
            .with("order", vec![2.into(), 0.into(), 1.into()])
            .with("open", true)
            .with("label", "a<b")
            .with("ratio", 0.25)
            .into();
        assert_eq!(
            serialize_state(&value).unwrap(),
            r#"{order:[2,0,1],open:true,label:"a&lt;b",ratio:0.25}"#
        );
    }

    #[test]
    fn integral_numbers_have_no_fraction() {
        assert_eq!(serialize_state(&StateValue::Number(3.0)).unwrap(), "3");
        assert_eq!(serialize_state(&StateValue::Number(-12.0)).unwrap(), "-12");
    }

    #[test]
    fn quotes_and_backslashes_are_escaped() {
        assert_eq!(
            serialize_state(&StateValue::from(r#"a"b\c"#)).unwrap(),
            r#""a\"b\\c""#
        );
    }

    #[test]
    fn rejects_unserializable_values() {
        assert!(matches!(
            serialize_state(&StateValue::Number(f64::INFINITY)),
            Err(VariableError::UnserializableValue(_))
        ));
        let bad_key: StateValue = StateMap::new().with("a:b", 1).into();
        assert!(matches!(
            serialize_state(&bad_key),
            Err(VariableError::UnserializableValue(_))
        ));
    }

    #[test]
    fn bare_keys() {
        assert!(is_bare_key("Gap1"));
        assert!(is_bare_key("0"));
        assert!(!is_bare_key(""));
        assert!(!is_bare_key("two words"));
        assert!(!is_bare_key("{x}"));
    }
}
