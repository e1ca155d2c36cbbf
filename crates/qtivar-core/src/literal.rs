//! Literal grammar: identifiers and the textual forms of scalar values.
//!
//! Parsers return `None` for text that does not conform; callers that need a
//! typed error go through [`parse_scalar`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VariableError};
use crate::model::{BaseType, DirectedPair, Pair, Point, Scalar};

/// Default delimiter between the key and value of a directed pair.
pub const DEFAULT_DIRECTED_PAIR_DELIMITER: char = ':';

fn is_name_start_char(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_combining_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0300}'..='\u{036F}'
            | '\u{0483}'..='\u{0487}'
            | '\u{0591}'..='\u{05BD}'
            | '\u{0610}'..='\u{061A}'
            | '\u{064B}'..='\u{065F}'
            | '\u{0900}'..='\u{0903}'
            | '\u{093A}'..='\u{094F}'
            | '\u{1AB0}'..='\u{1AFF}'
            | '\u{1DC0}'..='\u{1DFF}'
            | '\u{20D0}'..='\u{20FF}'
            | '\u{302A}'..='\u{302F}'
            | '\u{3099}'..='\u{309A}'
            | '\u{FE20}'..='\u{FE2F}'
    )
}

fn is_extender(c: char) -> bool {
    matches!(
        c,
        '\u{00B7}'
            | '\u{02D0}'
            | '\u{02D1}'
            | '\u{0387}'
            | '\u{0640}'
            | '\u{0E46}'
            | '\u{0EC6}'
            | '\u{3005}'
            | '\u{3031}'..='\u{3035}'
            | '\u{309D}'..='\u{309E}'
            | '\u{30FC}'..='\u{30FE}'
    )
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || c.is_numeric()
        || matches!(c, '-' | '.')
        || is_combining_mark(c)
        || is_extender(c)
}

fn is_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}

/// Whether `s` (after trimming) is an identifier.
pub fn is_identifier(s: &str) -> bool {
    is_name(s.trim())
}

/// Trim `s` and return it if it is an identifier.
pub fn parse_identifier(s: &str) -> Option<String> {
    let trimmed = s.trim();
    is_name(trimmed).then(|| trimmed.to_string())
}

/// An identifier without any `.`.
pub fn is_simple_identifier(s: &str) -> bool {
    let trimmed = s.trim();
    is_name(trimmed) && !trimmed.contains('.')
}

/// Exactly two simple identifiers joined by a single `.`.
pub fn is_composite_identifier(s: &str) -> bool {
    let trimmed = s.trim();
    match trimmed.split_once('.') {
        Some((item, local)) => is_simple_identifier(item) && is_simple_identifier(local),
        None => false,
    }
}

/// Join an item identifier and a local identifier into a composite key.
pub fn create_composite_identifier(item: &str, local: &str) -> Result<CompositeIdentifier> {
    if !is_simple_identifier(item) {
        return Err(VariableError::InvalidItemIdentifier(item.to_string()));
    }
    if !is_simple_identifier(local) {
        return Err(VariableError::InvalidIdentifier(local.to_string()));
    }
    Ok(CompositeIdentifier {
        item: item.trim().to_string(),
        local: local.trim().to_string(),
    })
}

/// `itemIdentifier.localIdentifier`, the primary key of the variable store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompositeIdentifier {
    item: String,
    local: String,
}

impl CompositeIdentifier {
    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn local(&self) -> &str {
        &self.local
    }
}

impl fmt::Display for CompositeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.item, self.local)
    }
}

impl FromStr for CompositeIdentifier {
    type Err = VariableError;

    fn from_str(s: &str) -> Result<Self> {
        if !is_composite_identifier(s) {
            return Err(VariableError::InvalidIdentifier(s.to_string()));
        }
        let (item, local) = s
            .trim()
            .split_once('.')
            .ok_or_else(|| VariableError::InvalidIdentifier(s.to_string()))?;
        create_composite_identifier(item, local)
    }
}

impl TryFrom<String> for CompositeIdentifier {
    type Error = VariableError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<CompositeIdentifier> for String {
    fn from(id: CompositeIdentifier) -> Self {
        id.to_string()
    }
}

/// `"1"`/`"true"` and `"0"`/`"false"`.
pub fn parse_boolean(s: &str) -> Option<bool> {
    match s.trim() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// An optionally signed decimal integer within the signed 32-bit range.
pub fn parse_integer(s: &str) -> Option<i32> {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<i32>().ok()
}

/// Signed decimal or exponential notation, without the special literals.
pub(crate) fn is_decimal_literal(s: &str) -> bool {
    let body = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (mantissa, None),
    };
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    let mantissa_ok = all_digits(int_part)
        && frac_part.map_or(true, all_digits)
        && (!int_part.is_empty() || frac_part.is_some_and(|f| !f.is_empty()));

    let exponent_ok = match exponent {
        None => true,
        Some(e) => {
            let digits = e.strip_prefix(['+', '-']).unwrap_or(e);
            !digits.is_empty() && all_digits(digits)
        }
    };

    mantissa_ok && exponent_ok
}

/// Decimal or exponential notation, plus `INF`, `-INF` and `NaN`.
pub fn parse_float(s: &str) -> Option<f64> {
    match s.trim() {
        "INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        other if is_decimal_literal(other) => other.parse::<f64>().ok(),
        _ => None,
    }
}

/// Split into exactly two tokens on whitespace and, if given, the delimiter.
fn split_two(s: &str, delimiter: Option<char>) -> Option<(&str, &str)> {
    let mut tokens = s
        .split(|c: char| c.is_whitespace() || Some(c) == delimiter)
        .filter(|t| !t.is_empty());
    let first = tokens.next()?;
    let second = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }
    Some((first, second))
}

/// `"x y"` → `Point`.
pub fn parse_point(s: &str) -> Option<Point> {
    let (x, y) = split_two(s, None)?;
    Some(Point::new(parse_integer(x)?, parse_integer(y)?))
}

/// `"a b"` → `Pair` of identifiers.
pub fn parse_pair(s: &str) -> Option<Pair> {
    let (a, b) = split_two(s, None)?;
    Some(Pair::new(parse_identifier(a)?, parse_identifier(b)?))
}

/// `"a:b"` or `"a b"` → `DirectedPair`, using the default delimiter.
pub fn parse_directed_pair(s: &str) -> Option<DirectedPair> {
    parse_directed_pair_with(s, DEFAULT_DIRECTED_PAIR_DELIMITER)
}

/// `parse_directed_pair` with an explicit key/value delimiter.
pub fn parse_directed_pair_with(s: &str, delimiter: char) -> Option<DirectedPair> {
    let (key, value) = split_two(s, Some(delimiter))?;
    Some(DirectedPair::new(parse_identifier(key)?, parse_identifier(value)?))
}

/// Parse the literal text of one scalar of `base_type`.
///
/// `Crobject` has no literal form and always fails here.
pub fn parse_scalar(base_type: BaseType, text: &str, delimiter: char) -> Result<Scalar> {
    let invalid = || VariableError::InvalidLiteral {
        base_type,
        text: text.to_string(),
    };
    let scalar = match base_type {
        BaseType::String => Scalar::String(text.to_string()),
        BaseType::Identifier => Scalar::Identifier(parse_identifier(text).ok_or_else(invalid)?),
        BaseType::Boolean => Scalar::Boolean(parse_boolean(text).ok_or_else(invalid)?),
        BaseType::Integer => Scalar::Integer(parse_integer(text).ok_or_else(invalid)?),
        BaseType::Float => Scalar::Float(parse_float(text).ok_or_else(invalid)?),
        BaseType::Point => Scalar::Point(parse_point(text).ok_or_else(invalid)?),
        BaseType::Pair => Scalar::Pair(parse_pair(text).ok_or_else(invalid)?),
        BaseType::DirectedPair => {
            Scalar::DirectedPair(parse_directed_pair_with(text, delimiter).ok_or_else(invalid)?)
        }
        BaseType::Duration => {
            let secs = parse_float(text)
                .filter(|v| v.is_finite() && *v >= 0.0)
                .ok_or_else(invalid)?;
            Scalar::Duration(secs)
        }
        BaseType::Uri => {
            let trimmed = text.trim();
            if !is_uri(trimmed) {
                return Err(invalid());
            }
            Scalar::Uri(trimmed.to_string())
        }
        BaseType::Crobject => return Err(invalid()),
    };
    Ok(scalar)
}

/// Non-empty and free of whitespace.
pub fn is_uri(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(char::is_whitespace)
}
