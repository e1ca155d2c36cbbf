//! Core data model types for qtivar.
//!
//! These are the types every other module speaks: cardinalities, base types,
//! the scalar values each base type admits, and the composite `Value` a
//! variable holds.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VariableError;

/// How many values a variable holds, and whether their order matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    Single,
    Multiple,
    Ordered,
}

impl Cardinality {
    pub const ALL: [Cardinality; 3] = [
        Cardinality::Single,
        Cardinality::Multiple,
        Cardinality::Ordered,
    ];

    /// Returns `true` for `Multiple` and `Ordered`.
    pub fn is_container(self) -> bool {
        !matches!(self, Cardinality::Single)
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::Single => write!(f, "single"),
            Cardinality::Multiple => write!(f, "multiple"),
            Cardinality::Ordered => write!(f, "ordered"),
        }
    }
}

impl FromStr for Cardinality {
    type Err = VariableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(Cardinality::Single),
            "multiple" => Ok(Cardinality::Multiple),
            "ordered" => Ok(Cardinality::Ordered),
            _ => Err(VariableError::UnknownCardinality(s.to_string())),
        }
    }
}

/// The scalar type of a variable's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BaseType {
    String,
    Identifier,
    Boolean,
    Integer,
    Float,
    Point,
    Pair,
    DirectedPair,
    Duration,
    Uri,
    Crobject,
}

impl BaseType {
    pub const ALL: [BaseType; 11] = [
        BaseType::String,
        BaseType::Identifier,
        BaseType::Boolean,
        BaseType::Integer,
        BaseType::Float,
        BaseType::Point,
        BaseType::Pair,
        BaseType::DirectedPair,
        BaseType::Duration,
        BaseType::Uri,
        BaseType::Crobject,
    ];
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BaseType::String => "string",
            BaseType::Identifier => "identifier",
            BaseType::Boolean => "boolean",
            BaseType::Integer => "integer",
            BaseType::Float => "float",
            BaseType::Point => "point",
            BaseType::Pair => "pair",
            BaseType::DirectedPair => "directedPair",
            BaseType::Duration => "duration",
            BaseType::Uri => "uri",
            BaseType::Crobject => "crobject",
        };
        f.write_str(name)
    }
}

impl FromStr for BaseType {
    type Err = VariableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "string" => Ok(BaseType::String),
            "identifier" => Ok(BaseType::Identifier),
            "boolean" => Ok(BaseType::Boolean),
            "integer" => Ok(BaseType::Integer),
            "float" => Ok(BaseType::Float),
            "point" => Ok(BaseType::Point),
            "pair" => Ok(BaseType::Pair),
            "directedpair" | "directed_pair" => Ok(BaseType::DirectedPair),
            "duration" => Ok(BaseType::Duration),
            "uri" => Ok(BaseType::Uri),
            "crobject" => Ok(BaseType::Crobject),
            _ => Err(VariableError::UnknownBaseType(s.to_string())),
        }
    }
}

/// An integer coordinate, e.g. a click on a hotspot image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// An unordered association between two identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    pub a: String,
    pub b: String,
}

impl Pair {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.a, self.b)
    }
}

/// A key → value association, used by match and gap-match interactions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectedPair {
    pub key: String,
    pub value: String,
}

impl DirectedPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for DirectedPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.key, self.value)
    }
}

/// Opaque payload of a registered custom response type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomResponse {
    /// Registered custom response type name.
    pub type_name: String,
    /// Free-form metadata bag.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl CustomResponse {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A single value of one of the base types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "baseType", content = "value", rename_all = "camelCase")]
pub enum Scalar {
    String(String),
    Identifier(String),
    Boolean(bool),
    Integer(i32),
    Float(f64),
    Point(Point),
    Pair(Pair),
    DirectedPair(DirectedPair),
    /// Seconds.
    Duration(f64),
    Uri(String),
    Crobject(CustomResponse),
}

impl Scalar {
    /// The base type this scalar belongs to.
    pub fn base_type(&self) -> BaseType {
        match self {
            Scalar::String(_) => BaseType::String,
            Scalar::Identifier(_) => BaseType::Identifier,
            Scalar::Boolean(_) => BaseType::Boolean,
            Scalar::Integer(_) => BaseType::Integer,
            Scalar::Float(_) => BaseType::Float,
            Scalar::Point(_) => BaseType::Point,
            Scalar::Pair(_) => BaseType::Pair,
            Scalar::DirectedPair(_) => BaseType::DirectedPair,
            Scalar::Duration(_) => BaseType::Duration,
            Scalar::Uri(_) => BaseType::Uri,
            Scalar::Crobject(_) => BaseType::Crobject,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) | Scalar::Identifier(s) | Scalar::Uri(s) => f.write_str(s),
            Scalar::Boolean(b) => write!(f, "{b}"),
            Scalar::Integer(i) => write!(f, "{i}"),
            Scalar::Float(v) | Scalar::Duration(v) => write!(f, "{v}"),
            Scalar::Point(p) => write!(f, "{p}"),
            Scalar::Pair(p) => write!(f, "{p}"),
            Scalar::DirectedPair(p) => write!(f, "{p}"),
            Scalar::Crobject(c) => write!(f, "<{}>", c.type_name),
        }
    }
}

/// The value held by a variable.
///
/// `Single` variables hold a `Scalar`; `Multiple`/`Ordered` variables hold a
/// `List` once canonicalized. `None` elements are unanswered slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(Scalar),
    List(Vec<Option<Scalar>>),
}

impl Value {
    /// A list of answered scalars.
    pub fn list(items: impl IntoIterator<Item = Scalar>) -> Self {
        Value::List(items.into_iter().map(Some).collect())
    }

    /// All elements as a slice of slots; a bare scalar is one slot.
    pub fn slots(&self) -> Vec<Option<&Scalar>> {
        match self {
            Value::Scalar(s) => vec![Some(s)],
            Value::List(items) => items.iter().map(Option::as_ref).collect(),
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => write!(f, "{s}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if let Some(s) = item {
                        write!(f, "{s}")?;
                    }
                }
                f.write_str("]")
            }
        }
    }
}

/// Whether a variable records a candidate answer or an item parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Response,
    Parameter,
}

/// The interaction that drives a response variable, as far as the status
/// engine needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InteractionType {
    Choice,
    Order,
    Match,
    Associate,
    GapMatch,
    InlineChoice,
    TextEntry,
    ExtendedText,
    Hotspot,
    SelectPoint,
    GraphicOrder,
    Slider,
    Custom,
}

impl FromStr for InteractionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        let normalized = normalized.strip_suffix("interaction").unwrap_or(&normalized);
        match normalized {
            "choice" => Ok(InteractionType::Choice),
            "order" => Ok(InteractionType::Order),
            "match" => Ok(InteractionType::Match),
            "associate" => Ok(InteractionType::Associate),
            "gapmatch" => Ok(InteractionType::GapMatch),
            "inlinechoice" => Ok(InteractionType::InlineChoice),
            "textentry" => Ok(InteractionType::TextEntry),
            "extendedtext" => Ok(InteractionType::ExtendedText),
            "hotspot" => Ok(InteractionType::Hotspot),
            "selectpoint" => Ok(InteractionType::SelectPoint),
            "graphicorder" => Ok(InteractionType::GraphicOrder),
            "slider" => Ok(InteractionType::Slider),
            "custom" => Ok(InteractionType::Custom),
            other => Err(format!("unknown interaction: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_type_display_and_parse() {
        for bt in BaseType::ALL {
            assert_eq!(bt.to_string().parse::<BaseType>().unwrap(), bt);
        }
        assert_eq!("DirectedPair".parse::<BaseType>().unwrap(), BaseType::DirectedPair);
        assert!(matches!(
            "matrix".parse::<BaseType>(),
            Err(VariableError::UnknownBaseType(_))
        ));
    }

    #[test]
    fn cardinality_display_and_parse() {
        for c in Cardinality::ALL {
            assert_eq!(c.to_string().parse::<Cardinality>().unwrap(), c);
        }
        assert!(matches!(
            "record".parse::<Cardinality>(),
            Err(VariableError::UnknownCardinality(_))
        ));
    }

    #[test]
    fn pair_types_render_canonically() {
        assert_eq!(Point::new(10, -2).to_string(), "(10,-2)");
        assert_eq!(Pair::new("A", "B").to_string(), "(A,B)");
        assert_eq!(DirectedPair::new("Gap1", "X").to_string(), "(Gap1,X)");
    }

    #[test]
    fn interaction_names_accept_qti_spelling() {
        assert_eq!(
            "choiceInteraction".parse::<InteractionType>().unwrap(),
            InteractionType::Choice
        );
        assert_eq!(
            "gap_match".parse::<InteractionType>().unwrap(),
            InteractionType::GapMatch
        );
        assert!("drawing".parse::<InteractionType>().is_err());
    }

    #[test]
    fn value_json_shape() {
        let v = Value::list([Scalar::Identifier("A".into())]);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"[{"baseType":"identifier","value":"A"}]"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
