//! Variable → wire element.

use std::collections::BTreeMap;

use super::{custom_response_to_xml, escape_list_item, escape_value_text, ResponseElement};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::model::{BaseType, Cardinality, DirectedPair, Scalar, Value};
use crate::state::serialize_state;
use crate::variable::Variable;

fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "INF".to_string()
    } else if v == f64::NEG_INFINITY {
        "-INF".to_string()
    } else {
        v.to_string()
    }
}

/// Text of one scalar as the sole content of a value child.
pub fn encode_scalar(scalar: &Scalar) -> String {
    match scalar {
        Scalar::String(s) | Scalar::Uri(s) => escape_value_text(s),
        Scalar::Identifier(s) => s.clone(),
        Scalar::Boolean(b) => b.to_string(),
        Scalar::Integer(i) => i.to_string(),
        Scalar::Float(v) | Scalar::Duration(v) => format_float(*v),
        Scalar::Point(p) => format!("{} {}", p.x, p.y),
        Scalar::Pair(p) => format!("{} {}", p.a, p.b),
        Scalar::DirectedPair(p) => format!("{} {}", p.key, p.value),
        Scalar::Crobject(c) => custom_response_to_xml(c),
    }
}

/// Text of one scalar as an element of a comma-joined list.
fn encode_list_item(scalar: &Scalar, config: &EngineConfig) -> String {
    match scalar {
        Scalar::String(s) | Scalar::Uri(s) => escape_list_item(s),
        Scalar::DirectedPair(p) => {
            format!("{}{}{}", p.key, config.directed_pair_delimiter, p.value)
        }
        other => encode_scalar(other),
    }
}

/// The slot number of a `GapN` key.
fn gap_index(key: &str, prefix: &str) -> Option<u32> {
    let digits = key.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|n| *n > 0)
}

/// Widest gap layout written out slot by slot.
pub const MAX_GAP_SLOTS: u32 = 1024;

/// Fixed-width `Gap1:value,Gap2:,…` layout.
///
/// `None` when some key is not a gap slot, when a slot is answered twice or
/// when the layout would span more than `MAX_GAP_SLOTS` slots.
fn encode_gap_slots(
    pairs: &[&DirectedPair],
    max_choices: u32,
    config: &EngineConfig,
) -> Option<String> {
    let mut answers = BTreeMap::new();
    for pair in pairs {
        let index = gap_index(&pair.key, &config.gap_prefix)?;
        if answers.insert(index, pair.value.as_str()).is_some() {
            return None;
        }
    }
    let highest = answers.last_key_value().map_or(0, |(n, _)| *n);
    let width = highest.max(max_choices);
    if width > MAX_GAP_SLOTS {
        return None;
    }

    let prefix = &config.gap_prefix;
    let delimiter = config.directed_pair_delimiter;
    let slots: Vec<String> = (1..=width)
        .map(|n| {
            let answer = answers.get(&n).copied().unwrap_or_default();
            format!("{prefix}{n}{delimiter}{answer}")
        })
        .collect();
    Some(slots.join(","))
}

/// Value children for a value of the given shape.
pub fn encode_value(
    base_type: BaseType,
    cardinality: Cardinality,
    value: Option<&Value>,
    max_choices: u32,
    config: &EngineConfig,
) -> Vec<String> {
    let Some(value) = value else {
        return Vec::new();
    };
    let slots = value.slots();

    if cardinality == Cardinality::Single {
        return slots
            .into_iter()
            .flatten()
            .take(1)
            .map(encode_scalar)
            .collect();
    }
    if slots.is_empty() {
        return Vec::new();
    }

    let joined = match base_type {
        BaseType::Crobject => slots
            .iter()
            .flatten()
            .map(|s| encode_scalar(s))
            .collect::<String>(),
        BaseType::DirectedPair => {
            let pairs: Vec<&DirectedPair> = slots
                .iter()
                .flatten()
                .filter_map(|s| match s {
                    Scalar::DirectedPair(p) => Some(p),
                    _ => None,
                })
                .collect();
            encode_gap_slots(&pairs, max_choices, config)
                .unwrap_or_else(|| join_slots(&slots, config))
        }
        _ => join_slots(&slots, config),
    };
    vec![joined]
}

fn join_slots(slots: &[Option<&Scalar>], config: &EngineConfig) -> String {
    slots
        .iter()
        .map(|slot| slot.map_or_else(String::new, |s| encode_list_item(s, config)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Build the wire element for a variable.
pub fn encode_response(variable: &Variable, config: &EngineConfig) -> Result<ResponseElement> {
    let identifier = variable.identifier();
    let collapse = variable.cardinality() == Cardinality::Multiple
        && identifier.local() == config.candidate_information_identifier;

    let values = encode_value(
        variable.base_type(),
        variable.cardinality(),
        variable.value(),
        variable.max_choices(),
        config,
    );
    let cardinality = if collapse {
        Cardinality::Single
    } else {
        variable.cardinality()
    };

    let state = match variable.state() {
        Some(state) => Some(serialize_state(state)?).filter(|s| !s.is_empty()),
        None => None,
    };

    Ok(ResponseElement {
        base_type: variable.base_type(),
        cardinality,
        item_identifier: identifier.item().to_string(),
        response_identifier: identifier.local().to_string(),
        values,
        state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CustomResponse, Point};
    use crate::registry::TypeRegistry;
    use crate::state::StateMap;
    use crate::variable::VariableSpec;

    fn variable(
        id: &str,
        cardinality: Cardinality,
        base_type: BaseType,
        max_choices: Option<u32>,
        value: Option<Value>,
        registry: &TypeRegistry,
    ) -> Variable {
        let mut spec = VariableSpec::response(id.parse().unwrap(), cardinality, base_type);
        spec.max_choices = max_choices;
        let mut var = Variable::create(spec, registry).unwrap();
        var.set_value(value, registry).unwrap();
        var
    }

    fn values_of(var: &Variable) -> Vec<String> {
        encode_response(var, &EngineConfig::default()).unwrap().values
    }

    fn pair(k: &str, v: &str) -> Scalar {
        Scalar::DirectedPair(DirectedPair::new(k, v))
    }

    #[test]
    fn gap_slots_fill_missing_positions() {
        let registry = TypeRegistry::new();
        let var = variable(
            "item1.RESP",
            Cardinality::Multiple,
            BaseType::DirectedPair,
            None,
            Some(Value::list([pair("Gap1", "B"), pair("Gap3", "A")])),
            &registry,
        );
        assert_eq!(values_of(&var), vec!["Gap1:B,Gap2:,Gap3:A"]);
    }

    #[test]
    fn gap_slots_extend_to_max_choices() {
        let registry = TypeRegistry::new();
        let var = variable(
            "item1.RESP",
            Cardinality::Multiple,
            BaseType::DirectedPair,
            Some(4),
            Some(Value::list([pair("Gap2", "C")])),
            &registry,
        );
        assert_eq!(values_of(&var), vec!["Gap1:,Gap2:C,Gap3:,Gap4:"]);
    }

    #[test]
    fn repeated_gap_keys_keep_every_answer() {
        let value = Value::list([pair("Gap1", "A"), pair("Gap1", "B"), pair("Gap3", "C")]);
        let values = encode_value(
            BaseType::DirectedPair,
            Cardinality::Multiple,
            Some(&value),
            0,
            &EngineConfig::default(),
        );
        assert_eq!(values, vec!["Gap1:A,Gap1:B,Gap3:C"]);
    }

    #[test]
    fn gap_layout_width_is_bounded() {
        let config = EngineConfig::default();
        let far = Value::list([pair("Gap3000000", "A"), pair("Gap4294967295", "B")]);
        let values = encode_value(
            BaseType::DirectedPair,
            Cardinality::Multiple,
            Some(&far),
            0,
            &config,
        );
        assert_eq!(values, vec!["Gap3000000:A,Gap4294967295:B"]);

        let edge = Value::list([pair("Gap1024", "Z")]);
        let values = encode_value(
            BaseType::DirectedPair,
            Cardinality::Multiple,
            Some(&edge),
            0,
            &config,
        );
        assert_eq!(values[0].split(',').count(), MAX_GAP_SLOTS as usize);
        assert!(values[0].ends_with(",Gap1024:Z"));

        let wide = Value::list([pair("Gap2", "Y")]);
        let values = encode_value(
            BaseType::DirectedPair,
            Cardinality::Multiple,
            Some(&wide),
            MAX_GAP_SLOTS + 1,
            &config,
        );
        assert_eq!(values, vec!["Gap2:Y"]);
    }

    #[test]
    fn plain_directed_pairs_are_joined() {
        let registry = TypeRegistry::new();
        let var = variable(
            "item1.MATCH",
            Cardinality::Multiple,
            BaseType::DirectedPair,
            Some(4),
            Some(Value::list([pair("A", "X"), pair("B", "Y")])),
            &registry,
        );
        assert_eq!(values_of(&var), vec!["A:X,B:Y"]);
    }

    #[test]
    fn point_holes_keep_their_position() {
        let registry = TypeRegistry::new();
        let var = variable(
            "item1.PTS",
            Cardinality::Ordered,
            BaseType::Point,
            None,
            Some(Value::List(vec![
                Some(Scalar::Point(Point::new(10, 20))),
                None,
                Some(Scalar::Point(Point::new(5, 5))),
            ])),
            &registry,
        );
        assert_eq!(values_of(&var), vec!["10 20,,5 5"]);
    }

    #[test]
    fn identifiers_and_strings() {
        let registry = TypeRegistry::new();
        let ids = variable(
            "item1.CHOICE",
            Cardinality::Multiple,
            BaseType::Identifier,
            Some(3),
            Some(Value::list([
                Scalar::Identifier("A".into()),
                Scalar::Identifier("C".into()),
            ])),
            &registry,
        );
        assert_eq!(values_of(&ids), vec!["A,C"]);

        let text = variable(
            "item1.TEXT",
            Cardinality::Single,
            BaseType::String,
            None,
            Some(Scalar::String("x < y & z".into()).into()),
            &registry,
        );
        let element = encode_response(&text, &EngineConfig::default()).unwrap();
        assert_eq!(element.values, vec!["x &lt; y &amp; z"]);
        assert!(element.to_xml().contains("<value>x &amp;lt; y &amp;amp; z</value>"));
    }

    #[test]
    fn floats_use_special_literals() {
        assert_eq!(encode_scalar(&Scalar::Float(f64::INFINITY)), "INF");
        assert_eq!(encode_scalar(&Scalar::Float(f64::NEG_INFINITY)), "-INF");
        assert_eq!(encode_scalar(&Scalar::Float(f64::NAN)), "NaN");
        assert_eq!(encode_scalar(&Scalar::Float(2.5)), "2.5");
    }

    #[test]
    fn absent_and_empty_values_have_no_children() {
        let registry = TypeRegistry::new();
        let absent = variable(
            "item1.A",
            Cardinality::Single,
            BaseType::Integer,
            None,
            None,
            &registry,
        );
        assert!(values_of(&absent).is_empty());

        let empty = variable(
            "item1.B",
            Cardinality::Multiple,
            BaseType::Integer,
            None,
            Some(Value::List(vec![])),
            &registry,
        );
        assert!(values_of(&empty).is_empty());
    }

    #[test]
    fn candidate_information_collapses_to_single() {
        let registry = TypeRegistry::new();
        let var = variable(
            "item1.candidateInformation",
            Cardinality::Multiple,
            BaseType::String,
            None,
            Some(Value::list([
                Scalar::String("Jane".into()),
                Scalar::String("Doe, Jr".into()),
            ])),
            &registry,
        );
        let element = encode_response(&var, &EngineConfig::default()).unwrap();
        assert_eq!(element.cardinality, Cardinality::Single);
        assert_eq!(element.values, vec!["Jane,Doe&#44; Jr"]);
    }

    #[test]
    fn custom_responses_are_concatenated() {
        let mut registry = TypeRegistry::new();
        registry.register_custom_response("graph");
        let var = variable(
            "item1.GRAPH",
            Cardinality::Multiple,
            BaseType::Crobject,
            None,
            Some(Value::list([
                Scalar::Crobject(CustomResponse::new("graph").with_entry("n", "1")),
                Scalar::Crobject(CustomResponse::new("graph")),
            ])),
            &registry,
        );
        assert_eq!(
            values_of(&var),
            vec![r#"<crobject type="graph"><entry key="n">1</entry></crobject><crobject type="graph"/>"#]
        );
    }

    #[test]
    fn state_child_is_attached() {
        let registry = TypeRegistry::new();
        let mut var = variable(
            "item1.R",
            Cardinality::Single,
            BaseType::Boolean,
            None,
            None,
            &registry,
        );
        var.set_state(Some(StateMap::new().with("open", true).into()))
            .unwrap();
        let element = encode_response(&var, &EngineConfig::default()).unwrap();
        assert_eq!(element.state.as_deref(), Some("{open:true}"));
        assert_eq!(element.item_identifier, "item1");
        assert_eq!(element.response_identifier, "R");
    }
}
