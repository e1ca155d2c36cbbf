//! Wire element → identifier, value and state.

use super::{custom_response_from_xml, unescape_value_text, xml, ResponseElement};
use crate::config::EngineConfig;
use crate::error::{Result, VariableError};
use crate::literal::{create_composite_identifier, parse_scalar, CompositeIdentifier};
use crate::model::{BaseType, Cardinality, Scalar, Value};
use crate::state::{deserialize_state, StateValue};

/// What a wire element carries once decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedResponse {
    pub identifier: CompositeIdentifier,
    pub base_type: BaseType,
    pub cardinality: Cardinality,
    pub value: Option<Value>,
    pub state: Option<StateValue>,
}

/// Parse the text of one value of `base_type`.
pub fn decode_scalar(base_type: BaseType, text: &str, config: &EngineConfig) -> Result<Scalar> {
    match base_type {
        BaseType::String => Ok(Scalar::String(unescape_value_text(text))),
        BaseType::Crobject => {
            let element = xml::parse_element(text)?;
            Ok(Scalar::Crobject(custom_response_from_xml(&element)?))
        }
        other => parse_scalar(other, &unescape_value_text(text), config.directed_pair_delimiter),
    }
}

fn decode_custom_responses(text: &str) -> Result<Vec<Option<Scalar>>> {
    xml::parse_fragments(text)?
        .iter()
        .map(|el| custom_response_from_xml(el).map(|c| Some(Scalar::Crobject(c))))
        .collect()
}

/// Split one comma-joined value child into list elements.
///
/// Empty pieces are dropped for every base type except `string`, and a
/// directed pair slot with nothing after the delimiter counts as empty. The
/// encoder's fixed-width placeholders therefore do not come back.
fn decode_joined(
    base_type: BaseType,
    text: &str,
    config: &EngineConfig,
) -> Result<Vec<Option<Scalar>>> {
    let mut items = Vec::new();
    for piece in text.split(',') {
        if base_type != BaseType::String {
            let trimmed = piece.trim();
            if trimmed.is_empty()
                || (base_type == BaseType::DirectedPair
                    && trimmed.ends_with(config.directed_pair_delimiter))
            {
                continue;
            }
        }
        items.push(Some(decode_scalar(base_type, piece, config)?));
    }
    Ok(items)
}

fn decode_value(
    base_type: BaseType,
    cardinality: Cardinality,
    values: &[String],
    config: &EngineConfig,
) -> Result<Option<Value>> {
    if values.is_empty() {
        return Ok(None);
    }

    if cardinality == Cardinality::Single {
        if values.len() > 1 {
            return Err(VariableError::InvalidArgumentCount {
                expected: 1,
                actual: values.len(),
            });
        }
        return decode_scalar(base_type, &values[0], config).map(|s| Some(Value::Scalar(s)));
    }

    let mut items = Vec::new();
    for text in values {
        if base_type == BaseType::Crobject {
            items.extend(decode_custom_responses(text)?);
        } else if values.len() == 1 {
            items.extend(decode_joined(base_type, text, config)?);
        } else if base_type == BaseType::String || !text.trim().is_empty() {
            items.push(Some(decode_scalar(base_type, text, config)?));
        }
    }

    Ok(if items.is_empty() {
        None
    } else {
        Some(Value::List(items))
    })
}

/// Decode a wire element.
pub fn decode_response(
    element: &ResponseElement,
    config: &EngineConfig,
) -> Result<DecodedResponse> {
    let identifier =
        create_composite_identifier(&element.item_identifier, &element.response_identifier)?;
    let value = decode_value(element.base_type, element.cardinality, &element.values, config)?;
    let state = element
        .state
        .as_deref()
        .map(deserialize_state)
        .transpose()?;

    Ok(DecodedResponse {
        identifier,
        base_type: element.base_type,
        cardinality: element.cardinality,
        value,
        state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CustomResponse, DirectedPair, Point};
    use crate::state::StateMap;

    fn element(
        base_type: BaseType,
        cardinality: Cardinality,
        values: &[&str],
        state: Option<&str>,
    ) -> ResponseElement {
        ResponseElement {
            base_type,
            cardinality,
            item_identifier: "item1".into(),
            response_identifier: "RESP".into(),
            values: values.iter().map(|v| v.to_string()).collect(),
            state: state.map(str::to_string),
        }
    }

    fn decode(el: &ResponseElement) -> DecodedResponse {
        decode_response(el, &EngineConfig::default()).unwrap()
    }

    #[test]
    fn gap_placeholders_are_dropped() {
        let decoded = decode(&element(
            BaseType::DirectedPair,
            Cardinality::Multiple,
            &["Gap1:B,Gap2:,Gap3:A"],
            None,
        ));
        assert_eq!(decoded.identifier.to_string(), "item1.RESP");
        assert_eq!(
            decoded.value,
            Some(Value::list([
                Scalar::DirectedPair(DirectedPair::new("Gap1", "B")),
                Scalar::DirectedPair(DirectedPair::new("Gap3", "A")),
            ]))
        );
    }

    #[test]
    fn point_holes_are_dropped() {
        let decoded = decode(&element(
            BaseType::Point,
            Cardinality::Ordered,
            &["10 20,,5 5"],
            None,
        ));
        assert_eq!(
            decoded.value,
            Some(Value::list([
                Scalar::Point(Point::new(10, 20)),
                Scalar::Point(Point::new(5, 5)),
            ]))
        );
    }

    #[test]
    fn all_placeholders_decode_to_absent() {
        let decoded = decode(&element(
            BaseType::DirectedPair,
            Cardinality::Multiple,
            &["Gap1:,Gap2:"],
            None,
        ));
        assert_eq!(decoded.value, None);
    }

    #[test]
    fn strings_keep_empty_elements_and_commas() {
        let decoded = decode(&element(
            BaseType::String,
            Cardinality::Ordered,
            &["a&#44; b,,c &lt;d&gt;"],
            None,
        ));
        assert_eq!(
            decoded.value,
            Some(Value::list([
                Scalar::String("a, b".into()),
                Scalar::String(String::new()),
                Scalar::String("c <d>".into()),
            ]))
        );
    }

    #[test]
    fn one_child_per_element_is_accepted() {
        let decoded = decode(&element(
            BaseType::Identifier,
            Cardinality::Multiple,
            &["A", "B"],
            None,
        ));
        assert_eq!(
            decoded.value,
            Some(Value::list([
                Scalar::Identifier("A".into()),
                Scalar::Identifier("B".into()),
            ]))
        );
    }

    #[test]
    fn single_rejects_several_children() {
        let err = decode_response(
            &element(BaseType::Integer, Cardinality::Single, &["1", "2"], None),
            &EngineConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            VariableError::InvalidArgumentCount {
                expected: 1,
                actual: 2
            }
        );
    }

    #[test]
    fn single_values_and_literal_errors() {
        let decoded = decode(&element(BaseType::Float, Cardinality::Single, &["-INF"], None));
        assert_eq!(decoded.value, Some(Scalar::Float(f64::NEG_INFINITY).into()));

        let err = decode_response(
            &element(BaseType::Integer, Cardinality::Single, &["4294967296"], None),
            &EngineConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, VariableError::InvalidLiteral { .. }));
    }

    #[test]
    fn state_is_parsed() {
        let decoded = decode(&element(
            BaseType::Boolean,
            Cardinality::Single,
            &[],
            Some("{open:[1,3]}"),
        ));
        assert_eq!(decoded.value, None);
        assert_eq!(
            decoded.state,
            Some(StateMap::new().with("open", vec![1.into(), 3.into()]).into())
        );

        let err = decode_response(
            &element(BaseType::Boolean, Cardinality::Single, &[], Some("{open:")),
            &EngineConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, VariableError::MalformedState { .. }));
    }

    #[test]
    fn custom_responses_decode_from_fragments() {
        let decoded = decode(&element(
            BaseType::Crobject,
            Cardinality::Multiple,
            &[r#"<crobject type="graph"><entry key="n">1</entry></crobject><crobject type="graph"/>"#],
            None,
        ));
        assert_eq!(
            decoded.value,
            Some(Value::list([
                Scalar::Crobject(CustomResponse::new("graph").with_entry("n", "1")),
                Scalar::Crobject(CustomResponse::new("graph")),
            ]))
        );
    }

    #[test]
    fn invalid_identifiers_are_rejected() {
        let mut el = element(BaseType::Integer, Cardinality::Single, &["1"], None);
        el.item_identifier = "1item".into();
        assert!(matches!(
            decode_response(&el, &EngineConfig::default()),
            Err(VariableError::InvalidItemIdentifier(_))
        ));
    }

    #[test]
    fn survives_the_xml_layer() {
        let el = element(
            BaseType::String,
            Cardinality::Single,
            &["x &lt; y &amp; z"],
            Some(r#"{label:"a&lt;b"}"#),
        );
        let reparsed = ResponseElement::from_xml(&el.to_xml()).unwrap();
        let decoded = decode(&reparsed);
        assert_eq!(decoded.value, Some(Scalar::String("x < y & z".into()).into()));
        assert_eq!(decoded.state, Some(StateMap::new().with("label", "a<b").into()));
    }
}
