//! Wire format for submitting and recovering responses.
//!
//! A response travels as one element carrying `baseType`, `cardinality`,
//! `itemIdentifier` and `responseIdentifier` attributes, zero or more `value`
//! children and an optional `state` child in the state notation.

mod decode;
mod encode;
pub mod xml;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{Result, VariableError};
use crate::model::{BaseType, Cardinality, CustomResponse};
use xml::{XmlElement, XmlError};

pub use decode::{decode_response, decode_scalar, DecodedResponse};
pub use encode::{encode_response, encode_scalar, encode_value};

impl From<XmlError> for VariableError {
    fn from(err: XmlError) -> Self {
        VariableError::MalformedResponse(err.to_string())
    }
}

/// One encoded response, independent of its XML rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseElement {
    pub base_type: BaseType,
    pub cardinality: Cardinality,
    pub item_identifier: String,
    pub response_identifier: String,
    /// Text of each `value` child, entity-escaped per base type.
    #[serde(default)]
    pub values: Vec<String>,
    /// State notation, when the interaction has state to keep.
    #[serde(default)]
    pub state: Option<String>,
}

impl ResponseElement {
    pub fn to_xml_element(&self, element_name: &str) -> XmlElement {
        let mut element = XmlElement::new(element_name)
            .with_attribute("baseType", self.base_type.to_string())
            .with_attribute("cardinality", self.cardinality.to_string())
            .with_attribute("itemIdentifier", &self.item_identifier)
            .with_attribute("responseIdentifier", &self.response_identifier);
        for value in &self.values {
            element = element.with_child(XmlElement::new("value").with_text(value));
        }
        if let Some(state) = &self.state {
            element = element.with_child(XmlElement::new("state").with_text(state));
        }
        element
    }

    /// Render as a `<response>` element.
    pub fn to_xml(&self) -> String {
        self.to_xml_element(&EngineConfig::default().response_element)
            .render()
    }

    pub fn from_xml_element(element: &XmlElement) -> Result<Self> {
        let attr = |name: &str| {
            element.attribute(name).ok_or_else(|| {
                VariableError::MalformedResponse(format!(
                    "<{}> is missing the {name} attribute",
                    element.name
                ))
            })
        };
        let base_type: BaseType = attr("baseType")?.parse()?;
        let cardinality: Cardinality = attr("cardinality")?.parse()?;
        let item_identifier = attr("itemIdentifier")?.to_string();
        let response_identifier = attr("responseIdentifier")?.to_string();

        let values = element
            .elements_named("value")
            .map(XmlElement::text)
            .collect();
        let state = element
            .elements_named("state")
            .last()
            .map(XmlElement::text)
            .filter(|s| !s.trim().is_empty());

        Ok(Self {
            base_type,
            cardinality,
            item_identifier,
            response_identifier,
            values,
            state,
        })
    }

    pub fn from_xml(text: &str) -> Result<Self> {
        Self::from_xml_element(&xml::parse_element(text)?)
    }
}

/// Read a payload holding either one response element or a container of
/// them.
pub fn parse_response_document(text: &str) -> Result<Vec<ResponseElement>> {
    let root = xml::parse_element(text)?;
    if root.attribute("baseType").is_some() {
        return Ok(vec![ResponseElement::from_xml_element(&root)?]);
    }
    root.elements()
        .map(ResponseElement::from_xml_element)
        .collect()
}

/// Render a batch of responses inside the configured container element.
pub fn render_response_document(elements: &[ResponseElement], config: &EngineConfig) -> String {
    let root = elements
        .iter()
        .fold(XmlElement::new(&config.responses_element), |root, e| {
            root.with_child(e.to_xml_element(&config.response_element))
        });
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}\n", root.render())
}

/// Entity-escape value text; used for `string` and `float` values.
pub fn escape_value_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape text that becomes one element of a comma-joined list.
pub(crate) fn escape_list_item(s: &str) -> String {
    escape_value_text(s).replace(',', "&#44;")
}

/// Undo value escaping.
///
/// Longer patterns go first so double-escaped sequences collapse in one
/// step; a string that literally contains an escape sequence therefore does
/// not survive the trip unchanged.
pub fn unescape_value_text(s: &str) -> String {
    s.replace("&amp;lt;", "<")
        .replace("&amp;gt;", ">")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&#44;", ",")
        .replace("&amp;", "&")
}

/// `<crobject type="NAME"><entry key="K">V</entry></crobject>`.
pub fn custom_response_to_xml(response: &CustomResponse) -> String {
    response
        .metadata
        .iter()
        .fold(
            XmlElement::new("crobject").with_attribute("type", &response.type_name),
            |el, (k, v)| {
                el.with_child(
                    XmlElement::new("entry")
                        .with_attribute("key", k)
                        .with_text(v),
                )
            },
        )
        .render()
}

pub fn custom_response_from_xml(element: &XmlElement) -> Result<CustomResponse> {
    if element.name != "crobject" {
        return Err(VariableError::MalformedResponse(format!(
            "expected <crobject>, found <{}>",
            element.name
        )));
    }
    let type_name = element
        .attribute("type")
        .ok_or_else(|| VariableError::MalformedResponse("<crobject> without type".into()))?
        .to_string();
    let mut metadata = BTreeMap::new();
    for entry in element.elements_named("entry") {
        let key = entry
            .attribute("key")
            .ok_or_else(|| VariableError::MalformedResponse("<entry> without key".into()))?;
        metadata.insert(key.to_string(), entry.text());
    }
    Ok(CustomResponse {
        type_name,
        metadata,
    })
}
