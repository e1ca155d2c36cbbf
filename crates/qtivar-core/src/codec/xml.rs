//! Minimal XML element tree used by the wire format.
//!
//! Covers what response payloads contain: elements, attributes, text,
//! comments, CDATA sections, the XML declaration and character references.
//! Namespaces and DTDs are not interpreted.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("XML error at offset {offset}: {message}")]
pub struct XmlError {
    pub offset: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.is_empty() {
            self.children.push(XmlNode::Text(text));
        }
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Direct child elements, in document order.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// Direct child elements with the given name.
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |e| e.name == name)
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                XmlNode::Text(t) => Some(t.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// Serialize without an XML declaration.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                XmlNode::Element(e) => e.write_to(out),
                XmlNode::Text(t) => out.push_str(&escape_text(t)),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn escape_attribute(s: &str) -> String {
    escape_text(s)
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Deepest element nesting the reader accepts.
pub const MAX_DEPTH: usize = 128;

struct Reader<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn error(&self, message: impl Into<String>) -> XmlError {
        XmlError {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn eat(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, s: &str) -> Result<(), XmlError> {
        if self.eat(s) {
            Ok(())
        } else {
            Err(self.error(format!("expected {s:?}")))
        }
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    /// Advance past `terminator`, returning the text before it.
    fn take_until(&mut self, terminator: &str) -> Result<&'a str, XmlError> {
        match self.rest().find(terminator) {
            Some(idx) => {
                let taken = &self.rest()[..idx];
                self.pos += idx + terminator.len();
                Ok(taken)
            }
            None => Err(self.error(format!("unterminated construct, expected {terminator:?}"))),
        }
    }

    /// Skip whitespace, declarations, comments and doctype.
    fn skip_misc(&mut self) -> Result<(), XmlError> {
        loop {
            self.skip_whitespace();
            if self.eat("<?") {
                self.take_until("?>")?;
            } else if self.eat("<!--") {
                self.take_until("-->")?;
            } else if self.eat("<!DOCTYPE") {
                self.take_until(">")?;
            } else {
                return Ok(());
            }
        }
    }

    fn read_name(&mut self) -> Result<&'a str, XmlError> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '/' | '>' | '=' | '<'))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error("expected a name"));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn read_element(&mut self, depth: usize) -> Result<XmlElement, XmlError> {
        if depth >= MAX_DEPTH {
            return Err(self.error(format!("elements nested deeper than {MAX_DEPTH} levels")));
        }
        self.expect("<")?;
        let mut element = XmlElement::new(self.read_name()?);

        loop {
            self.skip_whitespace();
            if self.eat("/>") {
                return Ok(element);
            }
            if self.eat(">") {
                break;
            }
            let name = self.read_name()?.to_string();
            self.skip_whitespace();
            self.expect("=")?;
            self.skip_whitespace();
            let quote = if self.eat("\"") {
                "\""
            } else if self.eat("'") {
                "'"
            } else {
                return Err(self.error("expected quoted attribute value"));
            };
            let start = self.pos;
            let raw = self.take_until(quote)?;
            let value = decode_entities(raw, start)?;
            element.attributes.push((name, value));
        }

        loop {
            if self.eat("</") {
                let name = self.read_name()?;
                if name != element.name {
                    return Err(self.error(format!(
                        "mismatched closing tag </{name}> for <{}>",
                        element.name
                    )));
                }
                self.skip_whitespace();
                self.expect(">")?;
                return Ok(element);
            }
            if self.eat("<!--") {
                self.take_until("-->")?;
            } else if self.eat("<![CDATA[") {
                let text = self.take_until("]]>")?;
                push_text(&mut element, text.to_string());
            } else if self.rest().starts_with('<') {
                let child = self.read_element(depth + 1)?;
                element.children.push(XmlNode::Element(child));
            } else if self.rest().is_empty() {
                return Err(self.error(format!("unclosed element <{}>", element.name)));
            } else {
                let start = self.pos;
                let len = self.rest().find('<').unwrap_or(self.rest().len());
                let raw = &self.rest()[..len];
                self.pos += len;
                push_text(&mut element, decode_entities(raw, start)?);
            }
        }
    }
}

fn push_text(element: &mut XmlElement, text: String) {
    if let Some(XmlNode::Text(last)) = element.children.last_mut() {
        last.push_str(&text);
    } else if !text.is_empty() {
        element.children.push(XmlNode::Text(text));
    }
}

fn decode_entities(raw: &str, offset: usize) -> Result<String, XmlError> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let Some(semi) = after.find(';') else {
            return Err(XmlError {
                offset: offset + (raw.len() - rest.len()) + amp,
                message: "unterminated entity reference".into(),
            });
        };
        let entity = &after[..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => {
                if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
                } else if let Some(dec) = entity.strip_prefix('#') {
                    dec.parse::<u32>().ok().and_then(char::from_u32)
                } else {
                    None
                }
            }
        };
        match decoded {
            Some(c) => out.push(c),
            None => {
                return Err(XmlError {
                    offset: offset + (raw.len() - rest.len()) + amp,
                    message: format!("unknown entity &{entity};"),
                })
            }
        }
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Parse a document with exactly one root element.
pub fn parse_element(input: &str) -> Result<XmlElement, XmlError> {
    let mut reader = Reader { input, pos: 0 };
    reader.skip_misc()?;
    let element = reader.read_element(0)?;
    reader.skip_misc()?;
    if !reader.rest().is_empty() {
        return Err(reader.error("content after root element"));
    }
    Ok(element)
}

/// Parse a sequence of sibling elements, e.g. concatenated fragments.
pub fn parse_fragments(input: &str) -> Result<Vec<XmlElement>, XmlError> {
    let mut reader = Reader { input, pos: 0 };
    let mut elements = Vec::new();
    loop {
        reader.skip_misc()?;
        if reader.rest().is_empty() {
            return Ok(elements);
        }
        elements.push(reader.read_element(0)?);
    }
}
