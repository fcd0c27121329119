//! Owned XML element tree for building TEI documents.
//!
//! Elements are created through idempotent path lookups so that independent
//! serialization steps can target the same header locations without
//! coordinating.

use crate::error::{Error, Result};

pub const TEI_NS: &str = "http://www.tei-c.org/ns/1.0";

/// A child of an element: nested element or text.
#[derive(Debug, Clone, PartialEq)]
pub enum TeiNode {
    Element(TeiElement),
    Text(String),
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct TeiElement {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<TeiNode>,
}

/// One parsed step of an element path: a tag with an optional
/// attribute-value filter.
#[derive(Debug, Clone, PartialEq)]
struct PathStep {
    tag: String,
    attribute: Option<(String, String)>,
}

/// Parse `tag` or `tag[@attr="value"]`.
fn parse_path_step(step: &str) -> Result<PathStep> {
    let Some(bracket) = step.find('[') else {
        if step.is_empty() {
            return Err(Error::InvalidPathStep(step.to_string()));
        }
        return Ok(PathStep {
            tag: step.to_string(),
            attribute: None,
        });
    };
    let tag = &step[..bracket];
    let rest = &step[bracket..];
    let invalid = || Error::InvalidPathStep(step.to_string());
    if tag.is_empty() {
        return Err(invalid());
    }
    let inner = rest
        .strip_prefix("[@")
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(invalid)?;
    let (name, value) = inner.split_once('=').ok_or_else(invalid)?;
    let value = value
        .strip_prefix('"')
        .and_then(|value| value.strip_suffix('"'))
        .ok_or_else(invalid)?;
    if name.is_empty() {
        return Err(invalid());
    }
    Ok(PathStep {
        tag: tag.to_string(),
        attribute: Some((name.to_string(), value.to_string())),
    })
}

impl TeiElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attribute, _)| attribute == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set or replace an attribute, keeping first-set attribute order.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(existing) = self
            .attributes
            .iter_mut()
            .find(|(attribute, _)| *attribute == name)
        {
            existing.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Append a child element and return a reference to it.
    pub fn append_element(&mut self, element: TeiElement) -> &mut TeiElement {
        self.children.push(TeiNode::Element(element));
        match self.children.last_mut() {
            Some(TeiNode::Element(element)) => element,
            _ => unreachable!(),
        }
    }

    /// Append text, merging with a trailing text node.
    pub fn append_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(TeiNode::Text(existing)) = self.children.last_mut() {
            existing.push_str(text);
        } else {
            self.children.push(TeiNode::Text(text.to_string()));
        }
    }

    /// Concatenated text of this element and all descendants.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        for child in &self.children {
            match child {
                TeiNode::Text(value) => text.push_str(value),
                TeiNode::Element(element) => text.push_str(&element.text_content()),
            }
        }
        text
    }

    fn matches(&self, step: &PathStep) -> bool {
        self.tag == step.tag
            && step
                .attribute
                .as_ref()
                .is_none_or(|(name, value)| self.attribute(name) == Some(value.as_str()))
    }

    /// Walk (and create as needed) the element path below this element.
    ///
    /// Each step is `tag` or `tag[@attr="value"]`; repeated calls with the
    /// same path return the same element.
    pub fn get_or_create_element_at(&mut self, path: &[&str]) -> Result<&mut TeiElement> {
        let mut current = self;
        for step in path {
            let step = parse_path_step(step)?;
            let index = current
                .children
                .iter()
                .position(|child| matches!(child, TeiNode::Element(element) if element.matches(&step)));
            let index = match index {
                Some(index) => index,
                None => {
                    let mut element = TeiElement::new(&step.tag);
                    if let Some((name, value)) = &step.attribute {
                        element.set_attribute(name, value);
                    }
                    current.children.push(TeiNode::Element(element));
                    current.children.len() - 1
                }
            };
            current = match &mut current.children[index] {
                TeiNode::Element(element) => element,
                _ => unreachable!(),
            };
        }
        Ok(current)
    }

    /// Serialize without declaration or namespace, for embedding and tests.
    pub fn to_fragment_string(&self) -> String {
        let mut xml = String::new();
        self.write_element(&mut xml, None);
        xml
    }

    /// Serialize as a standalone XML document with the TEI namespace on the
    /// root element.
    pub fn to_xml_string(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        self.write_element(&mut xml, Some(TEI_NS));
        xml
    }

    fn write_element(&self, xml: &mut String, namespace: Option<&str>) {
        xml.push('<');
        xml.push_str(&self.tag);
        if let Some(namespace) = namespace {
            xml.push_str(&format!(" xmlns=\"{}\"", escape_xml(namespace)));
        }
        for (name, value) in &self.attributes {
            xml.push_str(&format!(" {}=\"{}\"", name, escape_xml(value)));
        }
        if self.children.is_empty() {
            xml.push_str("/>");
            return;
        }
        xml.push('>');
        for child in &self.children {
            match child {
                TeiNode::Text(text) => xml.push_str(&escape_xml(text)),
                TeiNode::Element(element) => element.write_element(xml, None),
            }
        }
        xml.push_str(&format!("</{}>", self.tag));
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
