//! A small element tree over `quick_xml` events.
//!
//! Feed documents are small and read once, so they are decoded into an owned
//! tree and then mapped onto typed entries. Names keep their namespace prefix
//! (`gs:rowCount`); lookups match on the local part.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{FeedError, Result};

/// An XML element with its attributes, direct text and child elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    /// Qualified name as it appeared in the document.
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

fn split_name(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, qname),
    }
}

impl XmlElement {
    /// Parse a whole document and return its root element.
    pub fn parse(input: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(input);
        let mut buf = Vec::new();
        // Open elements; the last one is the innermost.
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    stack.push(Self::from_start(&e)?);
                }
                Ok(Event::Empty(e)) => {
                    let element = Self::from_start(&e)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => root = Some(element),
                    }
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| FeedError::Malformed("unbalanced end tag".into()))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => root = Some(element),
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&e.unescape()?);
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(FeedError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(FeedError::Malformed("unexpected end of document".into()));
        }
        root.ok_or_else(|| FeedError::Malformed("document has no root element".into()))
    }

    fn from_start(e: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| {
                FeedError::Malformed(format!("invalid attribute on <{name}>: {err}"))
            })?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            if key == "xmlns" || key.starts_with("xmlns:") {
                continue;
            }
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            text: String::new(),
            children: Vec::new(),
        })
    }

    pub fn local_name(&self) -> &str {
        split_name(&self.name).1
    }

    pub fn prefix(&self) -> Option<&str> {
        split_name(&self.name).0
    }

    /// Attribute value by local name.
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| split_name(key).1 == local)
            .map(|(_, value)| value.as_str())
    }

    /// First child with the given local name.
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.local_name() == local)
    }

    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.local_name() == local)
    }

    /// Text of the first child with the given local name.
    pub fn child_text(&self, local: &str) -> Option<&str> {
        self.child(local).map(|c| c.text.as_str())
    }
}

/// Escape text for inclusion in element content.
pub fn escape(raw: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(raw)
}

/// Escape text for inclusion in a quoted attribute value.
///
/// Tabs and line breaks are written as character references; a parser
/// normalizes literal ones to spaces.
pub fn escape_attr(raw: &str) -> Cow<'_, str> {
    let escaped = escape(raw);
    if !escaped.contains(['\n', '\r', '\t']) {
        return escaped;
    }
    let mut out = String::with_capacity(escaped.len() + 8);
    for c in escaped.chars() {
        match c {
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Whether `name` can be used as an unprefixed element or attribute name.
pub fn is_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
