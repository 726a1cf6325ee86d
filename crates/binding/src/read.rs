//! XML parsing into binding trees.
//!
//! The reader is schema-agnostic: element and attribute names are kept as
//! written (children by local name, with their prefix when it differs from
//! the parent's), repeated siblings fold into sequences
//! and text-only elements become text values. Namespace declarations are
//! collected separately so callers can re-emit them on export.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::error::{BindingError, Result};
use crate::object::{BindingObject, BindingValue};
use crate::utils;

/// A parsed document: its root binding object and the namespaces it declared.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub root: BindingObject,
    /// `(uri, prefix)` pairs in declaration order, first declaration wins.
    pub namespaces: Vec<(String, String)>,
}

/// Parses an XML document held in memory.
pub fn from_xml_str(xml: &str) -> Result<ParsedDocument> {
    // Text is not trimmed per event: entity references split text events,
    // so whitespace is trimmed once per element instead.
    let mut reader = Reader::from_str(xml);

    let mut builder = TreeBuilder::default();
    loop {
        match reader.read_event()? {
            Event::Start(start) => builder.open(&start)?,
            Event::Empty(start) => {
                builder.open(&start)?;
                builder.close()?;
            }
            Event::End(_) => builder.close()?,
            Event::Text(text) => {
                let raw = String::from_utf8_lossy(text.as_ref()).into_owned();
                let unescaped = quick_xml::escape::unescape(&raw)?;
                builder.text(&unescaped)?;
            }
            Event::CData(data) => {
                builder.text(&String::from_utf8_lossy(data.as_ref()))?;
            }
            Event::GeneralRef(reference) => {
                let name = String::from_utf8_lossy(&reference).into_owned();
                let resolved = utils::resolve_reference(&name)
                    .ok_or_else(|| BindingError::Malformed(format!("unknown entity &{};", name)))?;
                builder.text(&resolved)?;
            }
            Event::Eof => break,
            Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_) => {}
        }
    }
    builder.finish()
}

/// Reads and parses an XML file.
pub fn from_xml_file(path: impl AsRef<Path>) -> Result<ParsedDocument> {
    let path = path.as_ref();
    debug!(path = %path.display(), "parsing XML document");
    let xml = std::fs::read_to_string(path)?;
    from_xml_str(&xml)
}

/// Element under construction.
struct Frame {
    prefix: String,
    local: String,
    obj: BindingObject,
    text: String,
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Frame>,
    root: Option<BindingObject>,
    namespaces: Vec<(String, String)>,
}

impl TreeBuilder {
    fn open(&mut self, start: &BytesStart<'_>) -> Result<()> {
        if self.root.is_some() {
            return Err("content after the root element".into());
        }

        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let (prefix, local) = utils::split_qualified_name(&name);
        let mut obj = BindingObject::named(prefix.unwrap_or_default(), local);

        for attr in start.attributes() {
            let attr = attr.map_err(|e| BindingError::Malformed(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let raw = String::from_utf8_lossy(&attr.value).into_owned();
            let value = quick_xml::escape::unescape(&raw)?.into_owned();

            if let Some(declared) = utils::namespace_declaration(&key) {
                self.declare(value, declared);
            } else if key != utils::SCHEMA_LOCATION_ATTRIBUTE {
                obj.set_attribute(&key, value);
            }
        }

        self.stack.push(Frame {
            prefix: prefix.unwrap_or_default().to_string(),
            local: local.to_string(),
            obj,
            text: String::new(),
        });
        Ok(())
    }

    fn declare(&mut self, uri: String, prefix: &str) {
        if !self.namespaces.iter().any(|(known, _)| *known == uri) {
            self.namespaces.push((uri, prefix.to_string()));
        }
    }

    fn text(&mut self, text: &str) -> Result<()> {
        match self.stack.last_mut() {
            Some(frame) => {
                frame.text.push_str(text);
                Ok(())
            }
            None if text.trim().is_empty() => Ok(()),
            None => Err("text outside the root element".into()),
        }
    }

    fn close(&mut self) -> Result<()> {
        let Frame {
            prefix,
            local,
            mut obj,
            text,
        } = self
            .stack
            .pop()
            .ok_or_else(|| BindingError::Malformed("unbalanced end tag".to_string()))?;
        let text = text.trim();

        if self.stack.is_empty() {
            if !text.is_empty() {
                obj.set_content(text);
            }
            self.root = Some(obj);
            return Ok(());
        }

        let simple = obj.attributes().next().is_none() && obj.children().next().is_none();
        let value = if simple {
            BindingValue::Text(text.to_string())
        } else {
            if !text.is_empty() {
                obj.set_content(text);
            }
            BindingValue::Object(obj)
        };
        if let Some(parent) = self.stack.last_mut() {
            // Children default to the parent's namespace; only a different
            // prefix is recorded.
            let own = (prefix != parent.obj.prefix()).then_some(prefix.as_str());
            parent.obj.push_prefixed(own, &local, value);
        }
        Ok(())
    }

    fn finish(self) -> Result<ParsedDocument> {
        if !self.stack.is_empty() {
            return Err("unexpected end of document".into());
        }
        let root = self
            .root
            .ok_or_else(|| BindingError::Malformed("document has no root element".to_string()))?;
        Ok(ParsedDocument {
            root,
            namespaces: self.namespaces,
        })
    }
}
