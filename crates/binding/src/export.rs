//! XML export of binding trees.
//!
//! Elements are written through a quick-xml [`Writer`]; indentation is
//! emitted by hand so the layout matches schema-generated binding exports
//! (four spaces per level, one element per line).

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::Result;
use crate::object::{BindingObject, BindingValue};

const INDENT: &[u8] = b"    ";

impl BindingObject {
    /// Serializes the object as an XML element to `writer`.
    ///
    /// `namespace_def` is inserted verbatim right after the root tag name, so
    /// it must start with whitespace when non-empty. `level` is the starting
    /// indentation level.
    pub fn export<W: Write>(
        &self,
        writer: W,
        level: usize,
        namespace_def: &str,
        pretty_print: bool,
    ) -> Result<()> {
        let mut xml = Writer::new(writer);
        let tag = self.qualified_name();
        write_object(&mut xml, self, &tag, level, namespace_def, pretty_print)
    }

    /// Exports the object into a string.
    pub fn to_xml_string(&self, namespace_def: &str, pretty_print: bool) -> Result<String> {
        let mut buffer = Vec::new();
        self.export(&mut buffer, 0, namespace_def, pretty_print)?;
        Ok(String::from_utf8(buffer)?)
    }
}

fn write_object<W: Write>(
    xml: &mut Writer<W>,
    obj: &BindingObject,
    tag: &str,
    level: usize,
    namespace_def: &str,
    pretty: bool,
) -> Result<()> {
    write_indent(xml, level, pretty)?;

    let mut start = BytesStart::from_content(format!("{}{}", tag, namespace_def), tag.len());
    for (key, value) in obj.attributes() {
        start.push_attribute((key, value));
    }

    let content = obj.content();
    let has_children = obj.has_children();
    if content.is_none() && !has_children {
        xml.write_event(Event::Empty(start))?;
        return write_newline(xml, pretty);
    }

    xml.write_event(Event::Start(start))?;
    if let Some(text) = content {
        xml.write_event(Event::Text(BytesText::new(text)))?;
    }
    if has_children {
        write_newline(xml, pretty)?;
        for (child_tag, value) in obj.child_elements() {
            write_member(xml, &child_tag, value, level + 1, pretty)?;
        }
        write_indent(xml, level, pretty)?;
    }
    xml.write_event(Event::End(BytesEnd::new(tag)))?;
    write_newline(xml, pretty)
}

fn write_member<W: Write>(
    xml: &mut Writer<W>,
    tag: &str,
    value: &BindingValue,
    level: usize,
    pretty: bool,
) -> Result<()> {
    match value {
        BindingValue::Text(text) => {
            write_indent(xml, level, pretty)?;
            if text.is_empty() {
                xml.write_event(Event::Empty(BytesStart::new(tag)))?;
            } else {
                xml.write_event(Event::Start(BytesStart::new(tag)))?;
                xml.write_event(Event::Text(BytesText::new(text)))?;
                xml.write_event(Event::End(BytesEnd::new(tag)))?;
            }
            write_newline(xml, pretty)
        }
        BindingValue::Object(obj) => write_object(xml, obj, tag, level, "", pretty),
        BindingValue::List(items) => {
            for item in items {
                write_member(xml, tag, item, level, pretty)?;
            }
            Ok(())
        }
    }
}

fn write_indent<W: Write>(xml: &mut Writer<W>, level: usize, pretty: bool) -> Result<()> {
    if pretty {
        for _ in 0..level {
            xml.get_mut().write_all(INDENT)?;
        }
    }
    Ok(())
}

fn write_newline<W: Write>(xml: &mut Writer<W>, pretty: bool) -> Result<()> {
    if pretty {
        xml.get_mut().write_all(b"\n")?;
    }
    Ok(())
}
