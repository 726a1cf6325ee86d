//! Dynamic binding objects.
//!
//! A [`BindingObject`] stands in for one schema-generated binding class: it
//! knows its element name and namespace prefix and carries ordered attributes,
//! child members and optional simple content. Entities write into it by member
//! name and read back from it the same way.

use std::borrow::Cow;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::utils;

/// Static identity of a binding class: the namespace prefix and element name
/// used when an instance is exported as a document root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingClass {
    pub prefix: &'static str,
    pub element: &'static str,
}

impl BindingClass {
    pub const fn new(prefix: &'static str, element: &'static str) -> Self {
        Self { prefix, element }
    }
}

/// Where a member lives in the XML form of its binding object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemberKind {
    /// Child element named after the member.
    #[default]
    Element,
    /// Attribute on the element itself.
    Attribute,
    /// Simple text content of the element.
    Content,
}

/// Value stored under one binding member.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingValue {
    /// Primitive value in its lexical form.
    Text(String),
    /// Nested binding object.
    Object(BindingObject),
    /// Repeated member, exported as one element per item.
    List(Vec<BindingValue>),
}

impl BindingValue {
    /// Text of a primitive, or the simple content of an object.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            BindingValue::Text(text) => Some(text),
            BindingValue::Object(obj) => obj.content(),
            BindingValue::List(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&BindingObject> {
        match self {
            BindingValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Views the value as a sequence.
    ///
    /// A single value reads as a one-element sequence, since XML does not
    /// tell a repeated member with one occurrence apart from a single one.
    pub fn items(&self) -> &[BindingValue] {
        match self {
            BindingValue::List(items) => items,
            other => std::slice::from_ref(other),
        }
    }

    /// True for an empty sequence, which exports nothing.
    pub fn is_empty(&self) -> bool {
        matches!(self, BindingValue::List(items) if items.is_empty())
    }
}

impl From<String> for BindingValue {
    fn from(text: String) -> Self {
        BindingValue::Text(text)
    }
}

impl From<&str> for BindingValue {
    fn from(text: &str) -> Self {
        BindingValue::Text(text.to_string())
    }
}

impl From<BindingObject> for BindingValue {
    fn from(obj: BindingObject) -> Self {
        BindingValue::Object(obj)
    }
}

impl From<Vec<BindingValue>> for BindingValue {
    fn from(items: Vec<BindingValue>) -> Self {
        BindingValue::List(items)
    }
}

/// A child member: its local name, the prefix of its element when that
/// differs from the owner's, and its value.
#[derive(Debug, Clone, PartialEq)]
struct Member {
    prefix: Option<String>,
    name: String,
    value: BindingValue,
}

impl Member {
    fn new(prefix: Option<&str>, name: &str, value: BindingValue) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
            name: name.to_string(),
            value,
        }
    }
}

/// One element of a binding tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingObject {
    prefix: String,
    element: String,
    attributes: Vec<(String, BindingValue)>,
    children: Vec<Member>,
    content: Option<String>,
}

impl BindingObject {
    /// Creates an empty instance of a binding class.
    pub fn new(class: BindingClass) -> Self {
        Self::named(class.prefix, class.element)
    }

    /// Creates an empty object with an explicit prefix and element name.
    pub fn named(prefix: impl Into<String>, element: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            element: element.into(),
            ..Default::default()
        }
    }

    /// Creates an anonymous object holding only simple content.
    pub fn with_content(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn element(&self) -> &str {
        &self.element
    }

    /// `prefix:element`, or the bare element name without a prefix.
    pub fn qualified_name(&self) -> String {
        utils::qualify(&self.prefix, &self.element)
    }

    /// Sets a child member, replacing any previous value under `name`.
    ///
    /// The member is written in this object's own namespace.
    pub fn set(&mut self, name: &str, value: impl Into<BindingValue>) {
        let value = value.into();
        match self.children.iter_mut().find(|member| member.name == name) {
            Some(member) => {
                member.prefix = None;
                member.value = value;
            }
            None => self.children.push(Member::new(None, name, value)),
        }
    }

    /// Returns the child member stored under the local name `name`.
    pub fn get(&self, name: &str) -> Option<&BindingValue> {
        self.children
            .iter()
            .find(|member| member.name == name)
            .map(|member| &member.value)
    }

    /// Removes a child member, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<BindingValue> {
        let index = self.children.iter().position(|member| member.name == name)?;
        Some(self.children.remove(index).value)
    }

    /// Appends a child occurrence, folding repeated names into a sequence.
    pub fn push(&mut self, name: &str, value: impl Into<BindingValue>) {
        self.push_prefixed(None, name, value);
    }

    /// Appends a child occurrence written under `prefix` instead of this
    /// object's own prefix. `None` keeps the object's prefix.
    ///
    /// Occurrences fold into a sequence only when both name and prefix match.
    pub fn push_prefixed(
        &mut self,
        prefix: Option<&str>,
        name: &str,
        value: impl Into<BindingValue>,
    ) {
        let value = value.into();
        let existing = self
            .children
            .iter_mut()
            .find(|member| member.name == name && member.prefix.as_deref() == prefix);
        match existing {
            Some(Member {
                value: BindingValue::List(items),
                ..
            }) => items.push(value),
            Some(member) => {
                let first = std::mem::replace(&mut member.value, BindingValue::List(Vec::new()));
                member.value = BindingValue::List(vec![first, value]);
            }
            None => self.children.push(Member::new(prefix, name, value)),
        }
    }

    /// Prefix a child member is written under when it differs from this
    /// object's own.
    pub fn member_prefix(&self, name: &str) -> Option<&str> {
        self.children
            .iter()
            .find(|member| member.name == name)
            .and_then(|member| member.prefix.as_deref())
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = BindingValue::Text(value.into());
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => *slot = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attribute_value(name).and_then(BindingValue::as_text)
    }

    pub fn set_content(&mut self, text: impl Into<String>) {
        self.content = Some(text.into());
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Reads a member of the given kind. Content is returned as a text value.
    pub fn lookup(&self, kind: MemberKind, name: &str) -> Option<Cow<'_, BindingValue>> {
        match kind {
            MemberKind::Element => self.get(name).map(Cow::Borrowed),
            MemberKind::Attribute => self.attribute_value(name).map(Cow::Borrowed),
            MemberKind::Content => self
                .content
                .as_ref()
                .map(|text| Cow::Owned(BindingValue::Text(text.clone()))),
        }
    }

    /// Writes a member of the given kind. `None` clears it.
    ///
    /// Attributes and content only hold text; other values are dropped from
    /// those positions.
    pub fn assign(&mut self, kind: MemberKind, name: &str, value: Option<BindingValue>) {
        match (kind, value) {
            (MemberKind::Element, Some(value)) => self.set(name, value),
            (MemberKind::Element, None) => {
                self.remove(name);
            }
            (MemberKind::Attribute, Some(BindingValue::Text(text))) => {
                self.set_attribute(name, text);
            }
            (MemberKind::Attribute, _) => {
                self.attributes.retain(|(key, _)| key != name);
            }
            (MemberKind::Content, Some(BindingValue::Text(text))) => self.set_content(text),
            (MemberKind::Content, _) => self.content = None,
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .filter_map(|(key, value)| value.as_text().map(|text| (key.as_str(), text)))
    }

    /// Child members by local name, in insertion order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &BindingValue)> {
        self.children
            .iter()
            .map(|member| (member.name.as_str(), &member.value))
    }

    /// Child members with the qualified tag each one is written under.
    pub fn child_elements(&self) -> impl Iterator<Item = (String, &BindingValue)> {
        self.children.iter().map(|member| {
            let prefix = member.prefix.as_deref().unwrap_or(self.prefix.as_str());
            (utils::qualify(prefix, &member.name), &member.value)
        })
    }

    /// True when the object would export as an empty element.
    pub fn has_children(&self) -> bool {
        self.children.iter().any(|member| !member.value.is_empty())
    }

    fn attribute_value(&self, name: &str) -> Option<&BindingValue> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

/// JSON view of a binding tree: attributes as `@name`, content as `#text`.
/// Children written in another namespace keep their prefix in the key.
impl Serialize for BindingObject {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in self.attributes() {
            map.serialize_entry(&format!("@{}", key), value)?;
        }
        if let Some(text) = self.content() {
            map.serialize_entry("#text", text)?;
        }
        for member in &self.children {
            match &member.prefix {
                Some(prefix) => {
                    map.serialize_entry(&utils::qualify(prefix, &member.name), &member.value)?
                }
                None => map.serialize_entry(&member.name, &member.value)?,
            }
        }
        map.end()
    }
}

impl Serialize for BindingValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            BindingValue::Text(text) => serializer.serialize_str(text),
            BindingValue::Object(obj) => obj.serialize(serializer),
            BindingValue::List(items) => items.serialize(serializer),
        }
    }
}
