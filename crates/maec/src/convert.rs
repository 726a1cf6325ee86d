//! Conversion capability shared by entities, entity lists and external types.

use std::path::Path;

use maec_binding::BindingObject;
use serde_json::Value;

use crate::error::Result;
use crate::node::Node;
use crate::xml::{self, NamespaceDict, XmlOptions};

/// Three-way conversion between a typed value, its binding object and its
/// dictionary form.
///
/// Every [`Entity`](crate::Entity) gets this through a blanket impl driven by
/// its field table. Types outside the entity engine implement it by hand to be
/// usable as nested field types.
pub trait Convert: Node + Sized {
    /// Builds the binding object for this value.
    fn to_obj(&self) -> BindingObject;

    /// Builds the dictionary form of this value.
    fn to_dict(&self) -> Value;

    /// Rebuilds a value from a binding object; `Ok(None)` when there is none.
    fn from_obj(obj: Option<&BindingObject>) -> Result<Option<Self>>;

    /// Rebuilds a value from its dictionary form; `Ok(None)` for a missing or
    /// null input.
    fn from_dict(value: Option<&Value>) -> Result<Option<Self>>;

    /// Single-argument construction from a raw value, used when a list
    /// coerces a non-typed item.
    fn from_value(_value: &Value) -> Option<Self> {
        None
    }

    /// The dictionary form encoded as JSON text.
    fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_dict())?)
    }

    /// XML text with namespace declarations and pretty printing.
    fn to_xml(&self) -> Result<String> {
        self.to_xml_with(&XmlOptions::default())
    }

    fn to_xml_with(&self, options: &XmlOptions) -> Result<String> {
        xml::render(self, options)
    }

    /// Writes an XML document with declaration header, namespaces and pretty
    /// printing to `path`.
    fn to_xml_file(
        &self,
        path: impl AsRef<Path>,
        namespace_dict: Option<&NamespaceDict>,
    ) -> Result<()> {
        xml::write_file(self, path.as_ref(), namespace_dict)
    }
}
