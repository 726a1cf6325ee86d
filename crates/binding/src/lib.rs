//! # MAEC binding tree
//!
//! Schema-agnostic stand-in for schema-generated XML binding classes.
//!
//! A [`BindingObject`] represents one XML element: a namespace prefix, an
//! element name, ordered attributes, ordered child members and optional
//! simple content. Entity types in the `maec` crate convert to and from
//! binding objects; this crate turns binding objects into XML text and
//! parses XML text back into binding objects.
//!
//! ## XML layout
//!
//! | Binding member | XML |
//! |----------------|-----|
//! | attribute `id = "x"` | `<p:Elem id="x">` |
//! | child `Label = Text("a")` | `<p:Label>a</p:Label>` |
//! | child `Action = List([..])` | one `<p:Action>` per item |
//! | content `Text("a")` | `<p:Elem>a</p:Elem>` |
//!
//! Child elements are qualified with the prefix of the object that owns them.
//!
//! ## Examples
//!
//! ```ignore
//! use maec_binding::{BindingClass, BindingObject};
//!
//! let mut bundle = BindingObject::new(BindingClass::new("maecBundle", "MAEC_Bundle"));
//! bundle.set_attribute("id", "maec-bundle-1");
//! let xml = bundle.to_xml_string("", true)?;
//!
//! let parsed = maec_binding::read::from_xml_str(&xml)?;
//! assert_eq!(parsed.root, bundle);
//! ```

pub mod error;
pub mod export;
pub mod object;
pub mod read;
pub mod utils;

pub use error::{BindingError, Result};
pub use object::{BindingClass, BindingObject, BindingValue, MemberKind};
pub use read::{ParsedDocument, from_xml_file, from_xml_str};
