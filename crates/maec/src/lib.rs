//! # MAEC entity mapping
//!
//! Typed entities for MAEC documents with conversion between three forms:
//!
//! - **Objects**: binding trees from [`maec_binding`], exported as XML.
//! - **Dictionaries**: plain nested `serde_json::Value` mappings, encoded as JSON.
//! - **Entities**: Rust structs implementing [`Entity`].
//!
//! Each entity type declares an ordered table of [`TypedField`]s once. The
//! table drives every conversion direction, so a type gets `to_obj`,
//! `from_obj`, `to_dict`, `from_dict`, `to_xml` and `to_json` without
//! hand-written code. Typed collections are [`EntityList`]s, which validate
//! and coerce their elements on insert.
//!
//! ## XML namespaces
//!
//! `to_xml` declares every namespace used anywhere in the entity graph on the
//! root element. The walk that collects them follows descriptor fields, list
//! elements and the nodes an entity exposes through
//! [`Entity::extra_children`], and visits each node once, so graphs with
//! back references terminate.
//!
//! ## Examples
//!
//! ```ignore
//! use maec::{Convert, XmlOptions};
//!
//! let bundle = Bundle::from_dict(Some(&json))?.unwrap_or_default();
//! let xml = bundle.to_xml_with(&XmlOptions::compact())?;
//! bundle.to_xml_file("bundle.xml", None)?;
//! ```

pub mod convert;
pub mod entity;
pub mod error;
pub mod field;
pub mod json;
pub mod list;
pub mod namespace;
pub mod node;
pub mod parser;
pub mod primitive;
pub mod xml;

pub use convert::Convert;
pub use entity::Entity;
pub use error::{EntityError, Result};
pub use field::TypedField;
pub use list::{EntityList, ListArg, ListItem, ListKind};
pub use namespace::{
    Namespace, NamespaceRegistry, default_registry, get_schemaloc_string, get_xmlns_string,
};
pub use node::{Child, Node};
pub use parser::{ParseOptions, ParsedInstance, parse_xml_instance, parse_xml_str};
pub use primitive::Primitive;
pub use xml::{NamespaceDict, XmlOptions};

pub use maec_binding::{BindingClass, BindingObject, BindingValue, MemberKind};

/// Version of the MAEC API this crate models.
pub const API_VERSION: &str = "4.1.0.5";
