//! The generic entity conversion engine.
//!
//! An [`Entity`] declares a binding class and an ordered table of
//! [`TypedField`]s. From those two declarations every entity gets
//! [`Convert`] (object, dictionary, XML and JSON forms) and [`Node`]
//! (namespace walk) through blanket impls.
//!
//! ```ignore
//! #[derive(Debug, Default)]
//! struct Analysis {
//!     id: Option<String>,
//!     summary: Option<String>,
//! }
//!
//! impl Entity for Analysis {
//!     const BINDING_CLASS: BindingClass = BindingClass::new("maecPackage", "Analysis");
//!     const NAMESPACES: &'static [&'static str] = &[namespace::MAEC_PACKAGE];
//!
//!     fn fields() -> &'static [TypedField<Self>] {
//!         static FIELDS: Lazy<Vec<TypedField<Analysis>>> = Lazy::new(|| {
//!             vec![
//!                 typed_field!(primitive, Analysis, id, "id").attribute(),
//!                 typed_field!(primitive, Analysis, summary, "Summary"),
//!             ]
//!         });
//!         &FIELDS
//!     }
//! }
//!
//! impl_entity_eq!(Analysis);
//! ```

use maec_binding::{BindingClass, BindingObject};
use serde_json::{Map, Value};

use crate::convert::Convert;
use crate::error::{EntityError, Result, json_kind};
use crate::field::TypedField;
use crate::node::{Child, Node};

/// A typed node of a document whose conversions are driven by its field table.
pub trait Entity: Default + Send + Sync + 'static {
    /// Binding class instantiated by `to_obj`.
    const BINDING_CLASS: BindingClass;

    /// Namespace URIs declared along the type's declaration chain, root-most
    /// first.
    const NAMESPACES: &'static [&'static str] = &[];

    /// Schema version a parsed document must declare, for document roots.
    const SCHEMA_VERSION: Option<&'static str> = None;

    /// The type's field table. Built once, usually in a `Lazy` static.
    fn fields() -> &'static [TypedField<Self>];

    /// Adds data the field table does not describe to a fresh binding object.
    fn finalize_obj(&self, _obj: &mut BindingObject) {}

    /// Adds data the field table does not describe to a fresh dictionary.
    fn finalize_dict(&self, _dict: &mut Map<String, Value>) {}

    /// Single-argument construction from a non-mapping value.
    fn construct(_value: &Value) -> Option<Self> {
        None
    }

    /// Nodes held outside the field table, such as shared or back references.
    /// Only the namespace walk sees them.
    fn extra_children(&self) -> Vec<Child<'_>> {
        Vec::new()
    }
}

impl<T: Entity> Node for T {
    fn declared_namespaces(&self) -> &'static [&'static str] {
        T::NAMESPACES
    }

    fn namespace_children(&self) -> Vec<Child<'_>> {
        let mut children = Vec::new();
        for field in T::fields() {
            field.collect_children(self, &mut children);
        }
        children.extend(self.extra_children());
        children
    }
}

impl<T: Entity> Convert for T {
    fn to_obj(&self) -> BindingObject {
        to_obj(self)
    }

    fn to_dict(&self) -> Value {
        to_dict(self)
    }

    fn from_obj(obj: Option<&BindingObject>) -> Result<Option<Self>> {
        from_obj(obj)
    }

    fn from_dict(value: Option<&Value>) -> Result<Option<Self>> {
        from_dict(value)
    }

    fn from_value(value: &Value) -> Option<Self> {
        T::construct(value)
    }
}

/// Builds a fresh binding object of `E`'s class from its fields.
pub fn to_obj<E: Entity>(entity: &E) -> BindingObject {
    let mut obj = BindingObject::new(E::BINDING_CLASS);
    for field in E::fields() {
        field.write_obj(entity, &mut obj);
    }
    entity.finalize_obj(&mut obj);
    obj
}

/// Builds the dictionary form of `entity`. Null values and empty sequences
/// are left out.
pub fn to_dict<E: Entity>(entity: &E) -> Value {
    let mut dict = Map::new();
    for field in E::fields() {
        match field.write_dict(entity) {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) if items.is_empty() => {}
            Some(value) => {
                dict.insert(field.dict_key().to_string(), value);
            }
        }
    }
    entity.finalize_dict(&mut dict);
    Value::Object(dict)
}

pub fn from_obj<E: Entity>(obj: Option<&BindingObject>) -> Result<Option<E>> {
    let Some(obj) = obj else {
        return Ok(None);
    };

    let mut entity = E::default();
    for field in E::fields() {
        field.read_obj(&mut entity, obj)?;
    }
    Ok(Some(entity))
}

/// Rebuilds an entity from its dictionary form.
///
/// A non-mapping value goes through [`Entity::construct`]; a type that cannot
/// be built from it yields [`EntityError::Construct`].
pub fn from_dict<E: Entity>(value: Option<&Value>) -> Result<Option<E>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(dict)) => {
            let mut entity = E::default();
            for field in E::fields() {
                field.read_dict(&mut entity, dict.get(field.dict_key()))?;
            }
            Ok(Some(entity))
        }
        Some(other) => E::construct(other)
            .map(Some)
            .ok_or_else(|| EntityError::Construct {
                target: short_type_name::<E>(),
                source_type: json_kind(other),
                value: other.to_string(),
            }),
    }
}

/// Field-table equality.
///
/// A value always equals itself. Otherwise a type needs a non-empty field
/// table and every comparable field must match.
pub fn fields_eq<E: Entity>(a: &E, b: &E) -> bool {
    if std::ptr::eq(a, b) {
        return true;
    }

    let fields = E::fields();
    !fields.is_empty()
        && fields
            .iter()
            .filter(|field| field.is_comparable())
            .all(|field| field.values_eq(a, b))
}

/// Implements `PartialEq` for entity types through [`fields_eq`].
#[macro_export]
macro_rules! impl_entity_eq {
    ($($entity:ty),+ $(,)?) => {
        $(
            impl ::std::cmp::PartialEq for $entity {
                fn eq(&self, other: &Self) -> bool {
                    $crate::entity::fields_eq(self, other)
                }
            }
        )+
    };
}

/// Type name without its module path, keeping any generic arguments.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let head = full.find('<').unwrap_or(full.len());
    match full[..head].rfind("::") {
        Some(index) => &full[index + 2..],
        None => full,
    }
}
