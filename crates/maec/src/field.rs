//! Typed field descriptors.
//!
//! Every entity type declares an ordered table of [`TypedField`]s. A field
//! names the member it occupies in a binding object (`name`), the key it uses
//! in the dictionary form (`key_name`), whether it holds a sequence
//! (`multiple`) and whether it takes part in equality (`comparable`). The
//! field also carries typed accessors for the struct slot it describes, so the
//! conversion engine can read and write the slot without knowing its type.
//!
//! Fields are built with one constructor per value shape:
//!
//! | Constructor | Slot type | `type_` | `multiple` |
//! |-------------|-----------|---------|------------|
//! | [`TypedField::primitive`] | `Option<P>` | none | no |
//! | [`TypedField::primitives`] | `Vec<P>` | none | yes |
//! | [`TypedField::entity`] | `Option<T>` | `T` | no |
//! | [`TypedField::entities`] | `Vec<T>` | `T` | yes |
//! | [`TypedField::list`] | `Option<EntityList<L>>` | `EntityList<L>` | no |
//!
//! The [`typed_field!`](crate::typed_field) macro fills in the accessors.

use std::any::type_name;
use std::marker::PhantomData;

use maec_binding::{BindingObject, BindingValue, MemberKind};
use serde_json::Value;

use crate::convert::Convert;
use crate::error::{EntityError, Result};
use crate::list::{EntityList, ListKind};
use crate::node::Child;
use crate::primitive::Primitive;

/// Descriptor of one declared attribute of an entity type `E`.
pub struct TypedField<E: 'static> {
    attr_name: &'static str,
    name: &'static str,
    key_name: &'static str,
    type_name: Option<&'static str>,
    multiple: bool,
    comparable: bool,
    member: MemberKind,
    list: bool,
    access: Box<dyn FieldAccess<E>>,
}

impl<E: 'static> TypedField<E> {
    fn build(
        attr_name: &'static str,
        name: &'static str,
        type_name: Option<&'static str>,
        multiple: bool,
        access: Box<dyn FieldAccess<E>>,
    ) -> Self {
        Self {
            attr_name,
            name,
            key_name: name,
            type_name,
            multiple,
            comparable: true,
            member: MemberKind::Element,
            list: false,
            access,
        }
    }

    /// A single primitive value.
    pub fn primitive<P: Primitive>(
        attr_name: &'static str,
        name: &'static str,
        get: fn(&E) -> &Option<P>,
        get_mut: fn(&mut E) -> &mut Option<P>,
    ) -> Self {
        Self::build(
            attr_name,
            name,
            None,
            false,
            Box::new(PrimitiveSlot { get, get_mut }),
        )
    }

    /// A sequence of primitive values.
    pub fn primitives<P: Primitive>(
        attr_name: &'static str,
        name: &'static str,
        get: fn(&E) -> &Vec<P>,
        get_mut: fn(&mut E) -> &mut Vec<P>,
    ) -> Self {
        Self::build(
            attr_name,
            name,
            None,
            true,
            Box::new(PrimitivesSlot { get, get_mut }),
        )
    }

    /// A single nested entity (or external entity type).
    pub fn entity<T: Convert + PartialEq + 'static>(
        attr_name: &'static str,
        name: &'static str,
        get: fn(&E) -> &Option<T>,
        get_mut: fn(&mut E) -> &mut Option<T>,
    ) -> Self {
        Self::build(
            attr_name,
            name,
            Some(type_name::<T>()),
            false,
            Box::new(EntitySlot { get, get_mut }),
        )
    }

    /// A sequence of nested entities.
    pub fn entities<T: Convert + PartialEq + 'static>(
        attr_name: &'static str,
        name: &'static str,
        get: fn(&E) -> &Vec<T>,
        get_mut: fn(&mut E) -> &mut Vec<T>,
    ) -> Self {
        Self::build(
            attr_name,
            name,
            Some(type_name::<T>()),
            true,
            Box::new(EntitiesSlot { get, get_mut }),
        )
    }

    /// A nested [`EntityList`]; reconstructed from the dictionary form through
    /// [`EntityList::from_list`].
    pub fn list<L: ListKind>(
        attr_name: &'static str,
        name: &'static str,
        get: fn(&E) -> &Option<EntityList<L>>,
        get_mut: fn(&mut E) -> &mut Option<EntityList<L>>,
    ) -> Self {
        let mut field = Self::build(
            attr_name,
            name,
            Some(type_name::<EntityList<L>>()),
            false,
            Box::new(ListSlot {
                get,
                get_mut,
                _kind: PhantomData,
            }),
        );
        field.list = true;
        field
    }

    /// Uses a different key in the dictionary form.
    pub fn key_name(mut self, key_name: &'static str) -> Self {
        self.key_name = key_name;
        self
    }

    /// Excludes the field from equality.
    pub fn not_comparable(mut self) -> Self {
        self.comparable = false;
        self
    }

    /// Stores the field as an XML attribute of the binding object.
    pub fn attribute(mut self) -> Self {
        self.member = MemberKind::Attribute;
        self
    }

    /// Stores the field as the simple text content of the binding object.
    pub fn content(mut self) -> Self {
        self.member = MemberKind::Content;
        self
    }

    pub fn attr_name(&self) -> &'static str {
        self.attr_name
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn dict_key(&self) -> &'static str {
        self.key_name
    }

    /// Declared nested type, `None` for primitive fields.
    pub fn type_(&self) -> Option<&'static str> {
        self.type_name
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    pub fn is_comparable(&self) -> bool {
        self.comparable
    }

    pub fn is_entity_list(&self) -> bool {
        self.list
    }

    pub fn member(&self) -> MemberKind {
        self.member
    }

    pub(crate) fn write_obj(&self, entity: &E, obj: &mut BindingObject) {
        obj.assign(self.member, self.name, self.access.to_obj(entity));
    }

    pub(crate) fn read_obj(&self, entity: &mut E, obj: &BindingObject) -> Result<()> {
        let value = obj.lookup(self.member, self.name);
        self.access.from_obj(self, entity, value.as_deref())
    }

    pub(crate) fn write_dict(&self, entity: &E) -> Option<Value> {
        self.access.to_dict(entity)
    }

    pub(crate) fn read_dict(&self, entity: &mut E, value: Option<&Value>) -> Result<()> {
        self.access.from_dict(self, entity, value)
    }

    pub(crate) fn values_eq(&self, a: &E, b: &E) -> bool {
        self.access.eq(a, b)
    }

    pub(crate) fn collect_children<'a>(&self, entity: &'a E, out: &mut Vec<Child<'a>>) {
        self.access.children(entity, out);
    }

    fn invalid(&self, expected: &'static str, value: impl ToString) -> EntityError {
        EntityError::InvalidField {
            entity: type_name::<E>(),
            field: self.attr_name,
            expected,
            value: value.to_string(),
        }
    }
}

impl<E: 'static> std::fmt::Debug for TypedField<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedField")
            .field("attr_name", &self.attr_name)
            .field("name", &self.name)
            .field("key_name", &self.key_name)
            .field("type_", &self.type_name)
            .field("multiple", &self.multiple)
            .field("comparable", &self.comparable)
            .field("member", &self.member)
            .finish()
    }
}

/// Builds a [`TypedField`] whose accessors read and write `$entity.$attr`.
///
/// ```ignore
/// typed_field!(primitive, Action, name, "Name").key_name("name")
/// ```
#[macro_export]
macro_rules! typed_field {
    ($kind:ident, $entity:ty, $attr:ident, $name:expr) => {
        $crate::TypedField::<$entity>::$kind(
            stringify!($attr),
            $name,
            |entity| &entity.$attr,
            |entity| &mut entity.$attr,
        )
    };
}

/// Typed access to one struct slot, erased behind the field table.
trait FieldAccess<E>: Send + Sync {
    fn to_obj(&self, entity: &E) -> Option<BindingValue>;

    fn to_dict(&self, entity: &E) -> Option<Value>;

    fn from_obj(
        &self,
        field: &TypedField<E>,
        entity: &mut E,
        value: Option<&BindingValue>,
    ) -> Result<()>;

    fn from_dict(&self, field: &TypedField<E>, entity: &mut E, value: Option<&Value>)
    -> Result<()>;

    fn eq(&self, a: &E, b: &E) -> bool;

    fn children<'a>(&self, _entity: &'a E, _out: &mut Vec<Child<'a>>) {}
}

/// Reconstructs a nested value from one binding value. Text-only elements
/// read as objects holding simple content.
fn nested_from_obj<T: Convert>(value: &BindingValue) -> Result<Option<T>> {
    match value {
        BindingValue::Object(obj) => T::from_obj(Some(obj)),
        BindingValue::Text(text) => T::from_obj(Some(&BindingObject::with_content(text.clone()))),
        BindingValue::List(_) => Ok(None),
    }
}

fn is_absent(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

struct PrimitiveSlot<E, P> {
    get: fn(&E) -> &Option<P>,
    get_mut: fn(&mut E) -> &mut Option<P>,
}

impl<E: 'static, P: Primitive> FieldAccess<E> for PrimitiveSlot<E, P> {
    fn to_obj(&self, entity: &E) -> Option<BindingValue> {
        (self.get)(entity)
            .as_ref()
            .map(|value| BindingValue::Text(value.to_text()))
    }

    fn to_dict(&self, entity: &E) -> Option<Value> {
        (self.get)(entity).as_ref().map(Primitive::to_json)
    }

    fn from_obj(
        &self,
        field: &TypedField<E>,
        entity: &mut E,
        value: Option<&BindingValue>,
    ) -> Result<()> {
        let parsed = match value {
            None => None,
            Some(value) => {
                let text = value
                    .as_text()
                    .ok_or_else(|| field.invalid(P::KIND, format!("{:?}", value)))?;
                Some(P::from_text(text).ok_or_else(|| field.invalid(P::KIND, text))?)
            }
        };
        *(self.get_mut)(entity) = parsed;
        Ok(())
    }

    fn from_dict(
        &self,
        field: &TypedField<E>,
        entity: &mut E,
        value: Option<&Value>,
    ) -> Result<()> {
        let parsed = match value {
            Some(value) if !value.is_null() => {
                Some(P::from_json(value).ok_or_else(|| field.invalid(P::KIND, value))?)
            }
            _ => None,
        };
        *(self.get_mut)(entity) = parsed;
        Ok(())
    }

    fn eq(&self, a: &E, b: &E) -> bool {
        (self.get)(a) == (self.get)(b)
    }
}

struct PrimitivesSlot<E, P> {
    get: fn(&E) -> &Vec<P>,
    get_mut: fn(&mut E) -> &mut Vec<P>,
}

impl<E: 'static, P: Primitive> FieldAccess<E> for PrimitivesSlot<E, P> {
    fn to_obj(&self, entity: &E) -> Option<BindingValue> {
        let items = (self.get)(entity)
            .iter()
            .map(|value| BindingValue::Text(value.to_text()))
            .collect();
        Some(BindingValue::List(items))
    }

    fn to_dict(&self, entity: &E) -> Option<Value> {
        Some(Value::Array(
            (self.get)(entity).iter().map(Primitive::to_json).collect(),
        ))
    }

    fn from_obj(
        &self,
        field: &TypedField<E>,
        entity: &mut E,
        value: Option<&BindingValue>,
    ) -> Result<()> {
        let mut parsed = Vec::new();
        for item in value.map(BindingValue::items).unwrap_or_default() {
            let text = item
                .as_text()
                .ok_or_else(|| field.invalid(P::KIND, format!("{:?}", item)))?;
            parsed.push(P::from_text(text).ok_or_else(|| field.invalid(P::KIND, text))?);
        }
        *(self.get_mut)(entity) = parsed;
        Ok(())
    }

    fn from_dict(
        &self,
        field: &TypedField<E>,
        entity: &mut E,
        value: Option<&Value>,
    ) -> Result<()> {
        let items: &[Value] = match value {
            None | Some(Value::Null) => &[],
            Some(Value::Array(items)) => items,
            Some(single) => std::slice::from_ref(single),
        };
        let mut parsed = Vec::with_capacity(items.len());
        for item in items {
            parsed.push(P::from_json(item).ok_or_else(|| field.invalid(P::KIND, item))?);
        }
        *(self.get_mut)(entity) = parsed;
        Ok(())
    }

    fn eq(&self, a: &E, b: &E) -> bool {
        (self.get)(a) == (self.get)(b)
    }
}

struct EntitySlot<E, T> {
    get: fn(&E) -> &Option<T>,
    get_mut: fn(&mut E) -> &mut Option<T>,
}

impl<E: 'static, T: Convert + PartialEq + 'static> FieldAccess<E> for EntitySlot<E, T> {
    fn to_obj(&self, entity: &E) -> Option<BindingValue> {
        (self.get)(entity)
            .as_ref()
            .map(|value| BindingValue::Object(value.to_obj()))
    }

    fn to_dict(&self, entity: &E) -> Option<Value> {
        (self.get)(entity).as_ref().map(Convert::to_dict)
    }

    fn from_obj(
        &self,
        field: &TypedField<E>,
        entity: &mut E,
        value: Option<&BindingValue>,
    ) -> Result<()> {
        let parsed = match value {
            None => None,
            Some(value @ BindingValue::List(_)) => {
                return Err(field.invalid("a single element", format!("{:?}", value)));
            }
            Some(value) => nested_from_obj::<T>(value)?,
        };
        *(self.get_mut)(entity) = parsed;
        Ok(())
    }

    fn from_dict(
        &self,
        _field: &TypedField<E>,
        entity: &mut E,
        value: Option<&Value>,
    ) -> Result<()> {
        *(self.get_mut)(entity) = T::from_dict(value)?;
        Ok(())
    }

    fn eq(&self, a: &E, b: &E) -> bool {
        (self.get)(a) == (self.get)(b)
    }

    fn children<'a>(&self, entity: &'a E, out: &mut Vec<Child<'a>>) {
        if let Some(value) = (self.get)(entity) {
            out.push(Child::Borrowed(value));
        }
    }
}

struct EntitiesSlot<E, T> {
    get: fn(&E) -> &Vec<T>,
    get_mut: fn(&mut E) -> &mut Vec<T>,
}

impl<E: 'static, T: Convert + PartialEq + 'static> FieldAccess<E> for EntitiesSlot<E, T> {
    fn to_obj(&self, entity: &E) -> Option<BindingValue> {
        let items = (self.get)(entity)
            .iter()
            .map(|value| BindingValue::Object(value.to_obj()))
            .collect();
        Some(BindingValue::List(items))
    }

    fn to_dict(&self, entity: &E) -> Option<Value> {
        Some(Value::Array(
            (self.get)(entity).iter().map(Convert::to_dict).collect(),
        ))
    }

    fn from_obj(
        &self,
        field: &TypedField<E>,
        entity: &mut E,
        value: Option<&BindingValue>,
    ) -> Result<()> {
        let mut parsed = Vec::new();
        for item in value.map(BindingValue::items).unwrap_or_default() {
            let rebuilt = nested_from_obj::<T>(item)?
                .ok_or_else(|| field.invalid("an element per item", format!("{:?}", item)))?;
            parsed.push(rebuilt);
        }
        *(self.get_mut)(entity) = parsed;
        Ok(())
    }

    /// Every item must rebuild to a value; nulls and nested sequences are
    /// rejected.
    fn from_dict(
        &self,
        field: &TypedField<E>,
        entity: &mut E,
        value: Option<&Value>,
    ) -> Result<()> {
        let mut parsed = Vec::new();
        if !is_absent(value) {
            let items = match value {
                Some(Value::Array(items)) => items.as_slice(),
                other => other.map(std::slice::from_ref).unwrap_or_default(),
            };
            for item in items {
                if item.is_array() {
                    return Err(field.invalid("a mapping or scalar per item", item));
                }
                let rebuilt = T::from_dict(Some(item))?
                    .ok_or_else(|| field.invalid("a mapping or scalar per item", item))?;
                parsed.push(rebuilt);
            }
        }
        *(self.get_mut)(entity) = parsed;
        Ok(())
    }

    fn eq(&self, a: &E, b: &E) -> bool {
        (self.get)(a) == (self.get)(b)
    }

    fn children<'a>(&self, entity: &'a E, out: &mut Vec<Child<'a>>) {
        out.extend((self.get)(entity).iter().map(|value| Child::Borrowed(value)));
    }
}

struct ListSlot<E, L: ListKind> {
    get: fn(&E) -> &Option<EntityList<L>>,
    get_mut: fn(&mut E) -> &mut Option<EntityList<L>>,
    _kind: PhantomData<fn() -> L>,
}

impl<E: 'static, L: ListKind> FieldAccess<E> for ListSlot<E, L> {
    fn to_obj(&self, entity: &E) -> Option<BindingValue> {
        (self.get)(entity)
            .as_ref()
            .map(|list| BindingValue::Object(list.to_obj()))
    }

    fn to_dict(&self, entity: &E) -> Option<Value> {
        (self.get)(entity).as_ref().map(EntityList::to_list)
    }

    fn from_obj(
        &self,
        field: &TypedField<E>,
        entity: &mut E,
        value: Option<&BindingValue>,
    ) -> Result<()> {
        let parsed = match value {
            None => None,
            Some(value @ BindingValue::List(_)) => {
                return Err(field.invalid("a single collection element", format!("{:?}", value)));
            }
            Some(value) => nested_from_obj::<EntityList<L>>(value)?,
        };
        *(self.get_mut)(entity) = parsed;
        Ok(())
    }

    fn from_dict(
        &self,
        _field: &TypedField<E>,
        entity: &mut E,
        value: Option<&Value>,
    ) -> Result<()> {
        *(self.get_mut)(entity) = EntityList::from_list(value)?;
        Ok(())
    }

    fn eq(&self, a: &E, b: &E) -> bool {
        (self.get)(a) == (self.get)(b)
    }

    fn children<'a>(&self, entity: &'a E, out: &mut Vec<Child<'a>>) {
        if let Some(list) = (self.get)(entity) {
            out.push(Child::Borrowed(list));
        }
    }
}
