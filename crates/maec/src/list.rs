//! Typed entity collections.
//!
//! An [`EntityList`] is an ordered sequence of one contained type, declared
//! by a [`ListKind`]. Every write that introduces an element validates it
//! against the kind's [`ListKind::istypeof`] predicate and otherwise tries the
//! kind's coercion; a value that cannot be coerced is rejected with
//! [`EntityError::Coercion`].

use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;

use maec_binding::{BindingClass, BindingObject, BindingValue};
use serde_json::Value;

use crate::convert::Convert;
use crate::entity::short_type_name;
use crate::error::{EntityError, Result, json_kind};
use crate::node::{Child, Node};

/// Kind-level declarations of an [`EntityList`].
pub trait ListKind: Send + Sync + 'static {
    /// Contained type.
    type Item: Convert + PartialEq + Clone + fmt::Debug + 'static;

    /// Binding collection class produced by `to_obj`.
    const BINDING_CLASS: BindingClass;

    /// Binding member holding the raw sequence.
    const BINDING_VAR: &'static str;

    const NAMESPACES: &'static [&'static str] = &[];

    /// Whether `item` already belongs in the list.
    fn istypeof(_item: &Self::Item) -> bool {
        true
    }

    /// Turns a rejected item into one that belongs in the list.
    ///
    /// The default builds raw values through the contained type's
    /// single-argument constructor and gives up on typed items.
    fn coerce(item: ListItem<Self::Item>) -> Option<Self::Item> {
        match item {
            ListItem::Typed(_) => None,
            ListItem::Raw(value) => <Self::Item as Convert>::from_value(&value),
        }
    }
}

/// A value offered to an [`EntityList`]: an instance of the contained type
/// or a raw dictionary-form value.
#[derive(Debug, Clone, PartialEq)]
pub enum ListItem<T> {
    Typed(T),
    Raw(Value),
}

impl<T: Convert> From<T> for ListItem<T> {
    fn from(item: T) -> Self {
        ListItem::Typed(item)
    }
}

impl<T> From<Value> for ListItem<T> {
    fn from(value: Value) -> Self {
        ListItem::Raw(value)
    }
}

impl<T> From<&str> for ListItem<T> {
    fn from(value: &str) -> Self {
        ListItem::Raw(Value::String(value.to_string()))
    }
}

impl<T> From<String> for ListItem<T> {
    fn from(value: String) -> Self {
        ListItem::Raw(Value::String(value))
    }
}

/// One argument of [`EntityList::from_args`]: sequences are flattened, other
/// values are appended as they are.
#[derive(Debug, Clone)]
pub enum ListArg<T> {
    One(ListItem<T>),
    Many(Vec<ListItem<T>>),
}

impl<T: Convert> From<T> for ListArg<T> {
    fn from(item: T) -> Self {
        ListArg::One(ListItem::Typed(item))
    }
}

impl<T> From<Vec<T>> for ListArg<T> {
    fn from(items: Vec<T>) -> Self {
        ListArg::Many(items.into_iter().map(ListItem::Typed).collect())
    }
}

impl<T> From<Vec<ListItem<T>>> for ListArg<T> {
    fn from(items: Vec<ListItem<T>>) -> Self {
        ListArg::Many(items)
    }
}

impl<T> From<ListItem<T>> for ListArg<T> {
    fn from(item: ListItem<T>) -> Self {
        ListArg::One(item)
    }
}

impl<T> From<Value> for ListArg<T> {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => ListArg::Many(items.into_iter().map(ListItem::Raw).collect()),
            other => ListArg::One(ListItem::Raw(other)),
        }
    }
}

impl<T> From<&str> for ListArg<T> {
    fn from(value: &str) -> Self {
        ListArg::One(value.into())
    }
}

impl<T> From<String> for ListArg<T> {
    fn from(value: String) -> Self {
        ListArg::One(value.into())
    }
}

/// Ordered, validated collection of `L::Item`.
pub struct EntityList<L: ListKind> {
    inner: Vec<L::Item>,
    _kind: PhantomData<fn() -> L>,
}

impl<L: ListKind> EntityList<L> {
    pub fn new() -> Self {
        Self {
            inner: Vec::new(),
            _kind: PhantomData,
        }
    }

    /// Builds a list from a variable argument list.
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = ListArg<L::Item>>,
    {
        let mut list = Self::new();
        for arg in args {
            match arg {
                ListArg::One(item) => list.push(item)?,
                ListArg::Many(items) => list.extend(items)?,
            }
        }
        Ok(list)
    }

    /// Validates `item`, coercing it when it does not belong in the list.
    fn admit(item: ListItem<L::Item>) -> Result<L::Item> {
        let item = match item {
            ListItem::Typed(typed) if L::istypeof(&typed) => return Ok(typed),
            other => other,
        };

        let (value, actual_type) = match &item {
            ListItem::Typed(typed) => (
                format!("{:?}", typed),
                short_type_name::<L::Item>().to_string(),
            ),
            ListItem::Raw(Value::String(text)) => (text.clone(), "string".to_string()),
            ListItem::Raw(raw) => (raw.to_string(), json_kind(raw).to_string()),
        };
        L::coerce(item).ok_or_else(|| EntityError::Coercion {
            value,
            actual_type,
            target: short_type_name::<L>(),
        })
    }

    /// # Panics
    ///
    /// Panics if `index > len`, before the item is validated.
    pub fn insert(&mut self, index: usize, item: impl Into<ListItem<L::Item>>) -> Result<()> {
        let len = self.inner.len();
        assert!(index <= len, "insertion index (is {index}) should be <= len (is {len})");
        let item = Self::admit(item.into())?;
        self.inner.insert(index, item);
        Ok(())
    }

    pub fn push(&mut self, item: impl Into<ListItem<L::Item>>) -> Result<()> {
        let item = Self::admit(item.into())?;
        self.inner.push(item);
        Ok(())
    }

    /// Replaces the element at `index`, returning the previous one.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds, before the item is validated.
    pub fn set(&mut self, index: usize, item: impl Into<ListItem<L::Item>>) -> Result<L::Item> {
        let len = self.inner.len();
        assert!(index < len, "set index (is {index}) should be < len (is {len})");
        let item = Self::admit(item.into())?;
        Ok(std::mem::replace(&mut self.inner[index], item))
    }

    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> L::Item {
        self.inner.remove(index)
    }

    /// Appends every item, stopping at the first one that is rejected.
    pub fn extend<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<ListItem<L::Item>>,
    {
        for item in items {
            self.push(item)?;
        }
        Ok(())
    }

    /// Mutable access to an element. Changes made through it are not
    /// validated again.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut L::Item> {
        self.inner.get_mut(index)
    }

    pub fn into_vec(self) -> Vec<L::Item> {
        self.inner
    }

    /// Sequence of each element's dictionary form.
    pub fn to_list(&self) -> Value {
        Value::Array(self.inner.iter().map(Convert::to_dict).collect())
    }

    /// Rebuilds a list from its dictionary form; `Ok(None)` unless `raw` is a
    /// sequence.
    pub fn from_list(raw: Option<&Value>) -> Result<Option<Self>> {
        let Some(Value::Array(items)) = raw else {
            return Ok(None);
        };

        let mut list = Self::new();
        for item in items {
            let item = match L::Item::from_dict(Some(item))? {
                Some(typed) => ListItem::Typed(typed),
                None => ListItem::Raw(Value::Null),
            };
            list.push(item)?;
        }
        Ok(Some(list))
    }

    /// Converts a dictionary-form sequence straight into its binding object.
    pub fn object_from_list(raw: Option<&Value>) -> Result<Option<BindingObject>> {
        Ok(Self::from_list(raw)?.map(|list| list.to_obj()))
    }

    /// Converts a binding object straight into its dictionary-form sequence.
    pub fn list_from_object(obj: Option<&BindingObject>) -> Result<Option<Value>> {
        Ok(Self::from_obj(obj)?.map(|list| list.to_list()))
    }
}

impl<L: ListKind> Convert for EntityList<L> {
    fn to_obj(&self) -> BindingObject {
        let mut obj = BindingObject::new(L::BINDING_CLASS);
        let items = self
            .inner
            .iter()
            .map(|item| BindingValue::Object(item.to_obj()))
            .collect::<Vec<_>>();
        obj.set(L::BINDING_VAR, items);
        obj
    }

    fn to_dict(&self) -> Value {
        self.to_list()
    }

    fn from_obj(obj: Option<&BindingObject>) -> Result<Option<Self>> {
        let Some(obj) = obj else {
            return Ok(None);
        };

        let mut list = Self::new();
        let items = obj.get(L::BINDING_VAR).map(BindingValue::items).unwrap_or_default();
        for item in items {
            let typed = match item {
                BindingValue::Object(inner) => L::Item::from_obj(Some(inner))?,
                BindingValue::Text(text) => {
                    L::Item::from_obj(Some(&BindingObject::with_content(text.clone())))?
                }
                BindingValue::List(_) => None,
            };
            list.push(match typed {
                Some(typed) => ListItem::Typed(typed),
                None => ListItem::Raw(Value::Null),
            })?;
        }
        Ok(Some(list))
    }

    /// A sequence goes through [`EntityList::from_list`]; a single raw value
    /// becomes a one-element list.
    fn from_dict(value: Option<&Value>) -> Result<Option<Self>> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(_)) => Self::from_list(value),
            Some(other) => Self::from_args([ListArg::from(other.clone())]).map(Some),
        }
    }
}

impl<L: ListKind> Node for EntityList<L> {
    fn declared_namespaces(&self) -> &'static [&'static str] {
        L::NAMESPACES
    }

    fn namespace_children(&self) -> Vec<Child<'_>> {
        self.inner
            .iter()
            .map(|item| Child::Borrowed(item as &dyn Node))
            .collect()
    }
}

impl<L: ListKind> Deref for EntityList<L> {
    type Target = [L::Item];

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<'a, L: ListKind> IntoIterator for &'a EntityList<L> {
    type Item = &'a L::Item;
    type IntoIter = std::slice::Iter<'a, L::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl<L: ListKind> Default for EntityList<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ListKind> Clone for EntityList<L> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _kind: PhantomData,
        }
    }
}

impl<L: ListKind> PartialEq for EntityList<L> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<L: ListKind> fmt::Debug for EntityList<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.iter()).finish()
    }
}

/// Builds an [`EntityList`] from a variable argument list.
///
/// ```ignore
/// let list = entity_list!(EmailAddresses; "a@example.com", vec![address])?;
/// ```
#[macro_export]
macro_rules! entity_list {
    ($kind:ty) => {
        ::std::result::Result::<_, $crate::EntityError>::Ok($crate::EntityList::<$kind>::new())
    };
    ($kind:ty; $($arg:expr),+ $(,)?) => {
        $crate::EntityList::<$kind>::from_args([
            $($crate::ListArg::from($arg)),+
        ])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::field::TypedField;
    use crate::typed_field;
    use once_cell::sync::Lazy;
    use serde_json::json;

    #[derive(Debug, Default, Clone)]
    struct Tool {
        name: Option<String>,
    }

    impl Entity for Tool {
        const BINDING_CLASS: BindingClass = BindingClass::new("maecBundle", "Tool");

        fn fields() -> &'static [TypedField<Self>] {
            static FIELDS: Lazy<Vec<TypedField<Tool>>> =
                Lazy::new(|| vec![typed_field!(primitive, Tool, name, "Name").key_name("name")]);
            &FIELDS
        }

        fn construct(value: &Value) -> Option<Self> {
            value.as_str().map(|name| Tool {
                name: Some(name.to_string()),
            })
        }
    }

    crate::impl_entity_eq!(Tool);

    struct Tools;

    impl ListKind for Tools {
        type Item = Tool;
        const BINDING_CLASS: BindingClass = BindingClass::new("maecBundle", "ToolList");
        const BINDING_VAR: &'static str = "Tool";
    }

    fn tool(name: &str) -> Tool {
        Tool {
            name: Some(name.to_string()),
        }
    }

    #[test]
    fn test_push_keeps_typed_items() -> Result<()> {
        let mut list = EntityList::<Tools>::new();
        list.push(tool("strace"))?;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0], tool("strace"));
        Ok(())
    }

    #[test]
    fn test_push_constructs_from_raw_string() -> Result<()> {
        let mut list = EntityList::<Tools>::new();
        list.push("ltrace")?;
        assert_eq!(list[0].name.as_deref(), Some("ltrace"));
        Ok(())
    }

    #[test]
    fn test_push_rejects_unconstructible_value() {
        let mut list = EntityList::<Tools>::new();
        let err = list.push(json!(42)).unwrap_err();
        assert!(matches!(
            err,
            EntityError::Coercion { ref value, ref actual_type, .. }
                if value == "42" && actual_type == "number"
        ));
        assert!(list.is_empty());
    }

    #[test]
    fn test_from_args_flattens_sequences() -> Result<()> {
        let list = crate::entity_list!(Tools; tool("a"), vec![tool("b"), tool("c")], "d")?;
        let names: Vec<_> = list.iter().filter_map(|t| t.name.clone()).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);
        Ok(())
    }

    #[test]
    fn test_insert_set_remove() -> Result<()> {
        let mut list = crate::entity_list!(Tools; tool("a"), tool("c"))?;
        list.insert(1, "b")?;
        let old = list.set(0, tool("z"))?;
        assert_eq!(old, tool("a"));
        assert_eq!(list.remove(2), tool("c"));
        assert_eq!(list.to_list(), json!([{"name": "z"}, {"name": "b"}]));
        Ok(())
    }

    #[test]
    #[should_panic(expected = "set index (is 3) should be < len (is 1)")]
    fn test_set_checks_index_before_coercion() {
        let mut list = EntityList::<Tools>::new();
        list.push(tool("a")).unwrap();
        let _ = list.set(3, json!(42));
    }

    #[test]
    fn test_object_and_list_paths() -> Result<()> {
        let raw = json!([{"name": "a"}, {"name": "b"}]);
        let obj = EntityList::<Tools>::object_from_list(Some(&raw))?.unwrap();
        assert_eq!(obj.qualified_name(), "maecBundle:ToolList");
        assert_eq!(obj.get("Tool").map(|v| v.items().len()), Some(2));

        let back = EntityList::<Tools>::list_from_object(Some(&obj))?;
        assert_eq!(back, Some(raw));
        Ok(())
    }

    #[test]
    fn test_from_list_requires_sequence() -> Result<()> {
        assert!(EntityList::<Tools>::from_list(None)?.is_none());
        assert!(EntityList::<Tools>::from_list(Some(&json!({"name": "a"})))?.is_none());
        let list = EntityList::<Tools>::from_list(Some(&json!([])))?.unwrap();
        assert!(list.is_empty());
        Ok(())
    }
}
