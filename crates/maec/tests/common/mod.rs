//! MAEC-shaped entity types shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Weak};

use maec::namespace::{CYBOX, CYBOX_COMMON, MAEC_BUNDLE, MAEC_PACKAGE};
use maec::{
    BindingClass, BindingObject, Child, Convert, Entity, EntityList, ListItem, ListKind, Node,
    Result, TypedField, impl_entity_eq, typed_field,
};
use once_cell::sync::Lazy;
use serde_json::{Map, Value, json};

pub const EMAIL_CATEGORY: &str = "e-mail";

/// Tagged address: the category tells e-mail addresses from other kinds.
#[derive(Debug, Default, Clone)]
pub struct Address {
    pub category: Option<String>,
    pub address_value: Option<String>,
}

impl Address {
    pub fn new(value: &str, category: Option<&str>) -> Self {
        Self {
            category: category.map(str::to_string),
            address_value: Some(value.to_string()),
        }
    }

    pub fn email(value: &str) -> Self {
        Self::new(value, Some(EMAIL_CATEGORY))
    }
}

impl Entity for Address {
    const BINDING_CLASS: BindingClass = BindingClass::new("cyboxCommon", "Address");
    const NAMESPACES: &'static [&'static str] = &[CYBOX_COMMON];

    fn fields() -> &'static [TypedField<Self>] {
        static FIELDS: Lazy<Vec<TypedField<Address>>> = Lazy::new(|| {
            vec![
                typed_field!(primitive, Address, category, "category").attribute(),
                typed_field!(primitive, Address, address_value, "Address_Value")
                    .key_name("address_value")
                    .content(),
            ]
        });
        &FIELDS
    }

    fn construct(value: &Value) -> Option<Self> {
        value.as_str().map(|text| Address::new(text, None))
    }
}

impl_entity_eq!(Address);

/// Addresses tagged as e-mail. Bare strings are coerced into e-mail
/// addresses; addresses of other categories are rejected.
pub struct EmailAddressList;

impl ListKind for EmailAddressList {
    type Item = Address;
    const BINDING_CLASS: BindingClass = BindingClass::new("maecBundle", "EmailAddressListType");
    const BINDING_VAR: &'static str = "Address";

    fn istypeof(item: &Address) -> bool {
        item.category.as_deref() == Some(EMAIL_CATEGORY)
    }

    fn coerce(item: ListItem<Address>) -> Option<Address> {
        match item {
            ListItem::Raw(Value::String(text)) => Some(Address::email(&text)),
            _ => None,
        }
    }
}

/// A hash value from a companion library, wired in by hand rather than
/// through a field table.
#[derive(Debug, Clone, PartialEq)]
pub struct Hash {
    pub algorithm: String,
    pub value: String,
}

impl Hash {
    pub fn new(algorithm: &str, value: &str) -> Self {
        Self {
            algorithm: algorithm.to_string(),
            value: value.to_string(),
        }
    }
}

impl Node for Hash {
    fn declared_namespaces(&self) -> &'static [&'static str] {
        &[CYBOX_COMMON]
    }

    fn namespace_children(&self) -> Vec<Child<'_>> {
        Vec::new()
    }
}

impl Convert for Hash {
    fn to_obj(&self) -> BindingObject {
        let mut obj = BindingObject::named("cyboxCommon", "Hash");
        obj.set("Type", self.algorithm.as_str());
        obj.set("Simple_Hash_Value", self.value.as_str());
        obj
    }

    fn to_dict(&self) -> Value {
        json!({"type": self.algorithm, "simple_hash_value": self.value})
    }

    fn from_obj(obj: Option<&BindingObject>) -> Result<Option<Self>> {
        Ok(obj.map(|obj| {
            let text = |name: &str| {
                obj.get(name)
                    .and_then(|value| value.as_text())
                    .unwrap_or_default()
                    .to_string()
            };
            Hash {
                algorithm: text("Type"),
                value: text("Simple_Hash_Value"),
            }
        }))
    }

    fn from_dict(value: Option<&Value>) -> Result<Option<Self>> {
        Ok(value.and_then(Value::as_object).map(|dict| {
            let text = |key: &str| {
                dict.get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            Hash {
                algorithm: text("type"),
                value: text("simple_hash_value"),
            }
        }))
    }
}

#[derive(Debug, Default, Clone)]
pub struct Action {
    pub id: Option<String>,
    pub ordinal_position: Option<i64>,
    pub timestamp: Option<String>,
    pub name: Option<String>,
    pub tools: Vec<String>,
    pub hashes: Vec<Hash>,
}

impl Entity for Action {
    const BINDING_CLASS: BindingClass = BindingClass::new("maecBundle", "Action");
    const NAMESPACES: &'static [&'static str] = &[CYBOX, MAEC_BUNDLE];

    fn fields() -> &'static [TypedField<Self>] {
        static FIELDS: Lazy<Vec<TypedField<Action>>> = Lazy::new(|| {
            vec![
                typed_field!(primitive, Action, id, "id").attribute(),
                typed_field!(primitive, Action, ordinal_position, "ordinal_position").attribute(),
                typed_field!(primitive, Action, timestamp, "timestamp")
                    .attribute()
                    .not_comparable(),
                typed_field!(primitive, Action, name, "Name").key_name("name"),
                typed_field!(primitives, Action, tools, "Tool").key_name("tools"),
                typed_field!(entities, Action, hashes, "Hash").key_name("hashes"),
            ]
        });
        &FIELDS
    }

    fn construct(value: &Value) -> Option<Self> {
        value.as_str().map(|name| Action {
            name: Some(name.to_string()),
            ..Default::default()
        })
    }
}

impl_entity_eq!(Action);

pub struct ActionList;

impl ListKind for ActionList {
    type Item = Action;
    const BINDING_CLASS: BindingClass = BindingClass::new("maecBundle", "ActionListType");
    const BINDING_VAR: &'static str = "Action";
}

#[derive(Debug, Default, Clone)]
pub struct Bundle {
    pub id: Option<String>,
    pub schema_version: Option<String>,
    pub actions: Option<EntityList<ActionList>>,
    pub senders: Option<EntityList<EmailAddressList>>,
}

impl Entity for Bundle {
    const BINDING_CLASS: BindingClass = BindingClass::new("maecBundle", "MAEC_Bundle");
    const NAMESPACES: &'static [&'static str] = &[MAEC_BUNDLE];
    const SCHEMA_VERSION: Option<&'static str> = Some("4.1");

    fn fields() -> &'static [TypedField<Self>] {
        static FIELDS: Lazy<Vec<TypedField<Bundle>>> = Lazy::new(|| {
            vec![
                typed_field!(primitive, Bundle, id, "id").attribute(),
                typed_field!(primitive, Bundle, schema_version, "schema_version").attribute(),
                typed_field!(list, Bundle, actions, "Actions").key_name("actions"),
                typed_field!(list, Bundle, senders, "Senders").key_name("senders"),
            ]
        });
        &FIELDS
    }
}

impl_entity_eq!(Bundle);

#[derive(Debug, Default, Clone)]
pub struct MalwareSubject {
    pub id: Option<String>,
    pub label: Option<String>,
    pub findings_bundle: Option<Bundle>,
}

impl Entity for MalwareSubject {
    const BINDING_CLASS: BindingClass = BindingClass::new("maecPackage", "Malware_Subject");
    const NAMESPACES: &'static [&'static str] = &[MAEC_PACKAGE];

    fn fields() -> &'static [TypedField<Self>] {
        static FIELDS: Lazy<Vec<TypedField<MalwareSubject>>> = Lazy::new(|| {
            vec![
                typed_field!(primitive, MalwareSubject, id, "id").attribute(),
                typed_field!(primitive, MalwareSubject, label, "Label").key_name("label"),
                typed_field!(entity, MalwareSubject, findings_bundle, "Findings_Bundle")
                    .key_name("findings_bundle"),
            ]
        });
        &FIELDS
    }
}

impl_entity_eq!(MalwareSubject);

pub struct MalwareSubjectList;

impl ListKind for MalwareSubjectList {
    type Item = MalwareSubject;
    const BINDING_CLASS: BindingClass =
        BindingClass::new("maecPackage", "MalwareSubjectListType");
    const BINDING_VAR: &'static str = "Malware_Subject";
}

pub const PACKAGE_SCHEMA_VERSION: &str = "2.1";

/// Document root. The schema version is not a field; the finalize hooks
/// write it into both output forms.
#[derive(Debug, Default, Clone)]
pub struct Package {
    pub id: Option<String>,
    pub timestamp: Option<String>,
    pub malware_subjects: Option<EntityList<MalwareSubjectList>>,
}

impl Entity for Package {
    const BINDING_CLASS: BindingClass = BindingClass::new("maecPackage", "MAEC_Package");
    const NAMESPACES: &'static [&'static str] = &[MAEC_PACKAGE];
    const SCHEMA_VERSION: Option<&'static str> = Some(PACKAGE_SCHEMA_VERSION);

    fn fields() -> &'static [TypedField<Self>] {
        static FIELDS: Lazy<Vec<TypedField<Package>>> = Lazy::new(|| {
            vec![
                typed_field!(primitive, Package, id, "id").attribute(),
                typed_field!(primitive, Package, timestamp, "timestamp").attribute(),
                typed_field!(list, Package, malware_subjects, "Malware_Subjects")
                    .key_name("malware_subjects"),
            ]
        });
        &FIELDS
    }

    fn finalize_obj(&self, obj: &mut BindingObject) {
        obj.set_attribute("schema_version", PACKAGE_SCHEMA_VERSION);
    }

    fn finalize_dict(&self, dict: &mut Map<String, Value>) {
        dict.insert("schema_version".to_string(), json!(PACKAGE_SCHEMA_VERSION));
    }
}

impl_entity_eq!(Package);

/// An entity type without declared fields.
#[derive(Debug, Default)]
pub struct Marker {
    pub note: String,
}

impl Entity for Marker {
    const BINDING_CLASS: BindingClass = BindingClass::new("maecBundle", "Marker");

    fn fields() -> &'static [TypedField<Self>] {
        static NO_FIELDS: [TypedField<Marker>; 0] = [];
        &NO_FIELDS
    }
}

impl_entity_eq!(Marker);

/// Parent half of a cycle: owns its child, which points back through a weak
/// reference. Neither link is a declared field.
#[derive(Debug, Default)]
pub struct CycleParent {
    pub name: Option<String>,
    pub child: Arc<CycleChild>,
}

#[derive(Debug, Default)]
pub struct CycleChild {
    pub label: Option<String>,
    pub parent: Weak<CycleParent>,
}

impl Entity for CycleParent {
    const BINDING_CLASS: BindingClass = BindingClass::new("maecPackage", "Cycle_Parent");
    const NAMESPACES: &'static [&'static str] = &[MAEC_PACKAGE];

    fn fields() -> &'static [TypedField<Self>] {
        static FIELDS: Lazy<Vec<TypedField<CycleParent>>> =
            Lazy::new(|| vec![typed_field!(primitive, CycleParent, name, "Name")]);
        &FIELDS
    }

    fn extra_children(&self) -> Vec<Child<'_>> {
        vec![Child::Borrowed(self.child.as_ref())]
    }
}

impl Entity for CycleChild {
    const BINDING_CLASS: BindingClass = BindingClass::new("maecBundle", "Cycle_Child");
    const NAMESPACES: &'static [&'static str] = &[MAEC_BUNDLE];

    fn fields() -> &'static [TypedField<Self>] {
        static FIELDS: Lazy<Vec<TypedField<CycleChild>>> =
            Lazy::new(|| vec![typed_field!(primitive, CycleChild, label, "Label")]);
        &FIELDS
    }

    fn extra_children(&self) -> Vec<Child<'_>> {
        self.parent.upgrade().map(Child::shared).into_iter().collect()
    }
}

impl_entity_eq!(CycleParent, CycleChild);

/// Builds a parent and child referring to each other.
pub fn cycle() -> Arc<CycleParent> {
    Arc::new_cyclic(|parent| CycleParent {
        name: Some("parent".to_string()),
        child: Arc::new(CycleChild {
            label: Some("child".to_string()),
            parent: parent.clone(),
        }),
    })
}

pub fn sample_action(id: &str, name: &str) -> Action {
    Action {
        id: Some(id.to_string()),
        ordinal_position: Some(1),
        timestamp: Some("2014-02-11T10:00:00".to_string()),
        name: Some(name.to_string()),
        tools: vec!["strace".to_string()],
        hashes: vec![Hash::new("MD5", "0a1b2c")],
    }
}

pub fn sample_bundle() -> Result<Bundle> {
    let mut actions = EntityList::<ActionList>::new();
    actions.push(sample_action("act-1", "create file"))?;
    actions.push(sample_action("act-2", "delete file"))?;

    let mut senders = EntityList::<EmailAddressList>::new();
    senders.push("a@example.com")?;

    Ok(Bundle {
        id: Some("bundle-1".to_string()),
        schema_version: Some("4.1".to_string()),
        actions: Some(actions),
        senders: Some(senders),
    })
}

pub fn sample_package() -> Result<Package> {
    let subject = MalwareSubject {
        id: Some("subject-1".to_string()),
        label: Some("dropper".to_string()),
        findings_bundle: Some(sample_bundle()?),
    };
    let mut subjects = EntityList::<MalwareSubjectList>::new();
    subjects.push(subject)?;

    Ok(Package {
        id: Some("package-1".to_string()),
        timestamp: None,
        malware_subjects: Some(subjects),
    })
}
