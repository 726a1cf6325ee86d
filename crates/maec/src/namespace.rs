//! XML namespaces: the registry of known namespaces, the graph walk that
//! collects the namespaces an entity graph uses, and the root element's
//! namespace declaration block.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{trace, warn};

use crate::node::{Child, Node, node_key};

pub const MAEC_PACKAGE: &str = "http://maec.mitre.org/XMLSchema/maec-package-2";
pub const MAEC_BUNDLE: &str = "http://maec.mitre.org/XMLSchema/maec-bundle-4";
pub const MAEC_CONTAINER: &str = "http://maec.mitre.org/XMLSchema/maec-container-1";
pub const MAEC_VOCABS: &str = "http://maec.mitre.org/default_vocabularies-1";
pub const CYBOX: &str = "http://cybox.mitre.org/cybox-2";
pub const CYBOX_COMMON: &str = "http://cybox.mitre.org/common-2";
pub const CYBOX_VOCABS: &str = "http://cybox.mitre.org/default_vocabularies-2";
pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Additional namespace declarations, namespace URI to prefix.
pub type NamespaceDict = BTreeMap<String, String>;

/// An XML namespace. Ordered by URI.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Namespace {
    pub name: String,
    pub prefix: String,
    pub schema_location: Option<String>,
}

impl Namespace {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            schema_location: None,
        }
    }

    pub fn with_schema_location(mut self, location: impl Into<String>) -> Self {
        self.schema_location = Some(location.into());
        self
    }
}

/// Namespaces known by prefix and by URI.
#[derive(Debug, Clone, Default)]
pub struct NamespaceRegistry {
    by_prefix: HashMap<String, Namespace>,
    by_uri: HashMap<String, Namespace>,
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the MAEC and CybOX namespaces.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let defaults = [
            (
                MAEC_PACKAGE,
                "maecPackage",
                Some("http://maec.mitre.org/language/version4.1/maec_package_schema.xsd"),
            ),
            (
                MAEC_BUNDLE,
                "maecBundle",
                Some("http://maec.mitre.org/language/version4.1/maec_bundle_schema.xsd"),
            ),
            (
                MAEC_CONTAINER,
                "maecContainer",
                Some("http://maec.mitre.org/language/version4.1/maec_container_schema.xsd"),
            ),
            (
                MAEC_VOCABS,
                "maecVocabs",
                Some("http://maec.mitre.org/language/version4.1/maec_default_vocabularies.xsd"),
            ),
            (
                CYBOX,
                "cybox",
                Some("http://cybox.mitre.org/XMLSchema/core/2.1/cybox_core.xsd"),
            ),
            (
                CYBOX_COMMON,
                "cyboxCommon",
                Some("http://cybox.mitre.org/XMLSchema/common/2.1/cybox_common.xsd"),
            ),
            (
                CYBOX_VOCABS,
                "cyboxVocabs",
                Some(
                    "http://cybox.mitre.org/XMLSchema/default_vocabularies/2.1/cybox_default_vocabularies.xsd",
                ),
            ),
            (XSI, "xsi", None),
        ];

        for (uri, prefix, location) in defaults {
            let mut namespace = Namespace::new(uri, prefix);
            namespace.schema_location = location.map(str::to_string);
            registry.register(namespace);
        }
        registry
    }

    /// Adds a namespace, replacing any entry with the same prefix or URI.
    pub fn register(&mut self, namespace: Namespace) {
        self.by_uri.insert(namespace.name.clone(), namespace.clone());
        self.by_prefix.insert(namespace.prefix.clone(), namespace);
    }

    pub fn lookup_prefix(&self, prefix: &str) -> Option<&Namespace> {
        self.by_prefix.get(prefix)
    }

    pub fn lookup_namespace(&self, uri: &str) -> Option<&Namespace> {
        self.by_uri.get(uri)
    }
}

static DEFAULT_REGISTRY: Lazy<NamespaceRegistry> = Lazy::new(NamespaceRegistry::with_defaults);

/// The process-wide registry.
pub fn default_registry() -> &'static NamespaceRegistry {
    &DEFAULT_REGISTRY
}

/// `xmlns:prefix="uri"` declarations joined by a newline and a tab.
pub fn get_xmlns_string<'a>(namespaces: impl IntoIterator<Item = &'a Namespace>) -> String {
    namespaces
        .into_iter()
        .filter(|ns| !ns.name.is_empty())
        .map(|ns| format!("xmlns:{}=\"{}\"", ns.prefix, ns.name))
        .collect::<Vec<_>>()
        .join("\n\t")
}

/// `uri location` pairs for every namespace with a schema location, joined
/// by spaces.
pub fn get_schemaloc_string<'a>(namespaces: impl IntoIterator<Item = &'a Namespace>) -> String {
    namespaces
        .into_iter()
        .filter(|ns| !ns.name.is_empty())
        .filter_map(|ns| {
            ns.schema_location
                .as_ref()
                .map(|location| format!("{} {}", ns.name, location))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Every namespace used by `node` and the nodes reachable from it.
///
/// Each node is walked once, so cyclic graphs terminate. URIs missing from
/// the registry are skipped.
pub fn collect_namespaces(node: &dyn Node) -> BTreeSet<Namespace> {
    let mut walk = NamespaceWalk {
        registry: default_registry(),
        visited: HashSet::new(),
        retained: Vec::new(),
        found: BTreeSet::new(),
    };
    walk.visit(node);
    walk.found
}

struct NamespaceWalk<'r> {
    registry: &'r NamespaceRegistry,
    visited: HashSet<(usize, &'static str)>,
    /// Shared children stay alive until the walk ends so their addresses
    /// cannot be reused by later allocations.
    retained: Vec<Arc<dyn Node>>,
    found: BTreeSet<Namespace>,
}

impl NamespaceWalk<'_> {
    fn visit(&mut self, node: &dyn Node) {
        if !self.visited.insert(node_key(node)) {
            trace!(node = node.type_name(), "already visited");
            return;
        }

        for uri in node.declared_namespaces() {
            match self.registry.lookup_namespace(uri) {
                Some(namespace) => {
                    self.found.insert(namespace.clone());
                }
                None => warn!(namespace = %uri, node = node.type_name(), "unknown namespace"),
            }
        }

        for child in node.namespace_children() {
            self.visit(&*child);
            if let Child::Shared(shared) = child {
                self.retained.push(shared);
            }
        }
    }
}

/// Namespace declarations for the root element of `node`'s XML form.
///
/// When the graph uses any namespace, `xsi` and the default vocabularies are
/// added, then every `additional` URI not already present. Returns an empty
/// string when the graph declares no namespaces.
pub fn namespace_def(node: &dyn Node, additional: Option<&NamespaceDict>) -> String {
    let mut namespaces = collect_namespaces(node);
    if namespaces.is_empty() {
        return String::new();
    }

    let registry = default_registry();
    namespaces.extend(registry.lookup_prefix("xsi").cloned());
    namespaces.extend(registry.lookup_prefix("maecVocabs").cloned());

    if let Some(additional) = additional {
        let present: HashSet<String> = namespaces.iter().map(|ns| ns.name.clone()).collect();
        for (uri, prefix) in additional {
            if !present.contains(uri) {
                namespaces.insert(Namespace::new(uri.as_str(), prefix.as_str()));
            }
        }
    }

    format!(
        "\n\t{}\n\txsi:schemaLocation=\"{}\"",
        get_xmlns_string(&namespaces),
        get_schemaloc_string(&namespaces)
    )
}
