//! Graph capability shared by entities, lists and external entity types.

use std::ops::Deref;
use std::sync::Arc;

/// A node of an entity graph as seen by the namespace walk.
///
/// Implemented for every [`Entity`](crate::Entity) and
/// [`EntityList`](crate::EntityList); types from companion libraries
/// implement it directly to take part in namespace aggregation.
pub trait Node: Send + Sync {
    /// Namespace URIs declared by this node's type, root-most declaration first.
    fn declared_namespaces(&self) -> &'static [&'static str];

    /// Every node directly reachable from this one.
    fn namespace_children(&self) -> Vec<Child<'_>>;

    /// Diagnostic type name.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A child reached during the walk: borrowed from its parent, or held through
/// a shared pointer (e.g. an upgraded back-reference). The walk keeps shared
/// children alive until it ends.
pub enum Child<'a> {
    Borrowed(&'a dyn Node),
    Shared(Arc<dyn Node>),
}

impl<'a> Child<'a> {
    pub fn borrowed(node: &'a dyn Node) -> Self {
        Child::Borrowed(node)
    }

    pub fn shared<T: Node + 'static>(node: Arc<T>) -> Self {
        Child::Shared(node)
    }
}

impl<'a> Deref for Child<'a> {
    type Target = dyn Node + 'a;

    fn deref(&self) -> &Self::Target {
        match self {
            Child::Borrowed(node) => *node,
            Child::Shared(node) => node.as_ref(),
        }
    }
}

/// Identity of a node for cycle detection: its address plus its type, since
/// a struct and its first field may share an address.
pub(crate) fn node_key(node: &dyn Node) -> (usize, &'static str) {
    let address = node as *const dyn Node as *const () as usize;
    (address, node.type_name())
}
