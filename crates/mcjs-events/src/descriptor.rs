use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// What a type node represents in the host taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// The abstract root every event derives from
    Root,
    /// Intermediate grouping type without its own listener chain (e.g. PlayerEvent)
    Category,
    /// A type the host keeps a listener chain for
    Listenable,
}

#[derive(Debug)]
struct TypeNode {
    namespace: String,
    name: String,
    qualified: String,
    kind: TypeKind,
    parent: Option<EventTypeDescriptor>,
}

/// Identifies one event type in the host's type system
///
/// Descriptors are cheap to clone and compare by qualified name, so they can be
/// used as map keys without holding any live host handle.
#[derive(Clone)]
pub struct EventTypeDescriptor(Arc<TypeNode>);

impl EventTypeDescriptor {
    /// Create the root descriptor of a taxonomy
    pub fn root(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::build(namespace.into(), name.into(), TypeKind::Root, None)
    }

    /// Create a descriptor deriving from `parent`
    pub fn derived(
        namespace: impl Into<String>,
        name: impl Into<String>,
        kind: TypeKind,
        parent: &EventTypeDescriptor,
    ) -> Self {
        Self::build(namespace.into(), name.into(), kind, Some(parent.clone()))
    }

    fn build(
        namespace: String,
        name: String,
        kind: TypeKind,
        parent: Option<EventTypeDescriptor>,
    ) -> Self {
        let qualified = if namespace.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", namespace, name)
        };
        Self(Arc::new(TypeNode {
            namespace,
            name,
            qualified,
            kind,
            parent,
        }))
    }

    /// Simple type name, e.g. `PlayerJoinEvent`
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Namespace the type lives in, e.g. `org.bukkit.event.player`
    pub fn namespace(&self) -> &str {
        &self.0.namespace
    }

    /// Namespace plus simple name
    pub fn qualified_name(&self) -> &str {
        &self.0.qualified
    }

    pub fn kind(&self) -> TypeKind {
        self.0.kind
    }

    pub fn parent(&self) -> Option<&EventTypeDescriptor> {
        self.0.parent.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.0.kind == TypeKind::Root
    }

    /// Whether the host keeps per-type registration metadata for this type
    pub fn is_listenable(&self) -> bool {
        self.0.kind == TypeKind::Listenable
    }

    /// Iterate over this type followed by all of its ancestors, nearest first
    pub fn lineage(&self) -> Lineage<'_> {
        Lineage { next: Some(self) }
    }

    /// Whether every instance of `other` is also an instance of `self`
    ///
    /// True when `other` is `self` or derives from it.
    pub fn includes(&self, other: &EventTypeDescriptor) -> bool {
        other.lineage().any(|ancestor| ancestor == self)
    }
}

/// Iterator over a descriptor and its ancestors
pub struct Lineage<'a> {
    next: Option<&'a EventTypeDescriptor>,
}

impl<'a> Iterator for Lineage<'a> {
    type Item = &'a EventTypeDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}

impl PartialEq for EventTypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.qualified == other.0.qualified
    }
}

impl Eq for EventTypeDescriptor {}

impl Hash for EventTypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.qualified.hash(state);
    }
}

impl fmt::Debug for EventTypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTypeDescriptor")
            .field("type", &self.0.qualified)
            .field("kind", &self.0.kind)
            .finish()
    }
}

impl fmt::Display for EventTypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.qualified)
    }
}
