use std::sync::Arc;

use mcjs_events::{EventTaxonomy, EventTypeDescriptor};
use tracing::debug;

use crate::error::ResolveError;

/// Short namespace prefixes scripts may use, in probe order
pub const NAMESPACE_TABLE: [(&str, &str); 10] = [
    ("player", "org.bukkit.event.player"),
    ("block", "org.bukkit.event.block"),
    ("entity", "org.bukkit.event.entity"),
    ("inventory", "org.bukkit.event.inventory"),
    ("server", "org.bukkit.event.server"),
    ("world", "org.bukkit.event.world"),
    ("vehicle", "org.bukkit.event.vehicle"),
    ("hanging", "org.bukkit.event.hanging"),
    ("enchantment", "org.bukkit.event.enchantment"),
    ("painting", "org.bukkit.event.painting"),
];

/// Map a short prefix (case-insensitive) to its full namespace
pub fn namespace_for_prefix(prefix: &str) -> Option<&'static str> {
    NAMESPACE_TABLE
        .iter()
        .find(|(short, _)| short.eq_ignore_ascii_case(prefix))
        .map(|(_, namespace)| *namespace)
}

/// Resolves symbolic event names to host types
///
/// Accepted forms:
/// - `PlayerJoinEvent`: probed through every namespace in [`NAMESPACE_TABLE`]
/// - `player.PlayerJoinEvent`: looked up in the prefix's namespace only
/// - `custom.PlayerJoinEvent`: unknown prefixes are dropped and the simple name probed
/// - `org.bukkit.event.player.PlayerJoinEvent`: looked up directly
#[derive(Clone)]
pub struct EventResolver {
    taxonomy: Arc<dyn EventTaxonomy>,
}

impl EventResolver {
    pub fn new(taxonomy: Arc<dyn EventTaxonomy>) -> Self {
        Self { taxonomy }
    }

    pub fn taxonomy(&self) -> &Arc<dyn EventTaxonomy> {
        &self.taxonomy
    }

    pub fn resolve(&self, name: &str) -> Result<EventTypeDescriptor, ResolveError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ResolveError::NotFound(name.to_string()));
        }

        let root = self.taxonomy.root();
        if name == root.name() || name == root.qualified_name() {
            return Err(ResolveError::InvalidType(name.to_string()));
        }

        let simple_name = match name.split_once('.') {
            None => name,
            Some((prefix, rest)) => {
                if let Some(found) = self.taxonomy.lookup(name) {
                    return self.validate(name, found);
                }
                if let Some(namespace) = namespace_for_prefix(prefix) {
                    // A known prefix pins the namespace
                    return self
                        .taxonomy
                        .lookup(&format!("{}.{}", namespace, rest))
                        .ok_or_else(|| ResolveError::NotFound(name.to_string()))
                        .and_then(|found| self.validate(name, found));
                }
                debug!(target: "bridge", "Unknown prefix in '{}', probing namespaces", name);
                name.rsplit('.').next().unwrap_or(name)
            }
        };

        self.probe(simple_name)
            .ok_or_else(|| ResolveError::NotFound(name.to_string()))
    }

    /// First type named `simple_name` in probe order that is a proper subtype of the root
    fn probe(&self, simple_name: &str) -> Option<EventTypeDescriptor> {
        let root = self.taxonomy.root();
        NAMESPACE_TABLE.iter().find_map(|(_, namespace)| {
            self.taxonomy
                .lookup(&format!("{}.{}", namespace, simple_name))
                .filter(|found| !found.is_root() && root.includes(found))
        })
    }

    fn validate(
        &self,
        name: &str,
        found: EventTypeDescriptor,
    ) -> Result<EventTypeDescriptor, ResolveError> {
        if found.is_root() || !self.taxonomy.root().includes(&found) {
            return Err(ResolveError::InvalidType(name.to_string()));
        }
        Ok(found)
    }
}
