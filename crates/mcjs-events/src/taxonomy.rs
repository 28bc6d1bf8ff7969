use std::collections::HashMap;

use crate::descriptor::{EventTypeDescriptor, TypeKind};

/// Root namespace of the standard host taxonomy
pub const ROOT_NAMESPACE: &str = "org.bukkit.event";

/// Namespaced type lookup provided by the host
///
/// This is the reflection-equivalent the resolver relies on: the taxonomy is
/// large and versioned, so it can only be probed by name, never enumerated.
pub trait EventTaxonomy: Send + Sync {
    /// The abstract root every event type derives from
    fn root(&self) -> EventTypeDescriptor;

    /// Find a type by its fully qualified name (`namespace.TypeName`)
    fn lookup(&self, qualified_name: &str) -> Option<EventTypeDescriptor>;
}

/// In-memory taxonomy built up front
///
/// Used by the local host and by tests; a live host would answer lookups from
/// its own type system instead.
#[derive(Debug, Clone)]
pub struct StaticTaxonomy {
    root: EventTypeDescriptor,
    types: HashMap<String, EventTypeDescriptor>,
}

impl StaticTaxonomy {
    /// Create a taxonomy containing only its root type
    pub fn new(root_namespace: &str, root_name: &str) -> Self {
        let root = EventTypeDescriptor::root(root_namespace, root_name);
        let mut types = HashMap::new();
        types.insert(root.qualified_name().to_string(), root.clone());
        Self { root, types }
    }

    /// Define a grouping type that has no listener chain of its own
    pub fn category(
        &mut self,
        namespace: &str,
        name: &str,
        parent: &EventTypeDescriptor,
    ) -> EventTypeDescriptor {
        self.define(namespace, name, TypeKind::Category, parent)
    }

    /// Define a type the host keeps a listener chain for
    pub fn listenable(
        &mut self,
        namespace: &str,
        name: &str,
        parent: &EventTypeDescriptor,
    ) -> EventTypeDescriptor {
        self.define(namespace, name, TypeKind::Listenable, parent)
    }

    fn define(
        &mut self,
        namespace: &str,
        name: &str,
        kind: TypeKind,
        parent: &EventTypeDescriptor,
    ) -> EventTypeDescriptor {
        let descriptor = EventTypeDescriptor::derived(namespace, name, kind, parent);
        self.types
            .insert(descriptor.qualified_name().to_string(), descriptor.clone());
        descriptor
    }

    /// Convenience lookup by namespace and simple name
    pub fn get(&self, namespace: &str, name: &str) -> Option<EventTypeDescriptor> {
        self.types.get(&format!("{}.{}", namespace, name)).cloned()
    }

    /// Number of known types, root included
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The standard server event catalogue
    pub fn standard() -> Self {
        let mut tax = Self::new(ROOT_NAMESPACE, "Event");
        let root = tax.root.clone();

        let player_ns = "org.bukkit.event.player";
        let player = tax.category(player_ns, "PlayerEvent", &root);
        tax.listenable(player_ns, "PlayerJoinEvent", &player);
        tax.listenable(player_ns, "PlayerQuitEvent", &player);
        tax.listenable(player_ns, "PlayerKickEvent", &player);
        tax.listenable(player_ns, "AsyncPlayerChatEvent", &player);
        tax.listenable(player_ns, "PlayerInteractEvent", &player);
        tax.listenable(player_ns, "PlayerRespawnEvent", &player);
        let moved = tax.listenable(player_ns, "PlayerMoveEvent", &player);
        tax.listenable(player_ns, "PlayerTeleportEvent", &moved);

        let block_ns = "org.bukkit.event.block";
        let block = tax.category(block_ns, "BlockEvent", &root);
        let block_exp = tax.listenable(block_ns, "BlockExpEvent", &block);
        tax.listenable(block_ns, "BlockBreakEvent", &block_exp);
        tax.listenable(block_ns, "BlockPlaceEvent", &block);
        tax.listenable(block_ns, "BlockBurnEvent", &block);
        tax.listenable(block_ns, "SignChangeEvent", &block);

        let entity_ns = "org.bukkit.event.entity";
        let entity = tax.category(entity_ns, "EntityEvent", &root);
        let damage = tax.listenable(entity_ns, "EntityDamageEvent", &entity);
        tax.listenable(entity_ns, "EntityDamageByEntityEvent", &damage);
        let death = tax.listenable(entity_ns, "EntityDeathEvent", &entity);
        tax.listenable(entity_ns, "PlayerDeathEvent", &death);
        tax.listenable(entity_ns, "CreatureSpawnEvent", &entity);
        tax.listenable(entity_ns, "EntityExplodeEvent", &entity);

        let inventory_ns = "org.bukkit.event.inventory";
        let inventory = tax.category(inventory_ns, "InventoryEvent", &root);
        let interact = tax.category(inventory_ns, "InventoryInteractEvent", &inventory);
        let click = tax.listenable(inventory_ns, "InventoryClickEvent", &interact);
        tax.listenable(inventory_ns, "InventoryCreativeEvent", &click);
        tax.listenable(inventory_ns, "InventoryDragEvent", &interact);
        tax.listenable(inventory_ns, "InventoryOpenEvent", &inventory);
        tax.listenable(inventory_ns, "InventoryCloseEvent", &inventory);
        tax.listenable(inventory_ns, "CraftItemEvent", &click);

        let server_ns = "org.bukkit.event.server";
        let server = tax.category(server_ns, "ServerEvent", &root);
        tax.listenable(server_ns, "ServerLoadEvent", &server);
        tax.listenable(server_ns, "ServerCommandEvent", &server);
        tax.listenable(server_ns, "PluginEnableEvent", &server);

        let world_ns = "org.bukkit.event.world";
        let world = tax.category(world_ns, "WorldEvent", &root);
        tax.listenable(world_ns, "WorldLoadEvent", &world);
        tax.listenable(world_ns, "WorldSaveEvent", &world);
        let chunk = tax.category(world_ns, "ChunkEvent", &world);
        tax.listenable(world_ns, "ChunkLoadEvent", &chunk);

        let vehicle_ns = "org.bukkit.event.vehicle";
        let vehicle = tax.category(vehicle_ns, "VehicleEvent", &root);
        tax.listenable(vehicle_ns, "VehicleEnterEvent", &vehicle);
        tax.listenable(vehicle_ns, "VehicleExitEvent", &vehicle);

        let hanging_ns = "org.bukkit.event.hanging";
        let hanging = tax.category(hanging_ns, "HangingEvent", &root);
        let hanging_break = tax.listenable(hanging_ns, "HangingBreakEvent", &hanging);
        tax.listenable(hanging_ns, "HangingBreakByEntityEvent", &hanging_break);
        tax.listenable(hanging_ns, "HangingPlaceEvent", &hanging);

        let enchantment_ns = "org.bukkit.event.enchantment";
        tax.listenable(enchantment_ns, "EnchantItemEvent", &inventory);
        tax.listenable(enchantment_ns, "PrepareItemEnchantEvent", &inventory);

        let painting_ns = "org.bukkit.event.painting";
        let painting = tax.category(painting_ns, "PaintingEvent", &root);
        tax.listenable(painting_ns, "PaintingPlaceEvent", &painting);

        tax
    }
}

impl EventTaxonomy for StaticTaxonomy {
    fn root(&self) -> EventTypeDescriptor {
        self.root.clone()
    }

    fn lookup(&self, qualified_name: &str) -> Option<EventTypeDescriptor> {
        self.types.get(qualified_name).cloned()
    }
}
