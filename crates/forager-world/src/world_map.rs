//! World graph: territories owning aetherytes and gathering nodes, and the
//! items those nodes yield.
//!
//! The [`WorldMap`] is the spatial backbone of node selection. It is filled
//! once from static data (see [`crate::definition`]) and then shared
//! read-only, typically behind an `Arc`, by every gather request.
//!
//! # Build order
//!
//! Territories first, then aetherytes, then nodes, then items. A node added
//! without an explicit aetheryte has its closest one resolved on insertion,
//! so the territory's aetherytes must already be present. Adding an item
//! back-fills the item id into each of its nodes.

use std::collections::BTreeMap;

use forager_types::{
    Aetheryte, AetheryteId, Item, ItemId, Node, NodeId, PlayerLocation, Territory, TerritoryId,
};

use crate::error::WorldError;

/// The static world graph.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct WorldMap {
    /// All items indexed by id.
    items: BTreeMap<ItemId, Item>,
    /// All gathering nodes indexed by id.
    nodes: BTreeMap<NodeId, Node>,
    /// All territories indexed by id.
    territories: BTreeMap<TerritoryId, Territory>,
    /// All aetherytes indexed by id.
    aetherytes: BTreeMap<AetheryteId, Aetheryte>,
}

impl WorldMap {
    /// Create an empty world map.
    pub const fn new() -> Self {
        Self {
            items: BTreeMap::new(),
            nodes: BTreeMap::new(),
            territories: BTreeMap::new(),
            aetherytes: BTreeMap::new(),
        }
    }

    // -------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------

    /// Add a territory.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateTerritory`] if the id already exists.
    pub fn add_territory(&mut self, territory: Territory) -> Result<(), WorldError> {
        let id = territory.id;
        if self.territories.contains_key(&id) {
            return Err(WorldError::DuplicateTerritory(id));
        }
        self.territories.insert(id, territory);
        Ok(())
    }

    /// Add an aetheryte and register it with its territory.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::TerritoryNotFound`] if the owning territory is
    /// missing, or [`WorldError::DuplicateAetheryte`] if the id exists.
    pub fn add_aetheryte(&mut self, aetheryte: Aetheryte) -> Result<(), WorldError> {
        let id = aetheryte.id;
        if self.aetherytes.contains_key(&id) {
            return Err(WorldError::DuplicateAetheryte(id));
        }
        let territory = self
            .territories
            .get_mut(&aetheryte.territory)
            .ok_or(WorldError::TerritoryNotFound(aetheryte.territory))?;
        if !territory.aetherytes.contains(&id) {
            territory.aetherytes.push(id);
        }
        self.aetherytes.insert(id, aetheryte);
        Ok(())
    }

    /// Add a gathering node, resolving its closest aetheryte when none is
    /// given explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::TerritoryNotFound`], [`WorldError::DuplicateNode`],
    /// [`WorldError::AetheryteNotFound`] or
    /// [`WorldError::AetheryteOutsideTerritory`] for inconsistent input.
    pub fn add_node(&mut self, mut node: Node) -> Result<(), WorldError> {
        let id = node.id;
        if self.nodes.contains_key(&id) {
            return Err(WorldError::DuplicateNode(id));
        }
        if !self.territories.contains_key(&node.territory) {
            return Err(WorldError::TerritoryNotFound(node.territory));
        }

        match node.aetheryte {
            Some(aetheryte_id) => {
                let aetheryte = self
                    .aetherytes
                    .get(&aetheryte_id)
                    .ok_or(WorldError::AetheryteNotFound(aetheryte_id))?;
                if aetheryte.territory != node.territory {
                    return Err(WorldError::AetheryteOutsideTerritory {
                        node: id,
                        aetheryte: aetheryte_id,
                    });
                }
            }
            None => {
                node.aetheryte = self.closest_aetheryte(&node).map(|a| a.id);
                if node.aetheryte.is_none() {
                    tracing::debug!(node = %id, territory = %node.territory, "node has no reachable aetheryte");
                }
            }
        }

        self.nodes.insert(id, node);
        Ok(())
    }

    /// Add an item and link it into each of its nodes.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateItem`] if the id exists, or
    /// [`WorldError::NodeNotFound`] if the item names an unknown node.
    pub fn add_item(&mut self, item: Item) -> Result<(), WorldError> {
        let id = item.id;
        if self.items.contains_key(&id) {
            return Err(WorldError::DuplicateItem(id));
        }
        if let Some(missing) = item.nodes.iter().find(|n| !self.nodes.contains_key(n)) {
            return Err(WorldError::NodeNotFound(*missing));
        }
        for node_id in &item.nodes {
            if let Some(node) = self.nodes.get_mut(node_id)
                && !node.items.contains(&id)
            {
                node.items.push(id);
            }
        }
        self.items.insert(id, item);
        Ok(())
    }

    // -------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------

    /// Get an item by id.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a territory by id.
    pub fn territory(&self, id: TerritoryId) -> Option<&Territory> {
        self.territories.get(&id)
    }

    /// Get an aetheryte by id.
    pub fn aetheryte(&self, id: AetheryteId) -> Option<&Aetheryte> {
        self.aetherytes.get(&id)
    }

    /// Iterate over all items in id order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Iterate over all nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Iterate over all territories in id order.
    pub fn territories(&self) -> impl Iterator<Item = &Territory> {
        self.territories.values()
    }

    /// Iterate over all aetherytes in id order.
    pub fn aetherytes(&self) -> impl Iterator<Item = &Aetheryte> {
        self.aetherytes.values()
    }

    /// Number of items in the map.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Number of nodes in the map.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes of an item, in the item's declared order.
    ///
    /// Node ids that do not resolve are skipped.
    pub fn nodes_for_item<'a>(&'a self, item: &'a Item) -> impl Iterator<Item = &'a Node> + 'a {
        item.nodes.iter().filter_map(|id| self.nodes.get(id))
    }

    // -------------------------------------------------------------------
    // Spatial queries
    // -------------------------------------------------------------------

    /// Nearest teleportable aetheryte to `node` within its territory.
    ///
    /// Returns `None` when the node has no fixed position, or when the
    /// territory is unknown or has no teleportable aetherytes. Ties keep
    /// the aetheryte listed first by the territory.
    pub fn closest_aetheryte(&self, node: &Node) -> Option<&Aetheryte> {
        if node.position.is_unset() {
            return None;
        }
        self.closest_in_territory(node.territory, node.position)
    }

    /// The aetheryte resolved for `node` when the graph was built.
    pub fn node_aetheryte(&self, node: &Node) -> Option<&Aetheryte> {
        node.aetheryte.and_then(|id| self.aetherytes.get(&id))
    }

    /// The aetheryte the player would be measured from: the nearest
    /// teleportable one in the player's territory.
    pub fn player_anchor(&self, player: &PlayerLocation) -> Option<&Aetheryte> {
        self.closest_in_territory(player.territory, player.position)
    }

    /// Distance from the player to the aetheryte serving `node`, measured
    /// on the aether stream map.
    ///
    /// Returns `None` when the node has no aetheryte. When the player's
    /// own anchor is unknown (no location reported, or a territory without
    /// aetherytes) every reachable node is at distance `0.0`.
    pub fn anchor_distance(&self, player: Option<&PlayerLocation>, node: &Node) -> Option<f64> {
        let target = self.node_aetheryte(node)?;
        let origin = player.and_then(|p| self.player_anchor(p));
        Some(origin.map_or(0.0, |o| o.stream.distance(target.stream)))
    }

    fn closest_in_territory(
        &self,
        territory: TerritoryId,
        position: forager_types::MapPosition,
    ) -> Option<&Aetheryte> {
        self.territories
            .get(&territory)?
            .aetherytes
            .iter()
            .filter_map(|id| self.aetherytes.get(id))
            .filter(|a| a.teleportable)
            .map(|a| (a, a.position.distance(position)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(a, _)| a)
    }

    // -------------------------------------------------------------------
    // Name search
    // -------------------------------------------------------------------

    /// Find an item by name in any client language, ignoring case.
    ///
    /// An exact match wins. Otherwise the item whose name contains the
    /// query with the fewest extra characters is returned (lowest id on
    /// ties). Returns `None` for blank input or when nothing matches.
    pub fn find_item_by_name(&self, text: &str) -> Option<&Item> {
        let query = text.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        let mut best: Option<(&Item, usize)> = None;
        for item in self.items.values() {
            for (_, name) in item.names.iter() {
                let name = name.to_lowercase();
                if name == query {
                    return Some(item);
                }
                if name.contains(&query) {
                    let extra = name.len().saturating_sub(query.len());
                    if best.is_none_or(|(_, current)| extra < current) {
                        best = Some((item, extra));
                    }
                }
            }
        }
        best.map(|(item, _)| item)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use forager_types::{
        ClientLanguage, GatheringType, LocalizedNames, MapPosition, UptimeWindow,
    };

    use super::*;

    fn names(en: &str) -> LocalizedNames {
        LocalizedNames::new().with(ClientLanguage::English, en)
    }

    fn territory(id: u32, name: &str) -> Territory {
        Territory {
            id: TerritoryId(id),
            names: names(name),
            aetherytes: Vec::new(),
        }
    }

    fn aetheryte(id: u32, territory: u32, pos: (f64, f64), stream: (f64, f64)) -> Aetheryte {
        Aetheryte {
            id: AetheryteId(id),
            territory: TerritoryId(territory),
            names: names(&format!("Aetheryte {id}")),
            position: MapPosition::new(pos.0, pos.1),
            stream: MapPosition::new(stream.0, stream.1),
            teleportable: true,
        }
    }

    fn node(id: u32, territory: u32, pos: (f64, f64)) -> Node {
        Node {
            id: NodeId(id),
            place: String::new(),
            territory: TerritoryId(territory),
            position: MapPosition::new(pos.0, pos.1),
            aetheryte: None,
            gathering_type: GatheringType::Mining,
            uptime: UptimeWindow::always(),
            items: Vec::new(),
        }
    }

    fn make_world() -> WorldMap {
        let mut map = WorldMap::new();
        map.add_territory(territory(1, "Coast")).unwrap();
        map.add_territory(territory(2, "Desert")).unwrap();
        map.add_territory(territory(3, "Rift")).unwrap();
        map.add_aetheryte(aetheryte(10, 1, (5.0, 5.0), (100.0, 100.0))).unwrap();
        map.add_aetheryte(aetheryte(11, 1, (30.0, 30.0), (130.0, 130.0))).unwrap();
        map.add_aetheryte(aetheryte(20, 2, (10.0, 10.0), (400.0, 100.0))).unwrap();
        map.add_node(node(100, 1, (28.0, 27.0))).unwrap();
        map.add_node(node(101, 2, (11.0, 9.0))).unwrap();
        map.add_node(node(102, 3, (0.0, 0.0))).unwrap();
        map
    }

    #[test]
    fn aetherytes_register_with_territory() {
        let map = make_world();
        let coast = map.territory(TerritoryId(1)).unwrap();
        assert_eq!(coast.aetherytes, vec![AetheryteId(10), AetheryteId(11)]);
    }

    #[test]
    fn node_resolves_closest_aetheryte() {
        let map = make_world();
        assert_eq!(map.node(NodeId(100)).unwrap().aetheryte, Some(AetheryteId(11)));
        assert_eq!(map.node(NodeId(101)).unwrap().aetheryte, Some(AetheryteId(20)));
    }

    #[test]
    fn territory_without_aetherytes_yields_none() {
        let map = make_world();
        let rift_node = map.node(NodeId(102)).unwrap();
        assert!(map.closest_aetheryte(rift_node).is_none());
        assert!(rift_node.aetheryte.is_none());
    }

    #[test]
    fn unplaced_node_gets_no_aetheryte() {
        let mut map = make_world();
        map.add_node(node(103, 1, (0.0, 0.0))).unwrap();
        let unplaced = map.node(NodeId(103)).unwrap();
        assert!(unplaced.aetheryte.is_none());
        assert!(map.closest_aetheryte(unplaced).is_none());
        assert!(map.anchor_distance(None, unplaced).is_none());
    }

    #[test]
    fn non_teleportable_aetherytes_are_skipped() {
        let mut map = WorldMap::new();
        map.add_territory(territory(1, "Coast")).unwrap();
        let mut shard = aetheryte(10, 1, (28.0, 28.0), (0.0, 0.0));
        shard.teleportable = false;
        map.add_aetheryte(shard).unwrap();
        map.add_aetheryte(aetheryte(11, 1, (5.0, 5.0), (0.0, 0.0))).unwrap();
        map.add_node(node(100, 1, (27.0, 27.0))).unwrap();
        assert_eq!(map.node(NodeId(100)).unwrap().aetheryte, Some(AetheryteId(11)));
    }

    #[test]
    fn explicit_aetheryte_must_share_territory() {
        let mut map = make_world();
        let mut n = node(103, 1, (1.0, 1.0));
        n.aetheryte = Some(AetheryteId(20));
        assert!(matches!(
            map.add_node(n),
            Err(WorldError::AetheryteOutsideTerritory { .. })
        ));
    }

    #[test]
    fn node_requires_known_territory() {
        let mut map = make_world();
        assert!(matches!(
            map.add_node(node(104, 99, (1.0, 1.0))),
            Err(WorldError::TerritoryNotFound(TerritoryId(99)))
        ));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut map = make_world();
        assert!(matches!(
            map.add_territory(territory(1, "Again")),
            Err(WorldError::DuplicateTerritory(_))
        ));
        assert!(matches!(
            map.add_node(node(100, 1, (1.0, 1.0))),
            Err(WorldError::DuplicateNode(_))
        ));
    }

    #[test]
    fn add_item_links_nodes() {
        let mut map = make_world();
        let item = Item {
            id: ItemId(5106),
            names: names("Copper Ore"),
            nodes: vec![NodeId(100), NodeId(101)],
        };
        map.add_item(item).unwrap();
        assert_eq!(map.node(NodeId(100)).unwrap().items, vec![ItemId(5106)]);
        let item = map.item(ItemId(5106)).unwrap();
        assert_eq!(map.nodes_for_item(item).count(), 2);
    }

    #[test]
    fn add_item_rejects_unknown_node() {
        let mut map = make_world();
        let item = Item {
            id: ItemId(1),
            names: names("Ghost"),
            nodes: vec![NodeId(999)],
        };
        assert!(matches!(map.add_item(item), Err(WorldError::NodeNotFound(NodeId(999)))));
    }

    #[test]
    fn anchor_distance_uses_stream_map() {
        let map = make_world();
        let player = PlayerLocation {
            territory: TerritoryId(1),
            position: MapPosition::new(6.0, 6.0),
        };
        let desert_node = map.node(NodeId(101)).unwrap();
        // Player anchor is aetheryte 10 (100,100); target is 20 (400,100).
        assert_eq!(map.anchor_distance(Some(&player), desert_node), Some(300.0));

        let rift_node = map.node(NodeId(102)).unwrap();
        assert_eq!(map.anchor_distance(Some(&player), rift_node), None);
    }

    #[test]
    fn anchor_distance_without_player_is_zero() {
        let map = make_world();
        let desert_node = map.node(NodeId(101)).unwrap();
        assert_eq!(map.anchor_distance(None, desert_node), Some(0.0));
    }

    #[test]
    fn find_item_by_name_exact_and_partial() {
        let mut map = make_world();
        for (id, name) in [(1, "Copper Ore"), (2, "Iron Ore"), (3, "Copper Sand")] {
            map.add_item(Item {
                id: ItemId(id),
                names: names(name),
                nodes: Vec::new(),
            })
            .unwrap();
        }
        assert_eq!(map.find_item_by_name("copper ore").unwrap().id, ItemId(1));
        assert_eq!(map.find_item_by_name("  IRON ORE ").unwrap().id, ItemId(2));
        assert_eq!(map.find_item_by_name("sand").unwrap().id, ItemId(3));
        assert!(map.find_item_by_name("mythril").is_none());
        assert!(map.find_item_by_name("   ").is_none());
    }

    #[test]
    fn find_item_matches_other_languages() {
        let mut map = make_world();
        map.add_item(Item {
            id: ItemId(1),
            names: names("Copper Ore").with(ClientLanguage::German, "Kupfererz"),
            nodes: Vec::new(),
        })
        .unwrap();
        assert_eq!(map.find_item_by_name("kupfererz").unwrap().id, ItemId(1));
    }
}
