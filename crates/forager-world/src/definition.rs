//! Loading the static world snapshot from JSON.
//!
//! The game's data sheets are exported once into a single JSON document
//! mirroring [`WorldDefinition`]. Loading it yields an immutable
//! [`WorldMap`] plus the timed-group definitions that the scheduler in
//! `forager-core` turns into rotations.

use std::path::Path;

use forager_types::{Aetheryte, Item, Node, NodeId, Territory, UptimeWindow};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;
use crate::world_map::WorldMap;

/// One entry of a timed group as written in the world data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntryDefinition {
    /// Window during which this entry is the one to gather.
    pub window: UptimeWindow,
    /// Node to gather at during the window.
    pub node: NodeId,
    /// Free-form note shown alongside the node.
    #[serde(default)]
    pub description: String,
}

/// A named, ordered rotation of timed entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDefinition {
    /// Name the user asks for the group by.
    pub name: String,
    /// Entries in author-declared priority order.
    #[serde(default)]
    pub entries: Vec<GroupEntryDefinition>,
}

/// The full static data snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldDefinition {
    /// All territories.
    #[serde(default)]
    pub territories: Vec<Territory>,
    /// All aetherytes.
    #[serde(default)]
    pub aetherytes: Vec<Aetheryte>,
    /// All gathering nodes.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// All gatherable items.
    #[serde(default)]
    pub items: Vec<Item>,
    /// Timed group rotations.
    #[serde(default)]
    pub groups: Vec<GroupDefinition>,
}

impl WorldDefinition {
    /// Read a world definition from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Io`] if the file cannot be read, or
    /// [`WorldError::Parse`] if it is not a valid world document.
    pub fn from_file(path: &Path) -> Result<Self, WorldError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a world definition from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Parse`] on malformed JSON, including invalid
    /// uptime windows.
    pub fn parse(json: &str) -> Result<Self, WorldError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the world graph, returning it with the group definitions.
    ///
    /// Territories are inserted with their aetheryte lists cleared; the
    /// lists are rebuilt from the aetherytes' own territory references.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError`] on any referential inconsistency.
    pub fn build(self) -> Result<(WorldMap, Vec<GroupDefinition>), WorldError> {
        let mut map = WorldMap::new();

        for mut territory in self.territories {
            territory.aetherytes.clear();
            map.add_territory(territory)?;
        }
        for aetheryte in self.aetherytes {
            map.add_aetheryte(aetheryte)?;
        }
        for node in self.nodes {
            map.add_node(node)?;
        }
        for item in self.items {
            map.add_item(item)?;
        }

        for group in &self.groups {
            if let Some(entry) = group.entries.iter().find(|e| map.node(e.node).is_none()) {
                return Err(WorldError::NodeNotFound(entry.node));
            }
        }

        tracing::info!(
            items = map.item_count(),
            nodes = map.node_count(),
            groups = self.groups.len(),
            "world data loaded"
        );

        Ok((map, self.groups))
    }
}
