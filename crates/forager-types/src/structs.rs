//! Static entity structs: items, gathering nodes, territories, aetherytes.
//!
//! These mirror the rows of the game's static data sheets after they have
//! been joined into a graph. They are built once at startup and never
//! mutated afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{ClientLanguage, GatheringType};
use crate::ids::{AetheryteId, ItemId, NodeId, TerritoryId};
use crate::uptime::UptimeWindow;

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// A 2-D map coordinate as shown on the in-game map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MapPosition {
    /// Horizontal map coordinate.
    pub x: f64,
    /// Vertical map coordinate.
    pub y: f64,
}

impl MapPosition {
    /// Create a position from its coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are exactly zero.
    ///
    /// Zero marks a node without a fixed point (roaming or instanced
    /// areas). Such a node is still valid; it only cannot be flagged.
    #[allow(clippy::float_cmp)]
    pub fn is_unset(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Straight-line distance to another position.
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Where the player currently stands, as reported by the game state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerLocation {
    /// Territory the player is in.
    pub territory: TerritoryId,
    /// Player position on that territory's map.
    pub position: MapPosition,
}

// ---------------------------------------------------------------------------
// Localized names
// ---------------------------------------------------------------------------

/// Display names keyed by client language.
///
/// A language with no entry, or with an empty string, is unresolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedNames(BTreeMap<ClientLanguage, String>);

impl LocalizedNames {
    /// Create an empty name table.
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert of one localized name.
    #[must_use]
    pub fn with(mut self, language: ClientLanguage, name: impl Into<String>) -> Self {
        self.0.insert(language, name.into());
        self
    }

    /// Name in the given language, if recorded and non-empty.
    pub fn get(&self, language: ClientLanguage) -> Option<&str> {
        self.0
            .get(&language)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    /// English name, falling back to any recorded name, then `""`.
    ///
    /// Only for logs and diagnostics; user-facing commands must resolve
    /// the language they need through [`LocalizedNames::get`].
    pub fn display(&self) -> &str {
        self.get(ClientLanguage::English)
            .or_else(|| self.0.values().map(String::as_str).find(|n| !n.is_empty()))
            .unwrap_or("")
    }

    /// Iterate over all recorded `(language, name)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (ClientLanguage, &str)> {
        self.0.iter().map(|(lang, name)| (*lang, name.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A gatherable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Item row id.
    pub id: ItemId,
    /// Display name per client language.
    pub names: LocalizedNames,
    /// Nodes the item can be gathered from. May be empty for items whose
    /// nodes were never mapped.
    #[serde(default)]
    pub nodes: Vec<NodeId>,
}

/// A gathering point in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node row id.
    pub id: NodeId,
    /// Place name of the node within its territory.
    #[serde(default)]
    pub place: String,
    /// Territory the node lies in.
    pub territory: TerritoryId,
    /// Map coordinates; `(0, 0)` when the node has no fixed point.
    #[serde(default)]
    pub position: MapPosition,
    /// Closest valid aetheryte, resolved when the world graph is built.
    #[serde(default)]
    pub aetheryte: Option<AetheryteId>,
    /// Gathering action the node is worked with.
    pub gathering_type: GatheringType,
    /// Recurring windows during which the node is up.
    #[serde(default)]
    pub uptime: UptimeWindow,
    /// Items obtainable at this node.
    #[serde(default)]
    pub items: Vec<ItemId>,
}

/// A territory (zone).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Territory {
    /// Territory row id.
    pub id: TerritoryId,
    /// Display name per client language.
    pub names: LocalizedNames,
    /// Aetherytes located in this territory.
    #[serde(default)]
    pub aetherytes: Vec<AetheryteId>,
}

/// A fast-travel anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aetheryte {
    /// Aetheryte row id.
    pub id: AetheryteId,
    /// Territory the aetheryte stands in.
    pub territory: TerritoryId,
    /// Display name per client language.
    pub names: LocalizedNames,
    /// Position on the territory map.
    pub position: MapPosition,
    /// Position on the world-wide aether stream map, comparable across
    /// territories.
    pub stream: MapPosition,
    /// Whether players can teleport to this aetheryte.
    #[serde(default = "default_true")]
    pub teleportable: bool,
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn zero_position_is_unset() {
        assert!(MapPosition::default().is_unset());
        assert!(!MapPosition::new(0.0, 12.5).is_unset());
    }

    #[test]
    fn distance_is_euclidean() {
        let a = MapPosition::new(1.0, 1.0);
        let b = MapPosition::new(4.0, 5.0);
        assert_eq!(a.distance(b), 5.0);
    }

    #[test]
    fn localized_names_skip_empty_entries() {
        let names = LocalizedNames::new()
            .with(ClientLanguage::English, "Limsa Lominsa")
            .with(ClientLanguage::German, "");
        assert_eq!(names.get(ClientLanguage::English), Some("Limsa Lominsa"));
        assert_eq!(names.get(ClientLanguage::German), None);
        assert_eq!(names.get(ClientLanguage::French), None);
        assert_eq!(names.display(), "Limsa Lominsa");
    }

    #[test]
    fn localized_names_json_keys_are_languages() {
        let names: LocalizedNames =
            serde_json::from_str(r#"{"english":"Copper Ore","french":"Minerai de cuivre"}"#)
                .unwrap();
        assert_eq!(names.get(ClientLanguage::French), Some("Minerai de cuivre"));
    }

    #[test]
    fn aetheryte_defaults_to_teleportable() {
        let json = r#"{
            "id": 8,
            "territory": 129,
            "names": {"english": "Limsa Lominsa Lower Decks"},
            "position": {"x": 9.5, "y": 11.8},
            "stream": {"x": 120.0, "y": 300.0}
        }"#;
        let aetheryte: Aetheryte = serde_json::from_str(json).unwrap();
        assert!(aetheryte.teleportable);
    }
}
