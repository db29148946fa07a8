//! Pipe-delimited diagnostic dumps of the world graph.
//!
//! Each dump renders one line per entity for offline inspection. The
//! formats are fixed:
//!
//! ```text
//! items:        id|name|node,node,...
//! nodes:        id|gathering type|territory|place|x|y|aetheryte|uptime|item,item,...
//! territories:  id|name|aetheryte,aetheryte,...
//! aetherytes:   id|name|territory|x|y|stream x|stream y|teleportable
//! ```
//!
//! Names are the English display names. Missing references render as `-`.

use std::fmt::Display;

use crate::world_map::WorldMap;

/// Which entity table to dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpKind {
    /// All items.
    Items,
    /// All gathering nodes.
    Nodes,
    /// All territories.
    Territories,
    /// All aetherytes.
    Aetherytes,
}

impl DumpKind {
    /// Parse a dump kind from user input (`items`, `nodes`, ...).
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "items" | "item" => Some(Self::Items),
            "nodes" | "node" => Some(Self::Nodes),
            "territories" | "territory" => Some(Self::Territories),
            "aetherytes" | "aetheryte" => Some(Self::Aetherytes),
            _ => None,
        }
    }
}

fn join_ids<T: Display>(ids: &[T]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

impl WorldMap {
    /// Render one dump table.
    pub fn dump(&self, kind: DumpKind) -> Vec<String> {
        match kind {
            DumpKind::Items => self.dump_items(),
            DumpKind::Nodes => self.dump_nodes(),
            DumpKind::Territories => self.dump_territories(),
            DumpKind::Aetherytes => self.dump_aetherytes(),
        }
    }

    /// One line per item.
    pub fn dump_items(&self) -> Vec<String> {
        self.items()
            .map(|item| format!("{}|{}|{}", item.id, item.names.display(), join_ids(&item.nodes)))
            .collect()
    }

    /// One line per node.
    pub fn dump_nodes(&self) -> Vec<String> {
        self.nodes()
            .map(|node| {
                let territory = self
                    .territory(node.territory)
                    .map_or("-", |t| t.names.display());
                let aetheryte = self.node_aetheryte(node).map_or("-", |a| a.names.display());
                format!(
                    "{}|{}|{}|{}|{:.1}|{:.1}|{}|{}|{}",
                    node.id,
                    node.gathering_type.label(),
                    territory,
                    node.place,
                    node.position.x,
                    node.position.y,
                    aetheryte,
                    node.uptime.printable_hours(),
                    join_ids(&node.items),
                )
            })
            .collect()
    }

    /// One line per territory.
    pub fn dump_territories(&self) -> Vec<String> {
        self.territories()
            .map(|t| format!("{}|{}|{}", t.id, t.names.display(), join_ids(&t.aetherytes)))
            .collect()
    }

    /// One line per aetheryte.
    pub fn dump_aetherytes(&self) -> Vec<String> {
        self.aetherytes()
            .map(|a| {
                let territory = self
                    .territory(a.territory)
                    .map_or("-", |t| t.names.display());
                format!(
                    "{}|{}|{}|{:.1}|{:.1}|{:.1}|{:.1}|{}",
                    a.id,
                    a.names.display(),
                    territory,
                    a.position.x,
                    a.position.y,
                    a.stream.x,
                    a.stream.y,
                    a.teleportable,
                )
            })
            .collect()
    }
}
