//! Error types for the `forager-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type alias.

use forager_types::{AetheryteId, ItemId, NodeId, TerritoryId, UptimeError};

/// Errors that can occur while building or loading the world graph.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A territory was not found in the world graph.
    #[error("territory not found: {0}")]
    TerritoryNotFound(TerritoryId),

    /// A node was not found in the world graph.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// An item was not found in the world graph.
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    /// An aetheryte was not found in the world graph.
    #[error("aetheryte not found: {0}")]
    AetheryteNotFound(AetheryteId),

    /// A node names an aetheryte that stands in a different territory.
    #[error("node {node} names aetheryte {aetheryte} outside its territory")]
    AetheryteOutsideTerritory {
        /// The node carrying the explicit aetheryte.
        node: NodeId,
        /// The mismatched aetheryte.
        aetheryte: AetheryteId,
    },

    /// A duplicate item id was inserted.
    #[error("duplicate item id: {0}")]
    DuplicateItem(ItemId),

    /// A duplicate node id was inserted.
    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),

    /// A duplicate territory id was inserted.
    #[error("duplicate territory id: {0}")]
    DuplicateTerritory(TerritoryId),

    /// A duplicate aetheryte id was inserted.
    #[error("duplicate aetheryte id: {0}")]
    DuplicateAetheryte(AetheryteId),

    /// An uptime window in hard-coded data is malformed.
    #[error("invalid uptime window: {source}")]
    Uptime {
        /// The underlying window error.
        #[from]
        source: UptimeError,
    },

    /// Failed to read a world-data file from disk.
    #[error("failed to read world data: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse world-data JSON.
    #[error("failed to parse world data: {source}")]
    Parse {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
