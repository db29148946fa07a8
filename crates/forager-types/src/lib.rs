//! Shared type definitions for the Forager gathering assistant.
//!
//! This crate is the single source of truth for the static entities every
//! other crate in the workspace works with.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe wrappers for item, node, territory and aetheryte ids
//! - [`enums`] -- Client languages, gathering types and professions
//! - [`structs`] -- Items, nodes, territories, aetherytes, map positions
//! - [`uptime`] -- Recurring availability windows on the in-world clock

pub mod enums;
pub mod ids;
pub mod structs;
pub mod uptime;

// Re-export all public types at crate root for convenience.
pub use enums::{ClientLanguage, GatheringType, Job};
pub use ids::{AetheryteId, ItemId, NodeId, TerritoryId};
pub use structs::{
    Aetheryte, Item, LocalizedNames, MapPosition, Node, PlayerLocation, Territory,
};
pub use uptime::{HOURS_PER_DAY, HourRange, UptimeError, UptimeWindow};
