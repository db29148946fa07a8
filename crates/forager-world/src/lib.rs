//! Static world graph and spatial queries for the Forager gathering assistant.
//!
//! This crate models the part of the game world node selection needs:
//! territories, their aetherytes (fast-travel anchors), gathering nodes, and
//! the items those nodes yield. The graph is built once from static data
//! and shared read-only afterwards.
//!
//! # Modules
//!
//! - [`definition`] -- JSON world snapshot and timed-group definitions.
//! - [`dump`] -- Pipe-delimited diagnostic dumps.
//! - [`error`] -- Error types for world-graph operations.
//! - [`sample_world`] -- Bundled sample world.
//! - [`world_map`] -- The world graph with closest-aetheryte resolution,
//!   player distance and item name search.

pub mod definition;
pub mod dump;
pub mod error;
pub mod sample_world;
pub mod world_map;

// Re-export primary types at crate root.
pub use definition::{GroupDefinition, GroupEntryDefinition, WorldDefinition};
pub use dump::DumpKind;
pub use error::WorldError;
pub use sample_world::create_sample_world;
pub use world_map::WorldMap;
