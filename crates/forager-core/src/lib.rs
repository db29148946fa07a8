//! Eorzea clock, node selection, alarms, and the gather action pipeline
//! for the Forager gathering assistant.
//!
//! This crate turns a gather request ("copper ore", "the last alarm", "the
//! daily group") into a target node and then drives the three-stage
//! action pipeline (equip, teleport, flag) against the host game.
//!
//! # Modules
//!
//! - [`alarm`] -- Window-opening alarms and the last-alarm slot.
//! - [`clock`] -- Eorzea time derived from the Unix epoch.
//! - [`config`] -- Configuration loading from `forager-config.yaml` into
//!   strongly-typed structs.
//! - [`gatherer`] -- The session orchestrator ([`Gatherer`]).
//! - [`host`] -- [`CommandExecutor`], [`NotificationSink`] and
//!   [`GameState`] traits with in-memory implementations.
//! - [`language`] -- Mirror of the teleport collaborator's language.
//! - [`pipeline`] -- The equip/teleport/flag stage pipeline.
//! - [`selector`] -- Ranking an item's nodes by availability and distance.
//! - [`timed_group`] -- Named hour-of-day rotations.
//!
//! [`Gatherer`]: gatherer::Gatherer
//! [`CommandExecutor`]: host::CommandExecutor
//! [`NotificationSink`]: host::NotificationSink
//! [`GameState`]: host::GameState

pub mod alarm;
pub mod clock;
pub mod config;
pub mod gatherer;
pub mod host;
pub mod language;
pub mod pipeline;
pub mod selector;
pub mod timed_group;
