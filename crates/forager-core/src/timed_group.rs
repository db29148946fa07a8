//! Timed gathering groups: named rotations that map hours of the in-world
//! day to the node worth visiting at that hour.
//!
//! Entries are checked in declaration order and the first whose window
//! contains the hour wins, so overlapping windows resolve by priority.
//! An entry with an empty window covers the whole day and acts as a
//! fallback when placed last.

use std::collections::BTreeMap;

use forager_types::{NodeId, UptimeWindow};
use forager_world::GroupDefinition;

/// One slot of a timed group.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEntry {
    /// Hours during which this entry is active.
    pub window: UptimeWindow,
    /// Node to gather at while active.
    pub node: NodeId,
    /// Optional note shown to the user; empty when absent.
    pub description: String,
}

/// A named, ordered list of timed entries.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedGroup {
    name: String,
    entries: Vec<TimedEntry>,
}

impl TimedGroup {
    /// Create a group. Entry order is priority order.
    pub fn new(name: impl Into<String>, entries: Vec<TimedEntry>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    /// The group's name as declared.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entries in priority order.
    pub fn entries(&self) -> &[TimedEntry] {
        &self.entries
    }

    /// The first entry whose window contains `hour`, if any.
    pub fn current_node(&self, hour: f64) -> Option<&TimedEntry> {
        self.entries.iter().find(|entry| entry.window.is_up_at(hour))
    }
}

impl From<GroupDefinition> for TimedGroup {
    fn from(definition: GroupDefinition) -> Self {
        let entries = definition
            .entries
            .into_iter()
            .map(|entry| TimedEntry {
                window: entry.window,
                node: entry.node,
                description: entry.description,
            })
            .collect();
        Self::new(definition.name, entries)
    }
}

/// All known groups, looked up case-insensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimedGroups {
    groups: BTreeMap<String, TimedGroup>,
}

impl TimedGroups {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            groups: BTreeMap::new(),
        }
    }

    /// Build the registry from world-data definitions. A later group with
    /// the same (case-folded) name replaces an earlier one.
    pub fn from_definitions(definitions: impl IntoIterator<Item = GroupDefinition>) -> Self {
        let mut groups = Self::new();
        for definition in definitions {
            groups.insert(TimedGroup::from(definition));
        }
        groups
    }

    /// Register a group, replacing any group with the same name.
    pub fn insert(&mut self, group: TimedGroup) {
        let key = group.name.trim().to_lowercase();
        if let Some(previous) = self.groups.insert(key, group) {
            tracing::warn!(group = %previous.name, "timed group redefined; keeping the later one");
        }
    }

    /// Look up a group by name, ignoring case and surrounding whitespace.
    pub fn get(&self, name: &str) -> Option<&TimedGroup> {
        self.groups.get(&name.trim().to_lowercase())
    }

    /// Group names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.values().map(TimedGroup::name)
    }

    /// Number of registered groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no groups are registered.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// One-line listing of all known group names.
    pub fn print_help(&self) -> String {
        if self.groups.is_empty() {
            return "No gathering groups are defined.".to_owned();
        }
        let names: Vec<&str> = self.names().collect();
        format!("Known gathering groups: {}", names.join(", "))
    }
}
