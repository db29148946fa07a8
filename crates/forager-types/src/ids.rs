//! Type-safe identifier wrappers around the game's numeric row ids.
//!
//! Every static entity (item, node, territory, aetheryte) is keyed by the
//! row id of its source sheet. Wrapping each in its own newtype prevents
//! accidentally looking up a node with an item id, which the raw `u32`
//! values would happily allow.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around a `u32` row id with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Return the inner row id.
            pub const fn into_inner(self) -> u32 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Identifier of a gatherable item.
    ItemId
}

define_id! {
    /// Identifier of a gathering point (node in the world graph).
    NodeId
}

define_id! {
    /// Identifier of a territory (zone) that owns nodes and aetherytes.
    TerritoryId
}

define_id! {
    /// Identifier of an aetheryte, the fast-travel anchor of a territory.
    AetheryteId
}
