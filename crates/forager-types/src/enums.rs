//! Enumeration types shared across the Forager workspace.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Client language
// ---------------------------------------------------------------------------

/// A language the game client (and its static data) can be displayed in.
///
/// The discriminants match the integer encoding used by companion tools,
/// so `ClientLanguage::from_index(2)` is [`ClientLanguage::German`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ClientLanguage {
    /// English client.
    #[default]
    English = 0,
    /// Japanese client.
    Japanese = 1,
    /// German client.
    German = 2,
    /// French client.
    French = 3,
}

impl ClientLanguage {
    /// All languages in discriminant order.
    pub const ALL: [Self; 4] = [Self::English, Self::Japanese, Self::German, Self::French];

    /// Map the companion-tool integer encoding to a language.
    ///
    /// Returns `None` for anything outside `0..=3`.
    pub const fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::English),
            1 => Some(Self::Japanese),
            2 => Some(Self::German),
            3 => Some(Self::French),
            _ => None,
        }
    }

    /// Return the integer encoding of this language.
    pub const fn index(self) -> u8 {
        self as u8
    }
}

// ---------------------------------------------------------------------------
// Gathering disciplines
// ---------------------------------------------------------------------------

/// The gathering action a node is worked with.
///
/// Each node carries exactly one of these tags. Most map onto one of the
/// two gathering professions ([`Job`]); spearfishing holes do not, which
/// the action pipeline treats as an unrecognized discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatheringType {
    /// Mineral deposits (miner).
    Mining,
    /// Rocky outcrops (miner).
    Quarrying,
    /// Mature trees (botanist).
    Logging,
    /// Lush vegetation patches (botanist).
    Harvesting,
    /// Spearfishing holes (no gathering profession gear set).
    Spearfishing,
}

impl GatheringType {
    /// Return the profession that works this kind of node, if any.
    pub const fn job(self) -> Option<Job> {
        match self {
            Self::Mining | Self::Quarrying => Some(Job::Miner),
            Self::Logging | Self::Harvesting => Some(Job::Botanist),
            Self::Spearfishing => None,
        }
    }

    /// Short lowercase label used in diagnostic dumps.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mining => "mining",
            Self::Quarrying => "quarrying",
            Self::Logging => "logging",
            Self::Harvesting => "harvesting",
            Self::Spearfishing => "spearfishing",
        }
    }
}

/// One of the two mutually exclusive gathering professions.
///
/// Used both as the discipline filter for node selection and to derive the
/// default gear-set name for the equip stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Job {
    /// Works mining and quarrying nodes.
    Miner,
    /// Works logging and harvesting nodes.
    Botanist,
}

impl Job {
    /// Default gear-set name used when configuration carries no override.
    pub const fn default_set_name(self) -> &'static str {
        match self {
            Self::Miner => "Miner",
            Self::Botanist => "Botanist",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_index_roundtrip() {
        for lang in ClientLanguage::ALL {
            assert_eq!(ClientLanguage::from_index(i64::from(lang.index())), Some(lang));
        }
        assert_eq!(ClientLanguage::from_index(4), None);
        assert_eq!(ClientLanguage::from_index(-1), None);
    }

    #[test]
    fn gathering_types_map_to_jobs() {
        assert_eq!(GatheringType::Quarrying.job(), Some(Job::Miner));
        assert_eq!(GatheringType::Harvesting.job(), Some(Job::Botanist));
        assert_eq!(GatheringType::Spearfishing.job(), None);
    }
}
