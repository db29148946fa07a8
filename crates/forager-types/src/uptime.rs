//! Recurring availability windows on the in-world 24-hour clock.
//!
//! A gathering node is only workable during one or more recurring hour
//! ranges of the Eorzean day. [`UptimeWindow`] stores those ranges as
//! half-open `[start, end)` intervals over whole hours and answers
//! availability queries for a fractional hour-of-day.
//!
//! # Invariants
//!
//! - Ranges never overlap; construction rejects overlapping input.
//! - A range whose `end` is smaller than its `start` wraps past midnight:
//!   `[22, 2)` covers 22:00 through 01:59.
//! - An empty range set is the distinguished "always up" state.

use serde::{Deserialize, Serialize};

/// Number of hours in one in-world day.
pub const HOURS_PER_DAY: u8 = 24;

/// Length of the in-world day as a float, for clock arithmetic.
const DAY_LENGTH: f64 = 24.0;

/// Errors raised while building an [`UptimeWindow`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UptimeError {
    /// A start hour was 24 or more, or an end hour above 24.
    #[error("hour {hour} is outside the 24-hour day")]
    HourOutOfRange {
        /// The offending hour value.
        hour: u8,
    },

    /// A range had identical start and end, which is neither empty nor full.
    #[error("range starting at {start} has zero length")]
    EmptyRange {
        /// Start (and end) hour of the degenerate range.
        start: u8,
    },

    /// Two ranges cover at least one common hour.
    #[error("range {start}-{end} overlaps an earlier range")]
    Overlap {
        /// Start hour of the overlapping range.
        start: u8,
        /// End hour of the overlapping range.
        end: u8,
    },
}

/// One half-open `[start, end)` interval of whole hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HourRange {
    /// First hour of the window (inclusive), `0..24`.
    pub start: u8,
    /// Hour at which the window closes (exclusive), `0..=24`.
    pub end: u8,
}

impl HourRange {
    /// Whether this range crosses midnight.
    pub const fn wraps(self) -> bool {
        self.end < self.start
    }

    /// Whether the (already normalized) hour falls inside this range.
    pub fn contains(self, hour: f64) -> bool {
        let start = f64::from(self.start);
        let end = f64::from(self.end);
        if self.wraps() {
            hour >= start || hour < end
        } else {
            hour >= start && hour < end
        }
    }

    /// Bitmask of the whole hours covered, bit `h` set for hour `h`.
    fn hour_mask(self) -> u32 {
        (0..HOURS_PER_DAY)
            .filter(|&h| self.contains(f64::from(h)))
            .fold(0_u32, |mask, h| mask | (1_u32 << h))
    }
}

/// The set of recurring windows during which a node is up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(u8, u8)>", into = "Vec<(u8, u8)>")]
pub struct UptimeWindow {
    /// Disjoint ranges, sorted by start hour.
    ranges: Vec<HourRange>,
}

impl UptimeWindow {
    /// The always-up window (no ranges).
    pub const fn always() -> Self {
        Self { ranges: Vec::new() }
    }

    /// Build a window from `(start, end)` hour pairs.
    ///
    /// The pairs may arrive in any order; they are stored sorted by start
    /// hour. An empty input yields the always-up window.
    ///
    /// # Errors
    ///
    /// Returns [`UptimeError`] when an hour is out of range, a range has
    /// zero length, or two ranges overlap.
    pub fn new(pairs: &[(u8, u8)]) -> Result<Self, UptimeError> {
        let mut ranges = Vec::with_capacity(pairs.len());
        let mut covered = 0_u32;

        for &(start, end) in pairs {
            if start >= HOURS_PER_DAY {
                return Err(UptimeError::HourOutOfRange { hour: start });
            }
            if end > HOURS_PER_DAY {
                return Err(UptimeError::HourOutOfRange { hour: end });
            }
            if start == end {
                return Err(UptimeError::EmptyRange { start });
            }
            let range = HourRange { start, end };
            let mask = range.hour_mask();
            if covered & mask != 0 {
                return Err(UptimeError::Overlap { start, end });
            }
            covered |= mask;
            ranges.push(range);
        }

        ranges.sort_unstable();
        Ok(Self { ranges })
    }

    /// Whether the node is up at the given hour-of-day.
    ///
    /// The hour is folded into `[0, 24)` first, so callers may pass values
    /// produced by offset arithmetic without normalizing them.
    pub fn is_up_at(&self, hour: f64) -> bool {
        if self.ranges.is_empty() {
            return true;
        }
        let hour = hour.rem_euclid(DAY_LENGTH);
        self.ranges.iter().any(|range| range.contains(hour))
    }

    /// Whether this window is the distinguished always-up state.
    pub fn always_up(&self) -> bool {
        self.ranges.is_empty()
    }

    /// In-world hours from `hour` until the next window opens.
    ///
    /// Returns `0.0` when the node is already up (including always-up).
    pub fn hours_until_up(&self, hour: f64) -> f64 {
        if self.is_up_at(hour) {
            return 0.0;
        }
        let hour = hour.rem_euclid(DAY_LENGTH);
        self.ranges
            .iter()
            .map(|range| (f64::from(range.start) - hour).rem_euclid(DAY_LENGTH))
            .fold(DAY_LENGTH, f64::min)
    }

    /// Human-readable summary of all windows, ascending by start hour.
    ///
    /// ```text
    /// 02:00-06:00, 14:00-18:00
    /// ```
    pub fn printable_hours(&self) -> String {
        if self.ranges.is_empty() {
            return "always up".to_owned();
        }
        self.ranges
            .iter()
            .map(|r| format!("{:02}:00-{:02}:00", r.start, r.end))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The windows as `(start, end)` pairs for bulk export.
    pub fn uptime_table(&self) -> Vec<(u8, u8)> {
        self.ranges.iter().map(|r| (r.start, r.end)).collect()
    }

    /// The stored ranges, ascending by start hour.
    pub fn ranges(&self) -> &[HourRange] {
        &self.ranges
    }
}

impl TryFrom<Vec<(u8, u8)>> for UptimeWindow {
    type Error = UptimeError;

    fn try_from(pairs: Vec<(u8, u8)>) -> Result<Self, Self::Error> {
        Self::new(&pairs)
    }
}

impl From<UptimeWindow> for Vec<(u8, u8)> {
    fn from(window: UptimeWindow) -> Self {
        window.uptime_table()
    }
}

impl core::fmt::Display for UptimeWindow {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.printable_hours())
    }
}
