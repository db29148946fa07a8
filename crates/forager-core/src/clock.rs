//! Eorzea time: the in-world clock that gates node availability.
//!
//! The in-world day is 24 Eorzea hours long and runs at a fixed ratio to
//! real time: one Eorzea hour lasts 175 real seconds, so an Eorzea day
//! passes every 70 real minutes. The clock is a pure function of the Unix
//! epoch; there is no state to keep.
//!
//! # Design Principles
//!
//! - Conversions go through integer milliseconds and a single division so
//!   that whole Eorzea hours map to exact `f64` values.
//! - Offsets may be negative; results always fold into `[0, 24)`.

use chrono::{DateTime, Utc};

/// Real milliseconds per Eorzea hour.
pub const REAL_MILLIS_PER_EORZEA_HOUR: i64 = 175_000;

/// Real milliseconds per real minute.
const MILLIS_PER_MINUTE: i64 = 60_000;

/// Eorzea hours per Eorzea day, as a float.
const DAY_LENGTH: f64 = 24.0;

/// Errors that can occur during clock conversions.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// The requested Eorzea instant falls outside the representable range.
    #[error("eorzea instant out of range: day {day}, hour {hour}")]
    OutOfRange {
        /// Requested Eorzea day since the epoch.
        day: i64,
        /// Requested hour of that day.
        hour: f64,
    },
}

/// Conversion functions between real time and Eorzea time.
#[derive(Debug, Clone, Copy, Default)]
pub struct EorzeaTime;

impl EorzeaTime {
    /// Current Eorzea hour-of-day, shifted by `offset_minutes` real minutes.
    ///
    /// A positive offset looks into the future: alarms that should ring a
    /// few real minutes before a window opens ask for the hour at
    /// `now + offset`.
    pub fn current_hours(offset_minutes: i64) -> f64 {
        Self::hours_at(Utc::now(), offset_minutes)
    }

    /// Eorzea hour-of-day at `instant` shifted by `offset_minutes`.
    ///
    /// Always returns a value in `[0, 24)`.
    pub fn hours_at(instant: DateTime<Utc>, offset_minutes: i64) -> f64 {
        let offset = offset_minutes.saturating_mul(MILLIS_PER_MINUTE);
        let millis = instant.timestamp_millis().saturating_add(offset);
        let hours = millis as f64 / REAL_MILLIS_PER_EORZEA_HOUR as f64;
        let folded = hours.rem_euclid(DAY_LENGTH);
        // rem_euclid can round up to exactly 24.0 for tiny negative inputs.
        if folded >= DAY_LENGTH { 0.0 } else { folded }
    }

    /// Real instant at which Eorzea day `day` (since the Unix epoch)
    /// reaches `hour`.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::OutOfRange`] if the instant cannot be
    /// represented.
    #[allow(clippy::cast_possible_truncation)]
    pub fn real_instant_for(day: i64, hour: f64) -> Result<DateTime<Utc>, ClockError> {
        let out_of_range = || ClockError::OutOfRange { day, hour };
        let day_millis = day
            .checked_mul(24)
            .and_then(|h| h.checked_mul(REAL_MILLIS_PER_EORZEA_HOUR))
            .ok_or_else(out_of_range)?;
        let hour_millis = (hour * REAL_MILLIS_PER_EORZEA_HOUR as f64).round();
        if !hour_millis.is_finite() || hour_millis.abs() > 1e15 {
            return Err(out_of_range());
        }
        let millis = day_millis
            .checked_add(hour_millis as i64)
            .ok_or_else(out_of_range)?;
        DateTime::from_timestamp_millis(millis).ok_or_else(out_of_range)
    }

    /// Real minutes that `eorzea_hours` Eorzea hours take to pass.
    pub fn real_minutes(eorzea_hours: f64) -> f64 {
        eorzea_hours * REAL_MILLIS_PER_EORZEA_HOUR as f64 / MILLIS_PER_MINUTE as f64
    }

    /// Format an hour-of-day as `HH:MM`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn format_hour(hour: f64) -> String {
        let total_minutes = (hour.rem_euclid(DAY_LENGTH) * 60.0).floor() as u32;
        format!("{:02}:{:02}", (total_minutes / 60) % 24, total_minutes % 60)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn epoch_is_midnight() {
        let epoch = DateTime::from_timestamp(0, 0).unwrap();
        assert_eq!(EorzeaTime::hours_at(epoch, 0), 0.0);
    }

    #[test]
    fn one_eorzea_hour_is_175_seconds() {
        let t = DateTime::from_timestamp(175, 0).unwrap();
        assert_eq!(EorzeaTime::hours_at(t, 0), 1.0);
        let half = DateTime::from_timestamp(175 + 87, 500_000_000).unwrap();
        assert_eq!(EorzeaTime::hours_at(half, 0), 1.5);
    }

    #[test]
    fn day_wraps_after_seventy_minutes() {
        let t = DateTime::from_timestamp(70 * 60, 0).unwrap();
        assert_eq!(EorzeaTime::hours_at(t, 0), 0.0);
        let t = DateTime::from_timestamp(70 * 60 + 175 * 5, 0).unwrap();
        assert_eq!(EorzeaTime::hours_at(t, 0), 5.0);
    }

    #[test]
    fn offsets_shift_real_minutes() {
        let base = EorzeaTime::real_instant_for(1000, 10.0).unwrap();
        // 35 real minutes = 12 Eorzea hours.
        assert_eq!(EorzeaTime::hours_at(base, 35), 22.0);
        assert_eq!(EorzeaTime::hours_at(base, -35), 22.0);
        assert_eq!(EorzeaTime::hours_at(base, 70), 10.0);
    }

    #[test]
    fn negative_offsets_wrap_into_day() {
        let midnight = EorzeaTime::real_instant_for(1000, 0.0).unwrap();
        let hour = EorzeaTime::hours_at(midnight, -1);
        assert!((0.0..24.0).contains(&hour));
        assert!(hour > 23.0);
    }

    #[test]
    fn pre_epoch_instants_fold() {
        let t = DateTime::from_timestamp(-175, 0).unwrap();
        assert_eq!(EorzeaTime::hours_at(t, 0), 23.0);
    }

    #[test]
    fn real_instant_round_trips() {
        for hour in [0.0, 2.0, 13.5, 23.0] {
            let t = EorzeaTime::real_instant_for(20_000, hour).unwrap();
            assert_eq!(EorzeaTime::hours_at(t, 0), hour);
        }
        let later = EorzeaTime::real_instant_for(20_000, 14.0).unwrap();
        let earlier = EorzeaTime::real_instant_for(20_000, 13.0).unwrap();
        assert_eq!(later - earlier, Duration::seconds(175));
    }

    #[test]
    fn real_minutes_conversion() {
        assert_eq!(EorzeaTime::real_minutes(24.0), 70.0);
    }

    #[test]
    fn format_hour_pads() {
        assert_eq!(EorzeaTime::format_hour(0.0), "00:00");
        assert_eq!(EorzeaTime::format_hour(14.5), "14:30");
        assert_eq!(EorzeaTime::format_hour(23.999), "23:59");
    }
}
