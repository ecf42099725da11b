//! Clock trait
//!
//! Timestamps and the day-of-month fed to the billing jobs come from here
//! instead of calling `Utc::now()` directly, so tests can pin "day 13".

use chrono::{DateTime, Datelike, FixedOffset, Utc};

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current time in the given offset
    fn now_in(&self, offset: FixedOffset) -> DateTime<FixedOffset> {
        self.now().with_timezone(&offset)
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Calendar day of the month (1-31) in `offset`
pub fn local_day(clock: &dyn Clock, offset: FixedOffset) -> u8 {
    // day() is always 1..=31
    clock.now_in(offset).day() as u8
}

/// Build a fixed offset from whole hours, e.g. `-5` for America/Bogota
pub fn offset_from_hours(hours: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(hours * 3600)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FixedClock;
    use chrono::TimeZone;

    #[test]
    fn test_local_day_respects_offset() {
        // 03:00 UTC on the 14th is still the 13th in Bogota
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 14, 3, 0, 0).unwrap());
        let bogota = offset_from_hours(-5).unwrap();

        assert_eq!(local_day(&clock, bogota), 13);
        assert_eq!(local_day(&clock, offset_from_hours(0).unwrap()), 14);
    }

    #[test]
    fn test_offset_out_of_range() {
        assert!(offset_from_hours(30).is_none());
    }
}
