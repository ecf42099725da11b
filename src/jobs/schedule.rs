//! Wall-clock schedules
//!
//! Two shapes cover the billing jobs: every day at a fixed time, and on
//! listed days of the month at a fixed time. Times are evaluated in a fixed
//! UTC offset; there is no daylight-saving handling.

use crate::error::{BillingError, Result};
use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveTime, TimeZone};

/// Longest gap between two monthly fire dates: day 31 can be skipped for
/// two months in a row (e.g. Jan 31 -> Mar 31).
const MONTHLY_SEARCH_DAYS: u64 = 62;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    /// Every day at `hour:minute`
    Daily { hour: u32, minute: u32 },
    /// On each of `days` at `hour:minute`; months without that day are skipped
    MonthlyOn { days: Vec<u32>, hour: u32, minute: u32 },
}

impl Schedule {
    pub fn daily(hour: u32, minute: u32) -> Result<Self> {
        check_time(hour, minute)?;
        Ok(Self::Daily { hour, minute })
    }

    pub fn monthly_on(days: Vec<u32>, hour: u32, minute: u32) -> Result<Self> {
        check_time(hour, minute)?;
        if days.is_empty() {
            return Err(BillingError::config("a monthly schedule needs at least one day"));
        }
        if let Some(day) = days.iter().find(|d| !(1..=31).contains(*d)) {
            return Err(BillingError::config(format!("{} is not a day of the month", day)));
        }
        Ok(Self::MonthlyOn { days, hour, minute })
    }

    /// First fire time strictly after `after`, in `after`'s offset
    pub fn next_after(&self, after: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
        let (hour, minute) = match self {
            Self::Daily { hour, minute } | Self::MonthlyOn { hour, minute, .. } => (*hour, *minute),
        };
        let at = NaiveTime::from_hms_opt(hour, minute, 0)?;
        let offset = *after.offset();
        let start = after.date_naive();

        (0..=MONTHLY_SEARCH_DAYS)
            .filter_map(|i| start.checked_add_days(Days::new(i)))
            .filter(|date| match self {
                Self::Daily { .. } => true,
                Self::MonthlyOn { days, .. } => days.contains(&date.day()),
            })
            .filter_map(|date| offset.from_local_datetime(&date.and_time(at)).single())
            .find(|candidate| *candidate > after)
    }
}

impl std::fmt::Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily { hour, minute } => write!(f, "daily at {:02}:{:02}", hour, minute),
            Self::MonthlyOn { days, hour, minute } => {
                let days: Vec<String> = days.iter().map(u32::to_string).collect();
                write!(f, "monthly on day {} at {:02}:{:02}", days.join(","), hour, minute)
            }
        }
    }
}

fn check_time(hour: u32, minute: u32) -> Result<()> {
    if hour > 23 || minute > 59 {
        return Err(BillingError::config(format!(
            "invalid time of day {:02}:{:02}",
            hour, minute
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bogota(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_daily_later_today() {
        let s = Schedule::daily(17, 0).unwrap();
        assert_eq!(s.next_after(bogota(2024, 5, 13, 7, 0)), Some(bogota(2024, 5, 13, 17, 0)));
    }

    #[test]
    fn test_daily_is_strictly_after() {
        let s = Schedule::daily(17, 0).unwrap();
        assert_eq!(s.next_after(bogota(2024, 5, 13, 17, 0)), Some(bogota(2024, 5, 14, 17, 0)));
        assert_eq!(s.next_after(bogota(2024, 5, 31, 18, 0)), Some(bogota(2024, 6, 1, 17, 0)));
    }

    #[test]
    fn test_monthly_picks_next_listed_day() {
        let s = Schedule::monthly_on(vec![13, 25], 0, 0).unwrap();
        assert_eq!(s.next_after(bogota(2024, 5, 13, 7, 0)), Some(bogota(2024, 5, 25, 0, 0)));
        assert_eq!(s.next_after(bogota(2024, 5, 12, 23, 59)), Some(bogota(2024, 5, 13, 0, 0)));
        assert_eq!(s.next_after(bogota(2024, 12, 26, 0, 0)), Some(bogota(2025, 1, 13, 0, 0)));
    }

    #[test]
    fn test_monthly_skips_short_months() {
        let s = Schedule::monthly_on(vec![31], 0, 0).unwrap();
        assert_eq!(s.next_after(bogota(2024, 1, 31, 1, 0)), Some(bogota(2024, 3, 31, 0, 0)));
    }

    #[test]
    fn test_fire_time_is_in_the_given_offset() {
        let s = Schedule::daily(17, 0).unwrap();
        let next = s.next_after(bogota(2024, 5, 13, 7, 0)).unwrap();
        assert_eq!(next.naive_utc().to_string(), "2024-05-13 22:00:00");
    }

    #[test]
    fn test_rejects_invalid_times_and_days() {
        assert!(Schedule::daily(24, 0).is_err());
        assert!(Schedule::daily(0, 60).is_err());
        assert!(Schedule::monthly_on(vec![], 0, 0).is_err());
        assert!(Schedule::monthly_on(vec![0], 0, 0).is_err());
        assert!(Schedule::monthly_on(vec![32], 0, 0).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Schedule::daily(17, 0).unwrap().to_string(), "daily at 17:00");
        assert_eq!(
            Schedule::monthly_on(vec![13, 25], 0, 0).unwrap().to_string(),
            "monthly on day 13,25 at 00:00"
        );
    }
}
