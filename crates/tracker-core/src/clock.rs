//! Wall clock in the tracker's fixed time zone, and the cutoff-hour rollover.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Timelike, Utc};
use parking_lot::Mutex;

/// Source of "now" in the tracker's time zone.
pub trait Clock: Send + Sync {
    /// Current local time.
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Real clock at a fixed UTC offset.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    /// Clock at `offset`.
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Clock at a whole-hour UTC offset. `None` if out of range.
    pub fn from_utc_offset_hours(hours: i32) -> Option<Self> {
        FixedOffset::east_opt(hours * 3600).map(Self::new)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}

/// Settable clock for tests and replay.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<FixedOffset>>,
}

impl FixedClock {
    /// Clock frozen at `now`.
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move the clock.
    pub fn set(&self, now: DateTime<FixedOffset>) {
        *self.now.lock() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.now.lock()
    }
}

/// Date a new item is filed under.
///
/// At or past `cutoff_hour` the item belongs to tomorrow; before it, today.
pub fn target_date(now: &DateTime<FixedOffset>, cutoff_hour: u32) -> NaiveDate {
    let today = now.date_naive();
    if now.hour() >= cutoff_hour {
        today.checked_add_days(Days::new(1)).unwrap_or(today)
    } else {
        today
    }
}

/// `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `HH:MM:SS`.
pub fn format_time(now: &DateTime<FixedOffset>) -> String {
    now.format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn jst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<FixedOffset> {
        jst().with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn before_cutoff_is_today() {
        let now = at(2026, 3, 1, 17, 59, 59);
        assert_eq!(format_date(target_date(&now, 18)), "2026-03-01");
    }

    #[test]
    fn at_cutoff_is_tomorrow() {
        let now = at(2026, 3, 1, 18, 0, 0);
        assert_eq!(format_date(target_date(&now, 18)), "2026-03-02");
    }

    #[test]
    fn rollover_crosses_month_and_year() {
        assert_eq!(
            format_date(target_date(&at(2026, 2, 28, 23, 0, 0), 18)),
            "2026-03-01"
        );
        assert_eq!(
            format_date(target_date(&at(2026, 12, 31, 20, 0, 0), 18)),
            "2027-01-01"
        );
    }

    #[test]
    fn cutoff_zero_always_rolls() {
        let now = at(2026, 3, 1, 0, 0, 0);
        assert_eq!(format_date(target_date(&now, 0)), "2026-03-02");
    }

    #[test]
    fn cutoff_beyond_last_hour_never_rolls() {
        let now = at(2026, 3, 1, 23, 59, 59);
        assert_eq!(format_date(target_date(&now, 24)), "2026-03-01");
    }

    #[test]
    fn time_format_is_zero_padded() {
        assert_eq!(format_time(&at(2026, 3, 1, 7, 5, 9)), "07:05:09");
    }

    #[test]
    fn system_clock_reports_configured_offset() {
        let clock = SystemClock::from_utc_offset_hours(9).unwrap();
        assert_eq!(clock.now().offset().local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn system_clock_rejects_out_of_range_offset() {
        assert!(SystemClock::from_utc_offset_hours(30).is_none());
    }

    #[test]
    fn fixed_clock_can_be_moved() {
        let clock = FixedClock::new(at(2026, 3, 1, 8, 0, 0));
        assert_eq!(format_time(&clock.now()), "08:00:00");
        clock.set(at(2026, 3, 1, 19, 30, 0));
        assert_eq!(format_time(&clock.now()), "19:30:00");
    }

    #[test]
    fn utc_instant_is_converted_before_rollover() {
        // 09:30 UTC is 18:30 in UTC+9.
        let utc = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let local = utc.with_timezone(&jst());
        assert_eq!(format_date(target_date(&local, 18)), "2026-03-02");
    }
}
