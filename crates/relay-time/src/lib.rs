//! Wall-clock timestamp value used throughout the logic engine.
//!
//! `Time` decomposes a point in time into (years since 1970, day of year,
//! hour, minute, second, sub-second) rather than a single scalar, matching
//! the field layout elements reason about directly (Timer deadlines,
//! Overcurrent integration steps, Node history). The sub-second fraction is
//! fixed at build time to nanoseconds-per-second.

use std::fmt;

/// Nanoseconds per whole second; the fixed sub-second fraction for this build.
pub const SUB_SECOND_FRACTION: u32 = 1_000_000_000;

/// A decomposed timestamp: years since 1970, zero-based day of year, and a
/// time-of-day down to sub-second resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time {
    pub year: u16,
    pub day_of_year: u16,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub sub_second: u32,
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Month {
    January = 0,
    February = 1,
    March = 2,
    April = 3,
    May = 4,
    June = 5,
    July = 6,
    August = 7,
    September = 8,
    October = 9,
    November = 10,
    December = 11,
}

const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

impl Time {
    pub fn new(year: u16, day_of_year: u16, hour: u8, minute: u8, second: u8, sub_second: u32) -> Self {
        Self { year, day_of_year, hour, minute, second, sub_second }
    }

    /// Fast-path leap year test: `actual_year` is a full calendar year (e.g. 2026).
    #[inline]
    pub fn is_leap_year(actual_year: u32) -> bool {
        if actual_year % 4 != 0 {
            false
        } else if actual_year % 100 != 0 {
            true
        } else {
            actual_year % 400 == 0
        }
    }

    #[inline]
    pub fn days_in_year(actual_year: u32) -> u16 {
        if Self::is_leap_year(actual_year) { 366 } else { 365 }
    }

    #[inline]
    pub fn days_in_month(actual_year: u32, month: Month) -> u8 {
        if month as u8 == Month::February as u8 {
            if Self::is_leap_year(actual_year) { 29 } else { 28 }
        } else {
            DAYS_IN_MONTH[month as usize]
        }
    }

    #[inline]
    pub fn actual_year(&self) -> u32 {
        1970 + self.year as u32
    }

    /// Decompose `day_of_year` into a (month, day-of-month) pair, 1-based day.
    pub fn to_calendar_date(&self) -> (Month, u8) {
        let year = self.actual_year();
        let mut remaining = self.day_of_year as i32;
        for &m in MONTHS.iter() {
            let dim = Self::days_in_month(year, m) as i32;
            if remaining < dim {
                return (m, (remaining + 1) as u8);
            }
            remaining -= dim;
        }
        (Month::December, 31)
    }

    /// Number of whole days since 1970-01-01 represented by this value's
    /// (year, day_of_year) pair.
    fn absolute_days(&self) -> i64 {
        let mut days: i64 = 0;
        for y in 0..self.year as u32 {
            days += Self::days_in_year(1970 + y) as i64;
        }
        days + self.day_of_year as i64
    }

    /// Microseconds since 1970-01-01T00:00:00.
    pub fn micros_since_epoch(&self) -> i64 {
        let mut us = self.absolute_days() * 86_400_000_000i64;
        us += self.hour as i64 * 3_600_000_000;
        us += self.minute as i64 * 60_000_000;
        us += self.second as i64 * 1_000_000;
        us += (self.sub_second as i64 * 1_000_000) / SUB_SECOND_FRACTION as i64;
        us
    }

    /// Returns a new `Time` this many seconds in the future (negative moves
    /// into the past), carrying through every field with leap-year awareness.
    pub fn get_future(&self, seconds: f64) -> Time {
        let mut t = *self;
        t.advance_seconds(seconds);
        t
    }

    /// Advance in place by `seconds` (may be negative or fractional).
    pub fn update(&mut self, seconds: f64) {
        self.advance_seconds(seconds);
    }

    fn advance_seconds(&mut self, seconds: f64) {
        let total_ns = seconds * SUB_SECOND_FRACTION as f64;
        let whole_seconds = total_ns.div_euclid(SUB_SECOND_FRACTION as f64) as i64;
        let ns = total_ns.rem_euclid(SUB_SECOND_FRACTION as f64) as i64;

        let mut extra_seconds = whole_seconds;
        let mut sub = self.sub_second as i64 + ns;
        if sub >= SUB_SECOND_FRACTION as i64 {
            sub -= SUB_SECOND_FRACTION as i64;
            extra_seconds += 1;
        }
        self.sub_second = sub as u32;

        let mut sec = self.second as i64 + extra_seconds;
        let mut min = self.minute as i64;
        let mut hour = self.hour as i64;
        let mut day = self.day_of_year as i64;
        let mut year = self.year as i64;

        let add_min = sec.div_euclid(60);
        sec = sec.rem_euclid(60);
        min += add_min;

        let add_hour = min.div_euclid(60);
        min = min.rem_euclid(60);
        hour += add_hour;

        let add_day = hour.div_euclid(24);
        hour = hour.rem_euclid(24);
        day += add_day;

        loop {
            let dy = Self::days_in_year(1970 + year as u32) as i64;
            if day >= dy {
                day -= dy;
                year += 1;
            } else if day < 0 {
                year -= 1;
                day += Self::days_in_year(1970 + year as u32) as i64;
            } else {
                break;
            }
        }

        self.second = sec as u8;
        self.minute = min as u8;
        self.hour = hour as u8;
        self.day_of_year = day as u16;
        self.year = year as u16;
    }

    /// Sets the fields directly (used to apply an external time sync) and
    /// returns the drift relative to the prior contents, in microseconds.
    pub fn align(&mut self, sub_second: u32, second: u8, minute: u8, hour: u8, day_of_year: u16, year: u16) -> i64 {
        let before = self.micros_since_epoch();
        self.sub_second = sub_second;
        self.second = second;
        self.minute = minute;
        self.hour = hour;
        self.day_of_year = day_of_year;
        self.year = year;
        self.micros_since_epoch() - before
    }

    /// True iff `self` is at or after `reference` chronologically.
    pub fn has_elapsed(&self, reference: &Time) -> bool {
        self.micros_since_epoch() >= reference.micros_since_epoch()
    }

    /// Construct from nanoseconds since the Unix epoch.
    pub fn from_unix_nanos(total_ns: i128) -> Time {
        let secs = total_ns.div_euclid(1_000_000_000) as i64;
        let nanos = total_ns.rem_euclid(1_000_000_000) as u32;

        let mut days = secs.div_euclid(86_400);
        let mut rem = secs.rem_euclid(86_400);
        let hour = (rem / 3600) as u8;
        rem %= 3600;
        let minute = (rem / 60) as u8;
        let second = (rem % 60) as u8;

        let mut year: u32 = 0;
        loop {
            let dy = Self::days_in_year(1970 + year) as i64;
            if days >= dy {
                days -= dy;
                year += 1;
            } else {
                break;
            }
        }

        Time {
            year: year as u16,
            day_of_year: days as u16,
            hour,
            minute,
            second,
            sub_second: nanos,
        }
    }

    /// Sample the host realtime clock.
    pub fn get_time() -> Time {
        let mut ts = libc::timespec { tv_sec: 0, tv_nsec: 0 };
        unsafe {
            libc::clock_gettime(libc::CLOCK_REALTIME, &mut ts);
        }
        Self::from_unix_nanos(ts.tv_sec as i128 * 1_000_000_000 + ts.tv_nsec as i128)
    }

    /// Sample the host monotonic clock as raw nanoseconds (used by the
    /// diagnostics layer, which does not need calendar decomposition).
    pub fn monotonic_now_ns() -> u64 {
        let mut ts = libc::timespec { tv_sec: 0, tv_nsec: 0 };
        unsafe {
            libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts);
        }
        (ts.tv_sec as u64) * 1_000_000_000 + ts.tv_nsec as u64
    }

    /// Write `hh:mm:ss.uuuuuu` into `buf`, truncating to its capacity.
    pub fn write_short(&self, buf: &mut String) {
        use std::fmt::Write as _;
        let micros = self.sub_second / 1000;
        let _ = write!(buf, "{:02}:{:02}:{:02}.{:06}", self.hour, self.minute, self.second, micros);
    }
}

impl std::ops::Sub for Time {
    type Output = i64;
    /// Microsecond delta `self - other`.
    fn sub(self, other: Time) -> i64 {
        self.micros_since_epoch() - other.micros_since_epoch()
    }
}

impl std::ops::Add<f64> for Time {
    type Output = Time;
    fn add(self, seconds: f64) -> Time {
        self.get_future(seconds)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let micros = self.sub_second / 1000;
        write!(f, "{:02}:{:02}:{:02}.{:06}", self.hour, self.minute, self.second, micros)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leap_year_rules() {
        assert!(Time::is_leap_year(2024));
        assert!(!Time::is_leap_year(2023));
        assert!(!Time::is_leap_year(1900));
        assert!(Time::is_leap_year(2000));
    }

    #[test]
    fn advance_carries_seconds_into_minutes() {
        let t = Time::new(0, 0, 0, 0, 59, 0);
        let t2 = t.get_future(2.0);
        assert_eq!(t2.minute, 1);
        assert_eq!(t2.second, 1);
    }

    #[test]
    fn advance_carries_across_year_boundary_non_leap() {
        // day_of_year is 0-based; day 364 is the last day of a 365-day year.
        let t = Time::new(1, 364, 23, 59, 59, 0); // 1971, not a leap year
        let t2 = t.get_future(1.0);
        assert_eq!(t2.year, 2);
        assert_eq!(t2.day_of_year, 0);
        assert_eq!(t2.hour, 0);
        assert_eq!(t2.minute, 0);
        assert_eq!(t2.second, 0);
    }

    #[test]
    fn subtraction_yields_microsecond_delta() {
        let a = Time::new(0, 0, 0, 0, 1, 0);
        let b = Time::new(0, 0, 0, 0, 0, 0);
        assert_eq!(a - b, 1_000_000);
        assert_eq!(b - a, -1_000_000);
    }

    #[test]
    fn has_elapsed_is_chronological() {
        let earlier = Time::new(0, 0, 0, 0, 0, 0);
        let later = Time::new(0, 0, 0, 0, 1, 0);
        assert!(later.has_elapsed(&earlier));
        assert!(!earlier.has_elapsed(&later));
    }

    #[test]
    fn align_reports_drift() {
        let mut t = Time::new(0, 0, 0, 0, 10, 0);
        let drift = t.align(0, 12, 0, 0, 0, 0);
        assert_eq!(drift, 2_000_000);
        assert_eq!(t.second, 12);
    }
}
