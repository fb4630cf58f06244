//! Evaluation intervals and calendar-boundary detection.
//!
//! Rebalancing rules keep re-deriving "is this the first bar of the
//! month/week/quarter hour" from raw timestamps; `is_period_boundary` is the
//! shared answer. A boundary is detected by comparing the period bucket of
//! two consecutive timestamps, which is robust to weekends and holidays —
//! the first trading day of a month is simply the first bar whose month
//! bucket differs from the previous bar's.

use chrono::{DateTime, Datelike, Utc};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    Tick,
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl Interval {
    /// Parse config spellings like "1day", "day", "1week".
    pub fn parse(input: &str) -> Option<Interval> {
        match input.trim().to_lowercase().as_str() {
            "tick" => Some(Interval::Tick),
            "minute" | "1min" | "1minute" => Some(Interval::Minute),
            "hour" | "1hour" | "1h" => Some(Interval::Hour),
            "day" | "1day" | "1d" | "daily" => Some(Interval::Day),
            "week" | "1week" | "1w" | "weekly" => Some(Interval::Week),
            "month" | "1month" | "monthly" => Some(Interval::Month),
            _ => None,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Interval::Tick => "tick",
            Interval::Minute => "1min",
            Interval::Hour => "1hour",
            Interval::Day => "1day",
            Interval::Week => "1week",
            Interval::Month => "1month",
        };
        write!(f, "{name}")
    }
}

/// Bucket id for a timestamp; equal ids mean "same period".
pub fn period_key(timestamp: DateTime<Utc>, interval: Interval) -> i64 {
    match interval {
        Interval::Tick => timestamp.timestamp(),
        Interval::Minute => timestamp.timestamp().div_euclid(60),
        Interval::Hour => timestamp.timestamp().div_euclid(3600),
        Interval::Day => i64::from(timestamp.date_naive().num_days_from_ce()),
        Interval::Week => {
            let week = timestamp.iso_week();
            i64::from(week.year()) * 100 + i64::from(week.week())
        }
        Interval::Month => i64::from(timestamp.year()) * 12 + i64::from(timestamp.month0()),
    }
}

/// True when `current` falls in a different period bucket than `prev`.
pub fn is_period_boundary(prev: DateTime<Utc>, current: DateTime<Utc>, interval: Interval) -> bool {
    period_key(prev, interval) != period_key(current, interval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn parse_accepts_config_spellings() {
        assert_eq!(Interval::parse("1day"), Some(Interval::Day));
        assert_eq!(Interval::parse("daily"), Some(Interval::Day));
        assert_eq!(Interval::parse(" 1WEEK "), Some(Interval::Week));
        assert_eq!(Interval::parse("tick"), Some(Interval::Tick));
        assert_eq!(Interval::parse("fortnight"), None);
    }

    #[test]
    fn display_round_trips_through_parse() {
        for interval in [
            Interval::Tick,
            Interval::Minute,
            Interval::Hour,
            Interval::Day,
            Interval::Week,
            Interval::Month,
        ] {
            assert_eq!(Interval::parse(&interval.to_string()), Some(interval));
        }
    }

    #[test]
    fn day_boundary() {
        let prev = ts(2024, 1, 15, 23, 0);
        let same_day = ts(2024, 1, 15, 23, 59);
        let next_day = ts(2024, 1, 16, 0, 0);

        assert!(!is_period_boundary(prev, same_day, Interval::Day));
        assert!(is_period_boundary(prev, next_day, Interval::Day));
    }

    #[test]
    fn week_boundary_over_weekend() {
        // Friday 2024-01-12 → Monday 2024-01-15 crosses an ISO week
        let friday = ts(2024, 1, 12, 0, 0);
        let monday = ts(2024, 1, 15, 0, 0);
        assert!(is_period_boundary(friday, monday, Interval::Week));

        // Monday → Friday of the same week does not
        let same_week_friday = ts(2024, 1, 19, 0, 0);
        assert!(!is_period_boundary(monday, same_week_friday, Interval::Week));
    }

    #[test]
    fn month_boundary_skips_weekend() {
        // last trading day of March → first trading day of April (1st on a
        // weekend would make it the 2nd; bucket comparison doesn't care)
        let march = ts(2024, 3, 29, 0, 0);
        let april = ts(2024, 4, 1, 0, 0);
        assert!(is_period_boundary(march, april, Interval::Month));

        let mid_april = ts(2024, 4, 15, 0, 0);
        assert!(!is_period_boundary(april, mid_april, Interval::Month));
    }

    #[test]
    fn month_boundary_across_year() {
        let december = ts(2023, 12, 29, 0, 0);
        let january = ts(2024, 1, 2, 0, 0);
        assert!(is_period_boundary(december, january, Interval::Month));
    }

    #[test]
    fn hour_and_minute_boundaries() {
        let base = ts(2024, 1, 15, 10, 59);
        let next_minute = ts(2024, 1, 15, 11, 0);

        assert!(is_period_boundary(base, next_minute, Interval::Minute));
        assert!(is_period_boundary(base, next_minute, Interval::Hour));
        assert!(!is_period_boundary(
            ts(2024, 1, 15, 11, 1),
            ts(2024, 1, 15, 11, 59),
            Interval::Hour
        ));
    }

    #[test]
    fn tick_every_distinct_timestamp_is_a_boundary() {
        let a = ts(2024, 1, 15, 10, 0);
        let b = ts(2024, 1, 15, 10, 1);
        assert!(is_period_boundary(a, b, Interval::Tick));
        assert!(!is_period_boundary(a, a, Interval::Tick));
    }
}
