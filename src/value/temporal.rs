//! Time-of-day and timestamp values
//!
//! Both types distinguish naive values (no UTC offset) from aware ones so
//! validators can refuse naive input.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, NaiveTime, Offset, Utc};

const TIME_FORMATS: [&str; 3] = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];
const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// A time of day, optionally bound to a UTC offset
#[derive(Debug, Clone, Copy)]
pub enum TimeOfDay {
    Naive(NaiveTime),
    Aware(NaiveTime, FixedOffset),
}

impl TimeOfDay {
    /// Creates an aware time in UTC
    pub fn utc(time: NaiveTime) -> Self {
        TimeOfDay::Aware(time, utc_offset())
    }

    pub fn is_naive(&self) -> bool {
        matches!(self, TimeOfDay::Naive(_))
    }

    /// Wall-clock time as written
    pub fn time(&self) -> NaiveTime {
        match self {
            TimeOfDay::Naive(t) | TimeOfDay::Aware(t, _) => *t,
        }
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        match self {
            TimeOfDay::Naive(_) => None,
            TimeOfDay::Aware(_, offset) => Some(*offset),
        }
    }

    /// Time normalised to UTC (wrapping around midnight). Naive times are returned as-is.
    pub fn utc_time(&self) -> NaiveTime {
        match self {
            TimeOfDay::Naive(t) => *t,
            TimeOfDay::Aware(t, offset) => {
                let shift = Duration::seconds(i64::from(offset.local_minus_utc()));
                t.overflowing_sub_signed(shift).0
            }
        }
    }

    /// Parses `HH:MM[:SS[.fff]]` with an optional `Z` or `±HH:MM` suffix.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let (body, offset) = split_offset(input)?;
        let time = TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(body, fmt).ok())?;

        Some(match offset {
            Some(offset) => TimeOfDay::Aware(time, offset),
            None => TimeOfDay::Naive(time),
        })
    }

    pub fn to_iso(&self) -> String {
        match self {
            TimeOfDay::Naive(t) => t.format("%H:%M:%S%.f").to_string(),
            TimeOfDay::Aware(t, offset) => {
                format!("{}{}", t.format("%H:%M:%S%.f"), format_offset(*offset))
            }
        }
    }

    fn sort_key(&self) -> (bool, NaiveTime, i32) {
        (
            !self.is_naive(),
            self.utc_time(),
            self.offset().map(|o| o.local_minus_utc()).unwrap_or(0),
        )
    }
}

impl PartialEq for TimeOfDay {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimeOfDay {}

impl PartialOrd for TimeOfDay {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeOfDay {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso())
    }
}

/// A calendar date and time, optionally bound to a UTC offset
#[derive(Debug, Clone, Copy)]
pub enum Timestamp {
    Naive(NaiveDateTime),
    Aware(DateTime<FixedOffset>),
}

impl Timestamp {
    pub fn is_naive(&self) -> bool {
        matches!(self, Timestamp::Naive(_))
    }

    /// The instant in UTC for aware values, the wall-clock value for naive ones
    pub fn naive_utc(&self) -> NaiveDateTime {
        match self {
            Timestamp::Naive(dt) => *dt,
            Timestamp::Aware(dt) => dt.naive_utc(),
        }
    }

    /// Parses RFC 3339 (aware) or `YYYY-MM-DDTHH:MM:SS[.fff]` (naive).
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Some(Timestamp::Aware(dt));
        }
        NAIVE_DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
            .map(Timestamp::Naive)
    }

    pub fn to_iso(&self) -> String {
        match self {
            Timestamp::Naive(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            Timestamp::Aware(dt) => dt.to_rfc3339(),
        }
    }

    fn sort_key(&self) -> (bool, NaiveDateTime, i32) {
        match self {
            Timestamp::Naive(dt) => (false, *dt, 0),
            Timestamp::Aware(dt) => (true, dt.naive_utc(), dt.offset().local_minus_utc()),
        }
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso())
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

/// Splits a trailing `Z` / `±HH[:MM]` offset off a time string.
/// Returns `None` when a suffix is present but malformed.
fn split_offset(input: &str) -> Option<(&str, Option<FixedOffset>)> {
    if let Some(body) = input.strip_suffix('Z').or_else(|| input.strip_suffix('z')) {
        return Some((body, Some(utc_offset())));
    }

    match input.rfind(|c: char| c == '+' || c == '-') {
        Some(pos) => {
            let (body, suffix) = input.split_at(pos);
            parse_offset(suffix).map(|offset| (body, Some(offset)))
        }
        None => Some((input, None)),
    }
}

fn parse_offset(suffix: &str) -> Option<FixedOffset> {
    let sign = match suffix.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let digits: String = suffix[1..].chars().filter(|c| *c != ':').collect();
    if digits.is_empty() || digits.len() > 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = if digits.len() <= 2 {
        (digits.parse::<i32>().ok()?, 0)
    } else {
        let split = digits.len() - 2;
        (
            digits[..split].parse::<i32>().ok()?,
            digits[split..].parse::<i32>().ok()?,
        )
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn format_offset(offset: FixedOffset) -> String {
    let secs = offset.local_minus_utc();
    if secs == 0 {
        return "Z".to_string();
    }
    let sign = if secs < 0 { '-' } else { '+' };
    let secs = secs.abs();
    format!("{}{:02}:{:02}", sign, secs / 3600, (secs % 3600) / 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_naive_time() {
        let t = TimeOfDay::parse("10:30:00").unwrap();
        assert!(t.is_naive());
        assert_eq!(t.time(), NaiveTime::from_hms_opt(10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_aware_times() {
        let z = TimeOfDay::parse("10:30:00Z").unwrap();
        assert!(!z.is_naive());
        assert_eq!(z.offset().unwrap().local_minus_utc(), 0);

        let plus = TimeOfDay::parse("10:30:00+05:30").unwrap();
        assert_eq!(plus.offset().unwrap().local_minus_utc(), 5 * 3600 + 30 * 60);
        assert_eq!(plus.utc_time(), NaiveTime::from_hms_opt(5, 0, 0).unwrap());

        let minus = TimeOfDay::parse("23:00-0200").unwrap();
        assert_eq!(minus.utc_time(), NaiveTime::from_hms_opt(1, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(TimeOfDay::parse("noon").is_none());
        assert!(TimeOfDay::parse("10:30:00+99:00").is_none());
        assert!(TimeOfDay::parse("25:00:00").is_none());
    }

    #[test]
    fn test_same_instant_different_offsets_are_distinct() {
        let a = TimeOfDay::parse("10:00:00Z").unwrap();
        let b = TimeOfDay::parse("12:00:00+02:00").unwrap();
        assert_eq!(a.utc_time(), b.utc_time());
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_timestamps() {
        let aware = Timestamp::parse("2024-03-01T12:00:00+01:00").unwrap();
        assert!(!aware.is_naive());

        let naive = Timestamp::parse("2024-03-01T12:00:00").unwrap();
        assert!(naive.is_naive());

        assert!(Timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn test_timestamp_ordering_uses_instant() {
        let early = Timestamp::parse("2024-03-01T12:00:00+01:00").unwrap();
        let late = Timestamp::parse("2024-03-01T12:00:00Z").unwrap();
        assert!(early < late);
    }

    #[test]
    fn test_iso_round_trip_keeps_offset() {
        let t = TimeOfDay::parse("08:15:00-03:00").unwrap();
        assert_eq!(t.to_iso(), "08:15:00-03:00");
        assert_eq!(TimeOfDay::utc(t.time()).to_iso(), "08:15:00Z");
    }
}
