use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Unit words that may trail a time token, e.g. "10:00 Uhr".
const UNIT_SUFFIXES: [&str; 2] = ["Uhr", "uhr"];

/// Characters that get typed (or autocorrected) in place of a plain hyphen.
const DASH_LOOKALIKES: [char; 6] = [
    '\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}', '\u{2014}', '\u{2212}',
];

const DATE_FORMATS: [&str; 3] = ["%d.%m.%Y", "%Y-%m-%d", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%d.%m.%Y %H:%M"];

/// Wall-clock time with minute precision, from 00:00 up to and including 23:59.
///
/// There is no date and no timezone attached. Arithmetic never wraps past
/// midnight: [`TimeOfDay::checked_add`] returns `None` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    minutes: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time of day '{0}' (expected HH:MM)")]
pub struct TimeParseError(pub String);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { minutes: 0 };
    pub const LAST_MINUTE: TimeOfDay = TimeOfDay {
        minutes: MINUTES_PER_DAY - 1,
    };

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self {
                minutes: (hour * 60 + minute) as u16,
            })
        } else {
            None
        }
    }

    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self { minutes })
    }

    pub fn hour(self) -> u32 {
        u32::from(self.minutes / 60)
    }

    pub fn minute(self) -> u32 {
        u32::from(self.minutes % 60)
    }

    pub fn minutes_since_midnight(self) -> u16 {
        self.minutes
    }

    /// Shift forward (or backward, for a negative span) within the same day.
    pub fn checked_add(self, span: Duration) -> Option<Self> {
        let total = i64::from(self.minutes) + span.num_minutes();
        u16::try_from(total).ok().and_then(Self::from_minutes)
    }

    pub fn signed_duration_since(self, earlier: TimeOfDay) -> Duration {
        Duration::minutes(i64::from(self.minutes) - i64::from(earlier.minutes))
    }
}

impl From<NaiveTime> for TimeOfDay {
    /// Seconds and sub-second precision are dropped.
    fn from(value: NaiveTime) -> Self {
        Self {
            minutes: (value.hour() * 60 + value.minute()) as u16,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_time(s).ok_or_else(|| TimeParseError(s.to_string()))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Parse a free-text time token such as `"09:30"`, `" 9:30 "` or `"09:30 Uhr"`.
///
/// Returns `None` for empty input, malformed tokens and out-of-range
/// hour/minute values. Never panics.
pub fn parse_time(text: &str) -> Option<TimeOfDay> {
    let mut token = text.trim();
    for suffix in UNIT_SUFFIXES {
        if let Some(stripped) = token.strip_suffix(suffix) {
            token = stripped.trim_end();
            break;
        }
    }
    if token.is_empty() {
        return None;
    }
    NaiveTime::parse_from_str(token, "%H:%M")
        .ok()
        .map(TimeOfDay::from)
}

/// Parse `"HH:MM - HH:MM"` into its two endpoints.
///
/// En/em dashes and similar characters are treated as a plain hyphen. The
/// text must split into exactly two parts and both must parse. Ordering of
/// the endpoints is not checked here; see [`crate::Interval::parse`].
pub fn parse_range(text: &str) -> Option<(TimeOfDay, TimeOfDay)> {
    let normalized: String = text
        .chars()
        .map(|c| if DASH_LOOKALIKES.contains(&c) { '-' } else { c })
        .collect();

    let mut parts = normalized.split('-');
    let (Some(start), Some(end), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };
    Some((parse_time(start)?, parse_time(end)?))
}

/// Parse a calendar date the way spreadsheet exports deliver it.
///
/// Day-first forms (`DD.MM.YYYY`, `DD/MM/YYYY`) and ISO dates are accepted,
/// as are timestamps whose time part is ignored.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let token = text.trim();
    if token.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(token, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(token, format).ok())
                .map(|dt| dt.date())
        })
}

/// Format a date as `DD.MM.YYYY`, the form written back into booking rows.
pub fn format_date(date: NaiveDate) -> String {
    format!("{:02}.{:02}.{:04}", date.day(), date.month(), date.year())
}
