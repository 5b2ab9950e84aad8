use crate::time::{TimeOfDay, parse_range};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Half-open span `[start, end)` within a single day, `start < end`.
///
/// Ordering is by start, then by end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Interval {
    start: TimeOfDay,
    end: TimeOfDay,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalError {
    #[error("interval start {start} must be before end {end}")]
    NotIncreasing { start: TimeOfDay, end: TimeOfDay },
    #[error("invalid time range '{0}' (expected HH:MM - HH:MM)")]
    Unparsable(String),
}

impl Interval {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self, IntervalError> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(IntervalError::NotIncreasing { start, end })
        }
    }

    /// Caller guarantees `start < end`.
    pub(crate) fn between(start: TimeOfDay, end: TimeOfDay) -> Self {
        debug_assert!(start < end, "empty interval {start}..{end}");
        Self { start, end }
    }

    /// `[start, start + span)`, or `None` if the span is not positive or the
    /// end would fall past 23:59.
    pub fn starting_at(start: TimeOfDay, span: Duration) -> Option<Self> {
        if span <= Duration::zero() {
            return None;
        }
        let end = start.checked_add(span)?;
        Some(Self { start, end })
    }

    pub fn parse(text: &str) -> Result<Self, IntervalError> {
        let (start, end) =
            parse_range(text).ok_or_else(|| IntervalError::Unparsable(text.to_string()))?;
        Self::new(start, end)
    }

    pub fn start(self) -> TimeOfDay {
        self.start
    }

    pub fn end(self) -> TimeOfDay {
        self.end
    }

    pub fn duration(self) -> Duration {
        self.end.signed_duration_since(self.start)
    }

    /// Touching endpoints (`10:00 - 11:00` and `11:00 - 12:00`) do not overlap.
    pub fn overlaps(self, other: Interval) -> bool {
        self.start < other.end && self.end > other.start
    }

    pub fn contains(self, other: Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

impl FromStr for Interval {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Interval {
    type Error = IntervalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Interval> for String {
    fn from(value: Interval) -> Self {
        value.to_string()
    }
}
