//! Row schemas exchanged with the availability source, the booking store
//! and the free-time report, plus their typed counterparts.
//!
//! Rows are plain strings as they come out of a spreadsheet or CSV file.
//! Converting a row into a record is fallible per row; callers skip rows
//! that fail instead of aborting the whole computation.

use crate::interval::{Interval, IntervalError};
use crate::time::{format_date, parse_date};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AvailabilityRow {
    #[serde(alias = "Projekt")]
    pub project: String,
    #[serde(alias = "Datum")]
    pub date: String,
    #[serde(alias = "Zeitraum")]
    pub time_range: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BookingRow {
    #[serde(alias = "Projekt")]
    pub project: String,
    #[serde(alias = "Datum")]
    pub date: String,
    #[serde(alias = "Zeitraum")]
    pub time_range: String,
    #[serde(alias = "Instrument", default)]
    pub instrument: String,
    #[serde(alias = "Name", default)]
    pub person: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FreeTimeRow {
    pub project: String,
    pub date: String,
    pub time_range: String,
}

impl AvailabilityRow {
    pub fn new(
        project: impl Into<String>,
        date: impl Into<String>,
        time_range: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            date: date.into(),
            time_range: time_range.into(),
        }
    }
}

/// A row that contributes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("row has no project")]
    MissingProject,
    #[error("unparsable date '{0}'")]
    Date(String),
    #[error(transparent)]
    TimeRange(#[from] IntervalError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("field '{0}' must not be empty")]
    EmptyField(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    pub project: String,
    pub date: NaiveDate,
    pub window: Interval,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub project: String,
    pub date: NaiveDate,
    pub slot: Interval,
    pub instrument: String,
    pub person: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeTimeRecord {
    pub project: String,
    pub date: NaiveDate,
    pub gap: Interval,
}

/// Everything a single booking submission carries. Built per request and
/// dropped afterwards; nothing survives between interactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub project: String,
    pub date: NaiveDate,
    pub slot: Interval,
    pub instrument: String,
    pub person: String,
}

fn parse_key(project: &str, date: &str) -> Result<(String, NaiveDate), ParseFailure> {
    let project = project.trim();
    if project.is_empty() {
        return Err(ParseFailure::MissingProject);
    }
    let date = parse_date(date).ok_or_else(|| ParseFailure::Date(date.to_string()))?;
    Ok((project.to_string(), date))
}

impl AvailabilityRecord {
    pub fn from_row(row: &AvailabilityRow) -> Result<Self, ParseFailure> {
        let (project, date) = parse_key(&row.project, &row.date)?;
        let window = Interval::parse(&row.time_range)?;
        Ok(Self {
            project,
            date,
            window,
        })
    }
}

impl BookingRecord {
    pub fn from_row(row: &BookingRow) -> Result<Self, ParseFailure> {
        let (project, date) = parse_key(&row.project, &row.date)?;
        let slot = Interval::parse(&row.time_range)?;
        Ok(Self {
            project,
            date,
            slot,
            instrument: row.instrument.trim().to_string(),
            person: row.person.trim().to_string(),
        })
    }

    pub fn to_row(&self) -> BookingRow {
        BookingRow {
            project: self.project.clone(),
            date: format_date(self.date),
            time_range: self.slot.to_string(),
            instrument: self.instrument.clone(),
            person: self.person.clone(),
        }
    }
}

impl FreeTimeRecord {
    pub fn to_row(&self) -> FreeTimeRow {
        FreeTimeRow {
            project: self.project.clone(),
            date: format_date(self.date),
            time_range: self.gap.to_string(),
        }
    }
}

impl BookingRequest {
    pub fn validate(&self) -> Result<(), FormError> {
        if self.project.trim().is_empty() {
            return Err(FormError::EmptyField("project"));
        }
        if self.instrument.trim().is_empty() {
            return Err(FormError::EmptyField("instrument"));
        }
        if self.person.trim().is_empty() {
            return Err(FormError::EmptyField("person"));
        }
        Ok(())
    }

    pub fn into_record(self) -> BookingRecord {
        BookingRecord {
            project: self.project.trim().to_string(),
            date: self.date,
            slot: self.slot,
            instrument: self.instrument.trim().to_string(),
            person: self.person.trim().to_string(),
        }
    }
}

/// Parse every row, logging and dropping the ones that fail.
pub fn parse_availability(rows: &[AvailabilityRow]) -> Vec<AvailabilityRecord> {
    rows.iter()
        .enumerate()
        .filter_map(|(idx, row)| match AvailabilityRecord::from_row(row) {
            Ok(record) => Some(record),
            Err(err) => {
                log::warn!("skipping availability row #{idx} ({row:?}): {err}");
                None
            }
        })
        .collect()
}

pub fn parse_bookings(rows: &[BookingRow]) -> Vec<BookingRecord> {
    rows.iter()
        .enumerate()
        .filter_map(|(idx, row)| match BookingRecord::from_row(row) {
            Ok(record) => Some(record),
            Err(err) => {
                log::warn!("skipping booking row #{idx} ({row:?}): {err}");
                None
            }
        })
        .collect()
}
