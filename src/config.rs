use crate::time::MINUTES_PER_DAY;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Booking rules for one deployment.
///
/// The display threshold decides which days are offered at all; the report
/// threshold decides which leftover gaps end up in the free-time report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingPolicy {
    pub slot_minutes: u32,
    pub step_minutes: u32,
    pub display_min_gap_minutes: u32,
    pub report_min_gap_minutes: u32,
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("{field} must be between 1 and {max} minutes (got {value})")]
    OutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid policy file: {0}")]
    Json(#[from] serde_json::Error),
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            slot_minutes: 180,
            step_minutes: 15,
            display_min_gap_minutes: 180,
            report_min_gap_minutes: 60,
        }
    }
}

impl BookingPolicy {
    pub fn slot_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.slot_minutes))
    }

    pub fn step(&self) -> Duration {
        Duration::minutes(i64::from(self.step_minutes))
    }

    pub fn display_min_gap(&self) -> Duration {
        Duration::minutes(i64::from(self.display_min_gap_minutes))
    }

    pub fn report_min_gap(&self) -> Duration {
        Duration::minutes(i64::from(self.report_min_gap_minutes))
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        let max = u32::from(MINUTES_PER_DAY) - 1;
        for (field, value) in [
            ("slot_minutes", self.slot_minutes),
            ("step_minutes", self.step_minutes),
            ("display_min_gap_minutes", self.display_min_gap_minutes),
            ("report_min_gap_minutes", self.report_min_gap_minutes),
        ] {
            if value == 0 || value > max {
                return Err(PolicyError::OutOfRange { field, value, max });
            }
        }
        Ok(())
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, PolicyError> {
        let file = File::open(path)?;
        let policy: BookingPolicy = serde_json::from_reader(file)?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn save_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PolicyError> {
        self.validate()?;
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
