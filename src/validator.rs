use crate::interval::Interval;
use chrono::Duration;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingCheck {
    Accepted,
    Rejected(Rejection),
}

/// Why a chosen slot cannot be committed. The caller has to pick again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    #[error("{candidate} overlaps the existing booking {conflicting}")]
    Overlap {
        candidate: Interval,
        conflicting: Interval,
    },
    #[error("{candidate} lies outside the available window {window}")]
    OutsideAvailability { candidate: Interval, window: Interval },
    #[error("{candidate} does not last the required {expected_minutes} minutes")]
    DurationMismatch {
        candidate: Interval,
        expected_minutes: i64,
    },
    #[error("{candidate} is not one of the offered slots")]
    NotOffered { candidate: Interval },
    #[error("no availability is published for this project and date")]
    NoAvailability,
}

impl BookingCheck {
    pub fn is_accepted(&self) -> bool {
        matches!(self, BookingCheck::Accepted)
    }
}

/// Recheck `candidate` against the occupancy snapshot taken right before commit.
pub fn check(candidate: Interval, current_occupied: &[Interval]) -> BookingCheck {
    match current_occupied
        .iter()
        .find(|booked| candidate.overlaps(**booked))
    {
        Some(&conflicting) => BookingCheck::Rejected(Rejection::Overlap {
            candidate,
            conflicting,
        }),
        None => BookingCheck::Accepted,
    }
}

/// [`check`] plus the window and duration constraints a commit has to meet.
pub fn check_within(
    candidate: Interval,
    window: Interval,
    duration: Duration,
    current_occupied: &[Interval],
) -> BookingCheck {
    if candidate.duration() != duration {
        return BookingCheck::Rejected(Rejection::DurationMismatch {
            candidate,
            expected_minutes: duration.num_minutes(),
        });
    }
    if !window.contains(candidate) {
        return BookingCheck::Rejected(Rejection::OutsideAvailability { candidate, window });
    }
    check(candidate, current_occupied)
}
