use crate::config::BookingPolicy;
use crate::gaps::{free_gaps, gaps_at_least};
use crate::interval::Interval;
use crate::records::{
    AvailabilityRecord, BookingRecord, BookingRequest, FormError, FreeTimeRecord,
    parse_availability, parse_bookings,
};
use crate::slots::candidates;
use crate::store::{BookingBackend, StoreError, StoreResult};
use crate::validator::{BookingCheck, Rejection, check_within};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use thiserror::Error;

/// What a user can book on one project/day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SlotLookup {
    /// No usable availability row for the project and date.
    NoAvailability,
    /// The day is published, but no gap fits a full slot.
    EmptyCandidateSet {
        window: Interval,
        gaps: Vec<Interval>,
    },
    Candidates {
        window: Interval,
        gaps: Vec<Interval>,
        candidates: Vec<Interval>,
    },
}

impl SlotLookup {
    pub fn candidates(&self) -> &[Interval] {
        match self {
            SlotLookup::Candidates { candidates, .. } => candidates,
            _ => &[],
        }
    }

    pub fn window(&self) -> Option<Interval> {
        match self {
            SlotLookup::NoAvailability => None,
            SlotLookup::EmptyCandidateSet { window, .. } | SlotLookup::Candidates { window, .. } => {
                Some(*window)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Committed(BookingRecord),
    Rejected(Rejection),
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Per-request orchestration over a backend snapshot.
///
/// Every call re-reads the tables it needs; nothing is cached between calls,
/// so a view is cheap to build and meant to be thrown away after one request.
pub struct AvailabilityView<'a, S: BookingBackend + ?Sized> {
    store: &'a S,
    policy: &'a BookingPolicy,
}

impl<'a, S: BookingBackend + ?Sized> AvailabilityView<'a, S> {
    pub fn new(store: &'a S, policy: &'a BookingPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &BookingPolicy {
        self.policy
    }

    /// Valid availability records, first row per project/date only.
    fn availability(&self) -> StoreResult<Vec<AvailabilityRecord>> {
        let rows = self.store.availability_rows()?;
        let mut seen = HashSet::new();
        Ok(parse_availability(&rows)
            .into_iter()
            .filter(|record| seen.insert((record.project.clone(), record.date)))
            .collect())
    }

    fn bookings(&self) -> StoreResult<Vec<BookingRecord>> {
        let rows = self.store.booking_rows()?;
        Ok(parse_bookings(&rows))
    }

    /// Occupied intervals for one project/day from a fresh read of the booking store.
    pub fn occupied(&self, project: &str, date: NaiveDate) -> StoreResult<Vec<Interval>> {
        let project = project.trim();
        Ok(self
            .bookings()?
            .into_iter()
            .filter(|booking| booking.project == project && booking.date == date)
            .map(|booking| booking.slot)
            .collect())
    }

    pub fn window(&self, project: &str, date: NaiveDate) -> StoreResult<Option<Interval>> {
        let project = project.trim();
        Ok(self
            .availability()?
            .into_iter()
            .find(|record| record.project == project && record.date == date)
            .map(|record| record.window))
    }

    pub fn projects(&self) -> StoreResult<Vec<String>> {
        let projects: BTreeSet<String> = self
            .availability()?
            .into_iter()
            .map(|record| record.project)
            .collect();
        Ok(projects.into_iter().collect())
    }

    /// Dates on which `project` still has a gap of at least the display threshold.
    pub fn bookable_dates(&self, project: &str) -> StoreResult<Vec<NaiveDate>> {
        let project = project.trim();
        let occupied = self.occupied_by_day()?;
        let mut dates: Vec<NaiveDate> = self
            .availability()?
            .into_iter()
            .filter(|record| record.project == project)
            .filter(|record| {
                let busy = occupied
                    .get(&(record.project.clone(), record.date))
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                let gaps = free_gaps(record.window, busy);
                !gaps_at_least(&gaps, self.policy.display_min_gap()).is_empty()
            })
            .map(|record| record.date)
            .collect();
        dates.sort();
        dates.dedup();
        Ok(dates)
    }

    /// Window, displayable gaps and bookable candidates for one project/day.
    pub fn day(&self, project: &str, date: NaiveDate) -> StoreResult<SlotLookup> {
        let Some(window) = self.window(project, date)? else {
            log::debug!("no availability for '{project}' on {date}");
            return Ok(SlotLookup::NoAvailability);
        };

        let occupied = self.occupied(project, date)?;
        let (gaps, slots) = self.offered(window, &occupied);
        log::debug!(
            "'{project}' {date}: {} bookings, {} gaps, {} candidates",
            occupied.len(),
            gaps.len(),
            slots.len()
        );

        if slots.is_empty() {
            Ok(SlotLookup::EmptyCandidateSet { window, gaps })
        } else {
            Ok(SlotLookup::Candidates {
                window,
                gaps,
                candidates: slots,
            })
        }
    }

    /// Displayable gaps and the candidates generated inside them.
    fn offered(&self, window: Interval, occupied: &[Interval]) -> (Vec<Interval>, Vec<Interval>) {
        let gaps = gaps_at_least(&free_gaps(window, occupied), self.policy.display_min_gap());
        let slots = candidates(&gaps, self.policy.slot_duration(), self.policy.step());
        (gaps, slots)
    }

    /// A project's bookings ordered by date, then time.
    pub fn project_bookings(&self, project: &str) -> StoreResult<Vec<BookingRecord>> {
        let project = project.trim();
        let mut bookings: Vec<BookingRecord> = self
            .bookings()?
            .into_iter()
            .filter(|booking| booking.project == project)
            .collect();
        bookings.sort_by(|a, b| a.date.cmp(&b.date).then(a.slot.cmp(&b.slot)));
        Ok(bookings)
    }

    /// Leftover gaps of at least the report threshold, across every published day.
    pub fn free_time_report(&self) -> StoreResult<Vec<FreeTimeRecord>> {
        let occupied = self.occupied_by_day()?;
        let min_gap = self.policy.report_min_gap();
        let mut report = Vec::new();

        for record in self.availability()? {
            let key = (record.project.clone(), record.date);
            let busy = occupied.get(&key).map(Vec::as_slice).unwrap_or_default();
            for gap in gaps_at_least(&free_gaps(record.window, busy), min_gap) {
                report.push(FreeTimeRecord {
                    project: record.project.clone(),
                    date: record.date,
                    gap,
                });
            }
        }
        Ok(report)
    }

    /// Regenerate the free-time report and hand the full set to the sink.
    pub fn refresh_free_time(&self) -> StoreResult<Vec<FreeTimeRecord>> {
        let report = self.free_time_report()?;
        let rows: Vec<_> = report.iter().map(FreeTimeRecord::to_row).collect();
        self.store.replace_free_time(&rows)?;
        log::info!("free-time report rewritten with {} rows", rows.len());
        Ok(report)
    }

    /// Validate the request against a fresh occupancy snapshot and append it.
    ///
    /// Only a slot that [`Self::day`] would offer on that snapshot is accepted.
    ///
    /// Two sessions racing on the same slot can both pass the recheck; the
    /// store's append is the only serialization point.
    pub fn book(&self, request: &BookingRequest) -> Result<BookingOutcome, BookingError> {
        request.validate()?;

        let Some(window) = self.window(&request.project, request.date)? else {
            log::warn!(
                "rejecting booking for '{}' on {}: no availability",
                request.project,
                request.date
            );
            return Ok(BookingOutcome::Rejected(Rejection::NoAvailability));
        };

        // Overlap is checked before candidacy so a stale pick names its conflict.
        let occupied = self.occupied(&request.project, request.date)?;
        let verdict = match check_within(
            request.slot,
            window,
            self.policy.slot_duration(),
            &occupied,
        ) {
            BookingCheck::Accepted if !self.offered(window, &occupied).1.contains(&request.slot) => {
                BookingCheck::Rejected(Rejection::NotOffered {
                    candidate: request.slot,
                })
            }
            verdict => verdict,
        };
        if let BookingCheck::Rejected(rejection) = verdict {
            log::warn!(
                "rejecting booking for '{}' on {}: {rejection}",
                request.project,
                request.date
            );
            return Ok(BookingOutcome::Rejected(rejection));
        }

        let record = request.clone().into_record();
        self.store.append_booking(&record.to_row())?;
        log::info!(
            "booked '{}' {} {} for {} ({})",
            record.project,
            record.date,
            record.slot,
            record.person,
            record.instrument
        );

        // The booking is durable at this point; a stale report is recoverable.
        if let Err(err) = self.refresh_free_time() {
            log::warn!("free-time report refresh failed after booking: {err}");
        }
        Ok(BookingOutcome::Committed(record))
    }

    fn occupied_by_day(&self) -> StoreResult<HashMap<(String, NaiveDate), Vec<Interval>>> {
        let mut by_day: HashMap<(String, NaiveDate), Vec<Interval>> = HashMap::new();
        for booking in self.bookings()? {
            by_day
                .entry((booking.project, booking.date))
                .or_default()
                .push(booking.slot);
        }
        Ok(by_day)
    }
}
