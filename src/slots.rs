use crate::interval::Interval;
use chrono::Duration;
use std::collections::HashSet;

/// Enumerate bookable `[start, start + duration)` candidates inside `gaps`.
///
/// Each gap is walked from its start in increments of `step` until the next
/// candidate would run past the gap end. Results are de-duplicated (first
/// occurrence kept) and sorted by start. A non-positive `duration` or `step`
/// yields nothing.
pub fn candidates(gaps: &[Interval], duration: Duration, step: Duration) -> Vec<Interval> {
    if duration <= Duration::zero() || step <= Duration::zero() {
        log::warn!(
            "ignoring slot request with duration {}min and step {}min",
            duration.num_minutes(),
            step.num_minutes()
        );
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut slots = Vec::new();

    for gap in gaps {
        let mut cursor = gap.start();
        // starting_at() is None once the end would pass 23:59
        while let Some(slot) = Interval::starting_at(cursor, duration) {
            if slot.end() > gap.end() {
                break;
            }
            if seen.insert(slot) {
                slots.push(slot);
            }
            match cursor.checked_add(step) {
                Some(next) => cursor = next,
                None => break,
            }
        }
    }

    slots.sort_by_key(|slot| slot.start());
    slots
}
