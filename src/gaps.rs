use crate::interval::Interval;
use chrono::Duration;

/// Free sub-intervals of `total` not covered by any of `occupied`.
///
/// The result is ascending, non-overlapping and maximal: two consecutive gaps
/// never touch. Occupied intervals may overlap, nest, or reach outside
/// `total`; whatever lies outside is ignored.
pub fn free_gaps(total: Interval, occupied: &[Interval]) -> Vec<Interval> {
    let mut busy = occupied.to_vec();
    busy.sort();

    let mut gaps = Vec::with_capacity(busy.len() + 1);
    let mut cursor = total.start();

    for block in busy {
        if cursor >= total.end() {
            break;
        }
        if block.start() > cursor {
            let gap_end = block.start().min(total.end());
            gaps.push(Interval::between(cursor, gap_end));
        }
        // max() absorbs nested and overlapping blocks
        cursor = cursor.max(block.end());
    }

    if cursor < total.end() {
        gaps.push(Interval::between(cursor, total.end()));
    }

    log::debug!(
        "window {total}: {} occupied -> {} gaps",
        occupied.len(),
        gaps.len()
    );
    gaps
}

/// Keep only gaps lasting at least `min`.
pub fn gaps_at_least(gaps: &[Interval], min: Duration) -> Vec<Interval> {
    gaps.iter()
        .copied()
        .filter(|gap| gap.duration() >= min)
        .collect()
}
