//! Learns a chore's natural cadence from its completion history.

use crate::model::HistoryRecord;
use time::{Duration, OffsetDateTime, UtcOffset};

/// Weight of each older gap relative to the one after it.
const DECAY_FACTOR: f64 = 0.5;

/// Next due date from a decay-weighted average of the gaps between
/// completions, most recent first. `history` should not include the
/// completion happening at `completed_at`.
///
/// Never fails: with too little signal it falls back to repeating the gap
/// between the prior due date and this completion, or `None` when there is
/// no prior due date either.
pub fn next_due_date(
    prior_due: Option<OffsetDateTime>,
    completed_at: OffsetDateTime,
    history: &[HistoryRecord],
) -> Option<OffsetDateTime> {
    let completed_at = completed_at.to_offset(UtcOffset::UTC);

    let mut moments = Vec::with_capacity(history.len() + 1);
    moments.push(Some(completed_at));
    moments.extend(history.iter().map(|record| record.performed_at));

    let mut weighted_gaps = 0.0;
    let mut total_weight = 0.0;
    let mut pairs = 0usize;

    for (index, pair) in moments.windows(2).enumerate() {
        let (Some(newer), Some(older)) = (pair[0], pair[1]) else {
            continue;
        };
        let gap = (newer - older).as_seconds_f64();
        let weight = DECAY_FACTOR.powi(i32::try_from(index).unwrap_or(i32::MAX));
        weighted_gaps += gap * weight;
        total_weight += weight;
        pairs += 1;
    }

    if pairs == 0 {
        tracing::debug!(
            history_len = history.len(),
            "not enough completion history, repeating the last observed gap"
        );
        return repeat_last_gap(prior_due, completed_at);
    }

    let average = weighted_gaps / total_weight;
    completed_at.checked_add(Duration::seconds(average as i64))
}

fn repeat_last_gap(
    prior_due: Option<OffsetDateTime>,
    completed_at: OffsetDateTime,
) -> Option<OffsetDateTime> {
    let due = prior_due?.to_offset(UtcOffset::UTC);
    completed_at.checked_add(completed_at - due)
}
