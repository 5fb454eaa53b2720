//! Sequences the recurrence engine, adaptive estimator and assignment rotator
//! around a completion or skip event.

use crate::adaptive;
use crate::assignee;
use crate::error::AppError;
use crate::model::{Chore, FrequencyType, HistoryRecord, HistoryStatus, UserId};
use crate::schedule;
use rand::Rng;
use serde::Serialize;
use time::{Duration, OffsetDateTime};

pub const DEFAULT_ADAPTIVE_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionOptions {
    /// Most recent history entries fed to the adaptive estimator.
    pub adaptive_window: usize,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            adaptive_window: DEFAULT_ADAPTIVE_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionEvent {
    pub performed_by: UserId,
    pub performed_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipEvent {
    pub performed_by: UserId,
    pub performed_at: OffsetDateTime,
    pub rotate_assignee: bool,
}

/// What the caller should persist after an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    #[serde(with = "time::serde::rfc3339::option")]
    pub next_due_date: Option<OffsetDateTime>,
    pub next_assignee: Option<UserId>,
    /// The chore has no further occurrence and should be marked inactive.
    pub becomes_dormant: bool,
    /// Status of the history row recording this event.
    pub status: HistoryStatus,
}

/// Decides the chore's next state after a completion. `history` is most
/// recent first and excludes this completion.
pub fn complete<R: Rng + ?Sized>(
    chore: &Chore,
    history: &[HistoryRecord],
    event: &CompletionEvent,
    options: &CompletionOptions,
    rng: &mut R,
) -> Result<Decision, AppError> {
    ensure_within_window(chore, event.performed_at)?;

    let next_due_date = if chore.frequency_type == FrequencyType::Adaptive {
        let window = &history[..history.len().min(options.adaptive_window)];
        adaptive::next_due_date(chore.next_due_date, event.performed_at, window)
    } else {
        schedule::next_due_date(chore, event.performed_at)?
    };

    let status = match chore.next_due_date {
        Some(due) if event.performed_at > due => HistoryStatus::CompletedLate,
        _ => HistoryStatus::Completed,
    };

    let Some(next_due_date) = next_due_date else {
        tracing::info!(chore_id = chore.id, "chore has no further occurrence");
        return Ok(Decision {
            next_due_date: None,
            next_assignee: Some(event.performed_by),
            becomes_dormant: true,
            status,
        });
    };

    let next_assignee = assignee::next_assignee(chore, history, event.performed_by, rng)?;
    Ok(Decision {
        next_due_date: Some(next_due_date),
        next_assignee,
        becomes_dormant: false,
        status,
    })
}

/// Decides the chore's next state after a skip. Skips always follow the
/// recurrence engine and keep the assignee unless rotation is requested.
pub fn skip<R: Rng + ?Sized>(
    chore: &Chore,
    history: &[HistoryRecord],
    event: &SkipEvent,
    rng: &mut R,
) -> Result<Decision, AppError> {
    // Anchoring an adaptive skip on its own due date would reproduce that date.
    let reference = match chore.next_due_date {
        Some(due) if chore.frequency_type != FrequencyType::Adaptive => due,
        _ => event.performed_at,
    };
    let next_due_date = schedule::next_due_date(chore, reference)?;

    let next_assignee = match next_due_date {
        Some(_) if event.rotate_assignee => {
            assignee::next_assignee(chore, history, event.performed_by, rng)?
        }
        _ => chore.assigned_to,
    };

    Ok(Decision {
        next_due_date,
        next_assignee,
        becomes_dormant: next_due_date.is_none(),
        status: HistoryStatus::Skipped,
    })
}

/// History row the caller appends for an event that produced `decision`.
pub fn history_record(
    chore: &Chore,
    decision: &Decision,
    performed_by: UserId,
    performed_at: OffsetDateTime,
    note: Option<String>,
) -> HistoryRecord {
    HistoryRecord {
        chore_id: chore.id,
        performed_at: Some(performed_at),
        due_date: chore.next_due_date,
        completed_by: Some(performed_by),
        assigned_to: chore.assigned_to,
        note,
        status: decision.status,
    }
}

fn ensure_within_window(chore: &Chore, performed_at: OffsetDateTime) -> Result<(), AppError> {
    let (Some(hours), Some(due)) = (chore.completion_window, chore.next_due_date) else {
        return Ok(());
    };

    let opens_at = hours
        .checked_mul(3600)
        .map(Duration::seconds)
        .and_then(|window| due.checked_sub(window))
        .ok_or_else(|| AppError::invalid_data("completion window is out of range"))?;
    if performed_at < opens_at {
        return Err(AppError::invalid_input("chore is out of completion window"));
    }
    Ok(())
}
