//! Assignment rotator: who does the chore next.

use crate::error::AppError;
use crate::model::{AssignStrategy, Chore, HistoryRecord, UserId};
use rand::Rng;
use rand::seq::SliceRandom;

/// Picks the next assignee for `chore` according to its strategy.
///
/// Counting strategies only ever consider current members of
/// `chore.assignees`; history rows naming anyone else are ignored. Ties go to
/// the member listed first. `Ok(None)` means nobody is assigned.
pub fn next_assignee<R: Rng + ?Sized>(
    chore: &Chore,
    history: &[HistoryRecord],
    performer: UserId,
    rng: &mut R,
) -> Result<Option<UserId>, AppError> {
    let placeholder;
    let history = if history.is_empty() {
        placeholder = [HistoryRecord::placeholder(performer)];
        &placeholder[..]
    } else {
        history
    };

    let next = match chore.assign_strategy {
        AssignStrategy::LeastAssigned => Some(least_counted(
            &chore.assignees,
            history.iter().filter_map(|record| record.assigned_to),
        )?),
        AssignStrategy::LeastCompleted => Some(least_counted(
            &chore.assignees,
            history.iter().filter_map(|record| record.completed_by),
        )?),
        AssignStrategy::Random => Some(
            chore
                .assignees
                .choose(rng)
                .copied()
                .ok_or_else(no_assignees)?,
        ),
        AssignStrategy::KeepLastAssigned => chore.assigned_to,
        AssignStrategy::RandomExceptLastAssigned => {
            let eligible: Vec<UserId> = chore
                .assignees
                .iter()
                .copied()
                .filter(|id| Some(*id) != chore.assigned_to)
                .collect();
            let picked = eligible.choose(rng).copied().ok_or_else(|| {
                AppError::invalid_assignment("no assignees available besides the last assigned")
            })?;
            Some(picked)
        }
        AssignStrategy::RoundRobin => Some(round_robin(&chore.assignees, chore.assigned_to)?),
        AssignStrategy::NoAssignee => None,
    };

    tracing::debug!(
        chore_id = chore.id,
        strategy = %chore.assign_strategy,
        previous = ?chore.assigned_to,
        next = ?next,
        "selected next assignee"
    );
    Ok(next)
}

/// Drops `user` from the chore and re-points the assignment if needed.
pub fn reassign_after_removal<R: Rng + ?Sized>(
    chore: &mut Chore,
    user: UserId,
    rng: &mut R,
) -> Option<UserId> {
    chore.assignees.retain(|id| *id != user);

    chore.assigned_to = if chore.assign_strategy == AssignStrategy::NoAssignee {
        None
    } else if chore.assignees.is_empty() {
        Some(chore.created_by)
    } else {
        chore.assignees.choose(rng).copied()
    };
    chore.assigned_to
}

fn least_counted(
    assignees: &[UserId],
    keys: impl Iterator<Item = UserId>,
) -> Result<UserId, AppError> {
    let mut tally: Vec<(UserId, usize)> = assignees.iter().map(|id| (*id, 0)).collect();
    for key in keys {
        if let Some((_, count)) = tally.iter_mut().find(|(id, _)| *id == key) {
            *count += 1;
        }
    }

    tally
        .iter()
        .min_by_key(|(_, count)| *count)
        .map(|(id, _)| *id)
        .ok_or_else(no_assignees)
}

fn round_robin(assignees: &[UserId], current: Option<UserId>) -> Result<UserId, AppError> {
    if assignees.is_empty() {
        return Err(no_assignees());
    }

    let next_index = current
        .and_then(|current| assignees.iter().position(|id| *id == current))
        .map_or(0, |index| (index + 1) % assignees.len());
    Ok(assignees[next_index])
}

fn no_assignees() -> AppError {
    AppError::invalid_assignment("no assignees available")
}
