use crate::completion::{self, Decision};
use crate::error::AppError;
use crate::model::{Chore, HistoryRecord, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use time::OffsetDateTime;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoredSnapshot {
    schema_version: u32,
    chore: Chore,
    #[serde(default)]
    history: Vec<HistoryRecord>,
}

/// A chore together with its history, most recent first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoreSnapshot {
    pub chore: Chore,
    pub history: Vec<HistoryRecord>,
}

pub fn load_snapshot(path: &Path) -> Result<ChoreSnapshot, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let stored: StoredSnapshot =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = stored.chore.assignees.iter().find(|id| !seen.insert(**id)) {
        return Err(AppError::invalid_data(format!(
            "duplicate assignee: {duplicate}"
        )));
    }

    tracing::debug!(
        path = %path.display(),
        chore_id = stored.chore.id,
        history_len = stored.history.len(),
        "loaded chore snapshot"
    );
    Ok(ChoreSnapshot {
        chore: stored.chore,
        history: stored.history,
    })
}

pub fn save_snapshot(path: &Path, snapshot: &ChoreSnapshot) -> Result<(), AppError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredSnapshot {
        schema_version: SCHEMA_VERSION,
        chore: snapshot.chore.clone(),
        history: snapshot.history.clone(),
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    Ok(())
}

/// Writes `decision` back into the snapshot and records the event in its history.
pub fn apply_decision(
    snapshot: &mut ChoreSnapshot,
    decision: &Decision,
    performed_by: UserId,
    performed_at: OffsetDateTime,
    note: Option<String>,
) {
    let record =
        completion::history_record(&snapshot.chore, decision, performed_by, performed_at, note);
    snapshot.history.insert(0, record);

    let chore = &mut snapshot.chore;
    chore.next_due_date = decision.next_due_date;
    chore.assigned_to = decision.next_assignee;
    if decision.becomes_dormant {
        chore.is_active = false;
    }
}
