use super::{ChoreId, UserId};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One row per completion or skip, most recent first when supplied as a slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub chore_id: ChoreId,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub performed_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub completed_by: Option<UserId>,
    #[serde(default)]
    pub assigned_to: Option<UserId>,
    #[serde(default)]
    pub note: Option<String>,
    pub status: HistoryStatus,
}

impl HistoryRecord {
    /// Stand-in entry used when a chore has no history yet.
    pub(crate) fn placeholder(assigned_to: UserId) -> Self {
        Self {
            chore_id: 0,
            performed_at: None,
            due_date: None,
            completed_by: None,
            assigned_to: Some(assigned_to),
            note: None,
            status: HistoryStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStatus {
    Pending,
    Completed,
    CompletedLate,
    Missed,
    Skipped,
}

impl HistoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::CompletedLate => "completed_late",
            Self::Missed => "missed",
            Self::Skipped => "skipped",
        }
    }
}
