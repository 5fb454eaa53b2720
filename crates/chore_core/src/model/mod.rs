mod chore;
mod history;

pub use chore::{
    AssignStrategy, Chore, ChoreId, FrequencyMetadata, FrequencyType, IntervalUnit, UserId,
    WeekPattern,
};
pub use history::{HistoryRecord, HistoryStatus};
