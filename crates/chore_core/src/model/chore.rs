use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

pub type ChoreId = i64;
pub type UserId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chore {
    pub id: ChoreId,
    #[serde(default)]
    pub name: String,
    pub frequency_type: FrequencyType,
    #[serde(default)]
    pub frequency: i32,
    #[serde(default)]
    pub frequency_metadata: FrequencyMetadata,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub next_due_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub is_rolling: bool,
    pub assign_strategy: AssignStrategy,
    #[serde(default)]
    pub assigned_to: Option<UserId>,
    #[serde(default)]
    pub assignees: Vec<UserId>,
    #[serde(default)]
    pub created_by: UserId,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Hours before the due date from which a completion is accepted.
    #[serde(default)]
    pub completion_window: Option<i64>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyMetadata {
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(default)]
    pub months: Vec<String>,
    #[serde(default)]
    pub unit: Option<IntervalUnit>,
    /// RFC 3339 timestamp or `HH:MM[:SS]` with an optional offset.
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub week_pattern: Option<WeekPattern>,
    /// 1-based occurrence of the weekday, `-1` for the last one.
    #[serde(default)]
    pub occurrences: Vec<i32>,
    #[serde(default)]
    pub week_numbers: Vec<i32>,
    /// IANA zone whose calendar decides which weekday an every-week chore lands on.
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum FrequencyType {
    Once,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Adaptive,
    Interval,
    DaysOfTheWeek,
    DayOfTheMonth,
    Trigger,
    NoRepeat,
}

impl FrequencyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Adaptive => "adaptive",
            Self::Interval => "interval",
            Self::DaysOfTheWeek => "days_of_the_week",
            Self::DayOfTheMonth => "day_of_the_month",
            Self::Trigger => "trigger",
            Self::NoRepeat => "no_repeat",
        }
    }

    /// Kinds that never produce another occurrence.
    pub fn is_one_shot(&self) -> bool {
        matches!(self, Self::Once | Self::NoRepeat | Self::Trigger)
    }

    pub fn uses_time_of_day(&self) -> bool {
        matches!(
            self,
            Self::Interval | Self::DaysOfTheWeek | Self::DayOfTheMonth
        )
    }
}

impl FromStr for FrequencyType {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let kind = match raw.trim() {
            "once" => Self::Once,
            "daily" => Self::Daily,
            "weekly" => Self::Weekly,
            "monthly" => Self::Monthly,
            "yearly" => Self::Yearly,
            "adaptive" => Self::Adaptive,
            "interval" => Self::Interval,
            "days_of_the_week" => Self::DaysOfTheWeek,
            "day_of_the_month" => Self::DayOfTheMonth,
            "trigger" => Self::Trigger,
            "no_repeat" => Self::NoRepeat,
            other => {
                return Err(AppError::invalid_schedule(format!(
                    "invalid frequency type: {other}"
                )));
            }
        };
        Ok(kind)
    }
}

impl TryFrom<String> for FrequencyType {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for FrequencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum IntervalUnit {
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl FromStr for IntervalUnit {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "hours" => Ok(Self::Hours),
            "days" => Ok(Self::Days),
            "weeks" => Ok(Self::Weeks),
            "months" => Ok(Self::Months),
            "years" => Ok(Self::Years),
            other => Err(AppError::invalid_schedule(format!(
                "invalid frequency unit: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for IntervalUnit {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekPattern {
    EveryWeek,
    WeekOfMonth,
    WeekOfQuarter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum AssignStrategy {
    LeastAssigned,
    LeastCompleted,
    Random,
    KeepLastAssigned,
    RandomExceptLastAssigned,
    RoundRobin,
    NoAssignee,
}

impl AssignStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeastAssigned => "least_assigned",
            Self::LeastCompleted => "least_completed",
            Self::Random => "random",
            Self::KeepLastAssigned => "keep_last_assigned",
            Self::RandomExceptLastAssigned => "random_except_last_assigned",
            Self::RoundRobin => "round_robin",
            Self::NoAssignee => "no_assignee",
        }
    }
}

impl FromStr for AssignStrategy {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let strategy = match raw.trim() {
            "least_assigned" => Self::LeastAssigned,
            "least_completed" => Self::LeastCompleted,
            "random" => Self::Random,
            "keep_last_assigned" => Self::KeepLastAssigned,
            "random_except_last_assigned" => Self::RandomExceptLastAssigned,
            "round_robin" => Self::RoundRobin,
            "no_assignee" => Self::NoAssignee,
            other => {
                return Err(AppError::invalid_assignment(format!(
                    "invalid assign strategy: {other}"
                )));
            }
        };
        Ok(strategy)
    }
}

impl TryFrom<String> for AssignStrategy {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for AssignStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
