//! Recurrence engine: when is a chore due after a completion.
//!
//! Fixed schedules advance from their own prior due date no matter when the
//! completion happened; rolling schedules re-anchor on the completion time.

mod month_day;
pub(crate) mod time_of_day;
mod weekday;

use crate::adaptive;
use crate::error::AppError;
use crate::model::{Chore, FrequencyType, IntervalUnit};
use time::{Date, Duration, Month, OffsetDateTime, UtcOffset};

/// Next due date for `chore` completed at `completed_at`, or `None` when the
/// chore never repeats.
pub fn next_due_date(
    chore: &Chore,
    completed_at: OffsetDateTime,
) -> Result<Option<OffsetDateTime>, AppError> {
    let completed_at = completed_at.to_offset(UtcOffset::UTC);
    let prior_due = chore.next_due_date.map(|due| due.to_offset(UtcOffset::UTC));

    let next = match chore.frequency_type {
        FrequencyType::Once | FrequencyType::NoRepeat | FrequencyType::Trigger => None,
        FrequencyType::Adaptive => adaptive::next_due_date(prior_due, completed_at, &[]),
        FrequencyType::Daily => {
            let base = base_date(chore, prior_due, completed_at)?;
            Some(shift(base, Duration::days(1))?)
        }
        FrequencyType::Weekly => {
            let base = base_date(chore, prior_due, completed_at)?;
            Some(shift(base, Duration::weeks(1))?)
        }
        FrequencyType::Monthly => {
            let base = base_date(chore, prior_due, completed_at)?;
            Some(add_months(base, 1)?)
        }
        FrequencyType::Yearly => {
            let base = base_date(chore, prior_due, completed_at)?;
            Some(add_months(base, 12)?)
        }
        FrequencyType::Interval => {
            let base = base_date(chore, prior_due, completed_at)?;
            Some(advance_interval(chore, base)?)
        }
        FrequencyType::DaysOfTheWeek => {
            let base = base_date(chore, prior_due, completed_at)?;
            Some(weekday::next_listed_weekday(&chore.frequency_metadata, base)?)
        }
        FrequencyType::DayOfTheMonth => {
            let base = base_date(chore, prior_due, completed_at)?;
            Some(month_day::next_listed_month_day(
                chore,
                base,
                prior_due,
                completed_at,
            )?)
        }
    };

    tracing::debug!(
        chore_id = chore.id,
        frequency_type = %chore.frequency_type,
        is_rolling = chore.is_rolling,
        next_due_date = ?next,
        "computed next due date"
    );
    Ok(next)
}

fn base_date(
    chore: &Chore,
    prior_due: Option<OffsetDateTime>,
    completed_at: OffsetDateTime,
) -> Result<OffsetDateTime, AppError> {
    let mut base = match prior_due {
        Some(due) if !chore.is_rolling => due,
        _ => completed_at,
    };

    if chore.frequency_type.uses_time_of_day() {
        let time = time_of_day::configured(&chore.frequency_metadata)?;
        base = base.replace_time(time);
        if base < completed_at {
            base = shift(base, Duration::days(1))?;
        }
    }

    Ok(base)
}

fn advance_interval(chore: &Chore, base: OffsetDateTime) -> Result<OffsetDateTime, AppError> {
    let unit = chore
        .frequency_metadata
        .unit
        .ok_or_else(|| AppError::invalid_schedule("interval requires a frequency unit"))?;
    let count = i64::from(chore.frequency);

    match unit {
        IntervalUnit::Hours => shift(base, Duration::hours(count)),
        IntervalUnit::Days => shift(base, Duration::days(count)),
        IntervalUnit::Weeks => shift(base, Duration::weeks(count)),
        IntervalUnit::Months => add_months(base, count),
        IntervalUnit::Years => add_months(base, count * 12),
    }
}

pub(crate) fn shift(moment: OffsetDateTime, by: Duration) -> Result<OffsetDateTime, AppError> {
    moment
        .checked_add(by)
        .ok_or_else(|| AppError::invalid_schedule("next due date is out of range"))
}

/// Calendar-month arithmetic. A day past the end of the target month rolls
/// into the following month, so Jan 31 plus one month is Mar 3 (Mar 2 in a
/// leap year).
pub(crate) fn add_months(moment: OffsetDateTime, months: i64) -> Result<OffsetDateTime, AppError> {
    let (year, month) = shift_month(moment.year(), moment.month(), months)?;
    let date = Date::from_calendar_date(year, month, 1)
        .map_err(|err| AppError::invalid_schedule(err.to_string()))?
        .checked_add(Duration::days(i64::from(moment.day()) - 1))
        .ok_or_else(|| AppError::invalid_schedule("next due date is out of range"))?;
    Ok(moment.replace_date(date))
}

pub(crate) fn shift_month(year: i32, month: Month, offset: i64) -> Result<(i32, Month), AppError> {
    let out_of_range = || AppError::invalid_schedule("next due date is out of range");
    let index = i64::from(year) * 12 + i64::from(u8::from(month)) - 1 + offset;
    let year = i32::try_from(index.div_euclid(12)).map_err(|_| out_of_range())?;
    let month = u8::try_from(index.rem_euclid(12) + 1)
        .ok()
        .and_then(|number| Month::try_from(number).ok())
        .ok_or_else(out_of_range)?;
    Ok((year, month))
}

#[cfg(test)]
mod tests {
    use super::{add_months, next_due_date};
    use crate::model::{AssignStrategy, Chore, FrequencyMetadata, FrequencyType, IntervalUnit};
    use time::macros::datetime;
    use time::{Duration, OffsetDateTime};

    fn chore(frequency_type: FrequencyType) -> Chore {
        Chore {
            id: 1,
            name: "dishes".to_string(),
            frequency_type,
            frequency: 0,
            frequency_metadata: FrequencyMetadata {
                time: Some("2024-07-07T14:30:00-04:00".to_string()),
                ..FrequencyMetadata::default()
            },
            next_due_date: None,
            is_rolling: false,
            assign_strategy: AssignStrategy::KeepLastAssigned,
            assigned_to: Some(1),
            assignees: vec![1],
            created_by: 1,
            is_active: true,
            completion_window: None,
        }
    }

    fn now() -> OffsetDateTime {
        datetime!(2025-01-02 00:15 UTC)
    }

    #[test]
    fn one_shot_kinds_never_reschedule() {
        for kind in [
            FrequencyType::Once,
            FrequencyType::NoRepeat,
            FrequencyType::Trigger,
        ] {
            let mut task = chore(kind);
            task.next_due_date = Some(now());
            assert_eq!(next_due_date(&task, now()).unwrap(), None);
            assert_eq!(
                next_due_date(&task, now() + Duration::days(400)).unwrap(),
                None
            );
        }
    }

    #[test]
    fn daily_ignores_time_of_day() {
        let mut task = chore(FrequencyType::Daily);
        task.next_due_date = Some(now());

        let next = next_due_date(&task, now()).unwrap();

        assert_eq!(next, Some(datetime!(2025-01-03 00:15 UTC)));
    }

    #[test]
    fn fixed_schedule_advances_from_prior_due_date() {
        let mut task = chore(FrequencyType::Weekly);
        task.next_due_date = Some(now());

        let late = next_due_date(&task, now() + Duration::days(5)).unwrap();
        let early = next_due_date(&task, now() - Duration::days(2)).unwrap();

        assert_eq!(late, Some(datetime!(2025-01-09 00:15 UTC)));
        assert_eq!(early, late);
    }

    #[test]
    fn rolling_schedule_reanchors_on_completion() {
        let mut task = chore(FrequencyType::Weekly);
        task.next_due_date = Some(now());
        task.is_rolling = true;

        let next = next_due_date(&task, now() + Duration::days(5)).unwrap();

        assert_eq!(next, Some(datetime!(2025-01-14 00:15 UTC)));
    }

    #[test]
    fn missing_due_date_uses_completion_time() {
        let task = chore(FrequencyType::Monthly);
        let next = next_due_date(&task, now() + Duration::days(2)).unwrap();
        assert_eq!(next, Some(datetime!(2025-02-04 00:15 UTC)));

        let task = chore(FrequencyType::Yearly);
        let next = next_due_date(&task, now()).unwrap();
        assert_eq!(next, Some(datetime!(2026-01-02 00:15 UTC)));
    }

    #[test]
    fn completion_time_is_normalized_to_utc() {
        let task = chore(FrequencyType::Daily);
        let completed = datetime!(2025-01-01 19:15 -5);

        let next = next_due_date(&task, completed).unwrap().unwrap();

        assert_eq!(next, datetime!(2025-01-03 00:15 UTC));
        assert!(next.offset().is_utc());
    }

    #[test]
    fn interval_applies_time_of_day_then_advances() {
        let cases = [
            (IntervalUnit::Days, 2, datetime!(2025-01-04 18:30 UTC)),
            (IntervalUnit::Weeks, 4, datetime!(2025-01-30 18:30 UTC)),
            (IntervalUnit::Months, 3, datetime!(2025-04-02 18:30 UTC)),
            (IntervalUnit::Years, 2, datetime!(2027-01-02 18:30 UTC)),
            (IntervalUnit::Hours, 6, datetime!(2025-01-03 00:30 UTC)),
        ];

        for (unit, count, expected) in cases {
            let mut task = chore(FrequencyType::Interval);
            task.frequency = count;
            task.frequency_metadata.unit = Some(unit);

            let next = next_due_date(&task, now()).unwrap();
            assert_eq!(next, Some(expected), "unit {unit:?}");
        }
    }

    #[test]
    fn time_of_day_in_the_past_moves_a_day_forward() {
        let mut task = chore(FrequencyType::Interval);
        task.frequency = 1;
        task.frequency_metadata.unit = Some(IntervalUnit::Days);
        task.frequency_metadata.time = Some("08:00Z".to_string());

        let next = next_due_date(&task, datetime!(2025-01-02 10:00 UTC)).unwrap();

        assert_eq!(next, Some(datetime!(2025-01-04 08:00 UTC)));
    }

    #[test]
    fn interval_without_unit_is_an_error() {
        let mut task = chore(FrequencyType::Interval);
        task.frequency = 2;

        let err = next_due_date(&task, now()).unwrap_err();

        assert_eq!(err.code(), "invalid_schedule");
    }

    #[test]
    fn time_bearing_kinds_reject_bad_time() {
        let mut task = chore(FrequencyType::Interval);
        task.frequency = 2;
        task.frequency_metadata.unit = Some(IntervalUnit::Days);
        task.frequency_metadata.time = Some("half past nine".to_string());

        let err = next_due_date(&task, now()).unwrap_err();

        assert_eq!(err.message(), "invalid time of day: half past nine");
    }

    #[test]
    fn adaptive_without_history_extends_the_observed_gap() {
        let mut task = chore(FrequencyType::Adaptive);
        task.next_due_date = Some(now() - Duration::days(3));

        let next = next_due_date(&task, now()).unwrap();

        assert_eq!(next, Some(now() + Duration::days(3)));
    }

    #[test]
    fn monthly_due_on_the_31st_rolls_into_the_following_month() {
        let mut task = chore(FrequencyType::Monthly);
        task.next_due_date = Some(datetime!(2025-01-31 09:00 UTC));

        let next = next_due_date(&task, datetime!(2025-01-31 09:00 UTC)).unwrap();

        assert_eq!(next, Some(datetime!(2025-03-03 09:00 UTC)));
    }

    #[test]
    fn add_months_rolls_past_month_end() {
        let next = add_months(datetime!(2025-01-31 09:00 UTC), 1).unwrap();
        assert_eq!(next, datetime!(2025-03-03 09:00 UTC));

        let leap = add_months(datetime!(2024-02-29 09:00 UTC), 12).unwrap();
        assert_eq!(leap, datetime!(2025-03-01 09:00 UTC));

        let leap_month = add_months(datetime!(2024-01-31 09:00 UTC), 1).unwrap();
        assert_eq!(leap_month, datetime!(2024-03-02 09:00 UTC));

        let back = add_months(datetime!(2025-01-15 09:00 UTC), -1).unwrap();
        assert_eq!(back, datetime!(2024-12-15 09:00 UTC));
    }

    fn weekly_trash(days: &[&str]) -> Chore {
        let mut task = chore(FrequencyType::DaysOfTheWeek);
        task.frequency_metadata.days = days.iter().map(|day| day.to_string()).collect();
        task.frequency_metadata.time = Some("07:30Z".to_string());
        task
    }

    #[test]
    fn days_of_the_week_fixed_advances_from_prior_due_date() {
        // Monday May 5th 2025.
        let mut task = weekly_trash(&["monday", "thursday"]);
        task.next_due_date = Some(datetime!(2025-05-05 07:30 UTC));

        let next = next_due_date(&task, datetime!(2025-05-04 20:00 UTC)).unwrap();

        assert_eq!(next, Some(datetime!(2025-05-08 07:30 UTC)));
    }

    #[test]
    fn days_of_the_week_rolling_reanchors_on_completion() {
        let mut task = weekly_trash(&["monday", "thursday"]);
        task.next_due_date = Some(datetime!(2025-05-05 07:30 UTC));
        task.is_rolling = true;

        let next = next_due_date(&task, datetime!(2025-05-08 06:00 UTC)).unwrap();

        assert_eq!(next, Some(datetime!(2025-05-12 07:30 UTC)));
    }

    #[test]
    fn days_of_the_week_past_time_of_day_starts_a_day_later() {
        let mut task = weekly_trash(&["friday"]);
        task.is_rolling = true;

        // Thursday May 8th, before and after the 07:30 slot.
        let before = next_due_date(&task, datetime!(2025-05-08 06:00 UTC)).unwrap();
        let after = next_due_date(&task, datetime!(2025-05-08 09:00 UTC)).unwrap();

        assert_eq!(before, Some(datetime!(2025-05-09 07:30 UTC)));
        assert_eq!(after, Some(datetime!(2025-05-16 07:30 UTC)));
    }

    #[test]
    fn days_of_the_week_uses_the_chore_time_zone() {
        let mut task = weekly_trash(&["monday"]);
        task.frequency_metadata.time = Some("20:00-05:00".to_string());
        let completed = datetime!(2025-01-01 12:00 UTC);

        let utc = next_due_date(&task, completed).unwrap();
        task.frequency_metadata.timezone = Some("America/New_York".to_string());
        let local = next_due_date(&task, completed).unwrap();

        // Monday 01:00 UTC is Sunday evening in New York.
        assert_eq!(utc, Some(datetime!(2025-01-06 01:00 UTC)));
        assert_eq!(local, Some(datetime!(2025-01-07 01:00 UTC)));
    }
}
