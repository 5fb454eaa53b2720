use super::{shift, shift_month};
use crate::error::AppError;
use crate::model::Chore;
use time::{Date, Duration, OffsetDateTime, Time};

pub(super) fn next_listed_month_day(
    chore: &Chore,
    base: OffsetDateTime,
    prior_due: Option<OffsetDateTime>,
    completed_at: OffsetDateTime,
) -> Result<OffsetDateTime, AppError> {
    let months = &chore.frequency_metadata.months;
    let target_day = u8::try_from(chore.frequency)
        .ok()
        .filter(|day| (1..=31).contains(day))
        .ok_or_else(|| {
            AppError::invalid_schedule(format!("invalid day of the month: {}", chore.frequency))
        })?;
    if months.is_empty() {
        return Err(AppError::invalid_schedule(
            "day_of_the_month requires at least one month",
        ));
    }

    // An early completion of a rolling chore must not land on the same due date again.
    let mut base = base;
    if chore.is_rolling
        && let Some(due) = prior_due
    {
        let just_after_due = shift(due, Duration::seconds(1))?;
        if completed_at < just_after_due {
            base = just_after_due;
        }
    }

    // Year and month both have to match; a completion a year later in the
    // same month still starts the scan in that month.
    let first_offset = match prior_due {
        Some(due) if (due.year(), due.month()) == (base.year(), base.month()) => 1,
        _ => 0,
    };
    let time = Time::from_hms(base.hour(), base.minute(), 0)
        .map_err(|err| AppError::invalid_schedule(err.to_string()))?;

    for offset in first_offset..first_offset + 12 {
        let (year, month) = shift_month(base.year(), base.month(), offset)?;
        let name = month.to_string();
        if !months.iter().any(|listed| listed.trim().eq_ignore_ascii_case(&name)) {
            continue;
        }

        let day = target_day.min(time::util::days_in_year_month(year, month));
        let date = Date::from_calendar_date(year, month, day)
            .map_err(|err| AppError::invalid_schedule(err.to_string()))?;
        return Ok(date.with_time(time).assume_utc());
    }

    Err(AppError::invalid_schedule("no matching month found"))
}
