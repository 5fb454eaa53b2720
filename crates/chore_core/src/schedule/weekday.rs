use super::shift;
use crate::error::AppError;
use crate::model::{FrequencyMetadata, WeekPattern};
use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, UtcOffset, Weekday};
use time_tz::{OffsetDateTimeExt, timezones};

/// Occurrence patterns scan at most two years ahead.
const MAX_SEARCH_DAYS: u32 = 730;
const LAST_OCCURRENCE: i32 = -1;

pub(super) fn next_listed_weekday(
    metadata: &FrequencyMetadata,
    base: OffsetDateTime,
) -> Result<OffsetDateTime, AppError> {
    if metadata.days.is_empty() {
        return Err(AppError::invalid_schedule(
            "days_of_the_week requires at least one day",
        ));
    }

    match metadata.week_pattern.unwrap_or(WeekPattern::EveryWeek) {
        WeekPattern::EveryWeek => every_week(metadata, base),
        WeekPattern::WeekOfMonth => occurrence_pattern(metadata, base, Period::Month),
        WeekPattern::WeekOfQuarter => occurrence_pattern(metadata, base, Period::Quarter),
    }
}

/// Steps whole days on the wall clock of `metadata.timezone` (UTC when unset),
/// so a local time of day survives a DST change.
fn every_week(
    metadata: &FrequencyMetadata,
    base: OffsetDateTime,
) -> Result<OffsetDateTime, AppError> {
    let zone = match metadata.timezone.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Some(
            timezones::get_by_name(name)
                .ok_or_else(|| AppError::invalid_schedule(format!("unknown time zone: {name}")))?,
        ),
        _ => None,
    };
    let local = match zone {
        Some(tz) => base.to_timezone(tz),
        None => base,
    };

    for offset in 1..=7 {
        let date = local
            .date()
            .checked_add(Duration::days(offset))
            .ok_or_else(|| AppError::invalid_schedule("next due date is out of range"))?;
        let wall = PrimitiveDateTime::new(date, local.time());
        if !lists_weekday(&metadata.days, wall.weekday()) {
            continue;
        }

        let candidate = wall.assume_offset(local.offset());
        let candidate = match zone {
            // Re-read the zone offset at the candidate instant in case it changed.
            Some(tz) => wall.assume_offset(candidate.to_timezone(tz).offset()),
            None => candidate,
        };
        return Ok(candidate.to_offset(UtcOffset::UTC));
    }

    Err(AppError::invalid_schedule(
        "no matching day of the week found",
    ))
}

fn occurrence_pattern(
    metadata: &FrequencyMetadata,
    base: OffsetDateTime,
    period: Period,
) -> Result<OffsetDateTime, AppError> {
    // `week_numbers` is the older spelling of `occurrences`.
    let occurrences = if metadata.occurrences.is_empty() {
        &metadata.week_numbers
    } else {
        &metadata.occurrences
    };
    if occurrences.is_empty() {
        return Err(AppError::invalid_schedule(format!(
            "{} requires at least one occurrence",
            period.pattern_name()
        )));
    }

    let mut candidate = base;
    for _ in 0..MAX_SEARCH_DAYS {
        candidate = shift(candidate, Duration::days(1))?;
        if !lists_weekday(&metadata.days, candidate.weekday()) {
            continue;
        }

        let date = candidate.date();
        let nth = period.occurrence_of(date);
        if occurrences.contains(&nth)
            || (occurrences.contains(&LAST_OCCURRENCE) && period.is_last_occurrence(date))
        {
            return Ok(candidate);
        }
    }

    Err(AppError::invalid_schedule(
        "no matching date found for the specified occurrence pattern",
    ))
}

fn lists_weekday(days: &[String], weekday: Weekday) -> bool {
    let name = weekday.to_string();
    days.iter().any(|day| day.trim().eq_ignore_ascii_case(&name))
}

#[derive(Debug, Clone, Copy)]
enum Period {
    Month,
    Quarter,
}

impl Period {
    fn pattern_name(self) -> &'static str {
        match self {
            Self::Month => "week_of_month",
            Self::Quarter => "week_of_quarter",
        }
    }

    fn start_of(self, date: Date) -> Date {
        let month = match self {
            Self::Month => date.month(),
            Self::Quarter => quarter_start(date.month()),
        };
        Date::from_calendar_date(date.year(), month, 1).unwrap_or(date)
    }

    fn key(self, date: Date) -> (i32, u8) {
        let month = u8::from(date.month());
        match self {
            Self::Month => (date.year(), month),
            Self::Quarter => (date.year(), (month - 1) / 3),
        }
    }

    /// 1-based count of this weekday within the period, up to and including `date`.
    fn occurrence_of(self, date: Date) -> i32 {
        (date.to_julian_day() - self.start_of(date).to_julian_day()) / 7 + 1
    }

    fn is_last_occurrence(self, date: Date) -> bool {
        match date.checked_add(Duration::weeks(1)) {
            Some(next_week) => self.key(next_week) != self.key(date),
            None => true,
        }
    }
}

fn quarter_start(month: Month) -> Month {
    match month {
        Month::January | Month::February | Month::March => Month::January,
        Month::April | Month::May | Month::June => Month::April,
        Month::July | Month::August | Month::September => Month::July,
        Month::October | Month::November | Month::December => Month::October,
    }
}
