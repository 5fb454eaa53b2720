use crate::error::AppError;
use crate::model::FrequencyMetadata;
use time::format_description::well_known::Rfc3339;
use time::macros::date;
use time::{OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

/// UTC time of day configured for a time-bearing chore.
pub(crate) fn configured(metadata: &FrequencyMetadata) -> Result<Time, AppError> {
    let raw = metadata
        .time
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::invalid_schedule("frequency metadata time is required"))?;
    parse(raw)
}

/// Accepts a full RFC 3339 timestamp or `HH:MM[:SS]` with an optional `Z`/`±HH:MM` suffix.
pub(crate) fn parse(raw: &str) -> Result<Time, AppError> {
    let trimmed = raw.trim();
    if let Ok(moment) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(moment.to_offset(UtcOffset::UTC).time());
    }

    let invalid = || AppError::invalid_schedule(format!("invalid time of day: {trimmed}"));
    let (clock, offset) = split_offset(trimmed).ok_or_else(invalid)?;

    let mut parts = clock.split(':');
    let hour = parse_component(parts.next()).ok_or_else(invalid)?;
    let minute = parse_component(parts.next()).ok_or_else(invalid)?;
    let second = match parts.next() {
        Some(value) => parse_component(Some(value)).ok_or_else(invalid)?,
        None => 0,
    };
    if parts.next().is_some() {
        return Err(invalid());
    }

    let local = Time::from_hms(hour, minute, second).map_err(|_| invalid())?;
    let utc = PrimitiveDateTime::new(date!(2000 - 01 - 01), local)
        .assume_offset(offset)
        .to_offset(UtcOffset::UTC);
    Ok(utc.time())
}

fn split_offset(value: &str) -> Option<(&str, UtcOffset)> {
    if let Some(clock) = value.strip_suffix(['Z', 'z']) {
        return Some((clock, UtcOffset::UTC));
    }

    match value.rfind(['+', '-']) {
        Some(index) if index > 0 => {
            let (clock, suffix) = value.split_at(index);
            let sign: i8 = if suffix.starts_with('-') { -1 } else { 1 };
            let (hours, minutes) = suffix[1..].split_once(':')?;
            let hours = i8::try_from(parse_component(Some(hours))?).ok()?;
            let minutes = i8::try_from(parse_component(Some(minutes))?).ok()?;
            let offset = UtcOffset::from_hms(sign * hours, sign * minutes, 0).ok()?;
            Some((clock, offset))
        }
        Some(_) => None,
        None => Some((value, UtcOffset::UTC)),
    }
}

fn parse_component(value: Option<&str>) -> Option<u8> {
    let value = value?;
    if value.is_empty() || value.len() > 2 || !value.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
