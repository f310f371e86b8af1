//! Tolerant `Date` header parsing

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike};
use regex::{Captures, Regex};

/// Local send time as the sender's clock showed it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentAt {
    /// 0 = Monday .. 6 = Sunday
    pub day_of_week: u32,
    pub hour: u32,
    /// Seconds east of UTC
    pub offset_seconds: i64,
}

// "[Wkd,] 1 Jan 2024 10:00[:00] [zone]"
static DAY_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:[a-z]+\s*,?\s*)?(?P<day>\d{1,2})[\s-]+(?P<month>[a-z]{3})[a-z]*\.?[\s-]+(?P<year>\d{2,4}),?\s+(?P<hour>\d{1,2})[:.](?P<minute>\d{1,2})(?:[:.](?P<second>\d{1,2}))?\s*(?:(?P<sign>[+-])(?P<offset>\d{1,4})|(?P<zone>[a-z]+))?",
    )
    .unwrap()
});

// "[Wkd,] Jan 1 2024 10:00[:00] [zone]"
static MONTH_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:[a-z]+\s*,?\s*)?(?P<month>[a-z]{3})[a-z]*\.?\s+(?P<day>\d{1,2}),?\s+(?P<year>\d{2,4}),?\s+(?P<hour>\d{1,2})[:.](?P<minute>\d{1,2})(?:[:.](?P<second>\d{1,2}))?\s*(?:(?P<sign>[+-])(?P<offset>\d{1,4})|(?P<zone>[a-z]+))?",
    )
    .unwrap()
});

/// Parse a `Date` header value
///
/// Strict RFC 2822 first for four-digit years, then a tolerant pass that
/// ignores the weekday name, widens two-digit years, accepts obsolete zone
/// names and offsets beyond a day. Returns `None` when no date can be read or
/// the calendar date or time does not exist.
#[must_use]
pub fn parse_date(value: &str) -> Option<SentAt> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let tolerant = DAY_FIRST
        .captures(value)
        .or_else(|| MONTH_FIRST.captures(value));

    // Years shorter than four digits are widened by `widen_year`, never by chrono
    let short_year = tolerant
        .as_ref()
        .and_then(|caps| caps.name("year"))
        .is_some_and(|year| year.as_str().len() < 4);

    if !short_year && let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(SentAt {
            day_of_week: dt.weekday().num_days_from_monday(),
            hour: dt.hour(),
            offset_seconds: i64::from(dt.offset().local_minus_utc()),
        });
    }

    tolerant.and_then(|caps| from_captures(&caps))
}

fn from_captures(caps: &Captures<'_>) -> Option<SentAt> {
    let number = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<u32>().ok());

    let day = number("day")?;
    let month = month_number(caps.name("month")?.as_str())?;
    let year = widen_year(number("year")?);
    let hour = number("hour")?;
    let minute = number("minute")?;
    let second = number("second").unwrap_or(0);

    let date = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)?;
    NaiveTime::from_hms_opt(hour, minute, second)?;

    let offset_seconds = match (caps.name("sign"), caps.name("offset"), caps.name("zone")) {
        (Some(sign), Some(digits), _) => {
            let hhmm: i64 = digits.as_str().parse().ok()?;
            let seconds = (hhmm / 100) * 3600 + (hhmm % 100) * 60;
            if sign.as_str() == "-" { -seconds } else { seconds }
        }
        (_, _, Some(zone)) => named_zone_offset(zone.as_str()),
        _ => 0,
    };

    Some(SentAt {
        day_of_week: date.weekday().num_days_from_monday(),
        hour,
        offset_seconds,
    })
}

const fn widen_year(year: u32) -> u32 {
    match year {
        0..=68 => year + 2000,
        69..=99 => year + 1900,
        _ => year,
    }
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Offset of an obsolete zone name; unknown names count as UTC
fn named_zone_offset(zone: &str) -> i64 {
    let hours: i64 = match zone.to_ascii_uppercase().as_str() {
        "AST" => -4,
        "ADT" => -3,
        "EST" => -5,
        "EDT" => -4,
        "CST" => -6,
        "CDT" => -5,
        "MST" => -7,
        "MDT" => -6,
        "PST" => -8,
        "PDT" => -7,
        _ => 0,
    };
    hours * 3600
}
