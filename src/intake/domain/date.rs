//! Date interpretation for due-date phrases.
//!
//! All functions are pure: the current instant is passed in, and results are
//! expressed in the same time zone as that instant. Callers wanting an
//! end-of-day deadline apply [`end_of_day`] to the parsed value.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, TimeDelta, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Language codes whose numeric dates are written day first.
const DAY_FIRST_LANGUAGES: [&str; 6] = ["de", "fr", "es", "it", "nl", "pt"];

/// Canonical weekday names, Sunday first.
const WEEKDAY_NAMES: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

// `%.f` also accepts a missing fraction.
const NAIVE_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Locale tag steering numeric date interpretation, e.g. `de-CH` or `en-US`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    /// Wraps a locale tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the locale tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` when numeric dates are read as day, month, year.
    #[must_use]
    pub fn is_day_first(&self) -> bool {
        let tag = self.0.trim().to_ascii_lowercase();
        DAY_FIRST_LANGUAGES
            .iter()
            .any(|language| tag.starts_with(language))
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new("en-US")
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parses a free-text or near-ISO date expression relative to `now`.
///
/// Rules are tried in order and the first match wins: `today`, `tomorrow`,
/// `in <N> day(s)`, `next <weekday>`, a standard timestamp, and finally a
/// numeric date split on `.`, `/`, or `-` whose component order follows the
/// locale. Returns `None` when nothing matches or the date does not exist.
///
/// # Examples
///
/// ```rust
/// use chrono::{Datelike, TimeZone, Utc};
/// use kanban_intake::intake::domain::{Locale, parse_date};
///
/// let now = Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0).single().expect("valid instant");
/// let parsed = parse_date("30.10.2025", &Locale::new("de-CH"), &now).expect("parses");
/// assert_eq!((parsed.day(), parsed.month(), parsed.year()), (30, 10, 2025));
/// ```
#[must_use]
pub fn parse_date<Tz: TimeZone>(
    text: &str,
    locale: &Locale,
    now: &DateTime<Tz>,
) -> Option<DateTime<Tz>> {
    let input = text.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    if input == "today" {
        return Some(now.clone());
    }
    if input == "tomorrow" {
        return add_days(now, 1);
    }

    parse_in_days(&input, now)
        .or_else(|| parse_next_weekday(&input, now))
        .or_else(|| parse_timestamp(text, &now.timezone()))
        .or_else(|| parse_numeric_date(text, locale, now))
}

/// Parses a standard timestamp: RFC 3339, RFC 2822, or an ISO-like local
/// date or date-time, which is read in the zone `tz`.
#[must_use]
pub fn parse_timestamp<Tz: TimeZone>(text: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(tz));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(parsed.with_timezone(tz));
    }

    let naive = NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;
    tz.from_local_datetime(&naive).earliest()
}

/// Moves an instant to 23:59:59.999 on the same local calendar day.
#[must_use]
pub fn end_of_day<Tz: TimeZone>(instant: &DateTime<Tz>) -> DateTime<Tz> {
    instant
        .date_naive()
        .and_hms_milli_opt(23, 59, 59, 999)
        .and_then(|naive| instant.timezone().from_local_datetime(&naive).latest())
        .unwrap_or_else(|| instant.clone())
}

/// Returns the end of the following week's Sunday, 7 to 13 days ahead.
///
/// The offset is `((7 - weekday) mod 7) + 7` with Sunday as day zero, and the
/// time is set to 23:59:59.999.
#[must_use]
pub fn end_of_next_week<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let weekday = u64::from(now.weekday().num_days_from_sunday());
    let days_to_add = if weekday == 0 { 7 } else { 14 - weekday };
    let target = add_days(now, days_to_add).unwrap_or_else(|| {
        now.clone() + TimeDelta::days(i64::try_from(days_to_add).unwrap_or(7))
    });
    end_of_day(&target)
}

fn add_days<Tz: TimeZone>(now: &DateTime<Tz>, days: u64) -> Option<DateTime<Tz>> {
    now.clone().checked_add_days(Days::new(days))
}

/// Handles the `in <N> day(s)` shortcut; `N` is the first number in the text.
fn parse_in_days<Tz: TimeZone>(input: &str, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    if !input.starts_with("in ") || !input.contains("day") {
        return None;
    }
    let days = first_number(input)?;
    if days == 0 {
        return None;
    }
    add_days(now, days)
}

/// Handles `next <weekday>`, matching the first three letters of the name.
fn parse_next_weekday<Tz: TimeZone>(input: &str, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let day_name = input.strip_prefix("next ")?.trim();
    let prefix: String = day_name.chars().take(3).collect();
    let target_index = WEEKDAY_NAMES
        .iter()
        .position(|name| name.starts_with(prefix.as_str()))?;
    let target = u32::try_from(target_index).ok()?;
    let current = now.weekday().num_days_from_sunday();
    // "next" never means today: the same weekday is a full week away.
    let ahead = if target > current {
        target - current
    } else {
        target + 7 - current
    };
    add_days(now, u64::from(ahead))
}

fn parse_numeric_date<Tz: TimeZone>(
    text: &str,
    locale: &Locale,
    now: &DateTime<Tz>,
) -> Option<DateTime<Tz>> {
    let separator = text.chars().find(|ch| matches!(ch, '.' | '/' | '-'))?;
    let parts: Vec<&str> = text.split(separator).map(str::trim).collect();
    if !(2..=3).contains(&parts.len()) {
        return None;
    }

    let first = leading_number(parts.first()?)?;
    let second = leading_number(parts.get(1)?)?;
    let raw_year = match parts.get(2).filter(|part| !part.is_empty()) {
        Some(part) => leading_number(part)?,
        None => i64::from(now.year()),
    };
    let (day, month) = if locale.is_day_first() {
        (first, second)
    } else {
        (second, first)
    };
    let year = if raw_year < 100 {
        raw_year + 2000
    } else {
        raw_year
    };

    let date = NaiveDate::from_ymd_opt(
        i32::try_from(year).ok()?,
        u32::try_from(month).ok()?,
        u32::try_from(day).ok()?,
    )?;
    now.timezone()
        .from_local_datetime(&date.and_time(now.time()))
        .earliest()
}

/// Reads the leading run of ASCII digits, as `parseInt` would.
fn leading_number(part: &str) -> Option<i64> {
    let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

fn first_number(input: &str) -> Option<u64> {
    let digits: String = input
        .chars()
        .skip_while(|ch| !ch.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}
