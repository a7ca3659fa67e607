//! Internal helpers for input validation and calendar math.
//!
//! Apart from [`parse_date`] and [`DateRange`], these are **not** part of the
//! public API. They keep validation in one place so every operation enforces
//! the same rules.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Maximum icon length, in characters.
const MAX_ICON_CHARS: usize = 20;

/// Parses a calendar date.
///
/// Accepts `YYYY-MM-DD`, or an RFC 3339 timestamp reduced to its UTC date.
///
/// ```rust
/// use engine::parse_date;
///
/// assert_eq!(parse_date("2024-03-15").unwrap().to_string(), "2024-03-15");
/// assert_eq!(parse_date("2024-03-15T23:30:00-03:00").unwrap().to_string(), "2024-03-16");
/// assert!(parse_date("2023-02-29").is_err());
/// ```
pub fn parse_date(input: &str) -> ResultEngine<NaiveDate> {
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| EngineError::InvalidDate(format!("not a calendar date: {trimmed}")))
}

/// An inclusive `[from, to]` range of calendar days.
///
/// Built only through [`DateRange::new`], which enforces ordering and the
/// configured span cap, so every range reaching a query is valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    /// Validates a range: `to` must not precede `from` and the distance in
    /// days must not exceed `max_days`.
    pub fn new(from: NaiveDate, to: NaiveDate, max_days: i64) -> ResultEngine<Self> {
        let days = (to - from).num_days();
        if days < 0 {
            return Err(EngineError::InvalidRange(format!(
                "range end {to} precedes start {from}"
            )));
        }
        if days > max_days {
            return Err(EngineError::InvalidRange(format!(
                "range spans {days} days, maximum is {max_days}"
            )));
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }
}

/// Number of days in a calendar month (`month` is 1..=12).
pub(crate) fn days_in_month(year: i32, month: u32) -> ResultEngine<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| EngineError::InvalidDate(format!("invalid month {year}-{month}")))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| EngineError::InvalidDate(format!("invalid month {year}-{month}")))?;
    Ok(next.signed_duration_since(first).num_days() as u32)
}

/// `(year, month 1..=12, day)` rollup key of a date.
pub(crate) fn rollup_key(date: NaiveDate) -> (i32, i32, i32) {
    (date.year(), date.month() as i32, date.day() as i32)
}

/// Owner ids come from the identity provider and are trusted as-is, but an
/// empty id can never own anything.
pub(crate) fn normalize_owner(owner_id: &str) -> ResultEngine<String> {
    let trimmed = owner_id.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidOwner(
            "owner id must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_icon(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName("icon must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_ICON_CHARS {
        return Err(EngineError::InvalidName(format!(
            "icon must be at most {MAX_ICON_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
