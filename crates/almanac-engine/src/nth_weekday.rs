//! Resolve "the Nth <weekday> of a month" to a concrete date.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::rule::NthOccurrence;

/// Find the requested occurrence of `weekday` within `(year, month)`.
///
/// `month` is 1-based. Scans the month day by day: positional requests
/// (first through fourth) return as soon as the counter reaches the target;
/// `Last` scans the whole month and keeps the latest match.
///
/// Returns `None` when the month has fewer matching weekdays than requested
/// (e.g. a fifth Monday), or when `(year, month)` is not a valid month.
/// Pure — parameterized entirely by year and month, no "current date".
pub fn resolve(
    year: i32,
    month: u32,
    weekday: Weekday,
    occurrence: NthOccurrence,
) -> Option<NaiveDate> {
    debug_assert!((1..=12).contains(&month), "month must be 1-12");

    let target = occurrence.position();
    let mut seen = 0u32;
    let mut last_match = None;

    for day in 1..=days_in_month(year, month)? {
        // Valid by construction: day is within the month's length.
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        if date.weekday() == weekday {
            seen += 1;
            match target {
                Some(n) if seen == n => return Some(date),
                _ => last_match = Some(date),
            }
        }
    }

    match target {
        Some(_) => None,
        None => last_match,
    }
}

/// Number of days in `(year, month)`, or `None` for an invalid month.
pub(crate) fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(next_month.signed_duration_since(first).num_days() as u32)
}
