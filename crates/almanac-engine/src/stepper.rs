//! Occurrence stepping — computes the next occurrence date for a rule.
//!
//! This is the algorithmic heart of the engine. Each call advances strictly
//! past `current` and is idempotent when re-applied to its own output, so the
//! materializer can iterate it safely. All comparisons are on whole calendar
//! days; time-of-day is reattached later by the materializer.
//!
//! The stepper enforces no horizon or iteration caps of its own — those
//! belong to [`crate::materializer`].

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::nth_weekday::{self, days_in_month};
use crate::rule::{NthOccurrence, RecurrenceRule};

/// A single nth-weekday search never needs to scan far: every month contains
/// at least four of each weekday, so the occurrence after `current` is found
/// within a month or two. The guard only matters if month arithmetic itself
/// fails (e.g. dates at the far edge of chrono's range).
const NTH_WEEKDAY_MONTH_GUARD: u32 = 48;

/// Compute the next occurrence strictly after `current`, or `None` when the
/// rule produces no further occurrences (`None` and `Unrecognized` rules).
///
/// Callers decide what a terminated iteration means; in particular the
/// materializer, not this routine, warns about unrecognized rule text.
pub fn next_occurrence(rule: &RecurrenceRule, current: NaiveDate) -> Option<NaiveDate> {
    match rule {
        RecurrenceRule::None | RecurrenceRule::Unrecognized(_) => None,
        RecurrenceRule::Daily => current.checked_add_days(Days::new(1)),
        // The seed occurrence already sits on the event's weekday, so a flat
        // 7-day step preserves it with no weekday bookkeeping.
        RecurrenceRule::Weekly => current.checked_add_days(Days::new(7)),
        RecurrenceRule::BiWeekly => current.checked_add_days(Days::new(14)),
        RecurrenceRule::MonthlyByDayOfMonth => next_month_same_day(current),
        RecurrenceRule::AnnualByMonthDay { month, day } => next_annual(current, *month, *day),
        RecurrenceRule::MonthlyByNthWeekday {
            weekday,
            occurrence,
        } => next_nth_weekday(current, *weekday, *occurrence),
        RecurrenceRule::WeekdaysOnly => next_weekday_only(current),
    }
}

/// Same day-of-month in the following month, clamped to that month's last
/// day when it is shorter. The clamp is sticky: stepping from Jan 31 lands
/// on Feb 29 (leap year), and the step after that starts from day 29 — it
/// never rolls back out to day 31.
fn next_month_same_day(current: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = month_after(current.year(), current.month());
    let day = current.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `(month, day)` of the current year when `current` has not reached it yet,
/// otherwise of the following year. The same-year case lets a mid-year seed
/// align to its first annual occurrence instead of skipping a year.
fn next_annual(current: NaiveDate, month: u32, day: u32) -> Option<NaiveDate> {
    let this_year = annual_date(current.year(), month, day)?;
    if current < this_year {
        Some(this_year)
    } else {
        annual_date(current.year() + 1, month, day)
    }
}

/// Build the annual target date for one year, clamping Feb 29 to Feb 28 in
/// non-leap years (mirrors the monthly last-day clamp).
fn annual_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let day = day.min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Walk forward month by month from the month after `current`, resolving the
/// requested weekday occurrence, until one lands strictly after `current`.
fn next_nth_weekday(
    current: NaiveDate,
    weekday: Weekday,
    occurrence: NthOccurrence,
) -> Option<NaiveDate> {
    let (mut year, mut month) = month_after(current.year(), current.month());

    for _ in 0..NTH_WEEKDAY_MONTH_GUARD {
        if let Some(date) = nth_weekday::resolve(year, month, weekday, occurrence) {
            if date > current {
                return Some(date);
            }
        }
        let next = month_after(year, month);
        year = next.0;
        month = next.1;
    }

    None
}

/// One day at a time, skipping Saturday and Sunday.
fn next_weekday_only(current: NaiveDate) -> Option<NaiveDate> {
    let mut date = current.checked_add_days(Days::new(1))?;
    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        date = date.checked_add_days(Days::new(1))?;
    }
    Some(date)
}

fn month_after(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}
