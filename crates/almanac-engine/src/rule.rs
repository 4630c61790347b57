//! Recurrence rule parsing — free-form pattern text → tagged rule value.
//!
//! The surrounding application stores human-readable pattern strings like
//! "Weekly on Thursday" or "Monthly on the last Friday". [`parse`] normalizes
//! that text once into a closed [`RecurrenceRule`] variant so the stepping
//! hot loop can match exhaustively instead of re-running string matching on
//! every advance.
//!
//! Parsing is total: any text the grammar does not cover maps to
//! [`RecurrenceRule::Unrecognized`] carrying the original text.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Which occurrence of a weekday within a month a monthly rule targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NthOccurrence {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl NthOccurrence {
    /// 1-based position for positional variants; `None` for `Last`.
    pub fn position(self) -> Option<u32> {
        match self {
            NthOccurrence::First => Some(1),
            NthOccurrence::Second => Some(2),
            NthOccurrence::Third => Some(3),
            NthOccurrence::Fourth => Some(4),
            NthOccurrence::Last => None,
        }
    }
}

/// Normalized recurrence rule, derived once from an event's pattern text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecurrenceRule {
    /// The event does not repeat.
    None,
    Daily,
    /// Every 7 days from the seed occurrence. A "weekly on <day>" suffix is
    /// not validated against the seed's actual weekday: the flat 7-day step
    /// always lands on the same weekday the event started on.
    Weekly,
    BiWeekly,
    /// Same day-of-month each month, clamped to shorter months.
    MonthlyByDayOfMonth,
    /// E.g. "Monthly on the third Tuesday" or "Monthly on the last Friday".
    MonthlyByNthWeekday {
        #[serde(with = "weekday_name")]
        weekday: Weekday,
        occurrence: NthOccurrence,
    },
    /// Same month/day each year (1-based month).
    AnnualByMonthDay { month: u32, day: u32 },
    /// Monday through Friday, skipping weekends.
    WeekdaysOnly,
    /// Pattern text the grammar does not cover; carries the original text so
    /// the condition stays observable. The stepper terminates on it.
    Unrecognized(String),
}

/// Parse free-form recurrence text into a [`RecurrenceRule`].
///
/// Total function — never fails. Matching is case-insensitive on
/// whitespace-normalized text, first match wins:
///
/// 1. absent / "does not repeat" → `None`
/// 2. "daily" / "every day" → `Daily`
/// 3. "weekly on <day>" prefix, or "weekly" / "every week" → `Weekly`
/// 4. "bi-weekly" / "every 2 weeks" → `BiWeekly`
/// 5. "monthly" / "every month" → `MonthlyByDayOfMonth`
/// 6. "yearly" / "every year" → `AnnualByMonthDay` from `start`'s own
///    month and day (self-referential annual)
/// 7. contains "weekday" or "monday to friday" → `WeekdaysOnly`
/// 8. "annually on <month> <day>" → `AnnualByMonthDay` from the literals
/// 9. "monthly on the <first|second|third|fourth|last> <weekday>" →
///    `MonthlyByNthWeekday`
/// 10. anything else → `Unrecognized`
///
/// "last" is an ordinary occurrence selector in arm 9; there is no separate
/// last-weekday arm.
///
/// `start` is the event's start date, consulted only by the self-referential
/// "yearly" arm.
pub fn parse(text: Option<&str>, start: NaiveDate) -> RecurrenceRule {
    let raw = match text {
        Some(t) if !t.trim().is_empty() => t,
        _ => return RecurrenceRule::None,
    };

    // Lowercase and collapse runs of whitespace so the arms below can match
    // on exact strings and simple token lists.
    let normalized = raw
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    match normalized.as_str() {
        "does not repeat" => return RecurrenceRule::None,
        "daily" | "every day" => return RecurrenceRule::Daily,
        "weekly" | "every week" => return RecurrenceRule::Weekly,
        "bi-weekly" | "every 2 weeks" => return RecurrenceRule::BiWeekly,
        "monthly" | "every month" => return RecurrenceRule::MonthlyByDayOfMonth,
        "yearly" | "every year" => {
            return RecurrenceRule::AnnualByMonthDay {
                month: start.month(),
                day: start.day(),
            };
        }
        _ => {}
    }

    if normalized.starts_with("weekly on ") {
        return RecurrenceRule::Weekly;
    }

    if normalized.contains("weekday") || normalized.contains("monday to friday") {
        return RecurrenceRule::WeekdaysOnly;
    }

    if let Some(rule) = parse_annual_on(&normalized) {
        return rule;
    }

    if let Some(rule) = parse_monthly_nth(&normalized) {
        return rule;
    }

    RecurrenceRule::Unrecognized(raw.to_string())
}

/// "annually on <month> <day>", e.g. "Annually on March 14".
fn parse_annual_on(normalized: &str) -> Option<RecurrenceRule> {
    let tokens: Vec<&str> = normalized.split(' ').collect();
    match tokens.as_slice() {
        ["annually", "on", month, day] => {
            let month = month_from_name(month)?;
            let day: u32 = day.parse().ok()?;
            if !(1..=31).contains(&day) {
                return None;
            }
            Some(RecurrenceRule::AnnualByMonthDay { month, day })
        }
        _ => None,
    }
}

/// "monthly on the <first|second|third|fourth|last> <weekday>".
fn parse_monthly_nth(normalized: &str) -> Option<RecurrenceRule> {
    let tokens: Vec<&str> = normalized.split(' ').collect();
    match tokens.as_slice() {
        ["monthly", "on", "the", ordinal, weekday] => {
            let occurrence = match *ordinal {
                "first" => NthOccurrence::First,
                "second" => NthOccurrence::Second,
                "third" => NthOccurrence::Third,
                "fourth" => NthOccurrence::Fourth,
                "last" => NthOccurrence::Last,
                _ => return None,
            };
            let weekday = weekday_from_name(weekday)?;
            Some(RecurrenceRule::MonthlyByNthWeekday {
                weekday,
                occurrence,
            })
        }
        _ => None,
    }
}

/// Full English weekday name (already lowercased) → chrono [`Weekday`].
pub(crate) fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Full English month name (already lowercased) → 1-based month number.
pub(crate) fn month_from_name(name: &str) -> Option<u32> {
    match name {
        "january" => Some(1),
        "february" => Some(2),
        "march" => Some(3),
        "april" => Some(4),
        "may" => Some(5),
        "june" => Some(6),
        "july" => Some(7),
        "august" => Some(8),
        "september" => Some(9),
        "october" => Some(10),
        "november" => Some(11),
        "december" => Some(12),
        _ => None,
    }
}

/// Serialize chrono weekdays by name so the rule enum round-trips through
/// JSON without leaning on chrono's numeric representation.
mod weekday_name {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(weekday: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&weekday.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let name = String::deserialize(deserializer)?;
        Weekday::from_str(&name)
            .map_err(|_| serde::de::Error::custom(format!("invalid weekday: {}", name)))
    }
}
