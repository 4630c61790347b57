//! Window aggregation — groups materialized instances by calendar date.
//!
//! Multi-day instances expand into one entry per day with starting/ending
//! flags so a display layer can render a continuous span. Duplicate
//! instances — the same `(event, occurrence date)` pair arriving twice from
//! overlapping window buffers — are dropped, keeping the first.
//!
//! Stateless per invocation: feeding the same instance list in twice yields
//! the same maps, with no accumulation across calls.

use std::collections::{BTreeMap, HashSet};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::event::Instance;

/// One instance's presence on one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayEntry {
    pub instance: Instance,
    /// First day of this instance's span. Single-day instances are both the
    /// starting and the ending day.
    pub starting_day: bool,
    /// Last day of this instance's span.
    pub ending_day: bool,
}

/// Per-date marking summary for calendar widgets. Flags are ORed across all
/// entries on the date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayMarking {
    pub marked: bool,
    pub starting_day: bool,
    pub ending_day: bool,
}

/// Date-keyed view of a set of instances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregated {
    /// Which dates carry anything at all, with span flags for marking dots
    /// and period bars.
    pub marked_dates: BTreeMap<NaiveDate, DayMarking>,
    /// Every instance-day, grouped by date in chronological order.
    pub by_date: BTreeMap<NaiveDate, Vec<DayEntry>>,
}

/// Group instances by calendar date, expanding multi-day spans day by day.
///
/// Instances are identified by `(event_id, occurrence_date)`; when the same
/// pair appears more than once only the first is kept. Input order is
/// preserved within each date.
pub fn aggregate(instances: &[Instance]) -> Aggregated {
    let mut seen: HashSet<(&str, NaiveDate)> = HashSet::new();
    let mut result = Aggregated::default();

    for instance in instances {
        if !seen.insert((instance.event_id.as_str(), instance.occurrence_date)) {
            continue;
        }

        let first_day = instance.start.date();
        let last_day = instance.end.date();

        let mut day = first_day;
        loop {
            let entry = DayEntry {
                instance: instance.clone(),
                starting_day: day == first_day,
                ending_day: day == last_day,
            };

            let marking = result.marked_dates.entry(day).or_default();
            marking.marked = true;
            marking.starting_day |= entry.starting_day;
            marking.ending_day |= entry.ending_day;

            result.by_date.entry(day).or_default().push(entry);

            if day == last_day {
                break;
            }
            day = match day.checked_add_days(Days::new(1)) {
                Some(next) => next,
                None => break,
            };
        }
    }

    result
}
