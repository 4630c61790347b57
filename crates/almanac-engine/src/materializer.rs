//! Instance materialization — drives the stepper across a bounded horizon.
//!
//! Converts each occurrence date into a full [`Instance`] with wall-clock
//! start/end times, preserving the event's original duration across month
//! lengths. Enforces the engine's safety bounds: the horizon
//! (`min(window.end, today + 1 year)`), a stepper-call cap, and a
//! per-event instance cap. Hitting a cap truncates silently but observably —
//! it is a safety valve, not an error.
//!
//! "Today" is an explicit parameter rather than an ambient clock read, so
//! repeated calls with identical inputs are byte-identical (and tests need
//! no clock mocking).

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{EngineError, Result};
use crate::event::{Event, Instance, ViewWindow};
use crate::rule::{self, RecurrenceRule};
use crate::stepper;

/// Upper bound on stepper calls per event. Two steps per day over the
/// one-year horizon covers every rule the grammar can produce.
pub const MAX_STEPPER_CALLS: u32 = 732;

/// Upper bound on produced instances per event (one per day over a leap
/// year).
pub const MAX_INSTANCES_PER_EVENT: usize = 366;

/// Result of materializing one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Materialized {
    /// Instances inside the window, in occurrence order.
    pub instances: Vec<Instance>,
    /// True when a safety cap cut expansion short.
    pub truncated: bool,
    /// The raw rule text when it did not match the grammar. Expansion then
    /// stopped after the seed occurrence.
    pub unrecognized_rule: Option<String>,
}

/// Materialize a single event into the window.
///
/// `today` anchors the safety horizon: expansion never proceeds past
/// `min(window.end, today + 1 year)` no matter how large the window is.
///
/// # Errors
/// - [`EngineError::InvalidWindow`] when `window.end < window.start`.
/// - [`EngineError::InvalidEventTimes`] when `event.end < event.start`.
pub fn materialize(event: &Event, window: &ViewWindow, today: NaiveDate) -> Result<Materialized> {
    validate_window(window)?;
    validate_event(event)?;

    let rule = rule::parse(event.recurrence_rule_text.as_deref(), event.start.date());
    let unrecognized_rule = match &rule {
        RecurrenceRule::Unrecognized(raw) => Some(raw.clone()),
        _ => None,
    };

    let seed = event.start.date();
    let mut instances = Vec::new();
    let mut truncated = false;

    if window.contains(seed) {
        instances.push(build_instance(event, seed));
    }

    // Non-recurring events contribute the seed occurrence at most.
    if !matches!(
        rule,
        RecurrenceRule::None | RecurrenceRule::Unrecognized(_)
    ) {
        let horizon = horizon_bound(window, today);
        let mut current = seed;
        let mut calls = 0u32;

        while calls < MAX_STEPPER_CALLS {
            calls += 1;
            match stepper::next_occurrence(&rule, current) {
                Some(next) => current = next,
                None => break,
            }
            if current > horizon {
                break;
            }
            if window.contains(current) {
                if instances.len() >= MAX_INSTANCES_PER_EVENT {
                    truncated = true;
                    break;
                }
                instances.push(build_instance(event, current));
            }
        }

        // Exhausting the call budget while still inside the horizon means
        // occurrences were left unproduced.
        if calls == MAX_STEPPER_CALLS && current <= horizon {
            truncated = true;
        }
    }

    Ok(Materialized {
        instances,
        truncated,
        unrecognized_rule,
    })
}

/// Materialize a batch of events into one flat instance list.
///
/// The window is validated once up front. Events with invalid times are
/// skipped with a warning while the rest of the batch is still processed;
/// unrecognized rule text is likewise warned about (the event still
/// contributes its seed occurrence). Instances are concatenated in input
/// order, each event's occurrences in chronological order.
///
/// # Errors
/// [`EngineError::InvalidWindow`] when `window.end < window.start`.
pub fn materialize_batch(
    events: &[Event],
    window: &ViewWindow,
    today: NaiveDate,
) -> Result<Vec<Instance>> {
    validate_window(window)?;

    let mut all = Vec::new();
    for event in events {
        match materialize(event, window, today) {
            Ok(materialized) => {
                if let Some(raw) = &materialized.unrecognized_rule {
                    warn!(event_id = %event.id, rule = %raw, "unrecognized recurrence rule; event will not repeat");
                }
                if materialized.truncated {
                    warn!(event_id = %event.id, "instance expansion truncated by safety cap");
                }
                all.extend(materialized.instances);
            }
            Err(err @ EngineError::InvalidEventTimes { .. }) => {
                warn!(event_id = %event.id, error = %err, "skipping event with invalid times");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(all)
}

/// Expansion cutoff: the window end, but never more than a year past
/// `today`.
fn horizon_bound(window: &ViewWindow, today: NaiveDate) -> NaiveDate {
    let safety = today
        .checked_add_months(Months::new(12))
        .unwrap_or(NaiveDate::MAX);
    window.end.min(safety)
}

fn validate_window(window: &ViewWindow) -> Result<()> {
    if window.end < window.start {
        return Err(EngineError::InvalidWindow {
            start: window.start,
            end: window.end,
        });
    }
    Ok(())
}

fn validate_event(event: &Event) -> Result<()> {
    if event.end < event.start {
        return Err(EngineError::InvalidEventTimes {
            event_id: event.id.clone(),
            start: event.start,
            end: event.end,
        });
    }
    Ok(())
}

/// Combine an occurrence date with the event's start time-of-day, then add
/// the original duration to get the end. Adding the duration (rather than
/// re-deriving the end time-of-day) keeps multi-day spans the same length on
/// every occurrence regardless of month length.
fn build_instance(event: &Event, occurrence: NaiveDate) -> Instance {
    let start = occurrence.and_time(event.start.time());
    let end = start + (event.end - event.start);
    Instance {
        event_id: event.id.clone(),
        title: event.title.clone(),
        occurrence_date: occurrence,
        start,
        end,
        is_multi_day: start.date() != end.date(),
        metadata: event.metadata.clone(),
    }
}
