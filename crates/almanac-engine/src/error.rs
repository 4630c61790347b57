//! Error types for almanac-engine operations.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Errors that can occur while materializing events.
///
/// Malformed recurrence text is deliberately *not* an error — the parser
/// absorbs it into [`RecurrenceRule::Unrecognized`](crate::rule::RecurrenceRule)
/// and materialization stops after the seed occurrence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The caller supplied a view window whose end precedes its start.
    /// This is a precondition violation and is rejected before any stepping.
    #[error("invalid view window: start {start} is after end {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    /// The event's end precedes its start. In batch materialization the
    /// offending event is skipped; the single-event entry point surfaces it.
    #[error("invalid event times for '{event_id}': end {end} is before start {start}")]
    InvalidEventTimes {
        event_id: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// Convenience alias used throughout almanac-engine.
pub type Result<T> = std::result::Result<T, EngineError>;
