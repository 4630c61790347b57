//! Event, window, and instance records exchanged with the calling layer.
//!
//! All times are naive local wall-clock values — the engine has no timezone
//! concept. Storage, decryption, and rendering of events belong to the
//! callers on either side of this boundary.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A stored event as handed to the engine by the persistence layer.
///
/// Read-only to this engine. `metadata` is opaque and is passed through
/// unchanged onto every produced [`Instance`] (category flags, colors, and
/// whatever else the surrounding application stores per event).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Opaque stable identifier.
    pub id: String,
    pub title: String,
    /// Naive local start; invariant `start <= end` (violations are skipped
    /// during batch materialization, see [`crate::materializer`]).
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Raw recurrence pattern text. Absent or "Does not repeat" means the
    /// event does not recur.
    #[serde(default)]
    pub recurrence_rule_text: Option<String>,
    /// Application-specific payload, opaque to the engine.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Event {
    /// An event spans multiple calendar days iff its start and end fall on
    /// different dates.
    pub fn is_multi_day(&self) -> bool {
        self.start.date() != self.end.date()
    }
}

/// The caller-supplied date range to materialize for. Both ends inclusive,
/// always finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ViewWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether `date` falls inside the window (inclusive on both ends).
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// One concrete, fully materialized occurrence of an event.
///
/// Ephemeral: created fresh on every call, consumed by the aggregator or the
/// display layer, never persisted and never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub event_id: String,
    pub title: String,
    /// The occurrence date produced by the stepper, before time-of-day was
    /// reattached. Identifies the instance together with `event_id`.
    pub occurrence_date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub is_multi_day: bool,
    /// Copied unchanged from the source event.
    pub metadata: serde_json::Value,
}
