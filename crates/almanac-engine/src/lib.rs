//! # almanac-engine
//!
//! Deterministic recurring-event materialization for calendar views.
//!
//! Given a stored event (one canonical definition with start/end wall-clock
//! times and an optional human-readable recurrence rule like
//! "Weekly on Thursday" or "Monthly on the last Friday") and a bounded view
//! window, the engine computes the concrete occurrences inside that window —
//! handling multi-day spans, short months, and safety bounds against runaway
//! expansion.
//!
//! The engine is a pure library boundary: no I/O, no ambient clock (the
//! caller passes "today" explicitly), no state between calls. Identical
//! inputs always produce identical output, so independent events may be
//! materialized concurrently with no coordination.
//!
//! ## Data flow
//!
//! raw event → [`rule::parse`] → [`stepper::next_occurrence`] (iterated) →
//! [`materializer::materialize`] → [`aggregator::aggregate`] → date-keyed map
//! for the display layer.
//!
//! ## Modules
//!
//! - [`rule`] — pattern text → normalized [`RecurrenceRule`]
//! - [`nth_weekday`] — "third Tuesday of March 2026" → concrete date
//! - [`stepper`] — rule + current occurrence → next occurrence
//! - [`materializer`] — bounded expansion into full [`Instance`]s
//! - [`aggregator`] — window clipping, dedup, date-keyed grouping
//! - [`event`] — the `Event` / `ViewWindow` / `Instance` records
//! - [`error`] — error types

pub mod aggregator;
pub mod error;
pub mod event;
pub mod materializer;
pub mod nth_weekday;
pub mod rule;
pub mod stepper;

pub use aggregator::{aggregate, Aggregated, DayEntry, DayMarking};
pub use error::EngineError;
pub use event::{Event, Instance, ViewWindow};
pub use materializer::{materialize, materialize_batch, Materialized};
pub use rule::{NthOccurrence, RecurrenceRule};
