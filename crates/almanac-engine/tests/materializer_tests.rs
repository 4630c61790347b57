//! Tests for instance materialization — the end-to-end expansion vectors.

use almanac_engine::error::EngineError;
use almanac_engine::event::{Event, ViewWindow};
use almanac_engine::materializer::{
    materialize, materialize_batch, MAX_INSTANCES_PER_EVENT,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn dt(y: i32, m: u32, day: u32, h: u32, min: u32) -> NaiveDateTime {
    d(y, m, day).and_hms_opt(h, min, 0).unwrap()
}

fn event(id: &str, start: NaiveDateTime, end: NaiveDateTime, rule: Option<&str>) -> Event {
    Event {
        id: id.to_string(),
        title: format!("event {}", id),
        start,
        end,
        recurrence_rule_text: rule.map(str::to_string),
        metadata: serde_json::Value::Null,
    }
}

fn window(start: NaiveDate, end: NaiveDate) -> ViewWindow {
    ViewWindow::new(start, end)
}

// ---------------------------------------------------------------------------
// Non-recurring containment
// ---------------------------------------------------------------------------

#[test]
fn non_recurring_inside_window_yields_one_instance() {
    let ev = event("e1", dt(2024, 1, 10, 9, 0), dt(2024, 1, 10, 10, 0), None);
    let result = materialize(&ev, &window(d(2024, 1, 1), d(2024, 1, 31)), d(2024, 1, 1))
        .expect("materialize should succeed");

    assert_eq!(result.instances.len(), 1);
    assert_eq!(result.instances[0].occurrence_date, d(2024, 1, 10));
    assert!(!result.truncated);
    assert!(result.unrecognized_rule.is_none());
}

#[test]
fn non_recurring_outside_window_yields_nothing() {
    let ev = event("e1", dt(2024, 2, 10, 9, 0), dt(2024, 2, 10, 10, 0), None);
    let result = materialize(&ev, &window(d(2024, 1, 1), d(2024, 1, 31)), d(2024, 1, 1))
        .expect("materialize should succeed");

    assert!(result.instances.is_empty());
}

#[test]
fn does_not_repeat_text_behaves_like_absent_rule() {
    let ev = event(
        "e1",
        dt(2024, 1, 10, 9, 0),
        dt(2024, 1, 10, 10, 0),
        Some("Does not repeat"),
    );
    let result = materialize(&ev, &window(d(2024, 1, 1), d(2024, 1, 31)), d(2024, 1, 1))
        .expect("materialize should succeed");

    assert_eq!(result.instances.len(), 1);
    assert!(result.unrecognized_rule.is_none());
}

// ---------------------------------------------------------------------------
// Weekly correctness — the January 2024 Thursdays vector
// ---------------------------------------------------------------------------

#[test]
fn weekly_thursdays_of_january_2024() {
    let ev = event(
        "meeting",
        dt(2024, 1, 4, 14, 0),
        dt(2024, 1, 4, 15, 0),
        Some("Weekly on Thursday"),
    );
    let result = materialize(&ev, &window(d(2024, 1, 1), d(2024, 1, 31)), d(2024, 1, 1))
        .expect("materialize should succeed");

    let dates: Vec<NaiveDate> = result.instances.iter().map(|i| i.occurrence_date).collect();
    assert_eq!(
        dates,
        vec![d(2024, 1, 4), d(2024, 1, 11), d(2024, 1, 18), d(2024, 1, 25)]
    );
    for instance in &result.instances {
        assert_eq!(instance.occurrence_date.weekday(), Weekday::Thu);
        assert_eq!(instance.start.time(), dt(2024, 1, 4, 14, 0).time());
        assert_eq!(instance.end - instance.start, Duration::hours(1));
    }
}

#[test]
fn weekly_seed_before_window_still_fills_window() {
    // Seed occurrence falls before the window; later occurrences inside it
    // must still materialize.
    let ev = event(
        "meeting",
        dt(2023, 12, 28, 14, 0),
        dt(2023, 12, 28, 15, 0),
        Some("Weekly on Thursday"),
    );
    let result = materialize(&ev, &window(d(2024, 1, 1), d(2024, 1, 31)), d(2024, 1, 1))
        .expect("materialize should succeed");

    let dates: Vec<NaiveDate> = result.instances.iter().map(|i| i.occurrence_date).collect();
    assert_eq!(
        dates,
        vec![d(2024, 1, 4), d(2024, 1, 11), d(2024, 1, 18), d(2024, 1, 25)]
    );
}

// ---------------------------------------------------------------------------
// Monthly day clamp — the day-31 chain vector
// ---------------------------------------------------------------------------

#[test]
fn monthly_day_31_clamp_chain() {
    let ev = event(
        "rent",
        dt(2024, 1, 31, 8, 0),
        dt(2024, 1, 31, 8, 30),
        Some("Monthly"),
    );
    let result = materialize(&ev, &window(d(2024, 1, 1), d(2024, 4, 30)), d(2024, 1, 1))
        .expect("materialize should succeed");

    let dates: Vec<NaiveDate> = result.instances.iter().map(|i| i.occurrence_date).collect();
    assert_eq!(
        dates,
        vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 29), d(2024, 4, 29)]
    );
}

// ---------------------------------------------------------------------------
// Nth-weekday correctness — the last-Thursday vector
// ---------------------------------------------------------------------------

#[test]
fn monthly_last_thursday_jan_through_march_2024() {
    let ev = event(
        "review",
        dt(2024, 1, 25, 16, 0),
        dt(2024, 1, 25, 17, 0),
        Some("Monthly on the last Thursday"),
    );
    let result = materialize(&ev, &window(d(2024, 1, 1), d(2024, 3, 31)), d(2024, 1, 1))
        .expect("materialize should succeed");

    let dates: Vec<NaiveDate> = result.instances.iter().map(|i| i.occurrence_date).collect();
    // Feb 29 is a Thursday in 2024, so it is February's last Thursday.
    assert_eq!(
        dates,
        vec![d(2024, 1, 25), d(2024, 2, 29), d(2024, 3, 28)]
    );
}

// ---------------------------------------------------------------------------
// Unrecognized rules — safety bound
// ---------------------------------------------------------------------------

#[test]
fn unrecognized_rule_produces_only_the_seed() {
    let ev = event(
        "odd",
        dt(2024, 1, 10, 9, 0),
        dt(2024, 1, 10, 10, 0),
        Some("every full moon"),
    );
    let result = materialize(&ev, &window(d(2024, 1, 1), d(2024, 12, 31)), d(2024, 1, 1))
        .expect("unrecognized rules must not error");

    assert_eq!(result.instances.len(), 1);
    assert_eq!(result.unrecognized_rule.as_deref(), Some("every full moon"));
    assert!(!result.truncated);
}

// ---------------------------------------------------------------------------
// Duration preservation and multi-day flags
// ---------------------------------------------------------------------------

#[test]
fn multi_day_duration_is_preserved_across_occurrences() {
    // 39-hour span (18:00 → 09:00 two days later), recurring weekly.
    let ev = event(
        "retreat",
        dt(2024, 3, 1, 18, 0),
        dt(2024, 3, 3, 9, 0),
        Some("Weekly"),
    );
    let result = materialize(&ev, &window(d(2024, 3, 1), d(2024, 3, 31)), d(2024, 3, 1))
        .expect("materialize should succeed");

    assert!(!result.instances.is_empty());
    for instance in &result.instances {
        assert_eq!(instance.end - instance.start, Duration::hours(39));
        assert!(instance.is_multi_day);
    }
}

#[test]
fn single_day_instances_are_not_multi_day() {
    let ev = event("e1", dt(2024, 1, 10, 9, 0), dt(2024, 1, 10, 23, 59), None);
    let result = materialize(&ev, &window(d(2024, 1, 1), d(2024, 1, 31)), d(2024, 1, 1))
        .expect("materialize should succeed");

    assert!(!result.instances[0].is_multi_day);
}

#[test]
fn metadata_passes_through_unchanged() {
    let mut ev = event("e1", dt(2024, 1, 4, 9, 0), dt(2024, 1, 4, 10, 0), Some("Weekly"));
    ev.metadata = serde_json::json!({ "category": "work", "color": "#ff8800" });

    let result = materialize(&ev, &window(d(2024, 1, 1), d(2024, 1, 31)), d(2024, 1, 1))
        .expect("materialize should succeed");

    for instance in &result.instances {
        assert_eq!(instance.metadata, ev.metadata);
    }
}

// ---------------------------------------------------------------------------
// Horizon and caps
// ---------------------------------------------------------------------------

#[test]
fn horizon_stops_a_year_past_today_even_for_larger_windows() {
    // Weekly event, three-year window, but today + 1 year caps expansion.
    let ev = event(
        "standup",
        dt(2024, 1, 1, 9, 0),
        dt(2024, 1, 1, 9, 15),
        Some("Weekly"),
    );
    let result = materialize(&ev, &window(d(2024, 1, 1), d(2026, 12, 31)), d(2024, 1, 1))
        .expect("materialize should succeed");

    let last = result.instances.last().expect("instances expected");
    assert!(last.occurrence_date <= d(2025, 1, 1));
    // Mondays from 2024-01-01 through 2024-12-30, plus none past the horizon.
    assert_eq!(result.instances.len(), 53);
    assert!(!result.truncated);
}

#[test]
fn instance_cap_truncates_daily_expansion() {
    // Daily over a window wider than the cap: 366 instances, then truncation.
    let ev = event(
        "journal",
        dt(2024, 1, 1, 7, 0),
        dt(2024, 1, 1, 7, 30),
        Some("Daily"),
    );
    let result = materialize(&ev, &window(d(2024, 1, 1), d(2026, 12, 31)), d(2024, 1, 1))
        .expect("materialize should succeed");

    assert_eq!(result.instances.len(), MAX_INSTANCES_PER_EVENT);
    assert!(result.truncated);
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

#[test]
fn inverted_window_is_rejected() {
    let ev = event("e1", dt(2024, 1, 10, 9, 0), dt(2024, 1, 10, 10, 0), None);
    let result = materialize(&ev, &window(d(2024, 1, 31), d(2024, 1, 1)), d(2024, 1, 1));

    assert!(matches!(result, Err(EngineError::InvalidWindow { .. })));
}

#[test]
fn inverted_event_times_are_rejected() {
    let ev = event("e1", dt(2024, 1, 10, 10, 0), dt(2024, 1, 10, 9, 0), None);
    let result = materialize(&ev, &window(d(2024, 1, 1), d(2024, 1, 31)), d(2024, 1, 1));

    assert!(matches!(result, Err(EngineError::InvalidEventTimes { .. })));
}

#[test]
fn batch_skips_invalid_events_and_keeps_the_rest() {
    let good = event(
        "good",
        dt(2024, 1, 4, 9, 0),
        dt(2024, 1, 4, 10, 0),
        Some("Weekly"),
    );
    let bad = event("bad", dt(2024, 1, 10, 10, 0), dt(2024, 1, 10, 9, 0), None);

    let instances = materialize_batch(
        &[bad, good],
        &window(d(2024, 1, 1), d(2024, 1, 31)),
        d(2024, 1, 1),
    )
    .expect("batch must survive one bad event");

    assert_eq!(instances.len(), 4);
    assert!(instances.iter().all(|i| i.event_id == "good"));
}

#[test]
fn batch_rejects_invalid_window_up_front() {
    let result = materialize_batch(&[], &window(d(2024, 1, 31), d(2024, 1, 1)), d(2024, 1, 1));
    assert!(matches!(result, Err(EngineError::InvalidWindow { .. })));
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn identical_inputs_produce_identical_output() {
    let ev = event(
        "meeting",
        dt(2024, 1, 4, 14, 0),
        dt(2024, 1, 4, 15, 0),
        Some("Weekly on Thursday"),
    );
    let w = window(d(2024, 1, 1), d(2024, 3, 31));

    let first = materialize(&ev, &w, d(2024, 1, 1)).unwrap();
    let second = materialize(&ev, &w, d(2024, 1, 1)).unwrap();

    assert_eq!(first, second);
}
