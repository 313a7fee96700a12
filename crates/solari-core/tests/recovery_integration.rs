//! Integration tests for wall-clock recovery of persisted countdowns.
//!
//! These tests replay process exits, crashes and machine sleep by writing
//! snapshots directly to the store and reopening the engine against a
//! manual clock.

use std::sync::Arc;

use chrono::Duration;
use solari_core::clock::{Clock, ManualClock};
use solari_core::events::Event;
use solari_core::storage::{keys, KvStore, MemoryStore};
use solari_core::timer::{CountdownEngine, ManualScheduler, TimerState};

fn running_snapshot(
    rem_minutes: u32,
    rem_seconds: u32,
    orig_minutes: u32,
    orig_seconds: u32,
    last_update_ms: i64,
) -> String {
    format!(
        r#"{{"minutes":{rem_minutes},"seconds":{rem_seconds},"originalMinutes":{orig_minutes},"originalSeconds":{orig_seconds},"isRunning":true,"isFinished":false,"lastUpdate":{last_update_ms}}}"#
    )
}

fn restore_with(
    store: &MemoryStore,
    clock: &ManualClock,
    scheduler: &ManualScheduler,
) -> (CountdownEngine, Option<Event>) {
    CountdownEngine::restore(
        Arc::new(store.clone()),
        Arc::new(clock.clone()),
        Arc::new(scheduler.clone()),
        5,
        0,
    )
}

#[test]
fn test_running_snapshot_resumes_with_elapsed_subtracted() {
    let store = MemoryStore::new();
    let clock = ManualClock::default();
    let scheduler = ManualScheduler::new();

    let persisted_at = clock.now().timestamp_millis();
    store
        .set(keys::TIMER_STATE, &running_snapshot(0, 10, 0, 10, persisted_at))
        .unwrap();

    // The process was away for four seconds.
    clock.advance(Duration::seconds(4));
    let (engine, event) = restore_with(&store, &clock, &scheduler);

    assert!(event.is_none());
    assert_eq!(engine.state(), TimerState::Running);
    assert_eq!(engine.remaining_secs(), 6);
    assert_eq!(scheduler.live_handles(), 1);
}

#[test]
fn test_expired_countdown_recovers_as_finished() {
    let store = MemoryStore::new();
    let clock = ManualClock::default();
    let scheduler = ManualScheduler::new();

    let persisted_at = clock.now().timestamp_millis();
    store
        .set(keys::TIMER_STATE, &running_snapshot(0, 10, 0, 10, persisted_at))
        .unwrap();

    clock.advance(Duration::seconds(15));
    let (engine, event) = restore_with(&store, &clock, &scheduler);

    assert_eq!(engine.state(), TimerState::Finished);
    assert_eq!(engine.remaining_secs(), 0);
    assert_eq!(scheduler.live_handles(), 0);
    assert!(matches!(
        event,
        Some(Event::TimerCompleted {
            duration_secs: 10,
            while_away: true,
            ..
        })
    ));
}

#[test]
fn test_exact_elapsed_boundary_counts_as_finished() {
    let store = MemoryStore::new();
    let clock = ManualClock::default();
    let scheduler = ManualScheduler::new();

    let persisted_at = clock.now().timestamp_millis();
    store
        .set(keys::TIMER_STATE, &running_snapshot(0, 10, 0, 10, persisted_at))
        .unwrap();

    clock.advance(Duration::seconds(10));
    let (engine, event) = restore_with(&store, &clock, &scheduler);

    assert_eq!(engine.state(), TimerState::Finished);
    assert!(event.is_some());
}

#[test]
fn test_paused_snapshot_restores_verbatim() {
    let store = MemoryStore::new();
    let clock = ManualClock::default();
    let scheduler = ManualScheduler::new();

    let persisted_at = clock.now().timestamp_millis();
    store
        .set(
            keys::TIMER_STATE,
            &format!(
                r#"{{"minutes":2,"seconds":30,"originalMinutes":5,"originalSeconds":0,"isRunning":false,"isFinished":false,"lastUpdate":{persisted_at}}}"#
            ),
        )
        .unwrap();

    // However long the process was away, a paused countdown keeps its time.
    clock.advance(Duration::days(2));
    let (engine, event) = restore_with(&store, &clock, &scheduler);

    assert!(event.is_none());
    assert_eq!(engine.state(), TimerState::Idle);
    assert_eq!(engine.remaining_secs(), 150);
    assert_eq!(engine.original_secs(), 300);
    assert_eq!(scheduler.live_handles(), 0);
}

#[test]
fn test_running_snapshot_without_timestamp_resumes_paused() {
    let store = MemoryStore::new();
    let clock = ManualClock::default();
    let scheduler = ManualScheduler::new();

    store
        .set(
            keys::TIMER_STATE,
            r#"{"minutes":1,"seconds":0,"originalMinutes":1,"originalSeconds":0,"isRunning":true,"isFinished":false}"#,
        )
        .unwrap();

    let (engine, event) = restore_with(&store, &clock, &scheduler);

    assert!(event.is_none());
    assert_eq!(engine.state(), TimerState::Idle);
    assert_eq!(engine.remaining_secs(), 60);
    assert_eq!(scheduler.live_handles(), 0);
}

#[test]
fn test_zero_timestamp_reads_as_absent() {
    let store = MemoryStore::new();
    let clock = ManualClock::default();
    let scheduler = ManualScheduler::new();

    store
        .set(keys::TIMER_STATE, &running_snapshot(1, 0, 1, 0, 0))
        .unwrap();

    let (engine, event) = restore_with(&store, &clock, &scheduler);

    assert!(event.is_none());
    assert_eq!(engine.state(), TimerState::Idle);
    assert_eq!(engine.remaining_secs(), 60);
}

#[test]
fn test_corrupt_snapshot_falls_back_to_defaults() {
    let store = MemoryStore::new();
    let clock = ManualClock::default();
    let scheduler = ManualScheduler::new();

    store.set(keys::TIMER_STATE, "{not json").unwrap();
    let (engine, event) = restore_with(&store, &clock, &scheduler);

    assert!(event.is_none());
    assert_eq!(engine.state(), TimerState::Idle);
    assert_eq!(engine.remaining_secs(), 300);
    assert_eq!(engine.original_secs(), 300);
}

#[test]
fn test_catch_up_completion_fires_once() {
    let store = MemoryStore::new();
    let clock = ManualClock::default();
    let scheduler = ManualScheduler::new();

    let persisted_at = clock.now().timestamp_millis();
    store
        .set(keys::TIMER_STATE, &running_snapshot(0, 5, 0, 5, persisted_at))
        .unwrap();
    clock.advance(Duration::minutes(10));

    let (_, first) = restore_with(&store, &clock, &scheduler);
    assert!(first.is_some());

    // The finished state was persisted, so reopening reports nothing new.
    let (engine, second) = restore_with(&store, &clock, &scheduler);
    assert!(second.is_none());
    assert_eq!(engine.state(), TimerState::Finished);
}

#[test]
fn test_finished_snapshot_restores_without_event() {
    let store = MemoryStore::new();
    let clock = ManualClock::default();
    let scheduler = ManualScheduler::new();

    store
        .set(
            keys::TIMER_STATE,
            r#"{"minutes":0,"seconds":0,"originalMinutes":0,"originalSeconds":30,"isRunning":false,"isFinished":true,"lastUpdate":1}"#,
        )
        .unwrap();

    let (engine, event) = restore_with(&store, &clock, &scheduler);

    assert!(event.is_none());
    assert_eq!(engine.state(), TimerState::Finished);
    assert_eq!(engine.remaining_secs(), 0);
    assert_eq!(engine.original_secs(), 30);
}

#[test]
fn test_backwards_clock_resumes_with_full_remaining() {
    let store = MemoryStore::new();
    let clock = ManualClock::default();
    let scheduler = ManualScheduler::new();

    // lastUpdate claims to be in the future.
    let future = (clock.now() + Duration::hours(1)).timestamp_millis();
    store
        .set(keys::TIMER_STATE, &running_snapshot(0, 30, 0, 30, future))
        .unwrap();

    let (engine, event) = restore_with(&store, &clock, &scheduler);

    assert!(event.is_none());
    assert_eq!(engine.state(), TimerState::Running);
    assert_eq!(engine.remaining_secs(), 30);
}

#[test]
fn test_recovered_countdown_finishes_live() {
    let store = MemoryStore::new();
    let clock = ManualClock::default();
    let scheduler = ManualScheduler::new();

    let persisted_at = clock.now().timestamp_millis();
    store
        .set(keys::TIMER_STATE, &running_snapshot(0, 5, 0, 5, persisted_at))
        .unwrap();
    clock.advance(Duration::seconds(3));

    let (mut engine, event) = restore_with(&store, &clock, &scheduler);
    assert!(event.is_none());
    assert_eq!(engine.remaining_secs(), 2);

    assert!(engine.tick().is_none());
    let completed = engine.tick();
    assert!(matches!(
        completed,
        Some(Event::TimerCompleted {
            while_away: false,
            ..
        })
    ));
}

#[test]
fn test_out_of_range_snapshot_fields_are_clamped() {
    let store = MemoryStore::new();
    let clock = ManualClock::default();
    let scheduler = ManualScheduler::new();

    store
        .set(
            keys::TIMER_STATE,
            r#"{"minutes":120,"seconds":99,"originalMinutes":120,"originalSeconds":99,"isRunning":false,"isFinished":false,"lastUpdate":1}"#,
        )
        .unwrap();

    let (engine, _) = restore_with(&store, &clock, &scheduler);
    assert_eq!(engine.remaining_secs(), 59 * 60 + 59);
    assert_eq!(engine.original_secs(), 59 * 60 + 59);
}
