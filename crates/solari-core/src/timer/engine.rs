//! Countdown engine implementation.
//!
//! The engine is a wall-clock-based state machine. It does not use
//! internal threads - while running it holds one handle from the injected
//! [`TickScheduler`], and the caller applies ticks via `tick()` or `pump()`.
//! Every mutation persists a snapshot, so a countdown keeps running in
//! wall-clock terms across process exits; `restore()` replays the elapsed
//! time on the next start-up.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Idle | Finished) -> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let (mut engine, caught_up) = CountdownEngine::restore(store, clock, scheduler, 5, 0);
//! engine.start();
//! // In a loop:
//! engine.pump(frame); // Returns Some(Event) when the countdown finishes
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::events::Event;
use crate::storage::{keys, KvStore};

use super::ticker::{TickHandle, TickScheduler};

/// Engine tick period. One tick is one second of countdown.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Upper bound for the minutes and seconds fields of a duration.
pub const MAX_FIELD: u32 = 59;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    /// Not counting: never started, paused, or reset.
    Idle,
    Running,
    /// Reached zero. Cleared by `reset` or `set_duration`.
    Finished,
}

/// Persisted engine snapshot.
///
/// The wire shape (camelCase fields, epoch-millisecond `lastUpdate`)
/// matches the record the original web version of this timer kept in
/// localStorage, so data written by it stays readable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerSnapshot {
    pub minutes: u32,
    pub seconds: u32,
    pub original_minutes: u32,
    pub original_seconds: u32,
    pub is_running: bool,
    pub is_finished: bool,
    pub last_update: Option<i64>,
}

/// Core countdown engine.
///
/// Holds the remaining and original duration in whole seconds. State
/// changes go through the command methods, each of which returns the
/// resulting [`Event`] (or `None` when the command is a no-op).
pub struct CountdownEngine {
    state: TimerState,
    remaining_secs: u32,
    original_secs: u32,
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn TickScheduler>,
    /// Live tick schedule; `Some` exactly while `Running`.
    ticks: Option<TickHandle>,
}

impl CountdownEngine {
    /// Create a fresh engine with the given duration, ignoring any
    /// persisted snapshot. Fields are clamped to `0..=59`.
    pub fn new(
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn TickScheduler>,
        minutes: u32,
        seconds: u32,
    ) -> Self {
        let total = clamp_field(minutes) * 60 + clamp_field(seconds);
        let engine = Self {
            state: TimerState::Idle,
            remaining_secs: total,
            original_secs: total,
            store,
            clock,
            scheduler,
            ticks: None,
        };
        engine.persist();
        engine
    }

    /// Restore the engine from the persisted snapshot, falling back to the
    /// given defaults when the snapshot is missing or unreadable.
    ///
    /// A snapshot that was running has the wall-clock time since its
    /// `lastUpdate` subtracted from it. If the countdown expired during
    /// the absence, the engine resumes as `Finished` and the returned
    /// event carries `while_away: true` so the caller can record the
    /// session without replaying the completion sound.
    pub fn restore(
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn TickScheduler>,
        default_minutes: u32,
        default_seconds: u32,
    ) -> (Self, Option<Event>) {
        let snapshot = store
            .get(keys::TIMER_STATE)
            .ok()
            .flatten()
            .and_then(|json| serde_json::from_str::<TimerSnapshot>(&json).ok());

        match snapshot {
            Some(snapshot) => Self::from_snapshot(snapshot, store, clock, scheduler),
            None => (
                Self::new(store, clock, scheduler, default_minutes, default_seconds),
                None,
            ),
        }
    }

    fn from_snapshot(
        snapshot: TimerSnapshot,
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn TickScheduler>,
    ) -> (Self, Option<Event>) {
        let remaining = clamp_field(snapshot.minutes) * 60 + clamp_field(snapshot.seconds);
        let original = (clamp_field(snapshot.original_minutes) * 60
            + clamp_field(snapshot.original_seconds))
        .max(remaining);

        let mut engine = Self {
            state: TimerState::Idle,
            remaining_secs: remaining,
            original_secs: original,
            store,
            clock,
            scheduler,
            ticks: None,
        };

        if snapshot.is_finished {
            engine.state = TimerState::Finished;
            engine.remaining_secs = 0;
            engine.persist();
            return (engine, None);
        }

        // The web version wrote `lastUpdate: Date.now()` and treated any
        // falsy value as absent; zero gets the same reading here.
        let last_update = snapshot.last_update.filter(|&ms| ms != 0);

        if snapshot.is_running && remaining > 0 {
            if let Some(last_ms) = last_update {
                let now = engine.clock.now();
                let elapsed_secs = ((now.timestamp_millis().saturating_sub(last_ms)) / 1000).max(0);

                if elapsed_secs >= i64::from(remaining) {
                    engine.state = TimerState::Finished;
                    engine.remaining_secs = 0;
                    engine.persist();
                    let event = Event::TimerCompleted {
                        duration_secs: engine.original_secs,
                        while_away: true,
                        at: now,
                    };
                    return (engine, Some(event));
                }

                engine.state = TimerState::Running;
                engine.remaining_secs = remaining - elapsed_secs as u32;
                engine.ticks = Some(engine.scheduler.schedule(TICK_PERIOD));
            }
            // Without a usable timestamp the countdown resumes paused.
        }

        engine.persist();
        (engine, None)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn original_secs(&self) -> u32 {
        self.original_secs
    }

    /// Minutes component of the remaining time.
    pub fn minutes(&self) -> u32 {
        self.remaining_secs / 60
    }

    /// Seconds component of the remaining time.
    pub fn seconds(&self) -> u32 {
        self.remaining_secs % 60
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_finished(&self) -> bool {
        self.state == TimerState::Finished
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            minutes: self.minutes(),
            seconds: self.seconds(),
            remaining_secs: self.remaining_secs,
            original_secs: self.original_secs,
            at: self.clock.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin counting down. Rejected while already running and when no
    /// time remains (a finished countdown must be reset first).
    pub fn start(&mut self) -> Option<Event> {
        if self.state == TimerState::Running || self.remaining_secs == 0 {
            return None;
        }
        self.state = TimerState::Running;
        self.ticks = Some(self.scheduler.schedule(TICK_PERIOD));
        self.persist();
        Some(Event::TimerStarted {
            remaining_secs: self.remaining_secs,
            at: self.clock.now(),
        })
    }

    /// Stop counting, keeping the remaining time.
    pub fn pause(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => {
                self.state = TimerState::Idle;
                self.ticks = None;
                self.persist();
                Some(Event::TimerPaused {
                    remaining_secs: self.remaining_secs,
                    at: self.clock.now(),
                })
            }
            _ => None,
        }
    }

    /// Stop counting and restore the originally configured duration.
    pub fn reset(&mut self) -> Option<Event> {
        self.state = TimerState::Idle;
        self.ticks = None;
        self.remaining_secs = self.original_secs;
        self.persist();
        Some(Event::TimerReset {
            remaining_secs: self.remaining_secs,
            at: self.clock.now(),
        })
    }

    /// Set a new duration, clamping each field to `0..=59`. Rejected while
    /// running; otherwise clears a finished state.
    pub fn set_duration(&mut self, minutes: u32, seconds: u32) -> Option<Event> {
        if self.state == TimerState::Running {
            return None;
        }
        let minutes = clamp_field(minutes);
        let seconds = clamp_field(seconds);
        self.state = TimerState::Idle;
        self.remaining_secs = minutes * 60 + seconds;
        self.original_secs = self.remaining_secs;
        self.persist();
        Some(Event::DurationSet {
            minutes,
            seconds,
            at: self.clock.now(),
        })
    }

    /// Apply one elapsed second. Only meaningful while running; returns
    /// the completion event on the tick that reaches zero.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.state = TimerState::Finished;
            self.ticks = None;
            self.persist();
            return Some(Event::TimerCompleted {
                duration_secs: self.original_secs,
                while_away: false,
                at: self.clock.now(),
            });
        }
        self.persist();
        None
    }

    /// Wait up to `timeout` for the next scheduled tick and apply it.
    /// Returns immediately when the engine is not running.
    pub fn pump(&mut self, timeout: Duration) -> Option<Event> {
        let due = match &self.ticks {
            Some(handle) => handle.wait(timeout),
            None => false,
        };
        if due {
            self.tick()
        } else {
            None
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Best-effort snapshot write; a failure leaves the previous snapshot
    /// in place.
    fn persist(&self) {
        if let Ok(json) = serde_json::to_string(&self.to_snapshot()) {
            let _ = self.store.set(keys::TIMER_STATE, &json);
        }
    }

    fn to_snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            minutes: self.minutes(),
            seconds: self.seconds(),
            original_minutes: self.original_secs / 60,
            original_seconds: self.original_secs % 60,
            is_running: self.state == TimerState::Running,
            is_finished: self.state == TimerState::Finished,
            last_update: Some(self.clock.now().timestamp_millis()),
        }
    }
}

fn clamp_field(value: u32) -> u32 {
    value.min(MAX_FIELD)
}
