use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerState;

/// Every observable transition in the engine produces an Event.
/// The CLI prints them; the watch loop routes completions to the
/// stats tracker and the sound player.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    DurationSet {
        minutes: u32,
        seconds: u32,
        at: DateTime<Utc>,
    },
    /// The countdown reached zero. Emitted exactly once per completed
    /// countdown; `while_away` marks completions discovered during
    /// recovery rather than observed live.
    TimerCompleted {
        duration_secs: u32,
        while_away: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        minutes: u32,
        seconds: u32,
        remaining_secs: u32,
        original_secs: u32,
        at: DateTime<Utc>,
    },
}
