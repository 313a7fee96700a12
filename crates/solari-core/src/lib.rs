//! # Solari Core Library
//!
//! This library provides the core logic for the Solari split-flap countdown
//! timer. It implements a CLI-first philosophy where all operations are
//! available via a standalone CLI binary; any GUI is expected to be a thin
//! layer over the same core library.
//!
//! ## Architecture
//!
//! - **Countdown Engine**: A wall-clock-based state machine that requires
//!   the caller to apply ticks; interrupted countdowns are recovered from
//!   persisted snapshots on the next start-up
//! - **Split-Flap Board**: Per-digit flip animators behind an MM:SS
//!   composer, driven by wall-clock deadlines
//! - **Storage**: SQLite-backed key-value persistence and TOML-based
//!   configuration
//! - **Collaborators**: Session statistics, completion sounds and the
//!   theme preference, each reading and writing the shared store
//!
//! ## Key Components
//!
//! - [`CountdownEngine`]: Core countdown state machine
//! - [`FlapBoard`]: Four-digit split-flap display
//! - [`KvStore`]: Persistence port, with SQLite and in-memory backends
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod flap;
pub mod preset;
pub mod sound;
pub mod stats;
pub mod storage;
pub mod theme;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, Result, StoreError};
pub use events::Event;
pub use flap::{split_digits, DigitFlap, FlapBoard, FlipPhase};
pub use preset::{Preset, PRESETS};
pub use sound::{NullPlayer, RecordingPlayer, SoundClip, SoundPlayer, SoundSettings, TerminalBell};
pub use stats::{SessionStats, StatsTracker};
pub use storage::{Config, KvStore, MemoryStore, SqliteStore};
pub use theme::Theme;
pub use timer::{
    CountdownEngine, ManualScheduler, ThreadScheduler, TickHandle, TickScheduler, TimerSnapshot,
    TimerState,
};
