mod engine;
mod ticker;

pub use engine::{CountdownEngine, TimerSnapshot, TimerState, MAX_FIELD, TICK_PERIOD};
pub use ticker::{ManualScheduler, ThreadScheduler, TickHandle, TickScheduler};
