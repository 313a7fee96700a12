use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use solari_core::clock::SystemClock;
use solari_core::flap::FlapBoard;
use solari_core::sound::{SoundPlayer, SoundSettings, TerminalBell};
use solari_core::stats::StatsTracker;
use solari_core::storage::{Config, KvStore, SqliteStore};
use solari_core::timer::{CountdownEngine, ThreadScheduler, TimerState};
use solari_core::Event;

/// Render cadence for the watch loop. Ticks land once per second; the
/// extra frames exist for the flip animation.
const FRAME: Duration = Duration::from_millis(50);

#[derive(Subcommand)]
pub enum TimerAction {
    /// Set the countdown duration (each field clamped to 0..=59)
    Set {
        /// Minutes; keeps the current value when omitted
        #[arg(long, conflicts_with = "preset")]
        minutes: Option<u32>,
        /// Seconds; keeps the current value when omitted
        #[arg(long, conflicts_with = "preset")]
        seconds: Option<u32>,
        /// Use a named preset instead (see `preset list`)
        #[arg(long)]
        preset: Option<String>,
    },
    /// Start the countdown
    Start,
    /// Pause the countdown, keeping the remaining time
    Pause,
    /// Stop and restore the original duration
    Reset,
    /// Print the current state as JSON
    Status,
    /// Run the countdown live with the split-flap board.
    /// Ctrl-C leaves it running in wall-clock time; reopen to pick it up.
    Watch {
        /// Set this duration first (MM:SS, e.g. "25:00")
        #[arg(long)]
        duration: Option<String>,
    },
}

fn open_store() -> Result<Arc<dyn KvStore>, Box<dyn std::error::Error>> {
    Ok(Arc::new(SqliteStore::open()?))
}

/// Restore the engine, routing a completion that happened while no
/// process was running: the session still counts, the bell stays quiet.
fn open_engine(store: &Arc<dyn KvStore>) -> CountdownEngine {
    let cfg = Config::load_or_default();
    let (engine, caught_up) = CountdownEngine::restore(
        Arc::clone(store),
        Arc::new(SystemClock),
        Arc::new(ThreadScheduler),
        cfg.timer.default_minutes,
        cfg.timer.default_seconds,
    );

    if let Some(Event::TimerCompleted { duration_secs, .. }) = caught_up {
        let stats = StatsTracker::new(Arc::clone(store)).record_completion(duration_secs);
        tracing::info!(
            duration_secs,
            sessions = stats.sessions_completed,
            "countdown finished while away"
        );
    }

    engine
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;

    match action {
        TimerAction::Set {
            minutes,
            seconds,
            preset,
        } => {
            let mut engine = open_engine(&store);
            let (m, s) = match preset {
                Some(name) => {
                    let preset = solari_core::preset::find(&name)
                        .ok_or_else(|| format!("unknown preset: {name}"))?;
                    (preset.minutes, preset.seconds)
                }
                None => {
                    if minutes.is_none() && seconds.is_none() {
                        return Err("provide --minutes and/or --seconds, or --preset".into());
                    }
                    (
                        minutes.unwrap_or_else(|| engine.minutes()),
                        seconds.unwrap_or_else(|| engine.seconds()),
                    )
                }
            };
            match engine.set_duration(m, s) {
                Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
                None => {
                    return Err("cannot change the duration while the countdown is running".into())
                }
            }
        }
        TimerAction::Start => {
            let mut engine = open_engine(&store);
            match engine.start() {
                Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
                None => println!("{}", serde_json::to_string_pretty(&engine.snapshot())?),
            }
        }
        TimerAction::Pause => {
            let mut engine = open_engine(&store);
            match engine.pause() {
                Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
                None => println!("{}", serde_json::to_string_pretty(&engine.snapshot())?),
            }
        }
        TimerAction::Reset => {
            let mut engine = open_engine(&store);
            match engine.reset() {
                Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
                None => println!("{}", serde_json::to_string_pretty(&engine.snapshot())?),
            }
        }
        TimerAction::Status => {
            let engine = open_engine(&store);
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
        }
        TimerAction::Watch { duration } => watch(store, duration)?,
    }

    Ok(())
}

fn watch(store: Arc<dyn KvStore>, duration: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load_or_default();
    let mut engine = open_engine(&store);

    if let Some(spec) = duration {
        let (m, s) = parse_duration(&spec)?;
        if engine.set_duration(m, s).is_none() {
            return Err("cannot change the duration while the countdown is running".into());
        }
    }

    if !engine.is_running() && engine.start().is_none() {
        return Err("nothing to count down: set a duration first".into());
    }

    let settings = SoundSettings::load(store.as_ref());
    let player = TerminalBell;
    let tracker = StatsTracker::new(Arc::clone(&store));
    let mut board =
        FlapBoard::with_flip_duration(engine.remaining_secs(), cfg.display.flip_duration_ms);

    tracing::info!(remaining_secs = engine.remaining_secs(), "watching countdown");
    render(&board, engine.state());

    loop {
        let completed = if engine.is_running() {
            engine.pump(FRAME)
        } else {
            std::thread::sleep(FRAME);
            None
        };

        let now = chrono::Utc::now();
        board.observe(engine.remaining_secs(), now);
        board.poll(now);
        render(&board, engine.state());

        if let Some(Event::TimerCompleted { duration_secs, .. }) = completed {
            let stats = tracker.record_completion(duration_secs);
            player.play(settings.clip, settings.volume);
            tracing::info!(sessions = stats.sessions_completed, "countdown complete");
        }

        if engine.is_finished() && board.is_settled() {
            println!();
            println!("Time's up!");
            break;
        }
    }

    Ok(())
}

/// One-line board: flipping digits render in parentheses.
fn render(board: &FlapBoard, state: TimerState) {
    use std::io::Write;

    let digits = board.displayed();
    let cells: Vec<String> = board
        .digits()
        .iter()
        .zip(digits.iter())
        .map(|(flap, d)| {
            if flap.is_flipping() {
                format!("({d})")
            } else {
                format!("[{d}]")
            }
        })
        .collect();

    let status = match state {
        TimerState::Running => "running",
        TimerState::Finished => "finished",
        TimerState::Idle => "paused",
    };

    print!(
        "\r {}{} : {}{}  {status:<8}",
        cells[0], cells[1], cells[2], cells[3]
    );
    let _ = std::io::stdout().flush();
}

fn parse_duration(spec: &str) -> Result<(u32, u32), Box<dyn std::error::Error>> {
    let (m, s) = spec
        .split_once(':')
        .ok_or_else(|| format!("expected MM:SS, got '{spec}'"))?;
    let minutes: u32 = m
        .trim()
        .parse()
        .map_err(|_| format!("bad minutes in '{spec}'"))?;
    let seconds: u32 = s
        .trim()
        .parse()
        .map_err(|_| format!("bad seconds in '{spec}'"))?;
    Ok((minutes, seconds))
}
