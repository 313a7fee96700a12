//! Persistence: the key-value store port, its SQLite and in-memory
//! backends, and the TOML application config.

mod config;
mod memory;
mod sqlite;

pub use config::{Config, DisplayConfig, TimerConfig};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::path::PathBuf;

use crate::error::StoreError;

/// Keys used in the store. Kept verbatim from the original web version
/// of this timer so existing data stays readable.
pub mod keys {
    /// Countdown engine snapshot (JSON).
    pub const TIMER_STATE: &str = "timer-state";
    /// Completion sound settings (JSON).
    pub const SOUND_SETTINGS: &str = "timer-sound-settings";
    /// Lifetime session totals (JSON).
    pub const SESSION_STATS: &str = "timer-stats";
    /// Theme preference, the literal string "dark" or "light".
    pub const THEME: &str = "solari-timer-theme";
}

/// String key-value persistence.
///
/// Engine snapshots, sound settings, session stats and the theme all live
/// behind this port. Production uses [`SqliteStore`]; tests use
/// [`MemoryStore`].
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Returns the data directory, creating it if needed.
///
/// `SOLARI_DATA_DIR` overrides the location outright (tests rely on this).
/// Otherwise the directory is `~/.config/solari`, or `~/.config/solari-dev`
/// when `SOLARI_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("SOLARI_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("SOLARI_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("solari-dev")
            } else {
                base_dir.join("solari")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
