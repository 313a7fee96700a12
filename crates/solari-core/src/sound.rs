//! Completion sound settings and the playback port.

use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::storage::{keys, KvStore};

/// The selectable completion sounds.
///
/// Frequencies are the oscillator pitches the original web player used;
/// backends that cannot synthesize tones may ignore them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundClip {
    Bell,
    Chime,
    Beep,
    Gong,
    None,
}

impl SoundClip {
    pub const ALL: [SoundClip; 5] = [
        SoundClip::Bell,
        SoundClip::Chime,
        SoundClip::Beep,
        SoundClip::Gong,
        SoundClip::None,
    ];

    pub fn frequency_hz(self) -> u32 {
        match self {
            SoundClip::Bell => 800,
            SoundClip::Chime => 1200,
            SoundClip::Beep => 440,
            SoundClip::Gong => 200,
            SoundClip::None => 0,
        }
    }

    /// Human-readable name for listings.
    pub fn label(self) -> &'static str {
        match self {
            SoundClip::Bell => "Bell",
            SoundClip::Chime => "Chime",
            SoundClip::Beep => "Beep",
            SoundClip::Gong => "Gong",
            SoundClip::None => "No Sound",
        }
    }

    pub fn is_audible(self) -> bool {
        self != SoundClip::None
    }

    fn id(self) -> &'static str {
        match self {
            SoundClip::Bell => "bell",
            SoundClip::Chime => "chime",
            SoundClip::Beep => "beep",
            SoundClip::Gong => "gong",
            SoundClip::None => "none",
        }
    }
}

impl fmt::Display for SoundClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SoundClip {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bell" => Ok(SoundClip::Bell),
            "chime" => Ok(SoundClip::Chime),
            "beep" => Ok(SoundClip::Beep),
            "gong" => Ok(SoundClip::Gong),
            "none" => Ok(SoundClip::None),
            other => Err(format!(
                "unknown sound '{other}' (expected bell, chime, beep, gong or none)"
            )),
        }
    }
}

/// Persisted sound preferences.
///
/// Wire shape matches the `timer-sound-settings` record of the original
/// web version.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundSettings {
    #[serde(rename = "sound")]
    pub clip: SoundClip,
    pub volume: f32,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            clip: SoundClip::Bell,
            volume: 0.5,
        }
    }
}

impl SoundSettings {
    /// Load from the store; malformed or missing records read as default.
    pub fn load(store: &dyn KvStore) -> Self {
        store
            .get(keys::SOUND_SETTINGS)
            .ok()
            .flatten()
            .and_then(|json| serde_json::from_str::<Self>(&json).ok())
            .map(Self::clamped)
            .unwrap_or_default()
    }

    /// Best-effort persist.
    pub fn save(&self, store: &dyn KvStore) {
        if let Ok(json) = serde_json::to_string(self) {
            let _ = store.set(keys::SOUND_SETTINGS, &json);
        }
    }

    pub fn set_clip(&mut self, clip: SoundClip) {
        self.clip = clip;
    }

    /// Volume lands in `0.0..=1.0` no matter what is passed.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn clamped(mut self) -> Self {
        self.volume = self.volume.clamp(0.0, 1.0);
        self
    }
}

/// Fire-and-forget playback.
///
/// Implementations swallow their own failures; a broken audio path never
/// disturbs the countdown.
pub trait SoundPlayer: Send + Sync {
    fn play(&self, clip: SoundClip, volume: f32);
}

/// Rings the terminal bell. The clip's pitch cannot be reproduced here,
/// but the cue still fires; `none` and zero volume stay silent.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl SoundPlayer for TerminalBell {
    fn play(&self, clip: SoundClip, volume: f32) {
        if !clip.is_audible() || volume <= 0.0 {
            return;
        }
        let mut out = std::io::stdout();
        let _ = out.write_all(b"\x07");
        let _ = out.flush();
    }
}

/// Discards every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPlayer;

impl SoundPlayer for NullPlayer {
    fn play(&self, _clip: SoundClip, _volume: f32) {}
}

/// Test player that remembers every request.
#[derive(Debug, Default)]
pub struct RecordingPlayer {
    played: Mutex<Vec<(SoundClip, f32)>>,
}

impl RecordingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<(SoundClip, f32)> {
        self.lock().clone()
    }

    pub fn play_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(SoundClip, f32)>> {
        self.played
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SoundPlayer for RecordingPlayer {
    fn play(&self, clip: SoundClip, volume: f32) {
        self.lock().push((clip, volume));
    }
}
