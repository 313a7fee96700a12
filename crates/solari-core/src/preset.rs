//! Built-in duration presets.

/// A named duration shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub minutes: u32,
    pub seconds: u32,
}

impl Preset {
    pub fn total_secs(&self) -> u32 {
        self.minutes * 60 + self.seconds
    }
}

/// The four shortcuts the timer has always shipped with.
pub const PRESETS: [Preset; 4] = [
    Preset {
        name: "Pomodoro",
        minutes: 25,
        seconds: 0,
    },
    Preset {
        name: "Short Break",
        minutes: 5,
        seconds: 0,
    },
    Preset {
        name: "Long Break",
        minutes: 15,
        seconds: 0,
    },
    // The duration fields cap at 59, so the focus hour lands one short.
    Preset {
        name: "Focus",
        minutes: 59,
        seconds: 0,
    },
];

/// Case-insensitive lookup; spaces, hyphens and underscores are
/// interchangeable, so "short-break" finds "Short Break".
pub fn find(name: &str) -> Option<&'static Preset> {
    let wanted = normalize(name);
    PRESETS.iter().find(|preset| normalize(preset.name) == wanted)
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
