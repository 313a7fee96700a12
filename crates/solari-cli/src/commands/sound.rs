use clap::Subcommand;
use solari_core::sound::{SoundClip, SoundPlayer, SoundSettings, TerminalBell};
use solari_core::storage::SqliteStore;

#[derive(Subcommand)]
pub enum SoundAction {
    /// Print the current sound settings as JSON
    Show,
    /// Choose the completion sound (bell, chime, beep, gong, none)
    Set {
        /// Sound name
        clip: String,
    },
    /// Set the playback volume (clamped to 0.0..=1.0)
    Volume {
        /// Volume level
        volume: f32,
    },
    /// List the available sounds
    List,
    /// Play the configured sound once
    Test,
}

pub fn run(action: SoundAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteStore::open()?;

    match action {
        SoundAction::Show => {
            let settings = SoundSettings::load(&store);
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SoundAction::Set { clip } => {
            let clip: SoundClip = clip.parse()?;
            let mut settings = SoundSettings::load(&store);
            settings.set_clip(clip);
            settings.save(&store);
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SoundAction::Volume { volume } => {
            let mut settings = SoundSettings::load(&store);
            settings.set_volume(volume);
            settings.save(&store);
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SoundAction::List => {
            for clip in SoundClip::ALL {
                println!("{:<6} {:>4} Hz  {}", clip.to_string(), clip.frequency_hz(), clip.label());
            }
        }
        SoundAction::Test => {
            let settings = SoundSettings::load(&store);
            if settings.clip.is_audible() {
                TerminalBell.play(settings.clip, settings.volume);
                println!("played {} at volume {:.1}", settings.clip, settings.volume);
            } else {
                println!("sound is off");
            }
        }
    }
    Ok(())
}
