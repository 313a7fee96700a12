use clap::Subcommand;
use solari_core::preset::PRESETS;

#[derive(Subcommand)]
pub enum PresetAction {
    /// List the built-in presets
    List,
}

pub fn run(action: PresetAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PresetAction::List => {
            for preset in PRESETS {
                println!("{:<12} {:>2}:{:02}", preset.name, preset.minutes, preset.seconds);
            }
        }
    }
    Ok(())
}
