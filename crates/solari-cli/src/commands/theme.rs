use clap::Subcommand;
use solari_core::storage::SqliteStore;
use solari_core::theme::Theme;

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Print the current theme
    Show,
    /// Switch between dark and light
    Toggle,
    /// Set the theme explicitly
    Set {
        /// "dark" or "light"
        theme: String,
    },
}

pub fn run(action: ThemeAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteStore::open()?;

    match action {
        ThemeAction::Show => {
            println!("{}", Theme::load(&store));
        }
        ThemeAction::Toggle => {
            let theme = Theme::load(&store).toggle();
            theme.save(&store);
            println!("{theme}");
        }
        ThemeAction::Set { theme } => {
            let theme: Theme = theme.parse()?;
            theme.save(&store);
            println!("{theme}");
        }
    }
    Ok(())
}
