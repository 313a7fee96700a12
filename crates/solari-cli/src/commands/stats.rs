use std::sync::Arc;

use clap::Subcommand;
use solari_core::stats::StatsTracker;
use solari_core::storage::{KvStore, SqliteStore};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Print session totals as JSON
    Show,
    /// Zero the totals
    Clear,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let store: Arc<dyn KvStore> = Arc::new(SqliteStore::open()?);
    let tracker = StatsTracker::new(store);

    match action {
        StatsAction::Show => {
            let stats = tracker.load();
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Clear => {
            tracker.clear();
            println!("stats cleared");
        }
    }
    Ok(())
}
