//! Lifetime session totals.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::storage::{keys, KvStore};

/// Usage counters folded over every completed countdown.
///
/// Wire names match the `timer-stats` record of the original web version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionStats {
    /// Total completed countdown time in seconds.
    #[serde(rename = "totalTime")]
    pub total_secs: u64,
    #[serde(rename = "sessionsCompleted")]
    pub sessions_completed: u64,
}

/// Reads and updates [`SessionStats`] in the key-value store.
///
/// Malformed or missing records read as zeros rather than failing, so a
/// corrupted stats blob can never block the timer.
pub struct StatsTracker {
    store: Arc<dyn KvStore>,
}

impl StatsTracker {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub fn load(&self) -> SessionStats {
        self.store
            .get(keys::SESSION_STATS)
            .ok()
            .flatten()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    /// Fold one completed countdown into the totals and persist them.
    /// Returns the updated totals.
    pub fn record_completion(&self, duration_secs: u32) -> SessionStats {
        let mut stats = self.load();
        stats.total_secs = stats.total_secs.saturating_add(u64::from(duration_secs));
        stats.sessions_completed = stats.sessions_completed.saturating_add(1);
        self.save(stats);
        stats
    }

    /// Zero the totals.
    pub fn clear(&self) -> SessionStats {
        let stats = SessionStats::default();
        self.save(stats);
        stats
    }

    fn save(&self, stats: SessionStats) {
        if let Ok(json) = serde_json::to_string(&stats) {
            let _ = self.store.set(keys::SESSION_STATS, &json);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn tracker() -> (StatsTracker, MemoryStore) {
        let store = MemoryStore::new();
        (StatsTracker::new(Arc::new(store.clone())), store)
    }

    #[test]
    fn completions_accumulate() {
        let (tracker, _) = tracker();
        tracker.record_completion(300);
        let stats = tracker.record_completion(1500);
        assert_eq!(stats.sessions_completed, 2);
        assert_eq!(stats.total_secs, 1800);
    }

    #[test]
    fn corrupt_record_reads_as_zeros() {
        let (tracker, store) = tracker();
        store.set(keys::SESSION_STATS, "not json").unwrap();
        assert_eq!(tracker.load(), SessionStats::default());

        // And recording on top of it starts clean.
        let stats = tracker.record_completion(60);
        assert_eq!(stats.sessions_completed, 1);
        assert_eq!(stats.total_secs, 60);
    }

    #[test]
    fn clear_zeroes_the_totals() {
        let (tracker, _) = tracker();
        tracker.record_completion(120);
        assert_eq!(tracker.clear(), SessionStats::default());
        assert_eq!(tracker.load(), SessionStats::default());
    }

    #[test]
    fn wire_names_match_original_record() {
        let (tracker, store) = tracker();
        tracker.record_completion(90);

        let json = store.get(keys::SESSION_STATS).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["totalTime"], 90);
        assert_eq!(value["sessionsCompleted"], 1);
    }

    #[test]
    fn reads_original_wire_format() {
        let (tracker, store) = tracker();
        store
            .set(keys::SESSION_STATS, r#"{"totalTime":4500,"sessionsCompleted":3}"#)
            .unwrap();
        let stats = tracker.load();
        assert_eq!(stats.total_secs, 4500);
        assert_eq!(stats.sessions_completed, 3);
    }
}
