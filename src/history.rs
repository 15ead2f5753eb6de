//! Bounded ledger of recent presentations.
//!
//! The whole ledger is stored as one JSON array under [`HISTORY_KEY`],
//! newest first. Persistence failures are logged and otherwise ignored:
//! history is a convenience and must never fail a generation.

use crate::model::HistoryEntry;
use crate::storage::KeyValueStore;
use time::OffsetDateTime;
use tracing::{debug, warn};

pub const HISTORY_KEY: &str = "recentPresentations";
pub const MAX_HISTORY_ENTRIES: usize = 10;

pub struct HistoryStore<S> {
    store: S,
    entries: Vec<HistoryEntry>,
    last_id: u64,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// An empty, unloaded ledger over `store`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            entries: Vec::new(),
            last_id: 0,
        }
    }

    /// Construct and [`load`](Self::load) in one step.
    pub fn open(store: S) -> Self {
        let mut history = Self::new(store);
        history.load();
        history
    }

    /// Read the persisted ledger. Missing or unreadable data yields an empty one.
    pub fn load(&mut self) -> &[HistoryEntry] {
        let raw = match self.store.get(HISTORY_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "failed to read presentation history");
                None
            }
        };

        self.entries = match raw {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
                Ok(mut entries) => {
                    entries.truncate(MAX_HISTORY_ENTRIES);
                    entries
                }
                Err(e) => {
                    warn!(error = %e, "discarding corrupt presentation history");
                    Vec::new()
                }
            },
        };

        let highest = self
            .entries
            .iter()
            .filter_map(|e| e.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        self.last_id = self.last_id.max(highest);

        debug!(entries = self.entries.len(), "loaded presentation history");
        &self.entries
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Allocate a fresh entry id: creation time in milliseconds, bumped past
    /// every id issued or loaded so far so ids are never reused.
    pub fn next_id(&mut self) -> String {
        let now_ms = u64::try_from(OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000)
            .unwrap_or(0);
        let mut id = now_ms.max(self.last_id.saturating_add(1));
        // Only reachable once the counter has saturated at u64::MAX.
        while self.get(&id.to_string()).is_some() {
            id = id.wrapping_sub(1);
        }
        self.last_id = self.last_id.max(id);
        id.to_string()
    }

    /// Prepend `entry` and keep the newest [`MAX_HISTORY_ENTRIES`].
    pub fn record(&mut self, entry: HistoryEntry) {
        if let Ok(id) = entry.id.parse::<u64>() {
            self.last_id = self.last_id.max(id);
        }
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_HISTORY_ENTRIES);
        self.persist();
    }

    /// Remove the entry with `id`; no-op if absent.
    pub fn delete(&mut self, id: &str) {
        self.entries.retain(|e| e.id != id);
        self.persist();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    fn persist(&self) {
        let encoded = match serde_json::to_string(&self.entries) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "failed to encode presentation history");
                return;
            }
        };
        if let Err(e) = self.store.set(HISTORY_KEY, &encoded) {
            warn!(error = %e, "failed to save presentation history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::MemoryStore;

    fn entry(history: &mut HistoryStore<MemoryStore>, title: &str) -> HistoryEntry {
        HistoryEntry {
            id: history.next_id(),
            artifact_filename: format!("{title}.pptx"),
            title: title.to_string(),
            slide_count: 8,
            template_id: "executive".into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn eleventh_record_evicts_the_oldest() {
        let store = MemoryStore::new();
        let mut history = HistoryStore::open(store.clone());
        for i in 0..11 {
            let e = entry(&mut history, &format!("deck-{i}"));
            history.record(e);
        }

        assert_eq!(history.len(), MAX_HISTORY_ENTRIES);
        assert_eq!(history.entries()[0].title, "deck-10");
        assert!(history.entries().iter().all(|e| e.title != "deck-0"));

        let reloaded = HistoryStore::open(store);
        assert_eq!(reloaded.entries(), history.entries());
    }

    #[test]
    fn delete_is_idempotent() {
        let mut history = HistoryStore::open(MemoryStore::new());
        for title in ["a", "b", "c"] {
            let e = entry(&mut history, title);
            history.record(e);
        }
        let target = history.entries()[1].id.clone();

        history.delete(&target);
        let once = history.entries().to_vec();
        history.delete(&target);
        assert_eq!(history.entries(), once.as_slice());
        assert_eq!(once.len(), 2);

        history.delete("no-such-id");
        assert_eq!(history.entries(), once.as_slice());
    }

    #[test]
    fn clear_persists_empty_ledger() {
        let store = MemoryStore::new();
        let mut history = HistoryStore::open(store.clone());
        let e = entry(&mut history, "x");
        history.record(e);
        history.clear();

        assert!(history.is_empty());
        assert_eq!(store.get(HISTORY_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn corrupt_or_missing_ledger_loads_empty() {
        let store = MemoryStore::new();
        assert!(HistoryStore::open(store.clone()).is_empty());

        store.set(HISTORY_KEY, "{not json").unwrap();
        assert!(HistoryStore::open(store).is_empty());
    }

    #[test]
    fn ids_are_unique_and_not_reused_after_delete() {
        let mut history = HistoryStore::open(MemoryStore::new());
        let first = entry(&mut history, "a");
        let first_id = first.id.clone();
        history.record(first);
        history.delete(&first_id);

        let mut seen = std::collections::HashSet::new();
        seen.insert(first_id);
        for _ in 0..50 {
            assert!(seen.insert(history.next_id()));
        }
    }

    #[test]
    fn ids_continue_past_loaded_entries() {
        let store = MemoryStore::new();
        let far_future = u64::MAX / 2;
        store
            .set(
                HISTORY_KEY,
                &format!(
                    r#"[{{"id":"{far_future}","filename":"a.pptx","title":"a","slides":5,"template":"executive","timestamp":"2024-01-01T00:00:00Z"}}]"#
                ),
            )
            .unwrap();
        let mut history = HistoryStore::open(store);
        assert_eq!(history.len(), 1);
        assert_eq!(history.next_id(), (far_future + 1).to_string());
    }

    #[test]
    fn saturated_id_ledger_still_records() {
        let store = MemoryStore::new();
        store
            .set(
                HISTORY_KEY,
                &format!(
                    r#"[{{"id":"{}","filename":"a.pptx","title":"a","slides":5,"template":"executive","timestamp":"2024-01-01T00:00:00Z"}}]"#,
                    u64::MAX
                ),
            )
            .unwrap();
        let mut history = HistoryStore::open(store.clone());

        for title in ["b", "c"] {
            let e = entry(&mut history, title);
            history.record(e);
        }

        let ids: std::collections::HashSet<_> =
            history.entries().iter().map(|e| e.id.clone()).collect();
        assert_eq!(history.len(), 3);
        assert_eq!(ids.len(), 3);
        assert_eq!(HistoryStore::open(store).len(), 3);
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(std::io::Error::other("disk on fire").into())
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(std::io::Error::other("disk on fire").into())
        }
        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(std::io::Error::other("disk on fire").into())
        }
    }

    #[test]
    fn storage_failures_are_swallowed() {
        let mut history = HistoryStore::open(BrokenStore);
        assert!(history.is_empty());

        let e = HistoryEntry {
            id: history.next_id(),
            artifact_filename: "a.pptx".into(),
            title: "a".into(),
            slide_count: 5,
            template_id: "executive".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        history.record(e);
        assert_eq!(history.len(), 1);
        history.clear();
        assert!(history.is_empty());
    }
}
