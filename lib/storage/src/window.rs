use headend_types::ExecutionEntry;
use std::collections::HashSet;
use std::sync::Mutex;

/// Read-only view of the execution window.
///
/// Consumers (channel manager, guide API) read pre-built data and never
/// trigger generation; a miss here is the horizon manager's failure.
pub trait ReadExecutionWindow: Send + Sync {
    /// First entry with `start_utc_ms` strictly after `after_utc_ms`.
    fn get_next_entry(&self, after_utc_ms: i64) -> Option<ExecutionEntry>;

    /// The unique entry whose `[start, end)` interval contains `at_utc_ms`.
    fn get_entry_at(&self, at_utc_ms: i64) -> Option<ExecutionEntry>;

    /// `start_utc_ms` of the earliest entry.
    fn window_start(&self) -> Option<i64>;

    /// `end_utc_ms` of the latest entry.
    fn window_end(&self) -> Option<i64>;

    /// Snapshot of all entries in `start_utc_ms` order.
    fn all_entries(&self) -> Vec<ExecutionEntry>;
}

/// Write half; held only by the horizon manager.
pub trait WriteExecutionWindow: Send + Sync {
    /// Append entries and maintain sort order. Duplicate block ids are
    /// silently ignored, so repeated extension is idempotent.
    fn add_entries(&self, entries: Vec<ExecutionEntry>);
}

/// Thread-safe, in-memory, sorted execution window.
///
/// No eviction and no persistence: the window is horizon-bounded by its
/// single writer, and durable restore lives outside the core.
#[derive(Debug, Default)]
pub struct ExecutionWindowStore {
    entries: Mutex<Vec<ExecutionEntry>>,
}

impl ExecutionWindowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("window lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl WriteExecutionWindow for ExecutionWindowStore {
    fn add_entries(&self, entries: Vec<ExecutionEntry>) {
        let mut guard = self.entries.lock().expect("window lock poisoned");
        let existing: HashSet<_> = guard.iter().map(|e| e.block_id.clone()).collect();
        let mut fresh: Vec<ExecutionEntry> = entries
            .into_iter()
            .filter(|e| !existing.contains(&e.block_id))
            .collect();
        if fresh.is_empty() {
            return;
        }
        tracing::debug!(added = fresh.len(), total = guard.len() + fresh.len(), "extending execution window");
        guard.append(&mut fresh);
        guard.sort_by_key(|e| e.start_utc_ms);
    }
}

impl ReadExecutionWindow for ExecutionWindowStore {
    fn get_next_entry(&self, after_utc_ms: i64) -> Option<ExecutionEntry> {
        let guard = self.entries.lock().expect("window lock poisoned");
        guard.iter().find(|e| e.start_utc_ms > after_utc_ms).cloned()
    }

    fn get_entry_at(&self, at_utc_ms: i64) -> Option<ExecutionEntry> {
        let guard = self.entries.lock().expect("window lock poisoned");
        guard
            .iter()
            .find(|e| e.start_utc_ms <= at_utc_ms && at_utc_ms < e.end_utc_ms)
            .cloned()
    }

    fn window_start(&self) -> Option<i64> {
        let guard = self.entries.lock().expect("window lock poisoned");
        guard.first().map(|e| e.start_utc_ms)
    }

    fn window_end(&self) -> Option<i64> {
        let guard = self.entries.lock().expect("window lock poisoned");
        guard.last().map(|e| e.end_utc_ms)
    }

    fn all_entries(&self) -> Vec<ExecutionEntry> {
        self.entries.lock().expect("window lock poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use headend_types::BlockId;

    fn entry(start_utc_ms: i64, end_utc_ms: i64) -> ExecutionEntry {
        ExecutionEntry {
            block_id: BlockId::derive("asset", start_utc_ms),
            block_index: 0,
            start_utc_ms,
            end_utc_ms,
            segments: vec![],
        }
    }

    #[test]
    fn entries_are_kept_sorted_regardless_of_add_order() {
        let store = ExecutionWindowStore::new();
        store.add_entries(vec![entry(3_600_000, 5_400_000), entry(0, 1_800_000)]);
        store.add_entries(vec![entry(1_800_000, 3_600_000)]);
        let starts: Vec<i64> = store.all_entries().iter().map(|e| e.start_utc_ms).collect();
        assert_eq!(starts, vec![0, 1_800_000, 3_600_000]);
        assert_eq!(store.window_start(), Some(0));
        assert_eq!(store.window_end(), Some(5_400_000));
    }

    #[test]
    fn duplicate_adds_are_idempotent() {
        let store = ExecutionWindowStore::new();
        let batch = vec![entry(0, 1_800_000), entry(1_800_000, 3_600_000)];
        store.add_entries(batch.clone());
        let snapshot = store.all_entries();
        store.add_entries(batch);
        assert_eq!(store.all_entries(), snapshot);
    }

    #[test]
    fn next_entry_is_strictly_after() {
        let store = ExecutionWindowStore::new();
        store.add_entries(vec![entry(0, 1_800_000), entry(1_800_000, 3_600_000)]);
        assert_eq!(store.get_next_entry(0).unwrap().start_utc_ms, 1_800_000);
        // A probe exactly at a start does not return that entry.
        assert_eq!(store.get_next_entry(1_800_000), None);
        assert_eq!(store.get_next_entry(-1).unwrap().start_utc_ms, 0);
    }

    #[test]
    fn entry_at_uses_half_open_intervals() {
        let store = ExecutionWindowStore::new();
        store.add_entries(vec![entry(0, 1_800_000), entry(1_800_000, 3_600_000)]);
        assert_eq!(store.get_entry_at(0).unwrap().start_utc_ms, 0);
        assert_eq!(store.get_entry_at(1_799_999).unwrap().start_utc_ms, 0);
        assert_eq!(store.get_entry_at(1_800_000).unwrap().start_utc_ms, 1_800_000);
        assert_eq!(store.get_entry_at(3_600_000), None);
    }
}
