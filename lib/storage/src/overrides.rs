use headend_types::{OverrideLayer, OverrideRecord};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// The record could not be durably stored; the override must be aborted and
/// its artifact must not be published.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("override record persist failed for {layer:?}/{target_id}")]
pub struct OverridePersistError {
    pub layer: OverrideLayer,
    pub target_id: String,
}

/// Durable-record capability required before any override artifact is
/// committed. `persist` is atomic and the record is durable before return.
pub trait OverrideStore: Send + Sync {
    fn persist(
        &self,
        layer: OverrideLayer,
        target_id: &str,
        reason_code: &str,
        now_ms: i64,
    ) -> Result<OverrideRecord, OverridePersistError>;

    /// Snapshot of all records, in id order. Records are never deleted.
    fn records(&self) -> Vec<OverrideRecord>;
}

/// In-memory override store with monotonically increasing ids.
#[derive(Debug, Default)]
pub struct InMemoryOverrideStore {
    records: Mutex<Vec<OverrideRecord>>,
    /// Failure injection for persistence tests.
    fail_next_persist: AtomicBool,
}

impl InMemoryOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_persist(&self) {
        self.fail_next_persist.store(true, Ordering::SeqCst);
    }
}

impl OverrideStore for InMemoryOverrideStore {
    fn persist(
        &self,
        layer: OverrideLayer,
        target_id: &str,
        reason_code: &str,
        now_ms: i64,
    ) -> Result<OverrideRecord, OverridePersistError> {
        if self.fail_next_persist.swap(false, Ordering::SeqCst) {
            return Err(OverridePersistError {
                layer,
                target_id: target_id.to_string(),
            });
        }
        let mut guard = self.records.lock().expect("override lock poisoned");
        let record = OverrideRecord {
            id: guard.len() as u64 + 1,
            layer,
            target_id: target_id.to_string(),
            reason_code: reason_code.to_string(),
            created_utc_ms: now_ms,
        };
        guard.push(record.clone());
        Ok(record)
    }

    fn records(&self) -> Vec<OverrideRecord> {
        self.records.lock().expect("override lock poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic() {
        let store = InMemoryOverrideStore::new();
        let a = store
            .persist(OverrideLayer::TransmissionLog, "t1", "manual", 10)
            .unwrap();
        let b = store
            .persist(OverrideLayer::ScheduleDay, "t2", "manual", 20)
            .unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.records().len(), 2);
    }

    #[test]
    fn injected_failure_persists_nothing() {
        let store = InMemoryOverrideStore::new();
        store.fail_next_persist();
        let err = store.persist(OverrideLayer::TransmissionLog, "t1", "manual", 10);
        assert!(err.is_err());
        assert!(store.records().is_empty());
        // The failure is one-shot.
        assert!(
            store
                .persist(OverrideLayer::TransmissionLog, "t1", "manual", 11)
                .is_ok()
        );
    }
}
