use crate::overrides::{OverridePersistError, OverrideStore};
use chrono::NaiveDate;
use headend_types::{OverrideLayer, OverrideRecord, TransmissionLog};
use std::collections::HashMap;
use std::sync::Mutex;

/// Attempt to rewrite a locked artifact without an override record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("locked transmission log already exists for {channel}/{broadcast_date}")]
pub struct ArtifactExistsError {
    pub channel: String,
    pub broadcast_date: NaiveDate,
}

/// Store of locked transmission logs, keyed by (channel, broadcast date).
///
/// A locked log is write-once. Replacing one requires a durable override
/// record, created before the replacement is published.
#[derive(Debug, Default)]
pub struct CompiledLogStore {
    logs: Mutex<HashMap<(String, NaiveDate), TransmissionLog>>,
}

impl CompiledLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a locked log. Fails if the slot is already occupied; the
    /// stored artifact is never touched on failure.
    pub fn publish(&self, log: TransmissionLog) -> Result<(), ArtifactExistsError> {
        assert!(log.is_locked(), "only locked logs are publishable");
        let key = (log.channel.clone(), log.broadcast_date);
        let mut guard = self.logs.lock().expect("compiled log lock poisoned");
        if guard.contains_key(&key) {
            return Err(ArtifactExistsError {
                channel: key.0,
                broadcast_date: key.1,
            });
        }
        guard.insert(key, log);
        Ok(())
    }

    /// Replace a locked log under an already-persisted override record.
    ///
    /// Taking the record by reference keeps the ordering honest: callers
    /// must have a committed record in hand before this can be named.
    pub fn publish_override(&self, record: &OverrideRecord, log: TransmissionLog) {
        assert!(log.is_locked(), "only locked logs are publishable");
        tracing::warn!(
            override_id = record.id,
            reason_code = %record.reason_code,
            channel = %log.channel,
            broadcast_date = %log.broadcast_date,
            "replacing locked transmission log under override"
        );
        let key = (log.channel.clone(), log.broadcast_date);
        self.logs
            .lock()
            .expect("compiled log lock poisoned")
            .insert(key, log);
    }

    /// Full override flow: the record is durably persisted *before* the
    /// replacement is published. A persistence failure aborts the override
    /// and the stored artifact stays untouched.
    pub fn override_locked(
        &self,
        overrides: &dyn OverrideStore,
        reason_code: &str,
        log: TransmissionLog,
        now_ms: i64,
    ) -> Result<OverrideRecord, OverridePersistError> {
        let target_id = format!("{}/{}", log.channel, log.broadcast_date);
        let record =
            overrides.persist(OverrideLayer::TransmissionLog, &target_id, reason_code, now_ms)?;
        self.publish_override(&record, log);
        Ok(record)
    }

    pub fn get(&self, channel: &str, broadcast_date: NaiveDate) -> Option<TransmissionLog> {
        self.logs
            .lock()
            .expect("compiled log lock poisoned")
            .get(&(channel.to_string(), broadcast_date))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use headend_types::OverrideLayer;

    fn locked_log(marker_entries: usize) -> TransmissionLog {
        let mut log =
            TransmissionLog::new("retro-1", NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        for i in 0..marker_entries {
            log.entries.push(headend_types::TransmissionLogEntry {
                block_id: headend_types::BlockId::derive("a", i as i64),
                block_index: i as u32,
                start_utc_ms: i as i64 * 1_800_000,
                end_utc_ms: (i as i64 + 1) * 1_800_000,
                segments: vec![],
            });
        }
        log.lock().unwrap();
        log
    }

    #[test]
    fn republish_is_rejected_and_leaves_original() {
        let store = CompiledLogStore::new();
        let original = locked_log(1);
        store.publish(original.clone()).unwrap();
        assert_matches!(store.publish(locked_log(2)), Err(ArtifactExistsError { .. }));
        assert_eq!(
            store.get("retro-1", original.broadcast_date).unwrap(),
            original
        );
    }

    #[test]
    fn failed_record_persistence_aborts_the_override() {
        let store = CompiledLogStore::new();
        let original = locked_log(1);
        store.publish(original.clone()).unwrap();

        let overrides = crate::overrides::InMemoryOverrideStore::new();
        overrides.fail_next_persist();
        let err = store.override_locked(&overrides, "breaking-news", locked_log(2), 10);
        assert!(err.is_err());
        // Nothing published, nothing recorded.
        assert_eq!(
            store.get("retro-1", original.broadcast_date).unwrap(),
            original
        );
        assert!(overrides.records().is_empty());

        // With persistence healthy, the same override goes through and the
        // record precedes the artifact.
        let record = store
            .override_locked(&overrides, "breaking-news", locked_log(2), 11)
            .unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(
            store.get("retro-1", original.broadcast_date).unwrap(),
            locked_log(2)
        );
    }

    #[test]
    fn override_record_permits_replacement() {
        let store = CompiledLogStore::new();
        let original = locked_log(1);
        store.publish(original.clone()).unwrap();
        let record = OverrideRecord {
            id: 1,
            layer: OverrideLayer::TransmissionLog,
            target_id: "retro-1/2025-01-15".into(),
            reason_code: "breaking-news".into(),
            created_utc_ms: 0,
        };
        let replacement = locked_log(2);
        store.publish_override(&record, replacement.clone());
        assert_eq!(
            store.get("retro-1", original.broadcast_date).unwrap(),
            replacement
        );
    }
}
