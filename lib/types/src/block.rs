use crate::segment::ScheduledSegment;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Deterministic execution identity of a block.
///
/// Derived from `(asset key, start_utc_ms)` so the same programming at the
/// same instant always carries the same id, independent of the asset's own
/// UUIDs. First 96 bits of SHA-256, `blk-` prefixed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn derive(asset_key: &str, start_utc_ms: i64) -> Self {
        let digest = Sha256::digest(format!("{asset_key}:{start_utc_ms}").as_bytes());
        let mut hex = String::with_capacity(28);
        hex.push_str("blk-");
        for byte in &digest[..12] {
            hex.push_str(&format!("{byte:02x}"));
        }
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One execution-ready block of a transmission log. Frozen once the log is
/// locked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransmissionLogEntry {
    pub block_id: BlockId,
    pub block_index: u32,
    pub start_utc_ms: i64,
    pub end_utc_ms: i64,
    pub segments: Vec<ScheduledSegment>,
}

impl TransmissionLogEntry {
    pub fn duration_ms(&self) -> i64 {
        self.end_utc_ms - self.start_utc_ms
    }
}

/// Lifecycle of a transmission log. `Locked` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogState {
    Building,
    Locked,
}

/// Wall-clock-aligned, horizon-lockable sequence of blocks for one channel
/// and one broadcast date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransmissionLog {
    pub channel: String,
    pub broadcast_date: NaiveDate,
    pub state: LogState,
    pub entries: Vec<TransmissionLogEntry>,
}

/// Error returned when locking is requested twice. Locking never rewrites.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("transmission log for {channel}/{broadcast_date} is already locked")]
pub struct AlreadyLocked {
    pub channel: String,
    pub broadcast_date: NaiveDate,
}

impl TransmissionLog {
    pub fn new(channel: impl Into<String>, broadcast_date: NaiveDate) -> Self {
        Self {
            channel: channel.into(),
            broadcast_date,
            state: LogState::Building,
            entries: Vec::new(),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.state == LogState::Locked
    }

    /// Transition `building -> locked`. A second lock is an error and leaves
    /// the artifact untouched.
    pub fn lock(&mut self) -> Result<(), AlreadyLocked> {
        if self.is_locked() {
            return Err(AlreadyLocked {
                channel: self.channel.clone(),
                broadcast_date: self.broadcast_date,
            });
        }
        self.state = LogState::Locked;
        Ok(())
    }
}

/// Structural twin of [`TransmissionLogEntry`] held in the execution window.
///
/// Defined separately so the store stays independent of planning internals;
/// the runtime consumes only this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionEntry {
    pub block_id: BlockId,
    pub block_index: u32,
    pub start_utc_ms: i64,
    pub end_utc_ms: i64,
    pub segments: Vec<ScheduledSegment>,
}

impl ExecutionEntry {
    pub fn duration_ms(&self) -> i64 {
        self.end_utc_ms - self.start_utc_ms
    }
}

impl From<TransmissionLogEntry> for ExecutionEntry {
    fn from(entry: TransmissionLogEntry) -> Self {
        Self {
            block_id: entry.block_id,
            block_index: entry.block_index,
            start_utc_ms: entry.start_utc_ms,
            end_utc_ms: entry.end_utc_ms,
            segments: entry.segments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_id_is_deterministic_and_prefixed() {
        let a = BlockId::derive("asset-1", 1_736_935_200_000);
        let b = BlockId::derive("asset-1", 1_736_935_200_000);
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("blk-"));
        // blk- plus 96 bits as hex.
        assert_eq!(a.as_str().len(), 4 + 24);
    }

    #[test]
    fn block_id_varies_with_inputs() {
        let base = BlockId::derive("asset-1", 0);
        assert_ne!(base, BlockId::derive("asset-2", 0));
        assert_ne!(base, BlockId::derive("asset-1", 1));
    }

    #[test]
    fn double_lock_is_an_error_not_a_rewrite() {
        let mut log = TransmissionLog::new("retro-1", NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        log.lock().unwrap();
        let snapshot = log.clone();
        assert!(log.lock().is_err());
        assert_eq!(log, snapshot);
    }
}
