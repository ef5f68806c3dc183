use headend_types::SegmentType;
use std::sync::Mutex;

/// One placed interstitial, appended when traffic fills a break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayRecord {
    pub channel: String,
    pub asset_uri: String,
    pub asset_type: SegmentType,
    /// Scheduled air time of the spot (planning-time authority).
    pub played_at_utc_ms: i64,
    pub break_index: usize,
    pub block_id: String,
    pub duration_ms: i64,
}

/// Append-only play history consulted by break-fill policy decisions
/// (cooldowns and daily caps).
#[derive(Debug, Default)]
pub struct TrafficPlayLog {
    records: Mutex<Vec<PlayRecord>>,
}

impl TrafficPlayLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, record: PlayRecord) {
        self.records.lock().expect("play log poisoned").push(record);
    }

    /// Most recent play of `asset_uri` on `channel`, if any.
    pub fn last_played_ms(&self, channel: &str, asset_uri: &str) -> Option<i64> {
        self.records
            .lock()
            .expect("play log poisoned")
            .iter()
            .filter(|r| r.channel == channel && r.asset_uri == asset_uri)
            .map(|r| r.played_at_utc_ms)
            .max()
    }

    /// Number of plays of `asset_uri` on `channel` within `[day_start, day_end)`.
    pub fn plays_in_window(
        &self,
        channel: &str,
        asset_uri: &str,
        day_start_utc_ms: i64,
        day_end_utc_ms: i64,
    ) -> usize {
        self.records
            .lock()
            .expect("play log poisoned")
            .iter()
            .filter(|r| {
                r.channel == channel
                    && r.asset_uri == asset_uri
                    && r.played_at_utc_ms >= day_start_utc_ms
                    && r.played_at_utc_ms < day_end_utc_ms
            })
            .count()
    }

    pub fn records(&self) -> Vec<PlayRecord> {
        self.records.lock().expect("play log poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(uri: &str, at: i64) -> PlayRecord {
        PlayRecord {
            channel: "retro-1".into(),
            asset_uri: uri.into(),
            asset_type: SegmentType::Commercial,
            played_at_utc_ms: at,
            break_index: 0,
            block_id: "blk-x".into(),
            duration_ms: 30_000,
        }
    }

    #[test]
    fn last_played_and_daily_counts() {
        let log = TrafficPlayLog::new();
        log.append(record("file:///a.mp4", 1_000));
        log.append(record("file:///a.mp4", 5_000));
        log.append(record("file:///b.mp4", 2_000));
        assert_eq!(log.last_played_ms("retro-1", "file:///a.mp4"), Some(5_000));
        assert_eq!(log.last_played_ms("retro-1", "file:///c.mp4"), None);
        assert_eq!(log.plays_in_window("retro-1", "file:///a.mp4", 0, 10_000), 2);
        assert_eq!(log.plays_in_window("retro-1", "file:///a.mp4", 2_000, 10_000), 1);
    }
}
