use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Break-placement strategy of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    /// Post-content filler only; chapter markers are ignored.
    Movie,
    /// Mid-content breaks at chapter markers (or computed breakpoints).
    Network,
}

/// How resolution treats a broadcast day whose civil length is not 24 h.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Fail loudly; an operator must intervene.
    Reject,
    /// Resolve one grid block fewer than a normal day.
    ShrinkOneBlock,
    /// Resolve one grid block more than a normal day.
    ExpandOneBlock,
}

/// Per-channel planning configuration.
#[derive(Debug, Clone)]
pub struct ScheduleManagerConfig {
    /// Channel slug; keys every artifact the planner produces.
    pub channel: String,
    /// IANA timezone the schedule is authored in.
    pub timezone: Tz,
    /// Grid granularity; one of 15, 30, 60.
    pub grid_block_minutes: u32,
    /// Local time-of-day the broadcast day starts at.
    pub broadcast_day_start: NaiveTime,
    pub channel_type: ChannelType,
    pub dst_policy: DstPolicy,
    /// Break count when content has no chapter markers.
    pub num_breaks: u32,
    /// Crossfade length applied at computed breakpoints.
    pub fade_duration_ms: i64,
}

impl ScheduleManagerConfig {
    pub fn grid_ms(&self) -> i64 {
        i64::from(self.grid_block_minutes) * 60_000
    }

    /// Grid blocks in a normal (24 h) broadcast day.
    pub fn slots_per_normal_day(&self) -> u32 {
        24 * 60 / self.grid_block_minutes
    }
}
