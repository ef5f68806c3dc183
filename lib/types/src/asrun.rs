use crate::segment::{BreakpointClass, SegmentType};
use serde::{Deserialize, Serialize};

/// One segment as attested after execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsRunSegment {
    pub segment_type: SegmentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_start_offset_ms: Option<i64>,
    pub segment_duration_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpoint_class: Option<BreakpointClass>,
    #[serde(default)]
    pub runtime_recovery: bool,
    #[serde(default)]
    pub runway_degradation: bool,
}

/// Append-only attestation of one executed (or abandoned) block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsRunBlock {
    pub block_id: String,
    pub channel: String,
    pub start_utc_ms: i64,
    pub end_utc_ms: i64,
    /// `completed_utc_ms - scheduled_end_utc_ms`, from the injected clock.
    /// Absent for blocks cut short by session loss.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_ms: Option<i64>,
    pub completed: bool,
    pub segments: Vec<AsRunSegment>,
}
