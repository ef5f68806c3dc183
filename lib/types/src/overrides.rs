use serde::{Deserialize, Serialize};

/// Which planning layer an operator override targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideLayer {
    SchedulePlan,
    ScheduleDay,
    TransmissionLog,
}

/// Durable record of an operator override.
///
/// Monotonically numbered and persisted *before* the override artifact is
/// published; an override with no committed record never reaches a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRecord {
    pub id: u64,
    pub layer: OverrideLayer,
    pub target_id: String,
    pub reason_code: String,
    pub created_utc_ms: i64,
}
