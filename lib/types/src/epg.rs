use crate::program::ProgramRef;
use serde::{Deserialize, Serialize};

/// Viewer-facing guide event, derived from a resolved schedule day.
///
/// Carries the same seam and ordering guarantees as the transmission log it
/// was projected from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpgEvent {
    pub channel: String,
    pub start_utc_ms: i64,
    pub end_utc_ms: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    pub program_ref: ProgramRef,
}
