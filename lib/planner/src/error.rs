use crate::validate::{GridAlignmentError, SeamError};
use chrono::{NaiveDate, NaiveTime};
use headend_catalog::CatalogError;
use headend_types::AlreadyLocked;

/// Failures of the planning pipeline. All of these abort the current
/// planning unit (a broadcast day); none are recovered by retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("plan {plan_id} is not active on {date}")]
    PlanInactive { plan_id: String, date: NaiveDate },

    #[error("zone {zone_id} has no eligible programs")]
    EmptyProgramFamily { zone_id: String },

    #[error("broadcast day {date} changes civil length by {delta_ms} ms and DST policy is reject")]
    DstChangeRejected { date: NaiveDate, delta_ms: i64 },

    #[error("local time {time} on {date} does not exist in {timezone}")]
    UnrepresentableLocalTime {
        date: NaiveDate,
        time: NaiveTime,
        timezone: String,
    },

    #[error(
        "zone {zone_id} boundary at {minutes_from_anchor} min from the day anchor is off the \
         {grid_block_minutes}-minute grid"
    )]
    ZoneNotGridAligned {
        zone_id: String,
        minutes_from_anchor: u32,
        grid_block_minutes: u32,
    },

    #[error("zones do not tile the broadcast day: {detail}")]
    ZoneCoverage { detail: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("break {break_index} of {block_key}: fallback filler {filler_ms} ms is shorter than break {break_ms} ms")]
    FallbackFillerTooShort {
        block_key: String,
        break_index: usize,
        break_ms: i64,
        filler_ms: i64,
    },

    #[error(transparent)]
    Seam(#[from] SeamError),

    #[error(transparent)]
    GridAlignment(#[from] GridAlignmentError),

    #[error(transparent)]
    AlreadyLocked(#[from] AlreadyLocked),
}
