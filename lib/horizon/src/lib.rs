//! Horizon management: the sole authority permitted to trigger planning.
//!
//! The manager keeps the execution window a configured depth ahead of the
//! playhead. Consumers (channel manager, guide API) only ever read; when a
//! read path finds nothing, that is a planning failure to surface, never a
//! cue to regenerate.

mod manager;
mod metrics;
mod mode;

pub use manager::{DayPlanner, HorizonConfig, HorizonManager};
pub use mode::HorizonAuthorityMode;

/// A read path found missing schedule/execution data in authoritative mode.
///
/// The horizon manager did not extend far enough. Consumers must propagate
/// this error; regenerating on the read path is a policy violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no schedule data for channel {channel} at {at_utc_ms} ms")]
pub struct NoScheduleDataError {
    pub channel: String,
    pub at_utc_ms: i64,
}
