//! Deterministic time primitives for the playout core.
//!
//! Everything here is integer-only. Wall-clock quantities are milliseconds
//! since the Unix epoch (UTC, `i64`); pacing quantities are frame indices.
//! Floating point is forbidden on timing paths.

mod clock;
mod fence;
mod grid;

pub use clock::{MasterClock, SessionEpoch, SteppedClock, SystemClock};
pub use fence::{deadline_offset_ns, fence_tick};
pub use grid::{elapsed_in_grid, grid_end, grid_start, remaining_in_grid};

/// Failures of the rational timebase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TimebaseError {
    /// Frame-rate numerator or denominator is zero.
    #[error("invalid timebase: frame rate {fps_num}/{fps_den}")]
    InvalidTimebase { fps_num: u32, fps_den: u32 },
}
