//! Planning pipeline: editorial intent to execution-ready transmission logs.
//!
//! Headless and artifact-producing. Each stage is a pure transform over the
//! previous stage's artifact:
//!
//! ```text
//! SchedulePlanArtifact -> ResolvedScheduleDay -> [EpgEvent]
//!                                   |
//!                                   v
//!                    [SegmentedBlock] -> [FilledBlock] -> TransmissionLog (locked)
//! ```
//!
//! Nothing here touches the sink or the wall clock; broadcast dates and the
//! channel timezone fully determine the output.

mod assembly;
mod config;
mod day;
mod epg;
mod error;
mod pipeline;
mod plan;
mod resolve;
mod segmenter;
mod traffic;
mod validate;

pub use assembly::{assemble_transmission_log, lock_for_execution};
pub use config::{ChannelType, DstPolicy, ScheduleManagerConfig};
pub use day::{broadcast_date_for, day_anchor_utc_ms, day_window_utc};
pub use epg::derive_epg;
pub use error::PlanError;
pub use pipeline::{PlannedDay, PlanningPipeline};
pub use plan::{DayOfWeek, SchedulePlanArtifact, ZoneDirective};
pub use resolve::{ResolvedScheduleDay, ResolvedSlot, resolve_schedule_day};
pub use segmenter::{BlockItem, BreakSpec, SegmentedBlock, segment_slot};
pub use traffic::{ChannelTrafficPolicy, FallbackFiller, FilledBlock, fill_breaks};
pub use validate::{GridAlignmentError, SeamError, validate_grid_alignment, validate_seams};
