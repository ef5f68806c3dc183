//! Per-channel runtime: the state machine that keeps a channel on air.
//!
//! While viewers are attached, a [`ChannelManager`] drives one playout
//! session through the sink: seeding join-in-progress, feeding exactly one
//! block per completion, and tearing the session down within a bounded
//! deadline. Every timing decision reads the injected clock.

mod boundary;
mod channel_manager;
mod jip;
mod metrics;
mod ring_buffer;
mod runway;

pub use boundary::{BoundaryState, BoundaryTracker};
pub use channel_manager::{
    ChannelError, ChannelManager, ChannelRuntimeConfig, RunnerStats, RunnerStatus, SessionRunner,
    SharedStatus,
};
pub use jip::{JipError, JipPosition, compute_jip_position, trim_for_join};
pub use ring_buffer::TsRingBuffer;
pub use runway::{
    RunwayReadinessError, compute_runway_ms, session_runway_ms, validate_fence_readiness,
    validate_runway,
};
