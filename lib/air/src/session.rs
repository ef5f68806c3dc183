//! The playout session: Core's handle on one attached, running sink.
//!
//! A session is opened by a [`PlayoutGateway`], carries exactly one event
//! subscription, and dies with it. The event stream is exposed as an
//! explicit `next_event()` sequence with a terminal element; nothing is
//! buffered beyond the transport.

use crate::proto;
use crate::proto::air_control_client::AirControlClient;
use async_trait::async_trait;
use headend_timebase::MasterClock;
use headend_types::ExecutionEntry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Output geometry, timing base, and audio layout for a channel session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramFormat {
    pub width: u32,
    pub height: u32,
    pub frame_rate_num: u32,
    pub frame_rate_den: u32,
    pub aspect_policy: AspectPolicy,
    pub sample_rate: u32,
    pub channels: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectPolicy {
    Preserve,
    Stretch,
}

impl From<AspectPolicy> for proto::AspectPolicy {
    fn from(policy: AspectPolicy) -> Self {
        match policy {
            AspectPolicy::Preserve => proto::AspectPolicy::Preserve,
            AspectPolicy::Stretch => proto::AspectPolicy::Stretch,
        }
    }
}

/// Everything needed to open one channel session against the sink.
#[derive(Debug, Clone)]
pub struct SessionSpec {
    pub channel_slug: String,
    pub channel_id: u32,
    /// TS output transport, e.g. "tcp".
    pub transport: String,
    /// TS output endpoint the sink should emit to.
    pub endpoint: String,
    pub replace_existing: bool,
    pub program_format: ProgramFormat,
}

/// Result of feeding one block plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    Accepted,
    /// Back-pressure; retry at the next scheduling pass. Never drop the
    /// block.
    QueueFull,
}

/// An element of the session event stream. `Ended` is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    BlockCompleted(BlockCompletion),
    Ended { reason: String },
}

/// A retired block as reported by the sink, stamped with the drift between
/// the injected clock and the scheduled end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockCompletion {
    pub block_id: String,
    pub start_utc_ms: i64,
    pub end_utc_ms: i64,
    pub final_ct_ms: i64,
    pub blocks_executed_total: u64,
    /// `clock.now_utc_ms() - end_utc_ms` at observation time.
    pub delta_ms: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("sink transport error: {0}")]
    Transport(String),

    /// The sink refused the payload; fatal for the session.
    #[error("sink rejected {what}: {message}")]
    Rejected { what: &'static str, message: String },

    #[error("sink version handshake failed: {0}")]
    Handshake(String),
}

impl From<tonic::Status> for SessionError {
    fn from(status: tonic::Status) -> Self {
        SessionError::Transport(status.to_string())
    }
}

impl From<tonic::transport::Error> for SessionError {
    fn from(err: tonic::transport::Error) -> Self {
        SessionError::Transport(err.to_string())
    }
}

/// One attached, running sink session.
#[async_trait]
pub trait PlayoutSessionHandle: Send {
    /// Deliver one block plan. `QueueFull` is retryable back-pressure.
    async fn feed(&mut self, plan: &ExecutionEntry) -> Result<FeedOutcome, SessionError>;

    /// Declare the authoritative switch boundary.
    async fn switch_to_live(
        &mut self,
        target_boundary_time_ms: i64,
        issued_at_time_ms: i64,
    ) -> Result<(), SessionError>;

    /// Next element of the single event subscription. After `Ended`, the
    /// session is unusable.
    async fn next_event(&mut self) -> Result<SessionEvent, SessionError>;
}

/// Opens sessions. One per sink endpoint; injected into the runtime.
#[async_trait]
pub trait PlayoutGateway: Send + Sync + 'static {
    type Session: PlayoutSessionHandle + 'static;

    async fn open_session(&self, spec: &SessionSpec) -> Result<Self::Session, SessionError>;
}

/// The production session over the gRPC control surface.
pub struct PlayoutSession {
    pub(crate) client: AirControlClient<tonic::transport::Channel>,
    pub(crate) events: tonic::codec::Streaming<proto::BlockEvent>,
    pub(crate) clock: Arc<dyn MasterClock>,
    pub(crate) channel_id: u32,
}

fn wire_segments(plan: &ExecutionEntry) -> Vec<proto::BlockPlanSegment> {
    plan.segments
        .iter()
        .map(|seg| proto::BlockPlanSegment {
            segment_type: seg.segment_type.as_str().to_string(),
            asset_uri: seg.asset_uri.clone(),
            asset_start_offset_ms: seg.asset_start_offset_ms,
            segment_duration_ms: seg.segment_duration_ms,
        })
        .collect()
}

#[async_trait]
impl PlayoutSessionHandle for PlayoutSession {
    async fn feed(&mut self, plan: &ExecutionEntry) -> Result<FeedOutcome, SessionError> {
        let request = proto::FeedBlockPlanRequest {
            channel_id: self.channel_id,
            block_id: plan.block_id.to_string(),
            start_utc_ms: plan.start_utc_ms,
            end_utc_ms: plan.end_utc_ms,
            segments: wire_segments(plan),
        };
        let response = self.client.feed_block_plan(request).await?.into_inner();
        match proto::FeedResult::try_from(response.result) {
            Ok(proto::FeedResult::Accepted) => Ok(FeedOutcome::Accepted),
            Ok(proto::FeedResult::QueueFull) => Ok(FeedOutcome::QueueFull),
            Ok(proto::FeedResult::Rejected) => Err(SessionError::Rejected {
                what: "block plan",
                message: response.message,
            }),
            Ok(proto::FeedResult::Unspecified) | Err(_) => Err(SessionError::Transport(format!(
                "sink returned unknown feed result {}",
                response.result
            ))),
        }
    }

    async fn switch_to_live(
        &mut self,
        target_boundary_time_ms: i64,
        issued_at_time_ms: i64,
    ) -> Result<(), SessionError> {
        let response = self
            .client
            .switch_to_live(proto::SwitchToLiveRequest {
                channel_id: self.channel_id,
                target_boundary_time_ms,
                issued_at_time_ms,
            })
            .await?
            .into_inner();
        if !response.accepted {
            return Err(SessionError::Rejected {
                what: "switch to live",
                message: response.message,
            });
        }
        Ok(())
    }

    async fn next_event(&mut self) -> Result<SessionEvent, SessionError> {
        loop {
            let event = match self.events.message().await? {
                Some(event) => event,
                // The sink closing the stream without a terminal event is a
                // transport failure, not a clean end.
                None => {
                    return Err(SessionError::Transport(
                        "event stream closed without SessionEnded".to_string(),
                    ));
                }
            };
            match event.event {
                Some(proto::block_event::Event::BlockCompleted(done)) => {
                    let delta_ms = self.clock.now_utc_ms() - done.block_end_utc_ms;
                    tracing::info!(
                        channel_id = self.channel_id,
                        block_id = %done.block_id,
                        delta_ms,
                        blocks_executed_total = done.blocks_executed_total,
                        "block completed"
                    );
                    return Ok(SessionEvent::BlockCompleted(BlockCompletion {
                        block_id: done.block_id,
                        start_utc_ms: done.block_start_utc_ms,
                        end_utc_ms: done.block_end_utc_ms,
                        final_ct_ms: done.final_ct_ms,
                        blocks_executed_total: done.blocks_executed_total,
                        delta_ms,
                    }));
                }
                Some(proto::block_event::Event::SessionEnded(ended)) => {
                    return Ok(SessionEvent::Ended {
                        reason: ended.reason,
                    });
                }
                // Unknown future event kinds are skipped.
                None => continue,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use headend_types::{BlockId, ScheduledSegment};

    #[test]
    fn wire_segments_carry_type_names_and_timing() {
        let plan = ExecutionEntry {
            block_id: BlockId::derive("ep", 0),
            block_index: 0,
            start_utc_ms: 0,
            end_utc_ms: 1_800_000,
            segments: vec![
                ScheduledSegment::content("file:///ep.mp4", 420_000, 900_000),
                ScheduledSegment::pad(900_000),
            ],
        };
        let wire = wire_segments(&plan);
        assert_eq!(wire.len(), 2);
        assert_eq!(wire[0].segment_type, "content");
        assert_eq!(wire[0].asset_start_offset_ms, 420_000);
        assert_eq!(wire[0].segment_duration_ms, 900_000);
        assert_eq!(wire[1].segment_type, "pad");
        assert_eq!(wire[1].asset_uri, "");
    }

    #[test]
    fn feed_results_map_from_wire_values() {
        assert_eq!(
            crate::proto::FeedResult::try_from(1),
            Ok(crate::proto::FeedResult::Accepted)
        );
        assert_eq!(
            crate::proto::FeedResult::try_from(2),
            Ok(crate::proto::FeedResult::QueueFull)
        );
        assert!(crate::proto::FeedResult::try_from(99).is_err());
    }
}
