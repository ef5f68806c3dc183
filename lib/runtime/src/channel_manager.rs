//! Per-channel orchestrator and its session runner.
//!
//! The [`ChannelManager`] owns the viewer count and the lifecycle of at
//! most one session task. The [`SessionRunner`] is the feed-ahead state
//! machine itself: it seeds join-in-progress, keeps the sink's two-block
//! window full (exactly one feed per completion), and records as-run
//! attestation. All timing decisions read the injected clock.

use crate::boundary::{BoundaryState, BoundaryTracker};
use crate::jip::{JipError, compute_jip_position, trim_for_join};
use crate::metrics::PLAYOUT_METRICS;
use crate::runway::{
    RunwayReadinessError, compute_runway_ms, session_runway_ms, validate_runway,
};
use headend_air::{
    BlockCompletion, FeedOutcome, PlayoutGateway, PlayoutSessionHandle, SessionError,
    SessionEvent, SessionSpec,
};
use headend_horizon::NoScheduleDataError;
use headend_storage::AsRunStore;
use headend_storage::ReadExecutionWindow;
use headend_timebase::{
    MasterClock, SessionEpoch, TimebaseError, deadline_offset_ns, fence_tick,
};
use headend_types::{AsRunBlock, AsRunSegment, ExecutionEntry};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// Runtime configuration for one channel.
#[derive(Debug, Clone)]
pub struct ChannelRuntimeConfig {
    pub channel_slug: String,
    /// Minimum runway required before a session may start.
    pub preload_budget_ms: i64,
    /// How far ahead delivered blocks may reach; informational for the
    /// runway gauge.
    pub feed_ahead_horizon_ms: i64,
    /// Pause between feed attempts while the sink reports back-pressure.
    pub queue_full_retry: Duration,
    /// Bounded retry: a block is never dropped, but persistent
    /// back-pressure eventually fails the session.
    pub max_feed_attempts: u32,
    /// Teardown must complete within this deadline at any state.
    pub stop_deadline: Duration,
    pub session_spec: SessionSpec,
}

/// Failures of the channel runtime.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error(transparent)]
    NoScheduleData(#[from] NoScheduleDataError),

    #[error(transparent)]
    Runway(#[from] RunwayReadinessError),

    #[error(transparent)]
    Jip(#[from] JipError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Timebase(#[from] TimebaseError),

    #[error("boundary lifecycle fault: {0}")]
    Boundary(String),
}

/// Counters a runner accumulates; exposed for observability and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunnerStats {
    pub feeds_issued: u64,
    pub queue_full_retries: u64,
    pub ready_by_misses: u64,
    pub late_decisions: u64,
    pub completions_observed: u64,
}

/// Runner state visible outside the session task.
#[derive(Debug)]
pub struct RunnerStatus {
    pub boundary: BoundaryState,
    pub stats: RunnerStats,
    pub last_error: Option<String>,
}

impl Default for RunnerStatus {
    fn default() -> Self {
        Self {
            boundary: BoundaryState::None,
            stats: RunnerStats::default(),
            last_error: None,
        }
    }
}

pub type SharedStatus = Arc<Mutex<RunnerStatus>>;

enum FeedControl {
    Fed,
    Stopped,
}

/// Drives one playout session over a contiguous run of execution entries.
pub struct SessionRunner<S> {
    config: ChannelRuntimeConfig,
    session: S,
    window: Arc<dyn ReadExecutionWindow>,
    clock: Arc<dyn MasterClock>,
    asrun: Arc<AsRunStore>,
    status: SharedStatus,
    stop_rx: watch::Receiver<bool>,
    boundary: BoundaryTracker,
    /// Blocks delivered to the sink and not yet completed; never more than
    /// two (the playing block plus its successor).
    in_flight: VecDeque<ExecutionEntry>,
    last_fed_start_utc_ms: i64,
    delivered_end_utc_ms: i64,
    /// Captured once when the session starts; fence deadlines are derived
    /// from it in the monotonic domain while UTC stays schedule authority.
    epoch: Option<SessionEpoch>,
}

impl<S: PlayoutSessionHandle> SessionRunner<S> {
    pub fn new(
        config: ChannelRuntimeConfig,
        session: S,
        window: Arc<dyn ReadExecutionWindow>,
        clock: Arc<dyn MasterClock>,
        asrun: Arc<AsRunStore>,
        status: SharedStatus,
        stop_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            config,
            session,
            window,
            clock,
            asrun,
            status,
            stop_rx,
            boundary: BoundaryTracker::new(),
            in_flight: VecDeque::with_capacity(2),
            last_fed_start_utc_ms: i64::MIN,
            delivered_end_utc_ms: i64::MIN,
            epoch: None,
        }
    }

    pub async fn run(mut self) -> Result<(), ChannelError> {
        PLAYOUT_METRICS.sessions_started.inc();
        let result = self.drive().await;
        match &result {
            Ok(()) => {
                // Clean exit: only LIVE may return to NONE; any other
                // state at teardown is an abandoned boundary.
                if self.boundary.state() != BoundaryState::None
                    && self.boundary.request(BoundaryState::None).is_err()
                {
                    tracing::debug!(
                        channel = %self.config.channel_slug,
                        "session ended with an open boundary; tracker is terminal"
                    );
                }
            }
            Err(err) => {
                self.boundary.fail(&err.to_string());
                self.record_incomplete_block();
                self.update_status(|status| status.last_error = Some(err.to_string()));
            }
        }
        self.sync_boundary();
        PLAYOUT_METRICS.sessions_ended.inc();
        result
    }

    async fn drive(&mut self) -> Result<(), ChannelError> {
        let epoch = SessionEpoch::capture(self.clock.as_ref());
        self.epoch = Some(epoch);
        let now_utc_ms = epoch.utc_ms;
        let channel = self.config.channel_slug.clone();

        // Seed join-in-progress: position is computed once, atomically,
        // from the injected clock.
        let active = self
            .window
            .get_entry_at(now_utc_ms)
            .ok_or_else(|| NoScheduleDataError {
                channel: channel.clone(),
                at_utc_ms: now_utc_ms,
            })?;
        let position = compute_jip_position(now_utc_ms, &active)?;
        let trimmed = trim_for_join(&active, position);
        self.transition(BoundaryState::Planned)?;

        // Runway gate before execution.
        let successor = self.window.get_next_entry(active.start_utc_ms);
        let mut queued = vec![trimmed.clone()];
        queued.extend(successor.clone());
        validate_runway(
            compute_runway_ms(&queued, now_utc_ms),
            self.config.preload_budget_ms,
        )?;
        crate::runway::validate_fence_readiness(&queued, now_utc_ms, successor.is_some(), false)?;

        tracing::info!(
            %channel,
            block_id = %active.block_id,
            block_offset_ms = position.block_offset_ms,
            segment_cursor = position.segment_cursor,
            "seeding join-in-progress"
        );
        if let FeedControl::Stopped = self.feed_block(trimmed, true).await? {
            return Ok(());
        }

        // Go live at the join instant; Core declares the boundary.
        self.transition(BoundaryState::SwitchScheduled)?;
        let issued_at_time_ms = self.clock.now_utc_ms();
        self.session.switch_to_live(now_utc_ms, issued_at_time_ms).await?;
        self.transition(BoundaryState::SwitchIssued)?;
        self.transition(BoundaryState::Live)?;

        // Fill the sink's two-block window: the playing block plus one.
        if let Some(next) = successor {
            if let FeedControl::Stopped = self.plan_and_feed(next).await? {
                return Ok(());
            }
        }

        loop {
            let event = tokio::select! {
                _ = self.stop_rx.changed() => {
                    if *self.stop_rx.borrow() {
                        tracing::info!(%channel, "session stop requested");
                        return Ok(());
                    }
                    continue;
                }
                event = self.session.next_event() => event?,
            };
            match event {
                SessionEvent::BlockCompleted(done) => {
                    if let FeedControl::Stopped = self.on_block_completed(done).await? {
                        return Ok(());
                    }
                }
                SessionEvent::Ended { reason } => {
                    tracing::info!(%channel, %reason, "session ended by sink");
                    return Ok(());
                }
            }
        }
    }

    /// Exactly one feed per observed completion, in entry order.
    async fn on_block_completed(
        &mut self,
        done: BlockCompletion,
    ) -> Result<FeedControl, ChannelError> {
        self.update_status(|status| status.stats.completions_observed += 1);
        PLAYOUT_METRICS
            .block_delta_seconds
            .observe(done.delta_ms.abs() as f64 / 1000.0);

        let completed = self.in_flight.pop_front();
        match &completed {
            Some(entry) if entry.block_id.as_str() == done.block_id => {}
            Some(entry) => tracing::warn!(
                expected = %entry.block_id,
                got = %done.block_id,
                "completion out of order with delivered blocks"
            ),
            None => tracing::warn!(got = %done.block_id, "completion with no block in flight"),
        }
        if let Some(entry) = completed {
            self.asrun
                .append(as_run_block(&self.config.channel_slug, &entry, Some(done.delta_ms)));
        }

        // The armed successor is live now.
        self.transition(BoundaryState::SwitchIssued)?;
        self.transition(BoundaryState::Live)?;

        let next = self
            .window
            .get_next_entry(self.last_fed_start_utc_ms)
            .ok_or(NoScheduleDataError {
                channel: self.config.channel_slug.clone(),
                at_utc_ms: self.last_fed_start_utc_ms,
            })?;
        self.plan_and_feed(next).await
    }

    /// Open the next boundary and deliver its block.
    async fn plan_and_feed(&mut self, entry: ExecutionEntry) -> Result<FeedControl, ChannelError> {
        self.transition(BoundaryState::Planned)?;
        let fence = self.arm_fence(&entry)?;
        let control = self.feed_block(entry, false).await?;
        if let FeedControl::Fed = control {
            tracing::debug!(fence_tick = fence, "successor fence armed");
            self.transition(BoundaryState::SwitchScheduled)?;
        }
        Ok(control)
    }

    /// Frame-indexed deadline of the entry boundary, derived from the
    /// session epoch. Tick deadlines are epoch-derived and immutable;
    /// execution overruns never shift them.
    fn arm_fence(&self, entry: &ExecutionEntry) -> Result<i64, ChannelError> {
        let epoch = self.epoch.expect("epoch captured before any feed");
        let format = &self.config.session_spec.program_format;
        let tick = fence_tick(
            entry.start_utc_ms - epoch.utc_ms,
            format.frame_rate_num,
            format.frame_rate_den,
        )?;
        let offset_ns =
            deadline_offset_ns(tick.max(0) as u64, format.frame_rate_num, format.frame_rate_den)?;
        tracing::trace!(
            block_id = %entry.block_id,
            fence_tick = tick,
            deadline_monotonic_ns = epoch.deadline_monotonic_ns(offset_ns),
            "fence deadline computed"
        );
        Ok(tick)
    }

    /// Deliver one block, honoring back-pressure with bounded retry. The
    /// block is never silently dropped. Seed feeds (join-in-progress) are
    /// exempt from due/miss accounting: joining mid-block is late by
    /// construction.
    async fn feed_block(
        &mut self,
        entry: ExecutionEntry,
        is_seed: bool,
    ) -> Result<FeedControl, ChannelError> {
        let ready_by_utc_ms = entry.start_utc_ms - self.config.preload_budget_ms;
        let first_attempt_utc_ms = self.clock.now_utc_ms();
        let mut attempts = 0u32;
        loop {
            if *self.stop_rx.borrow() {
                return Ok(FeedControl::Stopped);
            }
            let outcome = self.session.feed(&entry).await?;
            match outcome {
                FeedOutcome::Accepted => {
                    let now_utc_ms = self.clock.now_utc_ms();
                    if !is_seed && now_utc_ms > entry.start_utc_ms {
                        // Decided too late; classify by when we first saw it.
                        if first_attempt_utc_ms > entry.start_utc_ms {
                            self.update_status(|s| s.stats.ready_by_misses += 1);
                            PLAYOUT_METRICS.ready_by_misses.inc();
                        } else {
                            self.update_status(|s| s.stats.late_decisions += 1);
                            PLAYOUT_METRICS.late_decisions.inc();
                        }
                        tracing::warn!(
                            block_id = %entry.block_id,
                            start_utc_ms = entry.start_utc_ms,
                            now_utc_ms,
                            "block fed after its start time"
                        );
                    } else if now_utc_ms > ready_by_utc_ms {
                        tracing::debug!(block_id = %entry.block_id, "block fed inside the ready-by window");
                    } else if entry.start_utc_ms - now_utc_ms > self.config.feed_ahead_horizon_ms {
                        tracing::debug!(
                            block_id = %entry.block_id,
                            "block fed beyond the feed-ahead horizon"
                        );
                    }

                    self.delivered_end_utc_ms = self.delivered_end_utc_ms.max(entry.end_utc_ms);
                    PLAYOUT_METRICS
                        .runway_ms
                        .set(session_runway_ms(self.delivered_end_utc_ms, now_utc_ms));
                    self.last_fed_start_utc_ms = entry.start_utc_ms;
                    self.update_status(|s| s.stats.feeds_issued += 1);
                    PLAYOUT_METRICS.feeds_issued.inc();
                    tracing::debug!(block_id = %entry.block_id, "block plan accepted");
                    self.in_flight.push_back(entry);
                    debug_assert!(self.in_flight.len() <= 2, "sink never holds more than two blocks");
                    self.transition(BoundaryState::PreloadIssued)?;
                    return Ok(FeedControl::Fed);
                }
                FeedOutcome::QueueFull => {
                    attempts += 1;
                    self.update_status(|s| s.stats.queue_full_retries += 1);
                    PLAYOUT_METRICS.queue_full_retries.inc();
                    if attempts >= self.config.max_feed_attempts {
                        return Err(SessionError::Transport(format!(
                            "sink back-pressure persisted for {attempts} feed attempts"
                        ))
                        .into());
                    }
                    tracing::debug!(
                        block_id = %entry.block_id,
                        attempts,
                        "sink queue full; retrying at next pass"
                    );
                    let retry = tokio::time::sleep(self.config.queue_full_retry);
                    tokio::select! {
                        _ = retry => {}
                        _ = self.stop_rx.changed() => {}
                    }
                }
            }
        }
    }

    fn transition(&mut self, to: BoundaryState) -> Result<(), ChannelError> {
        let result = self
            .boundary
            .request(to)
            .map_err(|fault| ChannelError::Boundary(fault.to_string()));
        self.sync_boundary();
        result
    }

    fn sync_boundary(&self) {
        let state = self.boundary.state();
        self.update_status(|status| status.boundary = state);
    }

    fn update_status(&self, apply: impl FnOnce(&mut RunnerStatus)) {
        let mut guard = self.status.lock().expect("status lock poisoned");
        apply(&mut guard);
    }

    /// A session lost mid-block leaves an incomplete attestation for the
    /// block that was playing.
    fn record_incomplete_block(&mut self) {
        if let Some(entry) = self.in_flight.pop_front() {
            let mut block = as_run_block(&self.config.channel_slug, &entry, None);
            block.completed = false;
            self.asrun.append(block);
        }
    }
}

fn as_run_block(channel: &str, entry: &ExecutionEntry, delta_ms: Option<i64>) -> AsRunBlock {
    AsRunBlock {
        block_id: entry.block_id.to_string(),
        channel: channel.to_string(),
        start_utc_ms: entry.start_utc_ms,
        end_utc_ms: entry.end_utc_ms,
        delta_ms,
        completed: true,
        segments: entry
            .segments
            .iter()
            .map(|segment| AsRunSegment {
                segment_type: segment.segment_type,
                asset_uri: (!segment.asset_uri.is_empty()).then(|| segment.asset_uri.clone()),
                asset_start_offset_ms: Some(segment.asset_start_offset_ms),
                segment_duration_ms: segment.segment_duration_ms,
                breakpoint_class: segment.breakpoint_class,
                runtime_recovery: segment.runtime_recovery,
                runway_degradation: false,
            })
            .collect(),
    }
}

struct ActiveSession {
    stop_tx: watch::Sender<bool>,
    handle: tokio::task::JoinHandle<Result<(), ChannelError>>,
    status: SharedStatus,
}

/// Viewer-driven lifecycle for one channel: the 0 -> 1 transition starts a
/// session, the N -> 0 transition stops it within the stop deadline.
pub struct ChannelManager<G: PlayoutGateway> {
    config: ChannelRuntimeConfig,
    gateway: Arc<G>,
    window: Arc<dyn ReadExecutionWindow>,
    clock: Arc<dyn MasterClock>,
    asrun: Arc<AsRunStore>,
    viewers: usize,
    active: Option<ActiveSession>,
}

impl<G: PlayoutGateway> ChannelManager<G> {
    pub fn new(
        config: ChannelRuntimeConfig,
        gateway: Arc<G>,
        window: Arc<dyn ReadExecutionWindow>,
        clock: Arc<dyn MasterClock>,
        asrun: Arc<AsRunStore>,
    ) -> Self {
        Self {
            config,
            gateway,
            window,
            clock,
            asrun,
            viewers: 0,
            active: None,
        }
    }

    pub fn viewer_count(&self) -> usize {
        self.viewers
    }

    pub fn status(&self) -> Option<SharedStatus> {
        self.active.as_ref().map(|a| a.status.clone())
    }

    /// 0 -> 1 starts a session; every further viewer shares it.
    pub async fn viewer_attached(&mut self) -> Result<(), ChannelError> {
        self.viewers += 1;
        if self.viewers == 1 && self.active.is_none() {
            self.start_session().await?;
        }
        Ok(())
    }

    /// N -> 0 stops the session.
    pub async fn viewer_detached(&mut self) {
        self.viewers = self.viewers.saturating_sub(1);
        if self.viewers == 0 {
            self.stop().await;
        }
    }

    async fn start_session(&mut self) -> Result<(), ChannelError> {
        let session = self.gateway.open_session(&self.config.session_spec).await?;
        let (stop_tx, stop_rx) = watch::channel(false);
        let status: SharedStatus = Arc::new(Mutex::new(RunnerStatus::default()));
        let runner = SessionRunner::new(
            self.config.clone(),
            session,
            self.window.clone(),
            self.clock.clone(),
            self.asrun.clone(),
            status.clone(),
            stop_rx,
        );
        let channel = self.config.channel_slug.clone();
        let handle = tokio::spawn(async move {
            let result = runner.run().await;
            if let Err(err) = &result {
                tracing::error!(%channel, %err, "playout session failed");
            }
            result
        });
        self.active = Some(ActiveSession {
            stop_tx,
            handle,
            status,
        });
        tracing::info!(channel = %self.config.channel_slug, "playout session started");
        Ok(())
    }

    /// Universal cancel. Signals the runner, waits out the stop deadline,
    /// and aborts outstanding work if the deadline passes. No feed is left
    /// in flight afterwards.
    pub async fn stop(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        let _ = active.stop_tx.send(true);
        let abort = active.handle.abort_handle();
        match tokio::time::timeout(self.config.stop_deadline, active.handle).await {
            Ok(joined) => {
                tracing::info!(
                    channel = %self.config.channel_slug,
                    clean = matches!(joined, Ok(Ok(()))),
                    "playout session stopped"
                );
            }
            Err(_) => {
                abort.abort();
                let mut status = active.status.lock().expect("status lock poisoned");
                status.boundary = BoundaryState::FailedTerminal;
                status.last_error = Some("stop deadline exceeded; session aborted".to_string());
                tracing::error!(
                    channel = %self.config.channel_slug,
                    "stop deadline exceeded; session aborted"
                );
            }
        }
    }
}
