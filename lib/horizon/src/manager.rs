use crate::metrics::HORIZON_METRICS;
use crate::mode::HorizonAuthorityMode;
use chrono::{Duration as ChronoDuration, NaiveDate};
use headend_planner::{PlanError, PlannedDay, PlanningPipeline, broadcast_date_for};
use headend_storage::{CompiledLogStore, ReadExecutionWindow, WriteExecutionWindow};
use headend_timebase::MasterClock;
use headend_types::ExecutionEntry;
use std::sync::Arc;
use std::time::Duration;

/// Horizon maintenance configuration.
#[derive(Debug, Clone)]
pub struct HorizonConfig {
    pub mode: HorizonAuthorityMode,
    /// Keep at least this much execution-ready data ahead of the playhead.
    pub target_depth_ms: i64,
    /// How often to re-evaluate the depth.
    pub poll_interval: Duration,
}

/// Planning capability the manager drives. One implementor per channel.
pub trait DayPlanner: Send + Sync {
    fn channel(&self) -> &str;
    fn plan_day(&self, date: NaiveDate) -> Result<PlannedDay, PlanError>;
    fn broadcast_date_at(&self, now_utc_ms: i64) -> NaiveDate;
}

impl DayPlanner for PlanningPipeline {
    fn channel(&self) -> &str {
        &self.config().channel
    }

    fn plan_day(&self, date: NaiveDate) -> Result<PlannedDay, PlanError> {
        PlanningPipeline::plan_day(self, date)
    }

    fn broadcast_date_at(&self, now_utc_ms: i64) -> NaiveDate {
        broadcast_date_for(now_utc_ms, self.config())
    }
}

/// Extends the schedule/execution stores ahead of the playhead.
///
/// The only component permitted to trigger planning. Extension is
/// idempotent: duplicate block ids are ignored by the window store, and the
/// next-date cursor only moves forward.
pub struct HorizonManager<W> {
    config: HorizonConfig,
    planner: Arc<dyn DayPlanner>,
    window: Arc<W>,
    clock: Arc<dyn MasterClock>,
    /// Durable home of locked logs; write-once per (channel, date).
    compiled: Option<Arc<CompiledLogStore>>,
    /// Last broadcast date planned; the cursor never revisits a date, so a
    /// short DST day cannot be re-planned just because it ends early.
    last_planned: Option<NaiveDate>,
}

impl<W> HorizonManager<W>
where
    W: ReadExecutionWindow + WriteExecutionWindow + 'static,
{
    pub fn new(
        config: HorizonConfig,
        planner: Arc<dyn DayPlanner>,
        window: Arc<W>,
        clock: Arc<dyn MasterClock>,
    ) -> Self {
        Self {
            config,
            planner,
            window,
            clock,
            compiled: None,
            last_planned: None,
        }
    }

    /// Also publish every locked log into the compiled-log store.
    pub fn with_compiled_store(mut self, compiled: Arc<CompiledLogStore>) -> Self {
        self.compiled = Some(compiled);
        self
    }

    /// Poll loop; runs until the task is aborted. In legacy mode the
    /// manager parks itself and never plans.
    pub async fn run(mut self) -> anyhow::Result<()> {
        if !self.config.mode.extends() {
            tracing::info!(channel = self.planner.channel(), "horizon manager idle in legacy mode");
            std::future::pending::<()>().await;
        }
        tracing::info!(
            channel = self.planner.channel(),
            mode = ?self.config.mode,
            target_depth_ms = self.config.target_depth_ms,
            "horizon manager starting"
        );
        let mut interval = tokio::time::interval(self.config.poll_interval);
        loop {
            interval.tick().await;
            if let Err(err) = self.extend_once() {
                HORIZON_METRICS.extension_failures.inc();
                tracing::error!(channel = self.planner.channel(), %err, "horizon extension failed");
            }
        }
    }

    /// One extension pass: plan and lock days until the window covers the
    /// target depth. Returns the number of days planned.
    pub fn extend_once(&mut self) -> Result<u32, PlanError> {
        let now_utc_ms = self.clock.now_utc_ms();
        let mut planned_days = 0u32;

        while self.depth_ms(now_utc_ms) < self.config.target_depth_ms {
            let date = match self.last_planned {
                Some(previous) => previous + ChronoDuration::days(1),
                None => self.planner.broadcast_date_at(now_utc_ms),
            };
            let planned = self.planner.plan_day(date)?;
            if let Some(compiled) = &self.compiled {
                // The date cursor never revisits a date, so an occupied
                // slot here means a restart raced a previous publish.
                if let Err(err) = compiled.publish(planned.log.clone()) {
                    tracing::warn!(%err, "compiled log already present; keeping the stored artifact");
                }
            }
            let entries: Vec<ExecutionEntry> = planned
                .log
                .entries
                .into_iter()
                .map(ExecutionEntry::from)
                .collect();
            tracing::info!(
                channel = self.planner.channel(),
                %date,
                blocks = entries.len(),
                epg_events = planned.epg.len(),
                "horizon extended by one broadcast day"
            );
            self.window.add_entries(entries);
            self.last_planned = Some(date);
            planned_days += 1;
            HORIZON_METRICS.days_planned.inc();
        }

        HORIZON_METRICS
            .window_depth_ms
            .set(self.depth_ms(now_utc_ms));
        Ok(planned_days)
    }

    /// Execution-ready depth ahead of `now`, never negative.
    fn depth_ms(&self, now_utc_ms: i64) -> i64 {
        self.window
            .window_end()
            .map_or(0, |end| (end - now_utc_ms).max(0))
    }
}
