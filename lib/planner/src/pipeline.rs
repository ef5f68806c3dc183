//! The end-to-end planning pipeline for one broadcast day.
//!
//! Owned by the horizon manager in authoritative mode; nothing else may
//! drive it. All collaborators are injected at construction.

use crate::assembly::{assemble_transmission_log, lock_for_execution};
use crate::config::ScheduleManagerConfig;
use crate::day;
use crate::epg::derive_epg;
use crate::error::PlanError;
use crate::plan::SchedulePlanArtifact;
use crate::resolve::resolve_schedule_day;
use crate::segmenter::segment_slot;
use crate::traffic::{ChannelTrafficPolicy, FallbackFiller, fill_breaks};
use chrono::NaiveDate;
use headend_catalog::AssetLibrary;
use headend_storage::{SequenceStore, TrafficPlayLog};
use headend_types::{EpgEvent, TransmissionLog};
use std::sync::Arc;

/// The locked artifacts produced for one (channel, date).
#[derive(Debug, Clone)]
pub struct PlannedDay {
    pub log: TransmissionLog,
    pub epg: Vec<EpgEvent>,
}

/// Stage 0 through Stage 6 as a single deterministic unit.
pub struct PlanningPipeline {
    plan: SchedulePlanArtifact,
    config: ScheduleManagerConfig,
    library: Arc<dyn AssetLibrary>,
    sequences: Arc<SequenceStore>,
    play_log: Arc<TrafficPlayLog>,
    traffic_policy: ChannelTrafficPolicy,
    fallback: FallbackFiller,
}

impl PlanningPipeline {
    pub fn new(
        plan: SchedulePlanArtifact,
        config: ScheduleManagerConfig,
        library: Arc<dyn AssetLibrary>,
        sequences: Arc<SequenceStore>,
        play_log: Arc<TrafficPlayLog>,
        traffic_policy: ChannelTrafficPolicy,
        fallback: FallbackFiller,
    ) -> Self {
        Self {
            plan,
            config,
            library,
            sequences,
            play_log,
            traffic_policy,
            fallback,
        }
    }

    pub fn config(&self) -> &ScheduleManagerConfig {
        &self.config
    }

    /// Resolve, segment, fill, assemble, and lock one broadcast day.
    pub fn plan_day(&self, date: NaiveDate) -> Result<PlannedDay, PlanError> {
        let resolved = resolve_schedule_day(
            &self.plan,
            date,
            &self.config,
            self.library.as_ref(),
            &self.sequences,
        )?;
        let epg = derive_epg(&resolved, self.library.as_ref())?;
        let day_window = day::day_window_utc(date, &self.config)?;

        let filled = resolved
            .slots
            .iter()
            .map(|slot| {
                let segmented = segment_slot(slot, &self.config);
                fill_breaks(
                    segmented,
                    &self.config.channel,
                    day_window,
                    self.library.as_ref(),
                    &self.traffic_policy,
                    &self.play_log,
                    &self.fallback,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut log = assemble_transmission_log(
            &self.config.channel,
            date,
            filled,
            self.config.grid_block_minutes,
        )?;
        lock_for_execution(&mut log, self.config.grid_block_minutes)?;
        Ok(PlannedDay { log, epg })
    }
}
