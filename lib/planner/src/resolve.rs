//! Stage 1: resolve a schedule plan into a frozen day of slots.
//!
//! Resolution is deterministic in `(plan, date, config, cursor state)`.
//! The only mutation is the sequence-cursor advance, and the planner is the
//! only writer of those cursors.

use crate::config::{DstPolicy, ScheduleManagerConfig};
use crate::day;
use crate::error::PlanError;
use crate::plan::{SchedulePlanArtifact, ZoneDirective};
use chrono::{NaiveDate, Timelike};
use headend_catalog::AssetLibrary;
use headend_storage::{SequenceKey, SequenceStore};
use headend_types::{ProgramRef, ResolvedAsset};

/// One grid slot bound to a program and its measured asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSlot {
    pub zone_id: String,
    pub slot_index: u32,
    pub start_utc_ms: i64,
    pub end_utc_ms: i64,
    pub program_ref: ProgramRef,
    pub asset: ResolvedAsset,
}

/// Frozen resolution of one channel's plan for one broadcast date.
/// Immutable once used to build a transmission log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedScheduleDay {
    pub channel: String,
    pub broadcast_date: NaiveDate,
    pub day_anchor_utc_ms: i64,
    pub slots: Vec<ResolvedSlot>,
}

/// A zone projected onto the day's slot grid.
struct ZoneSpan<'a> {
    zone: &'a ZoneDirective,
    start_slot: u32,
    end_slot: u32,
}

pub fn resolve_schedule_day(
    plan: &SchedulePlanArtifact,
    date: NaiveDate,
    cfg: &ScheduleManagerConfig,
    library: &dyn AssetLibrary,
    sequences: &SequenceStore,
) -> Result<ResolvedScheduleDay, PlanError> {
    if !plan.active_on(date) {
        return Err(PlanError::PlanInactive {
            plan_id: plan.plan_id.clone(),
            date,
        });
    }

    let (anchor_utc_ms, next_anchor_utc_ms) = day::day_window_utc(date, cfg)?;
    let slot_count = slot_count_for_day(date, anchor_utc_ms, next_anchor_utc_ms, cfg)?;
    let spans = project_zones(plan, date, cfg)?;

    let grid_ms = cfg.grid_ms();
    let mut slots = Vec::with_capacity(slot_count as usize);
    for slot_index in 0..slot_count {
        let zone = zone_for_slot(&spans, slot_index, cfg.slots_per_normal_day());
        if zone.programs.is_empty() {
            return Err(PlanError::EmptyProgramFamily {
                zone_id: zone.zone_id.clone(),
            });
        }

        let start_utc_ms = anchor_utc_ms + i64::from(slot_index) * grid_ms;
        let key = SequenceKey::new(
            plan.channel.as_str(),
            zone.zone_id.as_str(),
            zone.family_fingerprint(),
        );
        let pick = sequences.advance(&key, zone.programs.len(), start_utc_ms);
        let program_ref = zone.programs[pick].clone();
        let asset = resolve_asset(&program_ref, library)?;

        slots.push(ResolvedSlot {
            zone_id: zone.zone_id.clone(),
            slot_index,
            start_utc_ms,
            end_utc_ms: start_utc_ms + grid_ms,
            program_ref,
            asset,
        });
    }

    tracing::info!(
        channel = %plan.channel,
        %date,
        slots = slots.len(),
        "resolved schedule day"
    );

    Ok(ResolvedScheduleDay {
        channel: plan.channel.clone(),
        broadcast_date: date,
        day_anchor_utc_ms: anchor_utc_ms,
        slots,
    })
}

/// Slot count for the day, applying the DST policy when the civil day is
/// not 24 h. The shrink/expand policies move the count by exactly one grid
/// block; `reject` refuses to plan the day at all.
fn slot_count_for_day(
    date: NaiveDate,
    anchor_utc_ms: i64,
    next_anchor_utc_ms: i64,
    cfg: &ScheduleManagerConfig,
) -> Result<u32, PlanError> {
    let normal = cfg.slots_per_normal_day();
    let civil_ms = next_anchor_utc_ms - anchor_utc_ms;
    let delta_ms = civil_ms - 24 * 3_600_000;
    if delta_ms == 0 {
        return Ok(normal);
    }
    match cfg.dst_policy {
        DstPolicy::Reject => Err(PlanError::DstChangeRejected { date, delta_ms }),
        DstPolicy::ShrinkOneBlock => Ok(normal - 1),
        DstPolicy::ExpandOneBlock => Ok(normal + 1),
    }
}

/// Select and order the zones for `date`, convert their local windows into
/// slot indexes, and require them to tile the normal day exactly.
fn project_zones<'a>(
    plan: &'a SchedulePlanArtifact,
    date: NaiveDate,
    cfg: &ScheduleManagerConfig,
) -> Result<Vec<ZoneSpan<'a>>, PlanError> {
    let mut spans: Vec<ZoneSpan<'a>> = plan
        .zones
        .iter()
        .filter(|z| z.applies_on(date))
        .map(|zone| {
            let start_slot = slot_of(zone, zone.local_start, false, cfg)?;
            let end_slot = slot_of(zone, zone.local_end, true, cfg)?;
            Ok(ZoneSpan {
                zone,
                start_slot,
                end_slot,
            })
        })
        .collect::<Result<_, PlanError>>()?;
    spans.sort_by_key(|s| s.start_slot);

    let normal = cfg.slots_per_normal_day();
    let mut expected = 0u32;
    for span in &spans {
        if span.start_slot != expected || span.end_slot <= span.start_slot {
            return Err(PlanError::ZoneCoverage {
                detail: format!(
                    "zone {} covers slots [{}, {}) but slot {} is the first uncovered",
                    span.zone.zone_id, span.start_slot, span.end_slot, expected
                ),
            });
        }
        expected = span.end_slot;
    }
    if expected != normal {
        return Err(PlanError::ZoneCoverage {
            detail: format!("day has {normal} slots but zones cover {expected}"),
        });
    }
    Ok(spans)
}

/// Slot index of a zone boundary, measured from the broadcast-day anchor.
/// A boundary equal to the anchor means the day end when it closes a zone.
fn slot_of(
    zone: &ZoneDirective,
    time: chrono::NaiveTime,
    is_end: bool,
    cfg: &ScheduleManagerConfig,
) -> Result<u32, PlanError> {
    let day_minutes = 24 * 60;
    let anchor_min =
        cfg.broadcast_day_start.hour() * 60 + cfg.broadcast_day_start.minute();
    let bound_min = time.hour() * 60 + time.minute();
    let mut from_anchor = (bound_min + day_minutes - anchor_min) % day_minutes;
    if from_anchor == 0 && is_end {
        from_anchor = day_minutes;
    }
    if from_anchor % cfg.grid_block_minutes != 0 {
        return Err(PlanError::ZoneNotGridAligned {
            zone_id: zone.zone_id.clone(),
            minutes_from_anchor: from_anchor,
            grid_block_minutes: cfg.grid_block_minutes,
        });
    }
    Ok(from_anchor / cfg.grid_block_minutes)
}

/// Zone owning `slot_index`. The extra slot of an expanded DST day extends
/// the final zone.
fn zone_for_slot<'a>(spans: &'a [ZoneSpan<'a>], slot_index: u32, normal: u32) -> &'a ZoneDirective {
    if slot_index >= normal {
        return spans.last().expect("coverage validated non-empty").zone;
    }
    spans
        .iter()
        .find(|s| s.start_slot <= slot_index && slot_index < s.end_slot)
        .expect("coverage validated contiguous")
        .zone
}

fn resolve_asset(
    program_ref: &ProgramRef,
    library: &dyn AssetLibrary,
) -> Result<ResolvedAsset, PlanError> {
    let uri = program_ref.id();
    let duration_ms = library.duration_ms(uri)?;
    let markers = library.markers(uri)?;
    Ok(ResolvedAsset {
        asset_uri: uri.to_string(),
        duration_ms,
        markers,
    })
}
