//! Stage 4: fill break slots with interstitials under channel policy.
//!
//! Packing is greedy over the library's candidate order. Leftover time in a
//! break becomes black pad distributed between spots; the division
//! remainder lands on the trailing pads so the first pad is never larger
//! than the others. When no interstitial fits at all, the whole break falls
//! back to the static filler asset.

use crate::error::PlanError;
use crate::segmenter::{BlockItem, SegmentedBlock};
use headend_catalog::{AssetLibrary, FillerAsset};
use headend_storage::{PlayRecord, TrafficPlayLog};
use headend_types::{ScheduledSegment, SegmentType, Transition};
use std::collections::HashMap;

/// How many candidates to request from the library per packing step.
const CANDIDATE_BATCH: usize = 5;

/// Per-channel traffic policy (allowed kinds, cooldowns, daily caps).
#[derive(Debug, Clone)]
pub struct ChannelTrafficPolicy {
    pub allowed_types: Vec<SegmentType>,
    pub default_cooldown_seconds: i64,
    pub type_cooldowns: HashMap<SegmentType, i64>,
    pub max_plays_per_day: Option<u32>,
}

impl Default for ChannelTrafficPolicy {
    fn default() -> Self {
        Self {
            allowed_types: vec![
                SegmentType::Commercial,
                SegmentType::Promo,
                SegmentType::Ad,
                SegmentType::Filler,
            ],
            default_cooldown_seconds: 0,
            type_cooldowns: HashMap::new(),
            max_plays_per_day: None,
        }
    }
}

impl ChannelTrafficPolicy {
    fn cooldown_ms(&self, asset_type: SegmentType) -> i64 {
        self.type_cooldowns
            .get(&asset_type)
            .copied()
            .unwrap_or(self.default_cooldown_seconds)
            * 1000
    }

    fn permits(
        &self,
        candidate: &FillerAsset,
        channel: &str,
        at_utc_ms: i64,
        day_window: (i64, i64),
        play_log: &TrafficPlayLog,
    ) -> bool {
        if !self.allowed_types.contains(&candidate.asset_type) {
            return false;
        }
        let cooldown_ms = self.cooldown_ms(candidate.asset_type);
        if cooldown_ms > 0 {
            if let Some(last) = play_log.last_played_ms(channel, &candidate.asset_uri) {
                if at_utc_ms - last < cooldown_ms {
                    return false;
                }
            }
        }
        if let Some(cap) = self.max_plays_per_day {
            let plays =
                play_log.plays_in_window(channel, &candidate.asset_uri, day_window.0, day_window.1);
            if plays as u32 >= cap {
                return false;
            }
        }
        true
    }
}

/// Fallback asset spanning a whole break when no interstitials are
/// available.
#[derive(Debug, Clone)]
pub struct FallbackFiller {
    pub asset_uri: String,
    pub duration_ms: i64,
}

/// A block with every break materialized into spots and pads. Segment
/// durations sum exactly to the slot duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilledBlock {
    pub block_key: String,
    pub start_utc_ms: i64,
    pub end_utc_ms: i64,
    pub segments: Vec<ScheduledSegment>,
}

pub fn fill_breaks(
    block: SegmentedBlock,
    channel: &str,
    day_window: (i64, i64),
    library: &dyn AssetLibrary,
    policy: &ChannelTrafficPolicy,
    play_log: &TrafficPlayLog,
    fallback: &FallbackFiller,
) -> Result<FilledBlock, PlanError> {
    let block_id_key = headend_types::BlockId::derive(&block.block_key, block.start_utc_ms);
    let mut segments = Vec::new();
    for item in &block.items {
        match item {
            BlockItem::Content(seg) => segments.push(seg.clone()),
            BlockItem::Break(spec) => {
                let filled = fill_one_break(
                    spec.index,
                    spec.duration_ms,
                    channel,
                    block.start_utc_ms,
                    day_window,
                    library,
                    policy,
                    play_log,
                    block_id_key.as_str(),
                )
                .map_or_else(
                    || fallback_break(&block, spec.index, spec.duration_ms, fallback),
                    Ok,
                )?;
                segments.extend(filled);
            }
        }
    }
    Ok(FilledBlock {
        block_key: block.block_key,
        start_utc_ms: block.start_utc_ms,
        end_utc_ms: block.end_utc_ms,
        segments,
    })
}

/// Greedy pack of one break. Returns `None` when nothing was placeable so
/// the caller can fall back to the static filler.
#[allow(clippy::too_many_arguments)]
fn fill_one_break(
    break_index: usize,
    break_duration_ms: i64,
    channel: &str,
    block_start_utc_ms: i64,
    day_window: (i64, i64),
    library: &dyn AssetLibrary,
    policy: &ChannelTrafficPolicy,
    play_log: &TrafficPlayLog,
    block_id: &str,
) -> Option<Vec<ScheduledSegment>> {
    let mut remaining_ms = break_duration_ms;
    let mut picks: Vec<FillerAsset> = Vec::new();

    while remaining_ms > 0 {
        let candidates = library.filler_assets(remaining_ms, CANDIDATE_BATCH);
        let pick = candidates
            .into_iter()
            .find(|c| policy.permits(c, channel, block_start_utc_ms, day_window, play_log));
        let Some(pick) = pick else { break };
        remaining_ms -= pick.duration_ms;
        play_log.append(PlayRecord {
            channel: channel.to_string(),
            asset_uri: pick.asset_uri.clone(),
            asset_type: pick.asset_type,
            played_at_utc_ms: block_start_utc_ms,
            break_index,
            block_id: block_id.to_string(),
            duration_ms: pick.duration_ms,
        });
        picks.push(pick);
    }

    if picks.is_empty() {
        return None;
    }

    let gap_ms = break_duration_ms - picks.iter().map(|p| p.duration_ms).sum::<i64>();
    Some(interleave_with_pads(&picks, gap_ms))
}

/// `[spot, pad, spot, pad, ...]` with the pad remainder on the trailing
/// pads. A fully packed break emits no pads.
fn interleave_with_pads(picks: &[FillerAsset], gap_ms: i64) -> Vec<ScheduledSegment> {
    let n = picks.len();
    let base_ms = gap_ms / n as i64;
    let extra = (gap_ms % n as i64) as usize;
    let first_long_pad = n - extra;

    let mut segments = Vec::with_capacity(n * 2);
    for (i, pick) in picks.iter().enumerate() {
        let spot_type = if pick.asset_type.is_interstitial() {
            pick.asset_type
        } else {
            SegmentType::Filler
        };
        segments.push(ScheduledSegment {
            segment_type: spot_type,
            asset_uri: pick.asset_uri.clone(),
            asset_start_offset_ms: 0,
            segment_duration_ms: pick.duration_ms,
            transition: Transition::None,
            breakpoint_class: None,
            runtime_recovery: false,
        });
        let pad_ms = base_ms + i64::from(i >= first_long_pad);
        if pad_ms > 0 {
            segments.push(ScheduledSegment::pad(pad_ms));
        }
    }
    segments
}

/// Whole-break fallback to the static filler. Fatal when the filler is too
/// short to cover the break.
fn fallback_break(
    block: &SegmentedBlock,
    break_index: usize,
    break_duration_ms: i64,
    fallback: &FallbackFiller,
) -> Result<Vec<ScheduledSegment>, PlanError> {
    if fallback.duration_ms < break_duration_ms {
        return Err(PlanError::FallbackFillerTooShort {
            block_key: block.block_key.clone(),
            break_index,
            break_ms: break_duration_ms,
            filler_ms: fallback.duration_ms,
        });
    }
    Ok(vec![ScheduledSegment {
        segment_type: SegmentType::Filler,
        asset_uri: fallback.asset_uri.clone(),
        asset_start_offset_ms: 0,
        segment_duration_ms: break_duration_ms,
        transition: Transition::None,
        breakpoint_class: None,
        runtime_recovery: false,
    }])
}
