//! Stage 3: split each resolved slot into act segments and break slots.
//!
//! Break placement is driven solely by the channel type. Movie channels
//! never break mid-content; network channels break at chapter markers, or
//! at computed equal-division breakpoints when no markers exist.

use crate::config::{ChannelType, ScheduleManagerConfig};
use crate::resolve::ResolvedSlot;
use headend_types::{BreakpointClass, ScheduledSegment, Transition};

/// An unfilled break slot between acts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakSpec {
    /// Position of this break within the block, 0-based.
    pub index: usize,
    pub duration_ms: i64,
}

/// Alternating content/break structure of a block before traffic fills it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockItem {
    Content(ScheduledSegment),
    Break(BreakSpec),
}

/// A slot after act segmentation; durations are exact and sum to the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedBlock {
    /// Key feeding block-id derivation (the asset identity).
    pub block_key: String,
    pub start_utc_ms: i64,
    pub end_utc_ms: i64,
    pub items: Vec<BlockItem>,
}

impl SegmentedBlock {
    pub fn slot_duration_ms(&self) -> i64 {
        self.end_utc_ms - self.start_utc_ms
    }
}

pub fn segment_slot(slot: &ResolvedSlot, cfg: &ScheduleManagerConfig) -> SegmentedBlock {
    let slot_ms = slot.end_utc_ms - slot.start_utc_ms;
    let episode_ms = slot.asset.duration_ms.min(slot_ms);
    let surplus_ms = slot_ms - episode_ms;

    let items = match cfg.channel_type {
        ChannelType::Movie => single_act(&slot.asset.asset_uri, episode_ms, surplus_ms),
        ChannelType::Network => {
            let (points, class) = breakpoints(slot, episode_ms, cfg);
            // With no surplus there is nothing to break for; keep the
            // program continuous.
            if points.is_empty() || surplus_ms == 0 {
                single_act(&slot.asset.asset_uri, episode_ms, surplus_ms)
            } else {
                acts_with_breaks(
                    &slot.asset.asset_uri,
                    episode_ms,
                    surplus_ms,
                    &points,
                    class,
                    cfg.fade_duration_ms,
                )
            }
        }
    };

    SegmentedBlock {
        block_key: slot.asset.asset_uri.clone(),
        start_utc_ms: slot.start_utc_ms,
        end_utc_ms: slot.end_utc_ms,
        items,
    }
}

/// Breakpoints for a network slot: stored chapter markers first, computed
/// equal division as the fallback.
fn breakpoints(
    slot: &ResolvedSlot,
    episode_ms: i64,
    cfg: &ScheduleManagerConfig,
) -> (Vec<i64>, BreakpointClass) {
    let chapters: Vec<i64> = slot
        .asset
        .chapter_breakpoints()
        .into_iter()
        .filter(|&p| p < episode_ms)
        .collect();
    if !chapters.is_empty() {
        return (chapters, BreakpointClass::FirstClass);
    }
    if cfg.num_breaks == 0 {
        return (Vec::new(), BreakpointClass::SecondClass);
    }
    let interval = episode_ms / (i64::from(cfg.num_breaks) + 1);
    let points = (1..=i64::from(cfg.num_breaks))
        .map(|i| interval * i)
        .filter(|&p| p > 0 && p < episode_ms)
        .collect();
    (points, BreakpointClass::SecondClass)
}

/// One content segment covering the whole episode, plus a single trailing
/// break if the slot has surplus time.
fn single_act(asset_uri: &str, episode_ms: i64, surplus_ms: i64) -> Vec<BlockItem> {
    let mut items = Vec::with_capacity(2);
    items.push(BlockItem::Content(ScheduledSegment::content(
        asset_uri, 0, episode_ms,
    )));
    if surplus_ms > 0 {
        items.push(BlockItem::Break(BreakSpec {
            index: 0,
            duration_ms: surplus_ms,
        }));
    }
    items
}

/// Acts split at `points`, with the total break time distributed across the
/// break slots. The division remainder lands on the last breaks, one extra
/// millisecond each, keeping the early breaks uniform.
fn acts_with_breaks(
    asset_uri: &str,
    episode_ms: i64,
    total_break_ms: i64,
    points: &[i64],
    class: BreakpointClass,
    fade_duration_ms: i64,
) -> Vec<BlockItem> {
    let n = points.len() as i64;
    let base_ms = total_break_ms / n;
    let remainder = (total_break_ms % n) as usize;
    let first_long_break = points.len() - remainder;

    let transition = match class {
        BreakpointClass::FirstClass => Transition::None,
        BreakpointClass::SecondClass => Transition::Fade {
            duration_ms: fade_duration_ms,
        },
    };

    let mut items = Vec::with_capacity(points.len() * 2 + 1);
    let mut prev = 0i64;
    for (i, &point) in points.iter().enumerate() {
        let mut act = ScheduledSegment::content(asset_uri, prev, point - prev);
        act.transition = transition;
        act.breakpoint_class = Some(class);
        items.push(BlockItem::Content(act));

        let break_ms = base_ms + i64::from(i >= first_long_break);
        if break_ms > 0 {
            items.push(BlockItem::Break(BreakSpec {
                index: i,
                duration_ms: break_ms,
            }));
        }
        prev = point;
    }
    if episode_ms > prev {
        items.push(BlockItem::Content(ScheduledSegment::content(
            asset_uri,
            prev,
            episode_ms - prev,
        )));
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DstPolicy;
    use chrono::NaiveTime;
    use headend_types::{Marker, MarkerKind, ProgramRef, ResolvedAsset, SegmentType};

    fn cfg(channel_type: ChannelType) -> ScheduleManagerConfig {
        ScheduleManagerConfig {
            channel: "retro-1".into(),
            timezone: chrono_tz::UTC,
            grid_block_minutes: 30,
            broadcast_day_start: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            channel_type,
            dst_policy: DstPolicy::Reject,
            num_breaks: 3,
            fade_duration_ms: 500,
        }
    }

    fn slot(slot_ms: i64, episode_ms: i64, chapters: &[i64]) -> ResolvedSlot {
        ResolvedSlot {
            zone_id: "z".into(),
            slot_index: 0,
            start_utc_ms: 0,
            end_utc_ms: slot_ms,
            program_ref: ProgramRef::Episode("ep".into()),
            asset: ResolvedAsset {
                asset_uri: "file:///ep.mp4".into(),
                duration_ms: episode_ms,
                markers: chapters
                    .iter()
                    .map(|&offset_ms| Marker {
                        kind: MarkerKind::Chapter,
                        offset_ms,
                        label: None,
                    })
                    .collect(),
            },
        }
    }

    fn total_ms(block: &SegmentedBlock) -> i64 {
        block
            .items
            .iter()
            .map(|item| match item {
                BlockItem::Content(seg) => seg.segment_duration_ms,
                BlockItem::Break(spec) => spec.duration_ms,
            })
            .sum()
    }

    fn contents(block: &SegmentedBlock) -> Vec<&ScheduledSegment> {
        block
            .items
            .iter()
            .filter_map(|item| match item {
                BlockItem::Content(seg) => Some(seg),
                BlockItem::Break(_) => None,
            })
            .collect()
    }

    #[test]
    fn movie_slot_is_one_act_plus_trailing_break() {
        // Two-hour slot, 107-minute feature.
        let block = segment_slot(&slot(7_200_000, 6_420_000, &[1_200_000]), &cfg(ChannelType::Movie));
        let acts = contents(&block);
        assert_eq!(acts.len(), 1, "movie channels never break mid-content");
        assert_eq!(acts[0].segment_duration_ms, 6_420_000);
        assert!(matches!(
            block.items[1],
            BlockItem::Break(BreakSpec { duration_ms: 780_000, .. })
        ));
        assert_eq!(total_ms(&block), 7_200_000);
    }

    #[test]
    fn movie_exact_fit_has_no_break() {
        let block = segment_slot(&slot(7_200_000, 7_200_000, &[]), &cfg(ChannelType::Movie));
        assert_eq!(block.items.len(), 1);
        assert_eq!(total_ms(&block), 7_200_000);
    }

    #[test]
    fn network_uses_chapter_markers_as_first_class() {
        let block = segment_slot(
            &slot(1_800_000, 1_320_000, &[330_000, 660_000, 990_000]),
            &cfg(ChannelType::Network),
        );
        let acts = contents(&block);
        assert_eq!(acts.len(), 4);
        for act in &acts[..3] {
            assert_eq!(act.breakpoint_class, Some(BreakpointClass::FirstClass));
            assert_eq!(act.transition, Transition::None);
        }
        assert_eq!(total_ms(&block), 1_800_000);
    }

    #[test]
    fn network_without_markers_divides_evenly_with_fades() {
        let block = segment_slot(&slot(1_800_000, 1_320_000, &[]), &cfg(ChannelType::Network));
        let acts = contents(&block);
        assert_eq!(acts.len(), 4);
        for act in &acts[..3] {
            assert_eq!(act.breakpoint_class, Some(BreakpointClass::SecondClass));
            assert_eq!(act.transition, Transition::Fade { duration_ms: 500 });
        }
        // 1_320_000 / 4 = 330_000 per act.
        assert!(acts.iter().all(|a| a.segment_duration_ms == 330_000));
        assert_eq!(total_ms(&block), 1_800_000);
    }

    #[test]
    fn break_remainder_goes_to_the_last_breaks() {
        // 10-minute surplus over 3 breaks: 200_000 each; with a 2 ms
        // remainder the final two breaks each take one extra.
        let block = segment_slot(
            &slot(1_800_000, 1_199_998, &[300_000, 600_000, 900_000]),
            &cfg(ChannelType::Network),
        );
        let breaks: Vec<i64> = block
            .items
            .iter()
            .filter_map(|item| match item {
                BlockItem::Break(spec) => Some(spec.duration_ms),
                BlockItem::Content(_) => None,
            })
            .collect();
        assert_eq!(breaks, vec![200_000, 200_001, 200_001]);
        assert_eq!(total_ms(&block), 1_800_000);
    }

    #[test]
    fn act_offsets_walk_the_episode() {
        let block = segment_slot(&slot(1_800_000, 1_320_000, &[]), &cfg(ChannelType::Network));
        let acts = contents(&block);
        let offsets: Vec<i64> = acts.iter().map(|a| a.asset_start_offset_ms).collect();
        assert_eq!(offsets, vec![0, 330_000, 660_000, 990_000]);
        assert!(acts.iter().all(|a| a.segment_type == SegmentType::Content));
    }

    #[test]
    fn oversized_episode_is_truncated_with_no_breaks() {
        let block = segment_slot(&slot(1_800_000, 2_000_000, &[]), &cfg(ChannelType::Network));
        let acts = contents(&block);
        assert_eq!(acts.len(), 1);
        assert_eq!(acts[0].segment_duration_ms, 1_800_000);
        assert_eq!(total_ms(&block), 1_800_000);
    }
}
