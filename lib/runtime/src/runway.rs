//! Runway readiness: how much non-recovery material is queued ahead of the
//! playhead, and whether every fence has a ready successor.
//!
//! Pure validation; no execution behavior and no horizon dependency.

use headend_types::ExecutionEntry;

/// Runway or fence readiness below budget. Blocks session start; the
/// horizon must be extended upstream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunwayReadinessError {
    #[error("runway {runway_ms} ms is below the preload budget {preload_budget_ms} ms")]
    InsufficientRunway {
        runway_ms: i64,
        preload_budget_ms: i64,
    },

    #[error("terminal fence {at_block:?} has no ready successor")]
    NoReadySuccessor { at_block: Option<String> },
}

/// Cumulative non-recovery runway (ms) ahead of `playhead_utc_ms`.
///
/// Walks the queue forward; a block containing the playhead contributes
/// only its unplayed remainder. Recovery pads contribute nothing. All
/// queued blocks are treated as ready.
pub fn compute_runway_ms(queue: &[ExecutionEntry], playhead_utc_ms: i64) -> i64 {
    let mut runway_ms = 0i64;
    for block in queue {
        if block.end_utc_ms <= playhead_utc_ms {
            continue;
        }
        if block.start_utc_ms >= playhead_utc_ms {
            runway_ms += block
                .segments
                .iter()
                .filter(|s| !s.is_recovery())
                .map(|s| s.segment_duration_ms)
                .sum::<i64>();
            continue;
        }
        // Playhead is inside this block; count segment remainders.
        let elapsed = playhead_utc_ms - block.start_utc_ms;
        let mut cursor = 0i64;
        for segment in &block.segments {
            let segment_end = cursor + segment.segment_duration_ms;
            if segment_end > elapsed && !segment.is_recovery() {
                let remaining = segment.segment_duration_ms - (elapsed - cursor).max(0);
                runway_ms += remaining;
            }
            cursor = segment_end;
        }
    }
    runway_ms
}

/// Session-level runway from the furthest delivered end, clamped at zero.
pub fn session_runway_ms(delivered_end_utc_ms: i64, now_utc_ms: i64) -> i64 {
    (delivered_end_utc_ms - now_utc_ms).max(0)
}

/// Runway must cover the preload budget.
pub fn validate_runway(runway_ms: i64, preload_budget_ms: i64) -> Result<(), RunwayReadinessError> {
    if runway_ms < preload_budget_ms {
        return Err(RunwayReadinessError::InsufficientRunway {
            runway_ms,
            preload_budget_ms,
        });
    }
    Ok(())
}

/// Every fence needs a ready successor. Queued blocks satisfy internal
/// fences; the terminal fence is satisfied by `successor_ready`, or by a
/// recovery successor, which is exempt.
pub fn validate_fence_readiness(
    queue: &[ExecutionEntry],
    playhead_utc_ms: i64,
    successor_ready: bool,
    successor_is_recovery: bool,
) -> Result<(), RunwayReadinessError> {
    if successor_ready || successor_is_recovery {
        return Ok(());
    }
    let last_ahead = queue
        .iter()
        .filter(|b| b.end_utc_ms > playhead_utc_ms)
        .next_back();
    Err(RunwayReadinessError::NoReadySuccessor {
        at_block: last_ahead.map(|b| b.block_id.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use headend_types::{BlockId, ScheduledSegment};

    fn block(start_utc_ms: i64, segment_ms: &[i64]) -> ExecutionEntry {
        let total: i64 = segment_ms.iter().sum();
        ExecutionEntry {
            block_id: BlockId::derive("ep", start_utc_ms),
            block_index: 0,
            start_utc_ms,
            end_utc_ms: start_utc_ms + total,
            segments: segment_ms
                .iter()
                .map(|&d| ScheduledSegment::content("file:///ep.mp4", 0, d))
                .collect(),
        }
    }

    #[test]
    fn whole_queue_counts_from_before_the_window() {
        let queue = vec![block(10_000, &[5_000, 5_000]), block(20_000, &[10_000])];
        assert_eq!(compute_runway_ms(&queue, 0), 20_000);
    }

    #[test]
    fn mid_block_playhead_counts_remainders() {
        let queue = vec![block(0, &[5_000, 5_000]), block(10_000, &[10_000])];
        // 3 s into the first segment: 2 s + 5 s + 10 s.
        assert_eq!(compute_runway_ms(&queue, 3_000), 17_000);
    }

    #[test]
    fn recovery_pads_do_not_count() {
        let mut b = block(0, &[5_000, 5_000]);
        b.segments[1] = ScheduledSegment::pad(5_000);
        b.segments[1].runtime_recovery = true;
        assert_eq!(compute_runway_ms(&[b], 0), 5_000);
    }

    #[test]
    fn planned_pads_do_count() {
        let mut b = block(0, &[5_000, 5_000]);
        b.segments[1] = ScheduledSegment::pad(5_000);
        assert_eq!(compute_runway_ms(&[b], 0), 10_000);
    }

    #[test]
    fn fully_played_blocks_contribute_nothing() {
        let queue = vec![block(0, &[5_000]), block(5_000, &[5_000])];
        assert_eq!(compute_runway_ms(&queue, 5_000), 5_000);
        assert_eq!(compute_runway_ms(&queue, 10_000), 0);
    }

    #[test]
    fn session_runway_never_goes_negative() {
        // Delivered through 110 s.
        assert_eq!(session_runway_ms(110_000, 105_000), 5_000);
        assert_eq!(session_runway_ms(110_000, 111_000), 0);
    }

    #[test]
    fn budget_enforcement() {
        validate_runway(5_000, 3_000).unwrap();
        assert_matches!(
            validate_runway(2_000, 3_000),
            Err(RunwayReadinessError::InsufficientRunway { runway_ms: 2_000, .. })
        );
    }

    #[test]
    fn terminal_fence_requires_ready_or_recovery_successor() {
        let queue = vec![block(0, &[5_000])];
        validate_fence_readiness(&queue, 0, true, false).unwrap();
        validate_fence_readiness(&queue, 0, false, true).unwrap();
        assert_matches!(
            validate_fence_readiness(&queue, 0, false, false),
            Err(RunwayReadinessError::NoReadySuccessor { at_block: Some(_) })
        );
        assert_matches!(
            validate_fence_readiness(&[], 0, false, false),
            Err(RunwayReadinessError::NoReadySuccessor { at_block: None })
        );
    }
}
