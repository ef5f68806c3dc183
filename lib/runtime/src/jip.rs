//! Join-in-progress seeding.
//!
//! When the first viewer attaches mid-block, the position inside the active
//! entry is computed once, atomically, from the injected clock. The first
//! feed carries the full block identity and span, with the elapsed portion
//! trimmed off the front; steady-state feeding is untouched afterwards.

use headend_types::ExecutionEntry;

/// Where a join landed inside the active entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JipPosition {
    /// `now - entry.start`; always in `[0, entry duration)`.
    pub block_offset_ms: i64,
    /// Index of the first segment at or past the offset, after trimming.
    pub segment_cursor: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("join instant {now_utc_ms} outside active entry [{start_utc_ms}, {end_utc_ms})")]
pub struct JipError {
    pub now_utc_ms: i64,
    pub start_utc_ms: i64,
    pub end_utc_ms: i64,
}

/// Compute the join position. Deterministic in `(now, entry)`.
pub fn compute_jip_position(
    now_utc_ms: i64,
    entry: &ExecutionEntry,
) -> Result<JipPosition, JipError> {
    if now_utc_ms < entry.start_utc_ms || now_utc_ms >= entry.end_utc_ms {
        return Err(JipError {
            now_utc_ms,
            start_utc_ms: entry.start_utc_ms,
            end_utc_ms: entry.end_utc_ms,
        });
    }
    let block_offset_ms = now_utc_ms - entry.start_utc_ms;
    let mut elapsed = block_offset_ms;
    let mut segment_cursor = 0usize;
    for segment in &entry.segments {
        if elapsed < segment.segment_duration_ms {
            break;
        }
        elapsed -= segment.segment_duration_ms;
        segment_cursor += 1;
    }
    Ok(JipPosition {
        block_offset_ms,
        segment_cursor,
    })
}

/// First-feed view of the active entry: identity and span unchanged, fully
/// elapsed segments dropped, and the partially elapsed one advanced into
/// its asset by the elapsed amount.
pub fn trim_for_join(entry: &ExecutionEntry, position: JipPosition) -> ExecutionEntry {
    let mut trimmed = entry.clone();
    if position.block_offset_ms == 0 {
        return trimmed;
    }

    let mut elapsed = position.block_offset_ms;
    let mut segments = Vec::with_capacity(entry.segments.len());
    for segment in &entry.segments {
        if elapsed >= segment.segment_duration_ms {
            elapsed -= segment.segment_duration_ms;
            continue;
        }
        if elapsed > 0 {
            let mut partial = segment.clone();
            partial.asset_start_offset_ms += elapsed;
            partial.segment_duration_ms -= elapsed;
            segments.push(partial);
            elapsed = 0;
        } else {
            segments.push(segment.clone());
        }
    }
    trimmed.segments = segments;
    trimmed
}
