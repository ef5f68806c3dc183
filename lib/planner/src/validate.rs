//! Seam and grid validators enforced before a log becomes executable.
//!
//! Pure artifact validation; no side effects. A violation is fatal to the
//! planning unit and leaves the log unlocked.

use headend_timebase::grid_start;
use headend_types::TransmissionLogEntry;

/// Seam invariant violations: contiguity, grid duration, ordering, and
/// per-entry duration accounting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeamError {
    #[error("entry[{index}] ({block_id}) has non-positive duration: start={start_utc_ms}, end={end_utc_ms}")]
    NonPositiveDuration {
        index: usize,
        block_id: String,
        start_utc_ms: i64,
        end_utc_ms: i64,
    },

    #[error(
        "entry[{index}] ({block_id}) duration {actual_ms} ms != grid duration {expected_ms} ms"
    )]
    WrongGridDuration {
        index: usize,
        block_id: String,
        actual_ms: i64,
        expected_ms: i64,
    },

    #[error(
        "entry[{index}] ends at {end_utc_ms} but entry[{next_index}] starts at {next_start_utc_ms}; gaps or overlaps not allowed"
    )]
    Discontiguous {
        index: usize,
        next_index: usize,
        end_utc_ms: i64,
        next_start_utc_ms: i64,
    },

    #[error("entry[{next_index}] does not start strictly after entry[{index}]")]
    OrderViolation { index: usize, next_index: usize },

    #[error(
        "entry[{index}] ({block_id}) segments sum to {segment_sum_ms} ms but the block spans {block_ms} ms"
    )]
    SegmentSumMismatch {
        index: usize,
        block_id: String,
        segment_sum_ms: i64,
        block_ms: i64,
    },

    #[error("entry[{index}] ({block_id}) segment[{segment_index}] has non-positive duration")]
    NonPositiveSegment {
        index: usize,
        block_id: String,
        segment_index: usize,
    },
}

/// A block boundary off the channel grid, with the nearest valid
/// boundaries on each side.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "entry[{index}] ({block_id}) {field}={value_ms} is off the {grid_block_minutes}-minute grid; nearest boundaries: floor={floor_ms}, ceil={ceil_ms}"
)]
pub struct GridAlignmentError {
    pub index: usize,
    pub block_id: String,
    pub field: &'static str,
    pub value_ms: i64,
    pub grid_block_minutes: u32,
    pub floor_ms: i64,
    pub ceil_ms: i64,
}

/// Enforce seam invariants over an entry run.
pub fn validate_seams(
    entries: &[TransmissionLogEntry],
    grid_block_minutes: u32,
) -> Result<(), SeamError> {
    let expected_ms = i64::from(grid_block_minutes) * 60_000;

    for (index, entry) in entries.iter().enumerate() {
        let block_id = entry.block_id.to_string();

        if entry.end_utc_ms <= entry.start_utc_ms {
            return Err(SeamError::NonPositiveDuration {
                index,
                block_id,
                start_utc_ms: entry.start_utc_ms,
                end_utc_ms: entry.end_utc_ms,
            });
        }

        let actual_ms = entry.duration_ms();
        if actual_ms != expected_ms {
            return Err(SeamError::WrongGridDuration {
                index,
                block_id,
                actual_ms,
                expected_ms,
            });
        }

        let mut segment_sum_ms = 0i64;
        for (segment_index, segment) in entry.segments.iter().enumerate() {
            if segment.segment_duration_ms <= 0 {
                return Err(SeamError::NonPositiveSegment {
                    index,
                    block_id,
                    segment_index,
                });
            }
            segment_sum_ms += segment.segment_duration_ms;
        }
        if !entry.segments.is_empty() && segment_sum_ms != actual_ms {
            return Err(SeamError::SegmentSumMismatch {
                index,
                block_id,
                segment_sum_ms,
                block_ms: actual_ms,
            });
        }

        if let Some(next) = entries.get(index + 1) {
            if entry.end_utc_ms != next.start_utc_ms {
                return Err(SeamError::Discontiguous {
                    index,
                    next_index: index + 1,
                    end_utc_ms: entry.end_utc_ms,
                    next_start_utc_ms: next.start_utc_ms,
                });
            }
            if next.start_utc_ms <= entry.start_utc_ms {
                return Err(SeamError::OrderViolation {
                    index,
                    next_index: index + 1,
                });
            }
        }
    }
    Ok(())
}

/// Enforce grid alignment on every entry boundary. Reports the nearest
/// valid floor/ceil boundaries on failure. Empty runs pass trivially.
pub fn validate_grid_alignment(
    entries: &[TransmissionLogEntry],
    grid_block_minutes: u32,
) -> Result<(), GridAlignmentError> {
    let grid_ms = i64::from(grid_block_minutes) * 60_000;
    for (index, entry) in entries.iter().enumerate() {
        for (field, value_ms) in [
            ("start_utc_ms", entry.start_utc_ms),
            ("end_utc_ms", entry.end_utc_ms),
        ] {
            if value_ms % grid_ms != 0 {
                let floor_ms = grid_start(value_ms, grid_block_minutes);
                return Err(GridAlignmentError {
                    index,
                    block_id: entry.block_id.to_string(),
                    field,
                    value_ms,
                    grid_block_minutes,
                    floor_ms,
                    ceil_ms: floor_ms + grid_ms,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use headend_types::{BlockId, ScheduledSegment};

    fn entry(index: u32, start_utc_ms: i64, end_utc_ms: i64) -> TransmissionLogEntry {
        let duration = end_utc_ms - start_utc_ms;
        TransmissionLogEntry {
            block_id: BlockId::derive("asset", start_utc_ms),
            block_index: index,
            start_utc_ms,
            end_utc_ms,
            segments: vec![ScheduledSegment::content("file:///ep.mp4", 0, duration)],
        }
    }

    #[test]
    fn contiguous_grid_run_passes() {
        let entries = vec![entry(0, 0, 1_800_000), entry(1, 1_800_000, 3_600_000)];
        validate_seams(&entries, 30).unwrap();
        validate_grid_alignment(&entries, 30).unwrap();
    }

    #[test]
    fn gap_between_entries_is_a_seam_violation() {
        let entries = vec![entry(0, 0, 1_800_000), entry(1, 1_860_000, 3_660_000)];
        assert_matches!(
            validate_seams(&entries, 30),
            Err(SeamError::Discontiguous { index: 0, next_start_utc_ms: 1_860_000, .. })
        );
    }

    #[test]
    fn wrong_duration_is_caught_before_contiguity() {
        let entries = vec![entry(0, 0, 1_200_000)];
        assert_matches!(
            validate_seams(&entries, 30),
            Err(SeamError::WrongGridDuration { actual_ms: 1_200_000, expected_ms: 1_800_000, .. })
        );
    }

    #[test]
    fn zero_duration_entry_is_rejected() {
        let entries = vec![entry(0, 0, 0)];
        assert_matches!(
            validate_seams(&entries, 30),
            Err(SeamError::NonPositiveDuration { .. })
        );
    }

    #[test]
    fn segment_sum_must_match_block_duration() {
        let mut e = entry(0, 0, 1_800_000);
        e.segments[0].segment_duration_ms = 1_700_000;
        assert_matches!(
            validate_seams(&[e], 30),
            Err(SeamError::SegmentSumMismatch { segment_sum_ms: 1_700_000, .. })
        );
    }

    #[test]
    fn off_grid_boundary_reports_floor_and_ceil() {
        let entries = vec![entry(0, 600_000, 2_400_000)];
        let err = validate_grid_alignment(&entries, 30).unwrap_err();
        assert_eq!(err.field, "start_utc_ms");
        assert_eq!(err.floor_ms, 0);
        assert_eq!(err.ceil_ms, 1_800_000);
    }
}
