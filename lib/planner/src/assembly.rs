//! Stages 5 and 6: wall-clock alignment, validation, and the horizon lock.

use crate::error::PlanError;
use crate::traffic::FilledBlock;
use crate::validate::{validate_grid_alignment, validate_seams};
use chrono::NaiveDate;
use headend_types::{BlockId, TransmissionLog, TransmissionLogEntry};

/// Concatenate filled blocks into a transmission log in `building` state.
///
/// Block ids derive from `(asset key, start_utc_ms)`, so identical
/// programming at an identical instant always carries the same identity.
/// Seam and grid invariants are enforced before the log is returned.
pub fn assemble_transmission_log(
    channel: &str,
    broadcast_date: NaiveDate,
    blocks: Vec<FilledBlock>,
    grid_block_minutes: u32,
) -> Result<TransmissionLog, PlanError> {
    let entries: Vec<TransmissionLogEntry> = blocks
        .into_iter()
        .enumerate()
        .map(|(index, block)| TransmissionLogEntry {
            block_id: BlockId::derive(&block.block_key, block.start_utc_ms),
            block_index: index as u32,
            start_utc_ms: block.start_utc_ms,
            end_utc_ms: block.end_utc_ms,
            segments: block.segments,
        })
        .collect();

    validate_seams(&entries, grid_block_minutes)?;
    validate_grid_alignment(&entries, grid_block_minutes)?;

    let mut log = TransmissionLog::new(channel, broadcast_date);
    log.entries = entries;
    Ok(log)
}

/// Stage 6: re-validate and transition `building -> locked`.
///
/// Locking an already-locked log is an error and never a rewrite.
pub fn lock_for_execution(
    log: &mut TransmissionLog,
    grid_block_minutes: u32,
) -> Result<(), PlanError> {
    validate_seams(&log.entries, grid_block_minutes)?;
    validate_grid_alignment(&log.entries, grid_block_minutes)?;
    log.lock()?;
    tracing::info!(
        channel = %log.channel,
        broadcast_date = %log.broadcast_date,
        entries = log.entries.len(),
        "transmission log locked for execution"
    );
    Ok(())
}
