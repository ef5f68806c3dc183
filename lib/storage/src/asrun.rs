use headend_types::AsRunBlock;
use std::sync::Mutex;

/// Append-only as-run log.
///
/// A block committed here is never rewritten; reconciliation against the
/// planned log happens downstream on snapshots.
#[derive(Debug, Default)]
pub struct AsRunStore {
    blocks: Mutex<Vec<AsRunBlock>>,
}

impl AsRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, block: AsRunBlock) {
        tracing::debug!(
            block_id = %block.block_id,
            completed = block.completed,
            delta_ms = ?block.delta_ms,
            "as-run append"
        );
        self.blocks.lock().expect("as-run lock poisoned").push(block);
    }

    /// Snapshot in append order.
    pub fn blocks(&self) -> Vec<AsRunBlock> {
        self.blocks.lock().expect("as-run lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.blocks.lock().expect("as-run lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
