use dashmap::DashMap;

/// Identity of one rotation cursor.
///
/// Carries both the zone and the program family so two zones sharing a
/// family rotate independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SequenceKey {
    pub channel: String,
    pub zone_id: String,
    pub family: String,
}

impl SequenceKey {
    pub fn new(
        channel: impl Into<String>,
        zone_id: impl Into<String>,
        family: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            zone_id: zone_id.into(),
            family: family.into(),
        }
    }
}

/// Per-key rotation cursor. `next_index` only advances (modulo the family
/// size); it never retreats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SequenceState {
    pub next_index: usize,
    pub last_rotated_ms: i64,
}

/// Rotation cursors for all (channel, zone, family) tuples.
///
/// Mutated only by the planner during resolution; the per-entry locking of
/// the map is the required per-key mutex.
#[derive(Debug, Default)]
pub struct SequenceStore {
    cursors: DashMap<SequenceKey, SequenceState>,
}

impl SequenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the current index for `key` and advance the cursor by one,
    /// modulo `family_len`. Records `now_ms` as the rotation instant.
    pub fn advance(&self, key: &SequenceKey, family_len: usize, now_ms: i64) -> usize {
        assert!(family_len > 0, "empty families are rejected before rotation");
        let mut state = self.cursors.entry(key.clone()).or_default();
        let index = state.next_index % family_len;
        state.next_index = (index + 1) % family_len;
        state.last_rotated_ms = now_ms;
        index
    }

    pub fn get(&self, key: &SequenceKey) -> Option<SequenceState> {
        self.cursors.get(key).map(|s| *s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_is_deterministic_and_wraps() {
        let store = SequenceStore::new();
        let key = SequenceKey::new("retro-1", "zone-morning", "episode:show-a");
        let picks: Vec<usize> = (0..5).map(|i| store.advance(&key, 3, i * 1_800_000)).collect();
        assert_eq!(picks, vec![0, 1, 2, 0, 1]);
        let state = store.get(&key).unwrap();
        assert_eq!(state.next_index, 2);
        assert_eq!(state.last_rotated_ms, 4 * 1_800_000);
    }

    #[test]
    fn zones_sharing_a_family_rotate_independently() {
        let store = SequenceStore::new();
        let morning = SequenceKey::new("retro-1", "zone-morning", "episode:show-a");
        let evening = SequenceKey::new("retro-1", "zone-evening", "episode:show-a");
        assert_eq!(store.advance(&morning, 3, 0), 0);
        assert_eq!(store.advance(&morning, 3, 1), 1);
        assert_eq!(store.advance(&evening, 3, 2), 0);
    }
}
