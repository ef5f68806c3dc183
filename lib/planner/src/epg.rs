//! Stage 2: viewer-facing guide events, projected from a resolved day.

use crate::error::PlanError;
use crate::resolve::ResolvedScheduleDay;
use headend_catalog::AssetLibrary;
use headend_types::EpgEvent;

/// One event per resolved slot, in air order, carrying titles and synopses
/// from the library. Seam properties are inherited from the resolved day.
pub fn derive_epg(
    day: &ResolvedScheduleDay,
    library: &dyn AssetLibrary,
) -> Result<Vec<EpgEvent>, PlanError> {
    day.slots
        .iter()
        .map(|slot| {
            Ok(EpgEvent {
                channel: day.channel.clone(),
                start_utc_ms: slot.start_utc_ms,
                end_utc_ms: slot.end_utc_ms,
                title: library.title(&slot.asset.asset_uri)?,
                synopsis: library.synopsis(&slot.asset.asset_uri),
                program_ref: slot.program_ref.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::ResolvedSlot;
    use chrono::NaiveDate;
    use headend_catalog::{AssetRecord, InMemoryAssetLibrary};
    use headend_types::{ProgramRef, ResolvedAsset};

    fn day_with_slots(n: usize) -> ResolvedScheduleDay {
        ResolvedScheduleDay {
            channel: "retro-1".into(),
            broadcast_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            day_anchor_utc_ms: 0,
            slots: (0..n)
                .map(|i| ResolvedSlot {
                    zone_id: "z".into(),
                    slot_index: i as u32,
                    start_utc_ms: i as i64 * 1_800_000,
                    end_utc_ms: (i as i64 + 1) * 1_800_000,
                    program_ref: ProgramRef::Episode("file:///ep.mp4".into()),
                    asset: ResolvedAsset {
                        asset_uri: "file:///ep.mp4".into(),
                        duration_ms: 1_320_000,
                        markers: vec![],
                    },
                })
                .collect(),
        }
    }

    #[test]
    fn events_mirror_slot_seams_and_carry_titles() {
        let mut lib = InMemoryAssetLibrary::new();
        lib.insert_asset(AssetRecord {
            asset_uri: "file:///ep.mp4".into(),
            duration_ms: 1_320_000,
            markers: vec![],
            title: "Pilot".into(),
            synopsis: Some("The one that started it.".into()),
        })
        .unwrap();

        let events = derive_epg(&day_with_slots(3), &lib).unwrap();
        assert_eq!(events.len(), 3);
        for pair in events.windows(2) {
            assert_eq!(pair[0].end_utc_ms, pair[1].start_utc_ms);
            assert!(pair[0].start_utc_ms < pair[1].start_utc_ms);
        }
        assert_eq!(events[0].title, "Pilot");
        assert_eq!(events[0].synopsis.as_deref(), Some("The one that started it."));
    }

    #[test]
    fn missing_title_fails_the_projection() {
        let lib = InMemoryAssetLibrary::new();
        assert!(derive_epg(&day_with_slots(1), &lib).is_err());
    }
}
