use chrono::{Datelike, NaiveDate, NaiveTime};
use headend_types::ProgramRef;
use serde::{Deserialize, Serialize};

/// Day-of-week filter entry for a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl From<chrono::Weekday> for DayOfWeek {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => DayOfWeek::Mon,
            chrono::Weekday::Tue => DayOfWeek::Tue,
            chrono::Weekday::Wed => DayOfWeek::Wed,
            chrono::Weekday::Thu => DayOfWeek::Thu,
            chrono::Weekday::Fri => DayOfWeek::Fri,
            chrono::Weekday::Sat => DayOfWeek::Sat,
            chrono::Weekday::Sun => DayOfWeek::Sun,
        }
    }
}

/// Named time window within the broadcast day, carrying the programs that
/// may be scheduled inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneDirective {
    pub zone_id: String,
    pub name: String,
    /// Local wall-clock start of the zone.
    pub local_start: NaiveTime,
    /// Local wall-clock end, exclusive. Equal to the broadcast-day anchor
    /// means "runs to the end of the day".
    pub local_end: NaiveTime,
    /// Empty means every day.
    #[serde(default)]
    pub days: Vec<DayOfWeek>,
    #[serde(default)]
    pub effective_from: Option<NaiveDate>,
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
    /// Ordered, rotated through by the sequence cursor.
    pub programs: Vec<ProgramRef>,
}

impl ZoneDirective {
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        if let Some(from) = self.effective_from {
            if date < from {
                return false;
            }
        }
        if let Some(to) = self.effective_to {
            if date > to {
                return false;
            }
        }
        self.days.is_empty() || self.days.contains(&DayOfWeek::from(date.weekday()))
    }

    /// Stable fingerprint of the program family, part of the sequence key.
    pub fn family_fingerprint(&self) -> String {
        let keys: Vec<String> = self.programs.iter().map(ProgramRef::key).collect();
        keys.join("|")
    }
}

/// A channel's editorial intent: ordered zones plus an activation window.
/// Date-independent; authored once, read many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulePlanArtifact {
    pub plan_id: String,
    pub channel: String,
    pub priority: u32,
    #[serde(default)]
    pub active_from: Option<NaiveDate>,
    #[serde(default)]
    pub active_to: Option<NaiveDate>,
    pub zones: Vec<ZoneDirective>,
}

impl SchedulePlanArtifact {
    pub fn active_on(&self, date: NaiveDate) -> bool {
        if let Some(from) = self.active_from {
            if date < from {
                return false;
            }
        }
        if let Some(to) = self.active_to {
            if date > to {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(days: Vec<DayOfWeek>) -> ZoneDirective {
        ZoneDirective {
            zone_id: "z1".into(),
            name: "Morning".into(),
            local_start: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            local_end: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            days,
            effective_from: None,
            effective_to: None,
            programs: vec![ProgramRef::Episode("a".into())],
        }
    }

    #[test]
    fn empty_day_filter_matches_every_day() {
        let z = zone(vec![]);
        // 2025-01-15 is a Wednesday.
        assert!(z.applies_on(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()));
    }

    #[test]
    fn day_filter_and_effective_range_both_gate() {
        let mut z = zone(vec![DayOfWeek::Mon]);
        let wednesday = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap();
        assert!(!z.applies_on(wednesday));
        assert!(z.applies_on(monday));

        z.effective_from = Some(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert!(!z.applies_on(monday));
    }

    #[test]
    fn family_fingerprint_distinguishes_order_and_kind() {
        let mut z = zone(vec![]);
        z.programs = vec![
            ProgramRef::Episode("a".into()),
            ProgramRef::Movie("b".into()),
        ];
        assert_eq!(z.family_fingerprint(), "episode:a|movie:b");
    }
}
